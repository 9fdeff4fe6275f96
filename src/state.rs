use crate::chat::TurnContext;
use crate::config::Config;
use crate::error::Result;
use crate::ingestion::{HttpSpecFetcher, SpecFetcher};
use crate::invocation::{HttpToolInvoker, ToolExecutor};
use crate::llm::{ChatModel, OpenAiChatModel};
use crate::selection::RankPolicy;
use crate::session::SessionRegistry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Application state shared across all request handlers.
///
/// The fetcher, executor and model are trait objects so tests can swap in
/// canned documents and a scripted model.
pub struct AppState {
    pub registry: SessionRegistry,
    pub fetcher: Arc<dyn SpecFetcher>,
    pub executor: Arc<dyn ToolExecutor>,
    pub model: Arc<dyn ChatModel>,
    /// Set once the listener is bound; `/ready` answers 503 until then.
    pub ready: AtomicBool,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the HTTP-backed collaborators from configuration.
    pub fn new(config: Config) -> Result<Self> {
        let fetcher = HttpSpecFetcher::new(config.fetch_timeout())?;
        let executor = HttpToolInvoker::new(config.invoke_timeout())?;
        let model = OpenAiChatModel::new(
            &config.llm_base_url,
            &config.llm_api_path,
            config.llm_api_key.clone(),
            config.chat_model.clone(),
            config.invoke_timeout(),
        )?;

        if config.llm_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY is not set; chat turns will fail");
        }

        Ok(Self::with_components(
            config,
            Arc::new(fetcher),
            Arc::new(executor),
            Arc::new(model),
        ))
    }

    pub fn with_components(
        config: Config,
        fetcher: Arc<dyn SpecFetcher>,
        executor: Arc<dyn ToolExecutor>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        tracing::info!(
            max_history = config.max_history,
            tool_limit = config.tool_limit,
            avoid_uploads = config.avoid_uploads,
            "Application state initialized"
        );

        Self {
            registry: SessionRegistry::new(config.max_history),
            fetcher,
            executor,
            model,
            ready: AtomicBool::new(false),
            config: Arc::new(config),
        }
    }

    pub fn rank_policy(&self) -> RankPolicy {
        RankPolicy {
            avoid_uploads: self.config.avoid_uploads,
        }
    }

    pub fn turn_context(&self) -> TurnContext<'_> {
        TurnContext {
            model: self.model.as_ref(),
            executor: self.executor.as_ref(),
            tool_limit: self.config.tool_limit,
            policy: self.rank_policy(),
        }
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
    }

    /// Check if the service is ready to handle requests.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
