use std::env;
use std::time::Duration;

pub struct Config {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
    /// Maximum conversation messages retained per session (oldest dropped first).
    pub max_history: usize,
    /// Number of tools offered to the model on each chat turn.
    pub tool_limit: usize,
    /// Penalize upload/multipart endpoints unless the user asks for them.
    pub avoid_uploads: bool,
    /// Timeout for specification and declaration fetches.
    pub fetch_timeout_secs: u64,
    /// Timeout for a single downstream tool invocation.
    pub invoke_timeout_secs: u64,
    /// Origin of the OpenAI-compatible chat completions provider.
    pub llm_base_url: String,
    pub llm_api_path: String,
    pub llm_api_key: Option<String>,
    pub chat_model: String,
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            shutdown_timeout_secs: env::var("SHUTDOWN_TIMEOUT")
                .unwrap_or_else(|_| "5".to_string())
                .parse()?,
            max_history: env::var("MAX_HISTORY")
                .unwrap_or_else(|_| "16".to_string())
                .parse()?,
            tool_limit: env::var("TOP_TOOL_LIMIT")
                .unwrap_or_else(|_| "8".to_string())
                .parse()?,
            avoid_uploads: env::var("AVOID_UPLOAD_BY_DEFAULT")
                .map(|v| v == "1")
                .unwrap_or(true),
            fetch_timeout_secs: env::var("FETCH_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            invoke_timeout_secs: env::var("INVOKE_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()?,
            llm_base_url: env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            llm_api_path: env::var("LLM_API_PATH")
                .unwrap_or_else(|_| "/v1/chat/completions".to_string()),
            llm_api_key: env::var("OPENAI_API_KEY").ok().filter(|k| !k.trim().is_empty()),
            chat_model: env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn invoke_timeout(&self) -> Duration {
        Duration::from_secs(self.invoke_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            shutdown_timeout_secs: 5,
            max_history: 16,
            tool_limit: 8,
            avoid_uploads: true,
            fetch_timeout_secs: 30,
            invoke_timeout_secs: 30,
            llm_base_url: "https://api.openai.com".to_string(),
            llm_api_path: "/v1/chat/completions".to_string(),
            llm_api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
        }
    }
}
