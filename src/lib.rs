//! Toolforge - OpenAPI/Swagger to LLM tool compiler
//!
//! Normalizes OpenAPI 3, Swagger 2.0 and Swagger 1.2 documents into callable
//! tools, ranks them against a user utterance, and runs chat turns in which a
//! language model picks one and the tool's HTTP request is built and sent.

pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ingestion;
pub mod invocation;
pub mod llm;
pub mod selection;
pub mod session;
pub mod state;

// Re-export key types for convenience
pub use chat::{run_turn, ChatOutcome, TurnContext};
pub use config::Config;
pub use error::{AppError, Result};
pub use handlers::router;
pub use ingestion::{ingest_documents, normalize, Dialect, HttpMethod, SpecFetcher, Tool};
pub use invocation::{materialize, ToolExecutor, ToolResult};
pub use llm::{ChatMessage, ChatModel, FunctionDescriptor};
pub use selection::{rank, RankPolicy, Vocabulary};
pub use session::SessionRegistry;
pub use state::AppState;
