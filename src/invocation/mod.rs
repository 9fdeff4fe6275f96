//! Turning a selected tool plus model-supplied arguments into an HTTP call.

pub mod client;
pub mod materialize;

pub use client::{join_url, HttpToolInvoker, ToolExecutor, ToolResult};
pub use materialize::{materialize, MaterializeError, MaterializedCall};
