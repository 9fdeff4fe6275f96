//! Ingestion module: OpenAPI / Swagger documents in, normalized tools out.
//!
//! Three dialects are understood (OpenAPI 3, Swagger 2.0, Swagger 1.2). Each
//! has its own parser; [`normalize`] picks one by inspecting the document.

pub mod batch;
pub mod fetch;
pub mod normalizer;
pub mod oas3;
pub mod swagger12;
pub mod swagger2;
pub mod types;

pub use batch::{ingest_documents, IngestOutcome};
pub use fetch::{HttpSpecFetcher, SpecFetcher, StaticSpecFetcher};
pub use normalizer::{normalize, Dialect};
pub use types::{HttpMethod, ParamSchema, SchemaType, Tool, ToolParameters};
