// Formflux Connectors - Outbound HTTP Adapters
// Implements the core ports for the inference service and movie catalog

pub mod cache;
pub mod catalog;
pub mod executor;
pub mod inference;
pub mod request;

pub use cache::TtlCache;
pub use catalog::{OmdbCatalog, OmdbConfig};
pub use executor::RemoteCallExecutor;
pub use inference::{GeminiClient, GeminiConfig};
pub use request::{RequestBody, RequestSpec};
