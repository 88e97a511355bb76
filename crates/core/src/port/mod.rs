// Port Layer - Interfaces for external dependencies

pub mod catalog;
pub mod id_provider; // For deterministic testing
pub mod inference;
pub mod job_queue;
pub mod job_store;
pub mod response_cache;
pub mod time_provider;

// Re-exports
pub use catalog::CatalogClient;
pub use id_provider::IdProvider;
pub use inference::{FileReference, InferenceClient};
pub use job_queue::{JobQueue, WorkItem};
pub use job_store::JobStore;
pub use response_cache::ResponseCache;
pub use time_provider::TimeProvider;
