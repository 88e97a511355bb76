// Application Layer - Use Cases and Business Logic

pub mod fanout;
pub mod lifecycle;
pub mod masking;
pub mod pipeline;
pub mod retry;
pub mod search;
pub mod worker;

// Re-exports
pub use lifecycle::JobLifecycle;
pub use pipeline::DocumentPipeline;
pub use search::{MovieSearch, SearchConfig};
pub use worker::{shutdown_channel, work_channel, ShutdownSender, ShutdownToken, Worker};
