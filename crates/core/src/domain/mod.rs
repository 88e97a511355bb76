// Domain Layer - Pure business logic and entities

pub mod document;
pub mod error;
pub mod job;
pub mod movies;

// Re-exports
pub use document::{DocumentPayload, MediaKind};
pub use error::DomainError;
pub use job::{Job, JobId, JobState, JobTransition, MarkOutcome, TaskResult};
pub use movies::{MovieSearchResponse, MovieSummary, UNAVAILABLE};
