// Inference Service Port (Interface)

use crate::domain::MediaKind;
use crate::error::Result;
use async_trait::async_trait;

/// Opaque handle to a document uploaded to the inference service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReference {
    pub uri: String,
    pub mime_type: String,
}

/// Connector to the remote generative-inference service.
///
/// Both operations are remote and fallible. They run inside the job's
/// cancellation scope: when the supervising deadline fires the in-flight
/// future is dropped, which must abort the underlying call and release its
/// connection.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Upload a document, returning an opaque file reference
    async fn upload_document(&self, content: &[u8], kind: MediaKind) -> Result<FileReference>;

    /// Generate content from a prompt plus an optional uploaded file
    async fn generate(&self, prompt: &str, file: Option<&FileReference>) -> Result<String>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Scripted inference behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Upload and generate succeed, returning this response text
        Respond(String),
        /// Upload fails with this message
        UploadFail(String),
        /// Upload succeeds, generate fails with this message
        GenerateFail(String),
        /// Generate never completes (for deadline/cancellation testing)
        Hang,
    }

    /// Mock inference client for testing
    pub struct MockInferenceClient {
        behavior: MockBehavior,
        upload_calls: AtomicUsize,
        generate_calls: AtomicUsize,
    }

    impl MockInferenceClient {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                upload_calls: AtomicUsize::new(0),
                generate_calls: AtomicUsize::new(0),
            }
        }

        pub fn respond_with(text: impl Into<String>) -> Self {
            Self::new(MockBehavior::Respond(text.into()))
        }

        pub fn upload_calls(&self) -> usize {
            self.upload_calls.load(Ordering::SeqCst)
        }

        pub fn generate_calls(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InferenceClient for MockInferenceClient {
        async fn upload_document(
            &self,
            _content: &[u8],
            kind: MediaKind,
        ) -> Result<FileReference> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::UploadFail(msg) => Err(AppError::Upstream(serde_json::json!({
                    "error": {"message": msg}
                }))),
                _ => Ok(FileReference {
                    uri: "mock://files/1".to_string(),
                    mime_type: kind.mime_type().to_string(),
                }),
            }
        }

        async fn generate(&self, _prompt: &str, _file: Option<&FileReference>) -> Result<String> {
            self.generate_calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Respond(text) => Ok(text.clone()),
                MockBehavior::GenerateFail(msg) => Err(AppError::Upstream(serde_json::json!({
                    "error": {"message": msg}
                }))),
                MockBehavior::Hang => {
                    // Far longer than any test deadline; the supervising
                    // timeout drops this future first
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(String::new())
                }
                MockBehavior::UploadFail(_) => Err(AppError::Internal(
                    "generate called after failed upload".to_string(),
                )),
            }
        }
    }
}
