// Gemini inference adapter - document upload and content generation

use crate::executor::RemoteCallExecutor;
use crate::request::RequestSpec;
use async_trait::async_trait;
use formflux_core::application::retry::RetryPolicy;
use formflux_core::domain::MediaKind;
use formflux_core::error::{AppError, Result};
use formflux_core::port::{FileReference, InferenceClient};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Gemini REST client.
///
/// Calls are not retried here: the supervising job deadline owns slow
/// inference, and a duplicate generation is worse than a failed one.
pub struct GeminiClient {
    executor: RemoteCallExecutor,
    config: GeminiConfig,
    policy: RetryPolicy,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            executor: RemoteCallExecutor::new(),
            config,
            policy: RetryPolicy::no_retry(),
        }
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.config.base_url)
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn upload_document(&self, content: &[u8], kind: MediaKind) -> Result<FileReference> {
        let spec = RequestSpec::post(self.upload_url())
            .query_param("key", &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "raw")
            .bytes_body(content.to_vec(), kind.mime_type())
            .timeout(self.config.timeout);

        let (payload, status) = self.executor.execute(&spec, &self.policy).await;
        if status != Some(200) {
            return Err(AppError::Upstream(payload));
        }

        let uri = payload
            .pointer("/file/uri")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::Upstream(payload.clone()))?
            .to_string();
        debug!(uri = %uri, "Document uploaded");
        Ok(FileReference {
            uri,
            mime_type: kind.mime_type().to_string(),
        })
    }

    async fn generate(&self, prompt: &str, file: Option<&FileReference>) -> Result<String> {
        let mut parts = Vec::new();
        if let Some(file) = file {
            parts.push(json!({
                "file_data": {"file_uri": file.uri, "mime_type": file.mime_type}
            }));
        }
        parts.push(json!({"text": prompt}));

        let spec = RequestSpec::post(self.generate_url())
            .query_param("key", &self.config.api_key)
            .json_body(json!({"contents": [{"parts": parts}]}))
            .timeout(self.config.timeout);

        let (payload, status) = self.executor.execute(&spec, &self.policy).await;
        if status != Some(200) {
            return Err(AppError::Upstream(payload));
        }

        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(AppError::Upstream(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = GeminiClient::new(GeminiConfig::new("k", "gemini-2.0-flash"));
        assert_eq!(
            client.upload_url(),
            "https://generativelanguage.googleapis.com/upload/v1beta/files"
        );
        assert_eq!(
            client.generate_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }
}
