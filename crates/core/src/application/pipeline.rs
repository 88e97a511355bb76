// Document processing pipeline - upload, generate, persist outcome

use crate::application::lifecycle::JobLifecycle;
use crate::domain::{DocumentPayload, JobId, JobTransition, TaskResult};
use crate::error::{AppError, Result};
use crate::port::InferenceClient;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

/// Extraction instructions sent with every document
pub const EXTRACTION_PROMPT: &str = "Extract all fields from this W-2 tax form and return them \
as a single JSON object. Group the fields under employee_info, employer_info and wage_info. \
Return only the JSON object, with no surrounding text.";

/// Runs one queued document end to end.
///
/// The pipeline owns the happy path and converts every upstream problem
/// into a FAILED terminal record; only store access errors propagate.
/// The supervising deadline around `process` handles the case where an
/// upstream call never returns at all.
pub struct DocumentPipeline {
    lifecycle: Arc<JobLifecycle>,
    inference: Arc<dyn InferenceClient>,
}

impl DocumentPipeline {
    pub fn new(lifecycle: Arc<JobLifecycle>, inference: Arc<dyn InferenceClient>) -> Self {
        Self {
            lifecycle,
            inference,
        }
    }

    /// Process one work item: mark IN_PROGRESS, extract, mark terminal
    pub async fn process(&self, job_id: &JobId, payload: DocumentPayload) -> Result<()> {
        self.lifecycle.mark(job_id, JobTransition::Start).await?;

        let value = match self.extract(&payload).await {
            Ok(value) => value,
            Err(e) => {
                warn!(job_id = %job_id, error = %e, "Document extraction failed");
                let result = TaskResult::new(error_payload(&e));
                self.lifecycle
                    .mark(job_id, JobTransition::Fail(result))
                    .await?;
                return Ok(());
            }
        };

        // A well-formed response can still carry an upstream error object
        if value.get("error").is_some() {
            self.lifecycle
                .mark(job_id, JobTransition::Fail(TaskResult::new(value)))
                .await?;
            return Ok(());
        }

        info!(job_id = %job_id, "Document extraction succeeded");
        self.lifecycle
            .mark(job_id, JobTransition::Succeed(TaskResult::new(value)))
            .await?;
        Ok(())
    }

    async fn extract(&self, payload: &DocumentPayload) -> Result<Value> {
        let file = self
            .inference
            .upload_document(&payload.content, payload.media_kind)
            .await?;
        let text = self
            .inference
            .generate(EXTRACTION_PROMPT, Some(&file))
            .await?;
        parse_model_output(&text)
    }
}

/// Parse model output as JSON, tolerating a markdown code fence around it
fn parse_model_output(text: &str) -> Result<Value> {
    let trimmed = strip_code_fence(text.trim());
    serde_json::from_str(trimmed).map_err(|e| {
        AppError::Upstream(serde_json::json!({
            "error": {"message": format!("Model returned non-JSON output: {}", e)}
        }))
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.trim().strip_suffix("```").unwrap_or(rest).trim()
}

/// Build the failure payload stored on a FAILED job.
///
/// Upstream errors already shaped as JSON are stored verbatim; anything
/// else is wrapped in the standard error envelope.
fn error_payload(error: &AppError) -> Value {
    match error {
        AppError::Upstream(value) => value.clone(),
        other => serde_json::json!({
            "error": {"message": other.to_string()}
        }),
    }
}
