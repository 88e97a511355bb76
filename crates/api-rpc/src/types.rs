//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use formflux_core::domain::{Job, MovieSearchResponse, MovieSummary};
use serde::{Deserialize, Serialize};

/// doc.submit.v1 - Submit a document for extraction
#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    /// Base64-encoded document bytes
    pub document: String,
    /// MIME type of the document
    pub media_type: String,
    /// Optional per-request restriction of accepted MIME types
    #[serde(default)]
    pub allowed_media_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: String,
}

/// doc.result.v1 - Fetch a job record with its (masked) result
#[derive(Debug, Deserialize)]
pub struct ResultRequest {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultResponse {
    pub job_id: String,
    pub status: String,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub result: Option<serde_json::Value>,
}

impl ResultResponse {
    /// Build from a job record and an already-masked result payload
    pub fn from_job(job: Job, masked_result: Option<serde_json::Value>) -> Self {
        Self {
            job_id: job.id,
            status: job.status.to_string(),
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
            result: masked_result,
        }
    }
}

/// movies.search.v1 - Search the movie catalog
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_page() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub total_results: u64,
    pub total_pages: u64,
    pub results: Vec<MovieSummary>,
}

impl From<MovieSearchResponse> for SearchResponse {
    fn from(page: MovieSearchResponse) -> Self {
        Self {
            total_results: page.total_results,
            total_pages: page.total_pages,
            results: page.results,
        }
    }
}
