//! RPC Method Handlers
//!
//! Implements the business logic for each JSON-RPC method.

use crate::error::to_rpc_error;
use crate::types::{
    ResultRequest, ResultResponse, SearchRequest, SearchResponse, SubmitRequest, SubmitResponse,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use formflux_core::application::masking::{mask_sensitive_fields, DEFAULT_MASK_PATHS};
use formflux_core::application::{JobLifecycle, MovieSearch};
use formflux_core::domain::{DocumentPayload, MediaKind};
use formflux_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use std::sync::Arc;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    lifecycle: Arc<JobLifecycle>,
    search: Arc<MovieSearch>,
    mask_paths: &'static [&'static str],
}

impl RpcHandler {
    pub fn new(lifecycle: Arc<JobLifecycle>, search: Arc<MovieSearch>) -> Self {
        Self {
            lifecycle,
            search,
            mask_paths: DEFAULT_MASK_PATHS,
        }
    }

    /// doc.submit.v1
    pub async fn submit(&self, params: SubmitRequest) -> Result<SubmitResponse, ErrorObjectOwned> {
        let content = BASE64.decode(&params.document).map_err(|e| {
            to_rpc_error(AppError::Validation(format!("Invalid base64 document: {}", e)))
        })?;
        let media_kind = MediaKind::from_mime(&params.media_type)
            .map_err(|e| to_rpc_error(AppError::Domain(e)))?;

        let allowed_kinds = match &params.allowed_media_types {
            None => MediaKind::ALL.to_vec(),
            Some(mimes) => mimes
                .iter()
                .map(|mime| MediaKind::from_mime(mime))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| to_rpc_error(AppError::Domain(e)))?,
        };

        let job = self
            .lifecycle
            .submit(DocumentPayload::new(content, media_kind), &allowed_kinds)
            .await
            .map_err(to_rpc_error)?;

        Ok(SubmitResponse {
            job_id: job.id,
            status: job.status.to_string(),
        })
    }

    /// doc.result.v1
    pub async fn result(&self, params: ResultRequest) -> Result<ResultResponse, ErrorObjectOwned> {
        let job = self
            .lifecycle
            .get(&params.job_id)
            .await
            .map_err(to_rpc_error)?;

        // Mask on the read path only; the stored record stays complete
        let masked = job
            .result
            .as_ref()
            .map(|r| mask_sensitive_fields(r.as_value(), self.mask_paths));

        Ok(ResultResponse::from_job(job, masked))
    }

    /// movies.search.v1
    pub async fn movies_search(
        &self,
        params: SearchRequest,
    ) -> Result<SearchResponse, ErrorObjectOwned> {
        let page = self
            .search
            .search(&params.query, params.page)
            .await
            .map_err(to_rpc_error)?;
        Ok(page.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::code;
    use formflux_core::application::SearchConfig;
    use formflux_core::port::catalog::mocks::MockCatalogClient;
    use formflux_core::port::id_provider::mocks::SequentialIdProvider;
    use formflux_core::port::job_queue::mocks::RecordingQueue;
    use formflux_core::port::job_store::mocks::InMemoryJobStore;
    use formflux_core::port::response_cache::mocks::MemoryCache;
    use formflux_core::port::time_provider::mocks::MockTimeProvider;
    use formflux_core::port::JobStore;
    use serde_json::json;

    fn handler() -> (Arc<InMemoryJobStore>, RpcHandler) {
        let store = Arc::new(InMemoryJobStore::new());
        let lifecycle = Arc::new(JobLifecycle::new(
            store.clone(),
            Arc::new(RecordingQueue::new()),
            Arc::new(SequentialIdProvider::new()),
            Arc::new(MockTimeProvider::new(1000)),
        ));
        let search = Arc::new(MovieSearch::new(
            Arc::new(MockCatalogClient::unreachable()),
            Arc::new(MemoryCache::new()),
            SearchConfig::default(),
        ));
        (store, RpcHandler::new(lifecycle, search))
    }

    #[tokio::test]
    async fn test_submit_returns_queued_job() {
        let (_, handler) = handler();
        let response = handler
            .submit(SubmitRequest {
                document: BASE64.encode(b"fake pdf bytes"),
                media_type: "application/pdf".to_string(),
                allowed_media_types: None,
            })
            .await
            .unwrap();

        assert_eq!(response.status, "QUEUED");
        assert!(!response.job_id.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_bad_base64() {
        let (store, handler) = handler();
        let err = handler
            .submit(SubmitRequest {
                document: "not base64 !!!".to_string(),
                media_type: "application/pdf".to_string(),
                allowed_media_types: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_unknown_media_type() {
        let (store, handler) = handler();
        let err = handler
            .submit(SubmitRequest {
                document: BASE64.encode(b"bytes"),
                media_type: "text/csv".to_string(),
                allowed_media_types: None,
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_submit_honors_request_restriction() {
        let (_, handler) = handler();
        let err = handler
            .submit(SubmitRequest {
                document: BASE64.encode(b"bytes"),
                media_type: "application/pdf".to_string(),
                allowed_media_types: Some(vec!["image/png".to_string()]),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), code::VALIDATION_ERROR);
    }

    #[tokio::test]
    async fn test_result_masks_sensitive_fields() {
        use formflux_core::domain::{Job, JobTransition, TaskResult};

        let (store, handler) = handler();
        let mut job = Job::new("j1", 1000);
        job.apply(&JobTransition::Start, 1100);
        job.apply(
            &JobTransition::Succeed(TaskResult::new(json!({
                "employee_info": {"ssn": "123-45-6789"},
                "employer_info": {"ein": "98-7654321"}
            }))),
            1200,
        );
        store.insert(&job).await.unwrap();

        let response = handler
            .result(ResultRequest {
                job_id: "j1".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.status, "SUCCESS");
        let result = response.result.unwrap();
        assert_eq!(result["employee_info"]["ssn"], "*******6789");
        assert_eq!(result["employer_info"]["ein"], "******4321");

        // Stored record is untouched
        let stored = store.find_by_id(&"j1".to_string()).await.unwrap().unwrap();
        assert_eq!(
            stored.result.unwrap().as_value()["employee_info"]["ssn"],
            "123-45-6789"
        );
    }

    #[tokio::test]
    async fn test_result_unknown_job() {
        let (_, handler) = handler();
        let err = handler
            .result(ResultRequest {
                job_id: "missing".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_search_upstream_failure_maps_to_upstream_code() {
        let (_, handler) = handler();
        let err = handler
            .movies_search(SearchRequest {
                query: "dune".to_string(),
                page: 1,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), code::UPSTREAM_ERROR);
    }
}
