// Job lifecycle service - submission, lookup, state marking

use crate::domain::{DocumentPayload, Job, JobId, JobTransition, MarkOutcome, MediaKind};
use crate::error::{AppError, Result};
use crate::port::{IdProvider, JobQueue, JobStore, TimeProvider, WorkItem};
use std::sync::Arc;
use tracing::info;

/// Orchestrates the durable job state machine around the background queue.
///
/// Submission is validate-then-persist: an invalid document is rejected
/// before any record exists, so a failed submission leaves no trace.
pub struct JobLifecycle {
    store: Arc<dyn JobStore>,
    queue: Arc<dyn JobQueue>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl JobLifecycle {
    pub fn new(
        store: Arc<dyn JobStore>,
        queue: Arc<dyn JobQueue>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            store,
            queue,
            id_provider,
            time_provider,
        }
    }

    /// Validate and submit a document for processing.
    ///
    /// Returns the newly queued job. The document travels on the queue,
    /// not in the store.
    pub async fn submit(
        &self,
        payload: DocumentPayload,
        allowed_kinds: &[MediaKind],
    ) -> Result<Job> {
        if payload.content.is_empty() {
            return Err(AppError::Validation("Document is empty".to_string()));
        }
        if !allowed_kinds.contains(&payload.media_kind) {
            return Err(AppError::Validation(format!(
                "Unsupported media type: {}",
                payload.media_kind
            )));
        }

        let id = self.id_provider.generate_id();
        let now = self.time_provider.now_millis();
        let job = Job::new(id.clone(), now);
        self.store.insert(&job).await?;

        self.queue
            .push(WorkItem {
                job_id: id.clone(),
                payload,
            })
            .await?;

        info!(job_id = %id, "Job submitted");
        Ok(job)
    }

    /// Fetch a job record, erroring on unknown ids
    pub async fn get(&self, id: &JobId) -> Result<Job> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))
    }

    /// Apply a transition stamped with the current time
    pub async fn mark(&self, id: &JobId, transition: JobTransition) -> Result<MarkOutcome> {
        let now = self.time_provider.now_millis();
        let outcome = self.store.mark(id, transition, now).await?;
        if outcome == MarkOutcome::AlreadyTerminal {
            info!(job_id = %id, "Transition ignored, job already terminal");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::JobState;
    use crate::port::id_provider::mocks::SequentialIdProvider;
    use crate::port::job_queue::mocks::RecordingQueue;
    use crate::port::job_store::mocks::InMemoryJobStore;
    use crate::port::time_provider::mocks::MockTimeProvider;

    fn lifecycle() -> (Arc<InMemoryJobStore>, Arc<RecordingQueue>, JobLifecycle) {
        let store = Arc::new(InMemoryJobStore::new());
        let queue = Arc::new(RecordingQueue::new());
        let service = JobLifecycle::new(
            store.clone(),
            queue.clone(),
            Arc::new(SequentialIdProvider::new()),
            Arc::new(MockTimeProvider::new(1000)),
        );
        (store, queue, service)
    }

    fn payload(kind: MediaKind) -> DocumentPayload {
        DocumentPayload {
            content: vec![1, 2, 3],
            media_kind: kind,
        }
    }

    #[tokio::test]
    async fn test_submit_persists_and_enqueues() {
        let (store, queue, service) = lifecycle();
        let job = service
            .submit(payload(MediaKind::Pdf), &MediaKind::ALL)
            .await
            .unwrap();

        assert_eq!(job.status, JobState::Queued);
        assert_eq!(job.created_at, 1000);
        assert_eq!(store.len(), 1);
        let items = queue.drain();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].job_id, job.id);
    }

    #[tokio::test]
    async fn test_submit_rejects_empty_document() {
        let (store, queue, service) = lifecycle();
        let err = service
            .submit(
                DocumentPayload {
                    content: Vec::new(),
                    media_kind: MediaKind::Pdf,
                },
                &MediaKind::ALL,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_submit_rejects_disallowed_kind() {
        let (store, queue, service) = lifecycle();
        let err = service
            .submit(payload(MediaKind::Pdf), &[MediaKind::Png, MediaKind::Jpeg])
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(store.is_empty());
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_get_unknown_job_is_not_found() {
        let (_, _, service) = lifecycle();
        let err = service.get(&"nope".to_string()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
