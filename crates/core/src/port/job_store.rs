// Job Store Port (Interface)

use crate::domain::{Job, JobId, JobTransition, MarkOutcome};
use crate::error::Result;
use async_trait::async_trait;

/// Durable store for Job records.
///
/// `mark` must be atomic per job record (compare-and-set semantics): the
/// normal completion path and the timeout path both call it for the same
/// job, and exactly one terminal write may win. The loser gets
/// `MarkOutcome::AlreadyTerminal`, never an error and never an overwrite.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a new job
    async fn insert(&self, job: &Job) -> Result<()>;

    /// Find job by ID
    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>>;

    /// Apply a state transition with an explicit timestamp.
    ///
    /// Returns `NotFound` for unknown ids.
    async fn mark(
        &self,
        id: &JobId,
        transition: JobTransition,
        now_millis: i64,
    ) -> Result<MarkOutcome>;
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::error::AppError;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory JobStore with the same compare-and-set semantics as the
    /// SQLite adapter. The whole map sits behind one mutex, which is enough
    /// atomicity for tests.
    pub struct InMemoryJobStore {
        jobs: Mutex<HashMap<JobId, Job>>,
    }

    impl InMemoryJobStore {
        pub fn new() -> Self {
            Self {
                jobs: Mutex::new(HashMap::new()),
            }
        }

        pub fn len(&self) -> usize {
            self.jobs.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl Default for InMemoryJobStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobStore for InMemoryJobStore {
        async fn insert(&self, job: &Job) -> Result<()> {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.insert(job.id.clone(), job.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
            let jobs = self.jobs.lock().unwrap();
            Ok(jobs.get(id).cloned())
        }

        async fn mark(
            &self,
            id: &JobId,
            transition: JobTransition,
            now_millis: i64,
        ) -> Result<MarkOutcome> {
            let mut jobs = self.jobs.lock().unwrap();
            let job = jobs
                .get_mut(id)
                .ok_or_else(|| AppError::NotFound(format!("Job {} not found", id)))?;
            Ok(job.apply(&transition, now_millis))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mocks::InMemoryJobStore;
    use super::*;
    use crate::domain::{JobState, TaskResult};
    use crate::error::AppError;
    use serde_json::json;

    #[tokio::test]
    async fn test_mark_unknown_job_is_not_found() {
        let store = InMemoryJobStore::new();
        let err = store
            .mark(&"missing".to_string(), JobTransition::Start, 1000)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_terminal_write_wins_once() {
        let store = InMemoryJobStore::new();
        store.insert(&Job::new("j1", 1000)).await.unwrap();
        let id = "j1".to_string();

        store.mark(&id, JobTransition::Start, 1100).await.unwrap();
        let first = store
            .mark(
                &id,
                JobTransition::Succeed(TaskResult::new(json!({"ok": true}))),
                1200,
            )
            .await
            .unwrap();
        assert_eq!(first, MarkOutcome::Applied);

        let second = store
            .mark(
                &id,
                JobTransition::Cancel(TaskResult::new(json!({"error": {"message": "late"}}))),
                1300,
            )
            .await
            .unwrap();
        assert_eq!(second, MarkOutcome::AlreadyTerminal);

        let job = store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(job.status, JobState::Success);
        assert_eq!(job.finished_at, Some(1200));
    }
}
