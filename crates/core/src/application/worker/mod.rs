// Worker - background job execution loop

pub mod constants;
mod queue;
mod shutdown;

pub use queue::{work_channel, QueueHandle};
pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::lifecycle::JobLifecycle;
use crate::application::pipeline::DocumentPipeline;
use crate::domain::{JobTransition, TaskResult};
use crate::error::Result;
use crate::port::WorkItem;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Drains the work channel and supervises each job against a deadline.
///
/// Every item runs in its own spawned task wrapped in a timeout. When
/// the deadline fires the task's future is dropped, which aborts any
/// in-flight upstream call, and the job is marked CANCELLED. A task
/// panic marks the job FAILED. Nothing kills the loop: a store error
/// (e.g. a busy database) is logged and the worker resumes after a
/// short pause.
pub struct Worker {
    receiver: mpsc::Receiver<WorkItem>,
    pipeline: Arc<DocumentPipeline>,
    lifecycle: Arc<JobLifecycle>,
    deadline: Duration,
}

impl Worker {
    pub fn new(
        receiver: mpsc::Receiver<WorkItem>,
        pipeline: Arc<DocumentPipeline>,
        lifecycle: Arc<JobLifecycle>,
        deadline: Duration,
    ) -> Self {
        Self {
            receiver,
            pipeline,
            lifecycle,
            deadline,
        }
    }

    /// Run the worker loop until shutdown or channel close
    pub async fn run(mut self, mut shutdown: ShutdownToken) -> Result<()> {
        info!(deadline_secs = %self.deadline.as_secs(), "Worker started");
        loop {
            tokio::select! {
                item = self.receiver.recv() => {
                    match item {
                        Some(item) => {
                            if let Err(e) = self.process_item(item).await {
                                error!(error = %e, "Worker error, resuming after pause");
                                tokio::select! {
                                    _ = tokio::time::sleep(constants::ERROR_RECOVERY_SLEEP_DURATION) => {}
                                    _ = shutdown.wait() => {
                                        info!("Worker interrupted during error recovery");
                                        break;
                                    }
                                }
                            }
                        }
                        None => {
                            info!("Work channel closed, worker stopping");
                            break;
                        }
                    }
                }
                _ = shutdown.wait() => {
                    info!("Worker shutting down");
                    break;
                }
            }
        }
        info!("Worker stopped");
        Ok(())
    }

    /// Process one item under the deadline. Store access errors propagate
    /// to the loop; everything else lands in the job record.
    async fn process_item(&self, item: WorkItem) -> Result<()> {
        let job_id = item.job_id.clone();
        info!(job_id = %job_id, "Processing job");

        let pipeline = Arc::clone(&self.pipeline);
        let deadline = self.deadline;
        let handle = tokio::spawn(async move {
            tokio::time::timeout(deadline, pipeline.process(&item.job_id, item.payload)).await
        });

        match handle.await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => {
                error!(job_id = %job_id, error = %e, "Job processing failed");
                Err(e)
            }
            Ok(Err(_elapsed)) => {
                warn!(job_id = %job_id, deadline_secs = %deadline.as_secs(), "Job exceeded deadline");
                let result = TaskResult::new(timeout_payload(deadline));
                self.lifecycle
                    .mark(&job_id, JobTransition::Cancel(result))
                    .await?;
                Ok(())
            }
            Err(join_err) => {
                error!(job_id = %job_id, error = %join_err, "Job task panicked");
                let result = TaskResult::new(json!({
                    "error": {"message": "Job processing aborted unexpectedly"}
                }));
                self.lifecycle
                    .mark(&job_id, JobTransition::Fail(result))
                    .await?;
                Ok(())
            }
        }
    }
}

/// Error payload recorded when a job is cancelled by the deadline
pub fn timeout_payload(deadline: Duration) -> serde_json::Value {
    json!({
        "error": {
            "message": format!(
                "Task running longer than expected. Timeout - {}s",
                deadline.as_secs()
            )
        }
    })
}
