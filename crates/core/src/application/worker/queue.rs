// In-process work queue backed by a bounded channel

use crate::error::AppError;
use crate::port::{JobQueue, WorkItem};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Sending half of the work channel, handed to the submission path
#[derive(Clone)]
pub struct QueueHandle {
    tx: mpsc::Sender<WorkItem>,
}

#[async_trait]
impl JobQueue for QueueHandle {
    async fn push(&self, item: WorkItem) -> crate::error::Result<()> {
        self.tx
            .send(item)
            .await
            .map_err(|_| AppError::Internal("Work queue is closed".to_string()))
    }
}

/// Create a bounded work channel: the handle goes to the lifecycle
/// service, the receiver to a single worker
pub fn work_channel(capacity: usize) -> (QueueHandle, mpsc::Receiver<WorkItem>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (QueueHandle { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentPayload, MediaKind};

    #[tokio::test]
    async fn test_push_delivers_to_receiver() {
        let (handle, mut rx) = work_channel(4);
        handle
            .push(WorkItem {
                job_id: "j1".to_string(),
                payload: DocumentPayload::new(vec![1], MediaKind::Png),
            })
            .await
            .unwrap();

        let item = rx.recv().await.unwrap();
        assert_eq!(item.job_id, "j1");
    }

    #[tokio::test]
    async fn test_push_after_receiver_dropped_errors() {
        let (handle, rx) = work_channel(4);
        drop(rx);
        let err = handle
            .push(WorkItem {
                job_id: "j1".to_string(),
                payload: DocumentPayload::new(vec![1], MediaKind::Png),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
