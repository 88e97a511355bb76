// Background Queue Port (Interface)

use crate::domain::{DocumentPayload, JobId};
use crate::error::Result;
use async_trait::async_trait;

/// One unit of queued work: the job identity plus the document to process.
///
/// The document itself lives only in the queue; the durable job record
/// carries identity, status and result (exactly-once redelivery after a
/// restart is out of scope).
#[derive(Debug)]
pub struct WorkItem {
    pub job_id: JobId,
    pub payload: DocumentPayload,
}

/// Handle to the background queue. Submission pushes and returns
/// immediately; execution happens on the worker side of the channel.
///
/// Passed in as an explicit dependency so tests can substitute a recording
/// queue or drive a worker synchronously.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn push(&self, item: WorkItem) -> Result<()>;
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Queue that records pushed items without executing anything
    pub struct RecordingQueue {
        items: Mutex<Vec<WorkItem>>,
    }

    impl RecordingQueue {
        pub fn new() -> Self {
            Self {
                items: Mutex::new(Vec::new()),
            }
        }

        pub fn len(&self) -> usize {
            self.items.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }

        pub fn drain(&self) -> Vec<WorkItem> {
            self.items.lock().unwrap().drain(..).collect()
        }
    }

    impl Default for RecordingQueue {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl JobQueue for RecordingQueue {
        async fn push(&self, item: WorkItem) -> Result<()> {
            self.items.lock().unwrap().push(item);
            Ok(())
        }
    }
}
