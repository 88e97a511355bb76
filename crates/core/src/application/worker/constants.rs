// Worker constants
use std::time::Duration;

/// Default per-job execution deadline (2 minutes)
pub const DEFAULT_JOB_DEADLINE: Duration = Duration::from_secs(120);

/// Default bound on the in-process work queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Pause before the worker loop resumes after a store error
pub const ERROR_RECOVERY_SLEEP_DURATION: Duration = Duration::from_millis(500);
