// Job Domain Model

use serde::{Deserialize, Serialize};

/// Job ID (UUID v4, hex form, generated at submission)
pub type JobId = String;

/// Job status
///
/// QUEUED is initial; SUCCESS, FAILED and CANCELLED are terminal.
/// IN_PROGRESS is entered exactly once per job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobState {
    Queued,
    InProgress,
    Success,
    Failed,
    Cancelled,
}

impl JobState {
    /// Terminal states absorb all further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobState::Success | JobState::Failed | JobState::Cancelled
        )
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobState::Queued => write!(f, "QUEUED"),
            JobState::InProgress => write!(f, "IN_PROGRESS"),
            JobState::Success => write!(f, "SUCCESS"),
            JobState::Failed => write!(f, "FAILED"),
            JobState::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

impl std::str::FromStr for JobState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(JobState::Queued),
            "IN_PROGRESS" => Ok(JobState::InProgress),
            "SUCCESS" => Ok(JobState::Success),
            "FAILED" => Ok(JobState::Failed),
            "CANCELLED" => Ok(JobState::Cancelled),
            _ => Err(format!("Invalid job state: {}", s)),
        }
    }
}

/// Structured result payload written on a terminal transition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult(serde_json::Value);

impl TaskResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

/// A requested state change, applied atomically through the JobStore.
///
/// Terminal transitions carry the result payload that gets persisted
/// alongside the status flip.
#[derive(Debug, Clone)]
pub enum JobTransition {
    Start,
    Succeed(TaskResult),
    Fail(TaskResult),
    Cancel(TaskResult),
}

impl JobTransition {
    pub fn target_state(&self) -> JobState {
        match self {
            JobTransition::Start => JobState::InProgress,
            JobTransition::Succeed(_) => JobState::Success,
            JobTransition::Fail(_) => JobState::Failed,
            JobTransition::Cancel(_) => JobState::Cancelled,
        }
    }

    pub fn result(&self) -> Option<&TaskResult> {
        match self {
            JobTransition::Start => None,
            JobTransition::Succeed(r) | JobTransition::Fail(r) | JobTransition::Cancel(r) => {
                Some(r)
            }
        }
    }
}

/// Outcome of applying a transition through the JobStore.
///
/// The completion path and the timeout path race to write the terminal
/// state; whichever writes first wins and the loser observes
/// `AlreadyTerminal` (a tolerated no-op, not an error).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Applied,
    AlreadyTerminal,
}

/// Job entity - durable record of one background document task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub status: JobState,

    pub created_at: i64, // epoch ms, set once at submission
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,

    pub result: Option<TaskResult>,
}

impl Job {
    /// Create a new job in QUEUED state
    ///
    /// # Arguments
    ///
    /// * `id` - Unique job ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    pub fn new(id: impl Into<String>, created_at: i64) -> Self {
        Self {
            id: id.into(),
            status: JobState::Queued,
            created_at,
            started_at: None,
            finished_at: None,
            result: None,
        }
    }

    /// Apply a transition in place with an explicit timestamp.
    ///
    /// Encodes the state-machine laws used by every JobStore implementation:
    /// a terminal status absorbs any further transition as `AlreadyTerminal`,
    /// IN_PROGRESS stamps `started_at` once, terminal states stamp
    /// `finished_at` once and attach the result payload.
    pub fn apply(&mut self, transition: &JobTransition, now_millis: i64) -> MarkOutcome {
        if self.status.is_terminal() {
            return MarkOutcome::AlreadyTerminal;
        }

        match transition {
            JobTransition::Start => {
                if self.status == JobState::Queued {
                    self.status = JobState::InProgress;
                    self.started_at = Some(now_millis);
                }
                // Start on an already IN_PROGRESS job is a no-op
                // (idempotent by target state)
            }
            JobTransition::Succeed(r) | JobTransition::Fail(r) | JobTransition::Cancel(r) => {
                self.status = transition.target_state();
                self.finished_at = Some(now_millis);
                self.result = Some(r.clone());
            }
        }

        MarkOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(v: serde_json::Value) -> TaskResult {
        TaskResult::new(v)
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new("job-1", 1000);
        assert_eq!(job.status, JobState::Queued);
        assert_eq!(job.created_at, 1000);
        assert!(job.started_at.is_none());
        assert!(job.finished_at.is_none());
        assert!(job.result.is_none());
    }

    #[test]
    fn test_full_lifecycle_stamps_timestamps() {
        let mut job = Job::new("job-2", 1000);

        assert_eq!(job.apply(&JobTransition::Start, 2000), MarkOutcome::Applied);
        assert_eq!(job.status, JobState::InProgress);
        assert_eq!(job.started_at, Some(2000));
        assert!(job.finished_at.is_none());

        let ok = result(json!({"employee_info": {"ssn": "123-45-6789"}}));
        assert_eq!(
            job.apply(&JobTransition::Succeed(ok.clone()), 3000),
            MarkOutcome::Applied
        );
        assert_eq!(job.status, JobState::Success);
        assert_eq!(job.finished_at, Some(3000));
        assert_eq!(job.result, Some(ok));
        assert!(job.started_at.unwrap() <= job.finished_at.unwrap());
    }

    #[test]
    fn test_terminal_state_absorbs_further_transitions() {
        let mut job = Job::new("job-3", 1000);
        job.apply(&JobTransition::Start, 2000);
        job.apply(
            &JobTransition::Cancel(result(json!({"error": {"message": "timed out"}}))),
            3000,
        );
        assert_eq!(job.status, JobState::Cancelled);

        // Late completion must not overwrite the terminal state
        let outcome = job.apply(&JobTransition::Succeed(result(json!({"late": true}))), 4000);
        assert_eq!(outcome, MarkOutcome::AlreadyTerminal);
        assert_eq!(job.status, JobState::Cancelled);
        assert_eq!(job.finished_at, Some(3000));
        assert_eq!(
            job.result,
            Some(result(json!({"error": {"message": "timed out"}})))
        );
    }

    #[test]
    fn test_start_is_idempotent_by_target_state() {
        let mut job = Job::new("job-4", 1000);
        job.apply(&JobTransition::Start, 2000);
        let outcome = job.apply(&JobTransition::Start, 2500);
        assert_eq!(outcome, MarkOutcome::Applied);
        // started_at keeps the first stamp
        assert_eq!(job.started_at, Some(2000));
    }

    #[test]
    fn test_direct_failure_from_queued() {
        // Submission-time failures can terminate a job that never started
        let mut job = Job::new("job-5", 1000);
        job.apply(
            &JobTransition::Fail(result(json!({"error": {"message": "boom"}}))),
            2000,
        );
        assert_eq!(job.status, JobState::Failed);
        assert!(job.started_at.is_none());
        assert_eq!(job.finished_at, Some(2000));
    }

    #[test]
    fn test_state_round_trip() {
        for state in [
            JobState::Queued,
            JobState::InProgress,
            JobState::Success,
            JobState::Failed,
            JobState::Cancelled,
        ] {
            let parsed: JobState = state.to_string().parse().unwrap();
            assert_eq!(parsed, state);
        }
        assert!("DONE".parse::<JobState>().is_err());
    }

    #[test]
    fn test_job_serialization() {
        let mut job = Job::new("job-6", 1000);
        job.apply(&JobTransition::Start, 2000);

        let json = serde_json::to_string(&job).expect("serialize");
        assert!(json.contains("IN_PROGRESS"));
        let deserialized: Job = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(deserialized.id, job.id);
        assert_eq!(deserialized.status, job.status);
    }
}
