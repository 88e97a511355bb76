// SQLite JobStore Implementation

use async_trait::async_trait;
use formflux_core::domain::{Job, JobId, JobState, JobTransition, MarkOutcome, TaskResult};
use formflux_core::error::{AppError, Result};
use formflux_core::port::JobStore;
use sqlx::SqlitePool;

// Helper to convert sqlx::Error to AppError with structured information
fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                let code_str = code.as_ref();

                // SQLite error codes: https://www.sqlite.org/rescode.html
                match code_str {
                    "2067" | "1555" => AppError::Database(format!(
                        "Unique constraint violation: {} ({})",
                        db_err.message(),
                        code_str
                    )),
                    "5" => AppError::Database(format!(
                        "Database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    "13" => AppError::Database(format!("Database full: {}", db_err.message())),
                    _ => AppError::Database(format!(
                        "Database error [{}]: {}",
                        code_str,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("Database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::Database("Row not found".to_string()),
        sqlx::Error::ColumnNotFound(col) => AppError::Database(format!("Column not found: {}", col)),
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Resolve a zero-row conditional update: unknown id is an error, a
    /// terminal record is the tolerated loser of the completion race
    async fn resolve_unmatched(&self, id: &JobId, transition: &JobTransition) -> Result<MarkOutcome> {
        let status: Option<String> = sqlx::query_scalar("SELECT status FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        match status {
            None => Err(AppError::NotFound(format!("Job {} not found", id))),
            Some(current) => {
                let current: JobState = current
                    .parse()
                    .map_err(|e: String| AppError::Database(e))?;
                if current.is_terminal() {
                    Ok(MarkOutcome::AlreadyTerminal)
                } else if matches!(transition, JobTransition::Start)
                    && current == JobState::InProgress
                {
                    // Start on an already started job is idempotent
                    Ok(MarkOutcome::Applied)
                } else {
                    Err(AppError::Database(format!(
                        "Job {} in state {} did not match transition",
                        id, current
                    )))
                }
            }
        }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert(&self, job: &Job) -> Result<()> {
        let result_str = job.result.as_ref().map(|r| r.as_value().to_string());

        sqlx::query(
            r#"
            INSERT INTO jobs (id, status, created_at, started_at, finished_at, result)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(job.status.to_string())
        .bind(job.created_at)
        .bind(job.started_at)
        .bind(job.finished_at)
        .bind(&result_str)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn mark(
        &self,
        id: &JobId,
        transition: JobTransition,
        now_millis: i64,
    ) -> Result<MarkOutcome> {
        // Conditional updates give compare-and-set semantics: the WHERE
        // clause only matches non-terminal rows, so of the completion and
        // timeout paths exactly one write lands
        let rows_affected = match &transition {
            JobTransition::Start => sqlx::query(
                r#"
                UPDATE jobs
                SET status = ?, started_at = ?
                WHERE id = ? AND status = 'QUEUED'
                "#,
            )
            .bind(JobState::InProgress.to_string())
            .bind(now_millis)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .rows_affected(),
            JobTransition::Succeed(r) | JobTransition::Fail(r) | JobTransition::Cancel(r) => {
                sqlx::query(
                    r#"
                    UPDATE jobs
                    SET status = ?, finished_at = ?, result = ?
                    WHERE id = ? AND status IN ('QUEUED', 'IN_PROGRESS')
                    "#,
                )
                .bind(transition.target_state().to_string())
                .bind(now_millis)
                .bind(r.as_value().to_string())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?
                .rows_affected()
            }
        };

        if rows_affected == 0 {
            self.resolve_unmatched(id, &transition).await
        } else {
            Ok(MarkOutcome::Applied)
        }
    }
}

/// SQLite row representation
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    status: String,
    created_at: i64,
    started_at: Option<i64>,
    finished_at: Option<i64>,
    result: Option<String>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        let status: JobState = self
            .status
            .parse()
            .map_err(|e: String| AppError::Database(e))?;
        let result = self
            .result
            .map(|raw| serde_json::from_str(&raw).map(TaskResult::new))
            .transpose()?;

        Ok(Job {
            id: self.id,
            status,
            created_at: self.created_at,
            started_at: self.started_at,
            finished_at: self.finished_at,
            result,
        })
    }
}
