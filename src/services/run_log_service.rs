use crate::error::Result;
use crate::models::pipeline_run::RunReport;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

#[derive(Clone)]
pub struct RunLogService {
    pool: SqlitePool,
}

impl RunLogService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, report: &RunReport) -> Result<()> {
        let steps = serde_json::to_string(&report.steps)?;
        sqlx::query(
            r#"INSERT INTO pipeline_runs (id, started_at, finished_at, status, steps, error)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(id) DO UPDATE SET
                   finished_at = excluded.finished_at,
                   status = excluded.status,
                   steps = excluded.steps,
                   error = excluded.error"#,
        )
        .bind(report.run_id.to_string())
        .bind(report.started_at.to_rfc3339())
        .bind(report.finished_at.map(|t| t.to_rfc3339()))
        .bind(report.status.as_str())
        .bind(steps)
        .bind(&report.error)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Stored status of a run, if it was recorded.
    pub async fn status(&self, run_id: Uuid) -> Result<Option<String>> {
        let row = sqlx::query("SELECT status FROM pipeline_runs WHERE id = ?")
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(row.try_get("status")?)),
            None => Ok(None),
        }
    }
}
