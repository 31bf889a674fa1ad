use crate::error::Result;
use sqlx::SqlitePool;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users(
    email TEXT NOT NULL PRIMARY KEY,
    firstname TEXT NOT NULL,
    lastname TEXT NOT NULL,
    country TEXT NOT NULL,
    username TEXT NOT NULL,
    password TEXT NOT NULL
)
"#;

pub const CREATE_PIPELINE_RUNS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS pipeline_runs(
    id TEXT NOT NULL PRIMARY KEY,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    status TEXT NOT NULL,
    steps TEXT NOT NULL,
    error TEXT
)
"#;

#[derive(Clone)]
pub struct SchemaService {
    pool: SqlitePool,
}

impl SchemaService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Idempotent; safe to call on every run.
    pub async fn ensure_tables(&self) -> Result<()> {
        sqlx::query(CREATE_USERS_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_PIPELINE_RUNS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
