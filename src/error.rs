pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Scheduler error: {0}")]
    Scheduler(#[from] tokio_cron_scheduler::JobSchedulerError),

    #[error("User API at {url} unavailable after {attempts} attempts")]
    ApiUnavailable { url: String, attempts: u32 },

    #[error("User API returned no payload: {0}")]
    MissingPayload(String),

    #[error("Malformed user payload: {0}")]
    MalformedPayload(String),

    #[error("Malformed import row: {0}")]
    MalformedImportRow(String),

    #[error("Import file not found: {0}")]
    MissingImportFile(String),

    #[error("User with email {0} already exists")]
    DuplicateUser(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
