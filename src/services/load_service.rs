use crate::error::{Error, Result};
use crate::models::user::UserRecord;
use sqlx::SqlitePool;
use std::io::ErrorKind;
use std::path::Path;

const USER_COLUMNS: usize = 6;

#[derive(Clone)]
pub struct LoadService {
    pool: SqlitePool,
}

impl LoadService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Bulk-import a headerless, comma-separated file into `users`.
    ///
    /// All rows go in one transaction: a bad row or a duplicate email leaves
    /// the table untouched.
    pub async fn import_csv(&self, path: &Path) -> Result<u64> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::MissingImportFile(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b',')
            .from_reader(bytes.as_slice());
        let mut users = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != USER_COLUMNS {
                return Err(Error::MalformedImportRow(format!(
                    "row {} has {} fields, expected {}",
                    idx + 1,
                    record.len(),
                    USER_COLUMNS
                )));
            }
            users.push(record.deserialize::<UserRecord>(None)?);
        }
        if users.is_empty() {
            return Err(Error::MalformedImportRow(format!(
                "{} contains no rows",
                path.display()
            )));
        }

        let mut tx = self.pool.begin().await?;
        for user in &users {
            sqlx::query(
                r#"INSERT INTO users (email, firstname, lastname, country, username, password)
                   VALUES (?, ?, ?, ?, ?, ?)"#,
            )
            .bind(&user.email)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.country)
            .bind(&user.username)
            .bind(&user.password)
            .execute(&mut *tx)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    Error::DuplicateUser(user.email.clone())
                }
                other => Error::Database(other),
            })?;
        }
        tx.commit().await?;

        tracing::info!(rows = users.len(), path = %path.display(), "Users imported");
        Ok(users.len() as u64)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"SELECT email, firstname, lastname, country, username, password
               FROM users WHERE email = ?"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
