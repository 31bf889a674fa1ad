use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One user as stored in the `users` table. Field order matches the
/// intermediate CSV columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub country: String,
    pub username: String,
    pub password: String,
}
