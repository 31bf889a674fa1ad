use crate::error::{Error, Result};
use crate::models::user::UserRecord;
use serde_json::Value as JsonValue;
use std::path::Path;

pub struct TransformService;

impl TransformService {
    /// Pull the first user out of a user API payload.
    ///
    /// Returns `Ok(None)` when the payload is absent, null, or has no
    /// `results` key. A `results` entry that is present but unusable is an
    /// error.
    pub fn extract_user(payload: Option<&JsonValue>) -> Result<Option<UserRecord>> {
        let Some(results) = payload.and_then(|p| p.get("results")) else {
            return Ok(None);
        };
        let user = results
            .as_array()
            .ok_or_else(|| Error::MalformedPayload("`results` is not an array".to_string()))?
            .first()
            .ok_or_else(|| Error::MalformedPayload("`results` is empty".to_string()))?;

        Ok(Some(UserRecord {
            email: field(user, "/email")?,
            firstname: field(user, "/name/first")?,
            lastname: field(user, "/name/last")?,
            country: field(user, "/location/country")?,
            username: field(user, "/login/username")?,
            password: field(user, "/login/password")?,
        }))
    }

    /// Overwrite `path` with a single headerless CSV row.
    pub async fn write_csv(path: &Path, user: &UserRecord) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(user)?;
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    /// Extract and, when a user was found, write it to `path`. Nothing is
    /// written otherwise.
    pub async fn process_user(
        payload: Option<&JsonValue>,
        path: &Path,
    ) -> Result<Option<UserRecord>> {
        let user = Self::extract_user(payload)?;
        if let Some(user) = &user {
            Self::write_csv(path, user).await?;
            tracing::info!(email = %user.email, path = %path.display(), "User written to import file");
        }
        Ok(user)
    }
}

fn field(user: &JsonValue, pointer: &str) -> Result<String> {
    match user.pointer(pointer) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(v @ (JsonValue::Number(_) | JsonValue::Bool(_))) => Ok(v.to_string()),
        Some(_) => Err(Error::MalformedPayload(format!("`{}` is not a scalar", pointer))),
        None => Err(Error::MalformedPayload(format!("`{}` is missing", pointer))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_csv() -> PathBuf {
        std::env::temp_dir().join(format!("users-{}.csv", Uuid::new_v4()))
    }

    fn sample() -> JsonValue {
        json!({
            "results": [{
                "gender": "female",
                "email": "a@b.com",
                "name": { "title": "Ms", "first": "A", "last": "B" },
                "location": { "city": "Springfield", "country": "US" },
                "login": { "uuid": "x", "username": "ab", "password": "p" }
            }],
            "info": { "seed": "abc", "results": 1 }
        })
    }

    #[tokio::test]
    async fn writes_one_headerless_row_in_column_order() {
        let path = temp_csv();
        let user = TransformService::process_user(Some(&sample()), &path)
            .await
            .unwrap()
            .expect("user extracted");
        assert_eq!(user.email, "a@b.com");

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a@b.com,A,B,US,ab,p\n");
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn overwrites_previous_content() {
        let path = temp_csv();
        std::fs::write(&path, "old@x.com,O,L,D,old,pw\nsecond,line,,,,\n").unwrap();
        TransformService::process_user(Some(&sample()), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written.lines().count(), 1);
        assert!(written.starts_with("a@b.com,"));
        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn none_payload_writes_nothing() {
        let path = temp_csv();
        let user = TransformService::process_user(None, &path).await.unwrap();
        assert!(user.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn null_payload_writes_nothing() {
        let path = temp_csv();
        let user = TransformService::process_user(Some(&JsonValue::Null), &path).await.unwrap();
        assert!(user.is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn payload_without_results_writes_nothing() {
        let path = temp_csv();
        let user = TransformService::process_user(Some(&json!({ "nope": [] })), &path).await.unwrap();
        assert!(user.is_none());
        assert!(!path.exists());
    }

    #[test]
    fn empty_results_is_malformed() {
        let err = TransformService::extract_user(Some(&json!({ "results": [] }))).unwrap_err();
        assert!(matches!(err, Error::MalformedPayload(_)));
    }

    #[test]
    fn missing_nested_field_names_the_path() {
        let mut payload = sample();
        payload["results"][0]["login"]
            .as_object_mut()
            .unwrap()
            .remove("password");
        let err = TransformService::extract_user(Some(&payload)).unwrap_err();
        assert!(err.to_string().contains("/login/password"));
    }

    #[tokio::test]
    async fn values_with_commas_are_quoted() {
        let mut payload = sample();
        payload["results"][0]["location"]["country"] = json!("Korea, Republic of");
        let path = temp_csv();
        TransformService::process_user(Some(&payload), &path).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "a@b.com,A,B,\"Korea, Republic of\",ab,p\n");
        std::fs::remove_file(&path).ok();
    }
}
