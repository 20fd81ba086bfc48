use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use tutor_core::model::{User, UserId};

use crate::repository::{StorageError, UserRecord, UserRepository, user_key};

use super::SqliteRepository;

#[async_trait]
impl UserRepository for SqliteRepository {
    async fn get_user(&self, id: &UserId) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT payload
            FROM user_state
            WHERE key = ?1
            ",
        )
        .bind(user_key(id))
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            tracing::debug!(user_id = %id, "no stored state for user");
            return Ok(None);
        };

        let payload: String = row
            .try_get("payload")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        UserRecord::from_json(&payload)?.into_user().map(Some)
    }

    async fn save_user(&self, user: &User) -> Result<(), StorageError> {
        let payload = UserRecord::from_user(user).to_json()?;

        sqlx::query(
            r"
            INSERT INTO user_state (key, payload, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            ",
        )
        .bind(user_key(user.id()))
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        tracing::debug!(user_id = %user.id(), "saved user state");
        Ok(())
    }
}
