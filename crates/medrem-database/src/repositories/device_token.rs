//! Device token repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use medrem_core::error::{AppError, ErrorKind};
use medrem_core::result::AppResult;
use medrem_core::types::UserId;
use medrem_entity::device::DeviceToken;

use crate::store::DeviceTokenStore;

/// Repository for registered push tokens.
#[derive(Debug, Clone)]
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    /// Create a new device token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStore for DeviceTokenRepository {
    async fn register(&self, token: &DeviceToken) -> AppResult<DeviceToken> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        sqlx::query_as::<_, DeviceToken>(
            "INSERT INTO device_tokens (id, user_id, token, created_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, token) DO UPDATE SET token = EXCLUDED.token \
             RETURNING *",
        )
        .bind(token.id)
        .bind(token.user_id)
        .bind(&token.token)
        .bind(token.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register token", e))
    }

    async fn remove(&self, user_id: UserId, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to remove token", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tokens", e))
    }
}
