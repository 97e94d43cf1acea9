//! Device push token entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use medrem_core::types::{DeviceTokenId, UserId};

/// A push token registered by one of the user's devices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DeviceToken {
    /// Unique token record identifier.
    pub id: DeviceTokenId,
    /// The owning user.
    pub user_id: UserId,
    /// Opaque provider token.
    pub token: String,
    /// When the token was registered.
    pub created_at: DateTime<Utc>,
}

impl DeviceToken {
    /// Build a new token record for `user_id`.
    pub fn new(user_id: UserId, token: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: DeviceTokenId::new(),
            user_id,
            token: token.into(),
            created_at: now,
        }
    }
}
