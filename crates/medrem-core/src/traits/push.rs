//! Push notification delivery capability.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// A notification payload addressed to one or more device tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Action opened when the user taps the notification.
    pub click_action: String,
    /// Extra key/value data delivered alongside the notification.
    #[serde(default)]
    pub data: HashMap<String, String>,
}

/// Outcome of delivering to a single token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// The provider accepted the message.
    Delivered,
    /// The provider reports the token as unknown or unregistered.
    InvalidToken,
    /// Any other per-token failure.
    Failed(String),
}

/// Delivery result for one token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushDelivery {
    /// The device token.
    pub token: String,
    /// What happened.
    pub status: DeliveryStatus,
}

impl PushDelivery {
    /// Check whether this delivery succeeded.
    pub fn is_delivered(&self) -> bool {
        matches!(self.status, DeliveryStatus::Delivered)
    }
}

/// A push notification transport (FCM, log-only, test recorder).
///
/// `send` returns `Err` only when the whole request failed; per-token
/// failures are reported through [`PushDelivery`].
#[async_trait]
pub trait PushSender: Send + Sync + std::fmt::Debug + 'static {
    /// Short provider name for logging.
    fn name(&self) -> &str;

    /// Send `message` to every token in `tokens`.
    async fn send(&self, tokens: &[String], message: &PushMessage) -> AppResult<Vec<PushDelivery>>;
}
