//! Firebase Cloud Messaging sender (legacy HTTP API).
//!
//! One request carries every token in `registration_ids`. The response
//! lists one result per token in the same order, which is mapped back to
//! a [`PushDelivery`] per token.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use medrem_core::config::PushConfig;
use medrem_core::error::{AppError, ErrorKind};
use medrem_core::result::AppResult;
use medrem_core::traits::{DeliveryStatus, PushDelivery, PushMessage, PushSender};

/// FCM error codes meaning the token will never be deliverable again.
const INVALID_TOKEN_ERRORS: &[&str] = &["NotRegistered", "InvalidRegistration", "MissingRegistration"];

/// Sends notifications through the FCM HTTP endpoint.
#[derive(Debug, Clone)]
pub struct FcmPushSender {
    client: reqwest::Client,
    endpoint: String,
    server_key: String,
}

#[derive(Debug, Serialize)]
struct FcmRequest<'a> {
    registration_ids: &'a [String],
    notification: FcmNotification<'a>,
    data: &'a HashMap<String, String>,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
    click_action: &'a str,
}

#[derive(Debug, Deserialize)]
struct FcmResponse {
    #[serde(default)]
    results: Vec<FcmResult>,
}

#[derive(Debug, Deserialize)]
struct FcmResult {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl FcmPushSender {
    /// Create a sender for `endpoint` authenticated with `server_key`.
    pub fn new(endpoint: &str, server_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build FCM client", e)
            })?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            server_key: server_key.to_string(),
        })
    }

    /// Create a sender from push configuration.
    pub fn from_config(config: &PushConfig) -> AppResult<Self> {
        if config.fcm_server_key.trim().is_empty() {
            return Err(AppError::configuration(
                "push.fcm_server_key is required when push.provider = \"fcm\"",
            ));
        }
        Self::new(
            &config.fcm_endpoint,
            &config.fcm_server_key,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }
}

#[async_trait]
impl PushSender for FcmPushSender {
    fn name(&self) -> &str {
        "fcm"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> AppResult<Vec<PushDelivery>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let body = build_request(tokens, message);
        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("key={}", self.server_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::ExternalService, "FCM request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = %status, "FCM rejected the request");
            return Err(AppError::external_service(format!(
                "FCM returned HTTP {status}"
            )));
        }

        let parsed: FcmResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::ExternalService, "Invalid FCM response", e)
        })?;

        let deliveries = map_results(tokens, parsed);
        debug!(
            tokens = tokens.len(),
            delivered = deliveries.iter().filter(|d| d.is_delivered()).count(),
            "FCM send complete"
        );
        Ok(deliveries)
    }
}

fn build_request<'a>(tokens: &'a [String], message: &'a PushMessage) -> FcmRequest<'a> {
    FcmRequest {
        registration_ids: tokens,
        notification: FcmNotification {
            title: &message.title,
            body: &message.body,
            click_action: &message.click_action,
        },
        data: &message.data,
    }
}

fn map_results(tokens: &[String], response: FcmResponse) -> Vec<PushDelivery> {
    let mut results = response.results.into_iter();
    tokens
        .iter()
        .map(|token| {
            let status = match results.next() {
                Some(FcmResult {
                    message_id: Some(_),
                    ..
                }) => DeliveryStatus::Delivered,
                Some(FcmResult {
                    error: Some(error), ..
                }) if INVALID_TOKEN_ERRORS.contains(&error.as_str()) => DeliveryStatus::InvalidToken,
                Some(FcmResult {
                    error: Some(error), ..
                }) => DeliveryStatus::Failed(error),
                Some(_) | None => DeliveryStatus::Failed("missing result".to_string()),
            };
            PushDelivery {
                token: token.clone(),
                status,
            }
        })
        .collect()
}
