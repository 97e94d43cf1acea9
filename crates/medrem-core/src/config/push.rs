//! Push notification delivery configuration.

use serde::{Deserialize, Serialize};

/// Push provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Provider: `"fcm"` or `"log"` (log-only, for development).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// FCM send endpoint.
    #[serde(default = "default_fcm_endpoint")]
    pub fcm_endpoint: String,
    /// FCM server key. Required when `provider = "fcm"`.
    #[serde(default)]
    pub fcm_server_key: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    /// Base of the click action; the medication id is appended.
    #[serde(default = "default_click_action_base")]
    pub click_action_base_url: String,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            fcm_endpoint: default_fcm_endpoint(),
            fcm_server_key: String::new(),
            request_timeout_seconds: default_request_timeout(),
            click_action_base_url: default_click_action_base(),
        }
    }
}

fn default_provider() -> String {
    "log".to_string()
}

fn default_fcm_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_click_action_base() -> String {
    "medrem://medications".to_string()
}
