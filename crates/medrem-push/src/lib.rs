//! # medrem-push
//!
//! [`PushSender`](medrem_core::traits::PushSender) implementations: the
//! Firebase Cloud Messaging HTTP adapter and a log-only sender for
//! development. [`build_sender`] picks one from configuration.

pub mod fcm;
pub mod log;

use std::sync::Arc;

use medrem_core::config::PushConfig;
use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::traits::PushSender;

pub use fcm::FcmPushSender;
pub use log::LogPushSender;

/// Build the push sender named by `config.provider`.
pub fn build_sender(config: &PushConfig) -> AppResult<Arc<dyn PushSender>> {
    match config.provider.as_str() {
        "fcm" => Ok(Arc::new(FcmPushSender::from_config(config)?)),
        "log" => Ok(Arc::new(LogPushSender)),
        other => Err(AppError::configuration(format!(
            "Unknown push provider '{other}' (expected 'fcm' or 'log')"
        ))),
    }
}
