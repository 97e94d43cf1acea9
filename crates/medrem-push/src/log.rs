//! Log-only push sender.

use async_trait::async_trait;
use tracing::info;

use medrem_core::result::AppResult;
use medrem_core::traits::{DeliveryStatus, PushDelivery, PushMessage, PushSender};

/// Writes each notification to the log and reports it delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPushSender;

#[async_trait]
impl PushSender for LogPushSender {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> AppResult<Vec<PushDelivery>> {
        info!(
            tokens = tokens.len(),
            title = %message.title,
            body = %message.body,
            click_action = %message.click_action,
            "Push notification (log only)"
        );
        Ok(tokens
            .iter()
            .map(|token| PushDelivery {
                token: token.clone(),
                status: DeliveryStatus::Delivered,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_every_token_delivered() {
        let message = PushMessage {
            title: "Aspirin".to_string(),
            body: "It's time to take 1 dose(s) of Aspirin.".to_string(),
            click_action: "medrem://medications/1".to_string(),
            data: HashMap::new(),
        };
        let tokens = vec!["a".to_string(), "b".to_string()];
        let deliveries = LogPushSender.send(&tokens, &message).await.unwrap();
        assert_eq!(deliveries.len(), 2);
        assert!(deliveries.iter().all(PushDelivery::is_delivered));
    }
}
