//! Registers and resolves the push tokens of a user's devices.

use std::sync::Arc;

use tracing::{info, warn};

use medrem_core::error::AppError;
use medrem_core::result::AppResult;
use medrem_core::traits::Clock;
use medrem_core::types::UserId;
use medrem_database::DeviceTokenStore;
use medrem_entity::device::DeviceToken;

use crate::context::RequestContext;
use crate::error::conceal;

/// Longest token accepted from a device.
const MAX_TOKEN_LEN: usize = 4096;

/// Manages device push tokens.
#[derive(Debug, Clone)]
pub struct DeviceTokenService {
    /// Token store.
    tokens: Arc<dyn DeviceTokenStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl DeviceTokenService {
    /// Creates a new device token service.
    pub fn new(tokens: Arc<dyn DeviceTokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { tokens, clock }
    }

    /// Registers a token for the caller. Registering it again is a no-op.
    pub async fn register(&self, ctx: &RequestContext, token: &str) -> AppResult<DeviceToken> {
        let token = token.trim();
        if token.is_empty() || token.len() > MAX_TOKEN_LEN {
            return Err(AppError::bad_request("Invalid device token"));
        }

        let stored = self
            .tokens
            .register(&DeviceToken::new(ctx.user_id, token, self.clock.now()))
            .await
            .map_err(conceal("register device token"))?;

        info!(user_id = %ctx.user_id, token_id = %stored.id, "Device token registered");
        Ok(stored)
    }

    /// Removes one of the caller's tokens.
    pub async fn unregister(&self, ctx: &RequestContext, token: &str) -> AppResult<()> {
        let removed = self
            .tokens
            .remove(ctx.user_id, token.trim())
            .await
            .map_err(conceal("remove device token"))?;
        if !removed {
            return Err(AppError::not_found("Device token not found"));
        }

        info!(user_id = %ctx.user_id, "Device token removed");
        Ok(())
    }

    /// Lists the caller's tokens.
    pub async fn list(&self, ctx: &RequestContext) -> AppResult<Vec<DeviceToken>> {
        self.tokens
            .find_by_user(ctx.user_id)
            .await
            .map_err(conceal("list device tokens"))
    }

    /// Token strings to notify for `user_id`.
    pub async fn tokens_for_user(&self, user_id: UserId) -> AppResult<Vec<String>> {
        let tokens = self
            .tokens
            .find_by_user(user_id)
            .await
            .map_err(conceal("list device tokens"))?;
        Ok(tokens.into_iter().map(|t| t.token).collect())
    }

    /// Drops a token the push provider no longer accepts.
    pub async fn discard_invalid(&self, user_id: UserId, token: &str) -> AppResult<()> {
        let removed = self
            .tokens
            .remove(user_id, token)
            .await
            .map_err(conceal("remove device token"))?;
        if removed {
            warn!(user_id = %user_id, "Removed device token rejected by push provider");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medrem_core::error::ErrorKind;
    use medrem_core::traits::SystemClock;
    use medrem_database::memory::MemoryDeviceTokenStore;

    fn service() -> DeviceTokenService {
        DeviceTokenService::new(Arc::new(MemoryDeviceTokenStore::new()), Arc::new(SystemClock))
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let service = service();
        let ctx = RequestContext::new(UserId::new());
        let first = service.register(&ctx, " device-a ").await.unwrap();
        let again = service.register(&ctx, "device-a").await.unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(first.token, "device-a");

        service.register(&ctx, "device-b").await.unwrap();
        let mut tokens = service.tokens_for_user(ctx.user_id).await.unwrap();
        tokens.sort();
        assert_eq!(tokens, vec!["device-a".to_string(), "device-b".to_string()]);
    }

    #[tokio::test]
    async fn test_register_rejects_blank_token() {
        let err = service()
            .register(&RequestContext::new(UserId::new()), "   ")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn test_unregister_unknown_token() {
        let service = service();
        let ctx = RequestContext::new(UserId::new());
        service.register(&ctx, "device-a").await.unwrap();

        let other = RequestContext::new(UserId::new());
        let err = service.unregister(&other, "device-a").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        service.unregister(&ctx, "device-a").await.unwrap();
        assert!(service.list(&ctx).await.unwrap().is_empty());
    }
}
