//! In-memory device token store.

use async_trait::async_trait;
use dashmap::DashMap;

use medrem_core::result::AppResult;
use medrem_core::types::UserId;
use medrem_entity::device::DeviceToken;

use super::StoreProbe;
use crate::store::DeviceTokenStore;

/// Token store keyed by `(user_id, token)`.
#[derive(Debug, Default)]
pub struct MemoryDeviceTokenStore {
    rows: DashMap<(UserId, String), DeviceToken>,
    probe: StoreProbe,
}

impl MemoryDeviceTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Call counter and fault switch.
    pub fn probe(&self) -> &StoreProbe {
        &self.probe
    }
}

#[async_trait]
impl DeviceTokenStore for MemoryDeviceTokenStore {
    async fn register(&self, token: &DeviceToken) -> AppResult<DeviceToken> {
        self.probe.enter("register")?;
        let stored = self
            .rows
            .entry((token.user_id, token.token.clone()))
            .or_insert_with(|| token.clone());
        Ok(stored.value().clone())
    }

    async fn remove(&self, user_id: UserId, token: &str) -> AppResult<bool> {
        self.probe.enter("remove")?;
        Ok(self.rows.remove(&(user_id, token.to_string())).is_some())
    }

    async fn find_by_user(&self, user_id: UserId) -> AppResult<Vec<DeviceToken>> {
        self.probe.enter("find_by_user")?;
        let mut tokens: Vec<DeviceToken> = self
            .rows
            .iter()
            .filter(|entry| entry.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        tokens.sort_by_key(|t| t.created_at);
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let store = MemoryDeviceTokenStore::new();
        let user = UserId::new();
        let first = store
            .register(&DeviceToken::new(user, "tok-1", Utc::now()))
            .await
            .unwrap();
        let second = store
            .register(&DeviceToken::new(user, "tok-1", Utc::now()))
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.find_by_user(user).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_scoped_to_user() {
        let store = MemoryDeviceTokenStore::new();
        let user = UserId::new();
        store
            .register(&DeviceToken::new(user, "tok-1", Utc::now()))
            .await
            .unwrap();
        assert!(!store.remove(UserId::new(), "tok-1").await.unwrap());
        assert!(store.remove(user, "tok-1").await.unwrap());
        assert!(store.find_by_user(user).await.unwrap().is_empty());
    }
}
