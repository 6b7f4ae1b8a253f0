use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::RwLock;

use crate::dao::{
    models::StoredGameData,
    session_store::{SESSION_KEY, SessionStore},
    storage::{StorageError, StorageResult},
};

/// Session slot living as long as the server process.
///
/// The blob is kept serialized so a load goes through the same decoding path
/// as the file store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    slot: Arc<RwLock<Option<String>>>,
}

impl MemorySessionStore {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn save(&self, data: StoredGameData) -> BoxFuture<'static, StorageResult<()>> {
        let slot = self.slot.clone();
        Box::pin(async move {
            let raw = serde_json::to_string(&data).map_err(|source| {
                StorageError::corrupted(format!("failed to encode `{SESSION_KEY}`"), source)
            })?;
            *slot.write().await = Some(raw);
            Ok(())
        })
    }

    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoredGameData>>> {
        let slot = self.slot.clone();
        Box::pin(async move {
            let guard = slot.read().await;
            let Some(raw) = guard.as_deref() else {
                return Ok(None);
            };
            serde_json::from_str(raw).map(Some).map_err(|source| {
                StorageError::corrupted(format!("failed to decode `{SESSION_KEY}`"), source)
            })
        })
    }

    fn clear(&self) -> BoxFuture<'static, StorageResult<()>> {
        let slot = self.slot.clone();
        Box::pin(async move {
            slot.write().await.take();
            Ok(())
        })
    }

    fn exists(&self) -> BoxFuture<'static, StorageResult<bool>> {
        let slot = self.slot.clone();
        Box::pin(async move { Ok(slot.read().await.is_some()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::{Difficulty, Gender, Player, Seat};

    fn sample() -> StoredGameData {
        StoredGameData {
            players: [
                Player::new("Alex", Gender::Male),
                Player::new("Sam", Gender::Female),
            ],
            difficulty: Difficulty::Easy,
            current_activity: None,
            current_turn: Seat::Second,
            history: Vec::new(),
            last_updated: 1,
        }
    }

    #[tokio::test]
    async fn save_load_clear_cycle() {
        let store = MemorySessionStore::new();
        assert!(!store.exists().await.unwrap());
        assert_eq!(store.load().await.unwrap(), None);

        let data = sample();
        store.save(data.clone()).await.unwrap();
        assert!(store.exists().await.unwrap());
        assert_eq!(store.load().await.unwrap(), Some(data));

        store.clear().await.unwrap();
        assert!(!store.exists().await.unwrap());
    }
}
