mod file;
mod memory;

pub use file::FileSessionStore;
pub use memory::MemorySessionStore;

use futures::future::BoxFuture;

use crate::dao::{models::StoredGameData, storage::StorageResult};

/// Key under which the session blob is stored.
pub const SESSION_KEY: &str = "duel_game_state";

/// Single-slot persistence of the current session snapshot.
pub trait SessionStore: Send + Sync {
    fn save(&self, data: StoredGameData) -> BoxFuture<'static, StorageResult<()>>;
    fn load(&self) -> BoxFuture<'static, StorageResult<Option<StoredGameData>>>;
    fn clear(&self) -> BoxFuture<'static, StorageResult<()>>;
    fn exists(&self) -> BoxFuture<'static, StorageResult<bool>>;
}
