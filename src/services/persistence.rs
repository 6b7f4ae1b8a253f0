use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::dao::{
    models::StoredGameData,
    session_store::SessionStore,
    storage::StorageResult,
};

enum PersistCommand {
    Save(StoredGameData),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Sole writer of the session slot.
///
/// Commands are applied in the order they were issued by a single background
/// task, so a clear is never overtaken by an older save. Write failures are
/// logged and otherwise ignored.
pub struct Persistence {
    store: Arc<dyn SessionStore>,
    commands: mpsc::UnboundedSender<PersistCommand>,
}

impl Persistence {
    /// Start the writer task for `store`.
    pub fn spawn(store: Arc<dyn SessionStore>) -> Self {
        let (commands, mut rx) = mpsc::unbounded_channel::<PersistCommand>();
        let writer = Arc::clone(&store);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    PersistCommand::Save(data) => {
                        if let Err(err) = writer.save(data).await {
                            warn!(error = %err, "failed to save session snapshot");
                        }
                    }
                    PersistCommand::Clear => {
                        if let Err(err) = writer.clear().await {
                            warn!(error = %err, "failed to clear session snapshot");
                        }
                    }
                    PersistCommand::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
            debug!("session writer stopped");
        });
        Self { store, commands }
    }

    /// Queue a snapshot write.
    pub fn save(&self, data: StoredGameData) {
        self.send(PersistCommand::Save(data));
    }

    /// Queue removal of the snapshot.
    pub fn clear(&self) {
        self.send(PersistCommand::Clear);
    }

    /// Wait until every command queued so far has been applied.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        self.send(PersistCommand::Flush(done));
        let _ = wait.await;
    }

    /// Read the stored snapshot once every queued write has landed.
    pub async fn load(&self) -> StorageResult<Option<StoredGameData>> {
        self.flush().await;
        self.store.load().await
    }

    /// Whether a snapshot is stored, once every queued write has landed.
    pub async fn exists(&self) -> StorageResult<bool> {
        self.flush().await;
        self.store.exists().await
    }

    fn send(&self, command: PersistCommand) {
        if self.commands.send(command).is_err() {
            warn!("session writer is gone; dropping command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::session_store::{FileSessionStore, MemorySessionStore},
        state::game::{Difficulty, Gender, Player, Seat},
    };

    fn snapshot(turn: Seat) -> StoredGameData {
        StoredGameData {
            players: [
                Player::new("Alex", Gender::Male),
                Player::new("Sam", Gender::Female),
            ],
            difficulty: Difficulty::Medium,
            current_activity: None,
            current_turn: turn,
            history: Vec::new(),
            last_updated: 1,
        }
    }

    #[tokio::test]
    async fn commands_apply_in_order() {
        let persistence = Persistence::spawn(Arc::new(MemorySessionStore::new()));
        persistence.save(snapshot(Seat::First));
        persistence.clear();
        persistence.flush().await;
        assert!(!persistence.exists().await.unwrap());

        persistence.save(snapshot(Seat::First));
        persistence.save(snapshot(Seat::Second));
        persistence.flush().await;
        let stored = persistence.load().await.unwrap().unwrap();
        assert_eq!(stored.current_turn, Seat::Second);
    }

    #[tokio::test]
    async fn reads_wait_for_queued_commands() {
        let store = Arc::new(MemorySessionStore::new());
        let persistence = Persistence::spawn(store.clone());
        persistence.save(snapshot(Seat::Second));
        assert!(persistence.exists().await.unwrap());

        persistence.clear();
        assert!(!persistence.exists().await.unwrap());
        assert_eq!(persistence.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn file_slot_survives_a_new_writer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let data = snapshot(Seat::Second);

        let persistence = Persistence::spawn(Arc::new(FileSessionStore::new(&path)));
        persistence.save(data.clone());
        persistence.flush().await;

        let reopened = Persistence::spawn(Arc::new(FileSessionStore::new(&path)));
        assert_eq!(reopened.load().await.unwrap(), Some(data));
    }
}
