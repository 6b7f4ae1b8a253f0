/// Read-only access to the punishment, question, and strip-task collections.
pub mod content_store;
/// Wire models of the content files and the persisted session blob.
pub mod models;
/// Single-slot persistence of the current session.
pub mod session_store;
/// Storage error shared by every backend.
pub mod storage;
