#[cfg(feature = "http-content")]
pub mod http;
pub mod memory;

use futures::future::BoxFuture;

use crate::{
    dao::{
        models::{BodyPartRecord, Question, StripCollection, StripTask},
        storage::StorageResult,
    },
    state::game::{ActivityKind, ContentRecord, Difficulty, Gender},
};

/// Abstraction over the static content collections queried by the activities.
///
/// Implementations return the raw collection; callers filter client-side.
pub trait ContentStore: Send + Sync {
    fn fetch_records(
        &self,
        difficulty: Difficulty,
        kind: ActivityKind,
    ) -> BoxFuture<'static, StorageResult<Vec<ContentRecord>>>;
    fn fetch_body_explorer(
        &self,
        partner: Gender,
    ) -> BoxFuture<'static, StorageResult<Vec<BodyPartRecord>>>;
    fn fetch_strip_tasks(
        &self,
        collection: StripCollection,
    ) -> BoxFuture<'static, StorageResult<Vec<StripTask>>>;
    fn fetch_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<Question>>>;
}

/// Relative path of a punishment collection.
pub fn records_path(difficulty: Difficulty, kind: ActivityKind) -> String {
    format!("data/punishments/{}/{}.json", difficulty.as_str(), kind.as_str())
}

/// Relative path of a body-explorer collection.
pub fn body_explorer_path(partner: Gender) -> String {
    format!("data/punishments/body-explorer/{}.json", partner.as_str())
}

/// Relative path of a strip-task collection.
pub fn strip_tasks_path(collection: StripCollection) -> String {
    format!("data/strip/{}.json", collection.file_stem())
}

/// Relative path of the would-you-rather questions.
pub fn questions_path(difficulty: Difficulty) -> String {
    format!(
        "data/punishments/{}/would-you-rather.json",
        difficulty.as_str()
    )
}
