use std::{collections::HashMap, io, sync::Arc};

use futures::future::BoxFuture;

use crate::{
    dao::{
        content_store::{
            ContentStore, body_explorer_path, questions_path, records_path, strip_tasks_path,
        },
        models::{BodyPartRecord, Question, StripCollection, StripTask},
        storage::{StorageError, StorageResult},
    },
    state::game::{ActivityKind, ContentRecord, Difficulty, Gender},
};

#[derive(Debug, Clone, Default)]
struct Collections {
    records: HashMap<String, Vec<ContentRecord>>,
    body: HashMap<String, Vec<BodyPartRecord>>,
    strip: HashMap<String, Vec<StripTask>>,
    questions: HashMap<String, Vec<Question>>,
}

/// In-process content store keyed by the same paths as the HTTP store.
///
/// Missing collections behave like a failed fetch.
#[derive(Debug, Clone, Default)]
pub struct MemoryContentStore {
    inner: Arc<Collections>,
}

impl MemoryContentStore {
    /// Empty store; every fetch fails until collections are added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a punishment collection.
    pub fn with_records(
        mut self,
        difficulty: Difficulty,
        kind: ActivityKind,
        records: Vec<ContentRecord>,
    ) -> Self {
        Arc::make_mut(&mut self.inner)
            .records
            .insert(records_path(difficulty, kind), records);
        self
    }

    /// Register a body-explorer collection.
    pub fn with_body_explorer(mut self, partner: Gender, records: Vec<BodyPartRecord>) -> Self {
        Arc::make_mut(&mut self.inner)
            .body
            .insert(body_explorer_path(partner), records);
        self
    }

    /// Register a strip-task collection.
    pub fn with_strip_tasks(mut self, collection: StripCollection, tasks: Vec<StripTask>) -> Self {
        Arc::make_mut(&mut self.inner)
            .strip
            .insert(strip_tasks_path(collection), tasks);
        self
    }

    /// Register the would-you-rather questions of a difficulty.
    pub fn with_questions(mut self, difficulty: Difficulty, questions: Vec<Question>) -> Self {
        Arc::make_mut(&mut self.inner)
            .questions
            .insert(questions_path(difficulty), questions);
        self
    }
}

fn lookup<T: Clone>(map: &HashMap<String, Vec<T>>, path: String) -> StorageResult<Vec<T>> {
    map.get(&path).cloned().ok_or_else(|| {
        StorageError::unavailable(
            format!("no collection registered at `{path}`"),
            io::Error::from(io::ErrorKind::NotFound),
        )
    })
}

impl ContentStore for MemoryContentStore {
    fn fetch_records(
        &self,
        difficulty: Difficulty,
        kind: ActivityKind,
    ) -> BoxFuture<'static, StorageResult<Vec<ContentRecord>>> {
        let result = lookup(&self.inner.records, records_path(difficulty, kind));
        Box::pin(async move { result })
    }

    fn fetch_body_explorer(
        &self,
        partner: Gender,
    ) -> BoxFuture<'static, StorageResult<Vec<BodyPartRecord>>> {
        let result = lookup(&self.inner.body, body_explorer_path(partner));
        Box::pin(async move { result })
    }

    fn fetch_strip_tasks(
        &self,
        collection: StripCollection,
    ) -> BoxFuture<'static, StorageResult<Vec<StripTask>>> {
        let result = lookup(&self.inner.strip, strip_tasks_path(collection));
        Box::pin(async move { result })
    }

    fn fetch_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let result = lookup(&self.inner.questions, questions_path(difficulty));
        Box::pin(async move { result })
    }
}
