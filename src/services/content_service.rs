//! Cached access to the content collections with built-in fallbacks.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::{
    dao::{
        content_store::ContentStore,
        models::{BodyPartRecord, Question, StripCollection, StripTask},
    },
    state::{
        activities::strip_game::StripDeck,
        game::{ActivityKind, ContentRecord, Difficulty, Gender},
        selection::ContentPool,
    },
};

/// Content loader shared by every activity.
///
/// Successful fetches are cached for the lifetime of the process; failures
/// are logged and answered with fallbacks without being cached, so the next
/// request retries the store.
pub struct ContentService {
    store: Arc<dyn ContentStore>,
    pools: DashMap<(Difficulty, ActivityKind), ContentPool>,
    body_parts: DashMap<Gender, Arc<Vec<BodyPartRecord>>>,
    questions: DashMap<Difficulty, Arc<Vec<Question>>>,
    strip: DashMap<StripCollection, Arc<Vec<StripTask>>>,
}

impl ContentService {
    /// Wrap a content store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self {
            store,
            pools: DashMap::new(),
            body_parts: DashMap::new(),
            questions: DashMap::new(),
            strip: DashMap::new(),
        }
    }

    /// Records of an activity at a difficulty, filtered on both fields.
    pub async fn pool(&self, difficulty: Difficulty, kind: ActivityKind) -> ContentPool {
        if let Some(pool) = self.pools.get(&(difficulty, kind)) {
            return pool.clone();
        }
        match self.store.fetch_records(difficulty, kind).await {
            Ok(records) => {
                let pool = ContentPool::new(difficulty, kind, records);
                debug!(
                    difficulty = ?difficulty,
                    activity = %kind,
                    count = pool.records().len(),
                    "loaded content pool"
                );
                self.pools.insert((difficulty, kind), pool.clone());
                pool
            }
            Err(err) => {
                warn!(
                    difficulty = ?difficulty,
                    activity = %kind,
                    error = %err,
                    "failed to load content; using built-in records"
                );
                ContentPool::new(difficulty, kind, fallback_records(difficulty, kind))
            }
        }
    }

    /// Body-part records addressed to `partner`.
    pub async fn body_parts(&self, partner: Gender) -> Arc<Vec<BodyPartRecord>> {
        if let Some(records) = self.body_parts.get(&partner) {
            return Arc::clone(&records);
        }
        match self.store.fetch_body_explorer(partner).await {
            Ok(records) => {
                let records = Arc::new(records);
                self.body_parts.insert(partner, Arc::clone(&records));
                records
            }
            Err(err) => {
                warn!(partner = partner.as_str(), error = %err, "failed to load body parts");
                Arc::default()
            }
        }
    }

    /// Would-you-rather questions of a difficulty.
    pub async fn questions(&self, difficulty: Difficulty) -> Arc<Vec<Question>> {
        if let Some(questions) = self.questions.get(&difficulty) {
            return Arc::clone(&questions);
        }
        match self.store.fetch_questions(difficulty).await {
            Ok(questions) => {
                let questions = Arc::new(questions);
                self.questions.insert(difficulty, Arc::clone(&questions));
                questions
            }
            Err(err) => {
                warn!(difficulty = ?difficulty, error = %err, "failed to load questions");
                Arc::default()
            }
        }
    }

    /// All three strip-task collections.
    pub async fn strip_deck(&self) -> StripDeck {
        StripDeck {
            common: self.strip_tasks(StripCollection::Common).await,
            male: self.strip_tasks(StripCollection::Male).await,
            female: self.strip_tasks(StripCollection::Female).await,
        }
    }

    async fn strip_tasks(&self, collection: StripCollection) -> Vec<StripTask> {
        if let Some(tasks) = self.strip.get(&collection) {
            return tasks.as_ref().clone();
        }
        match self.store.fetch_strip_tasks(collection).await {
            Ok(tasks) => {
                self.strip.insert(collection, Arc::new(tasks.clone()));
                tasks
            }
            Err(err) => {
                warn!(
                    collection = collection.file_stem(),
                    error = %err,
                    "failed to load strip tasks"
                );
                Vec::new()
            }
        }
    }
}

/// Minimal records served when a collection cannot be fetched.
pub fn fallback_records(difficulty: Difficulty, activity: ActivityKind) -> Vec<ContentRecord> {
    [
        (1, "Do 5 jumping jacks", Gender::Male, 30),
        (2, "Sing a verse from a song", Gender::Female, 30),
        (3, "Strike a funny pose for 10 seconds", Gender::Male, 10),
        (4, "Tell a joke", Gender::Female, 0),
    ]
    .into_iter()
    .map(|(id, description, gender, timer)| ContentRecord {
        id,
        description: description.to_string(),
        gender,
        difficulty,
        activity,
        timer: Some(timer),
        categories: None,
    })
    .collect()
}
