use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    dao::{
        content_store::{
            ContentStore, body_explorer_path, questions_path, records_path, strip_tasks_path,
        },
        models::{BodyPartRecord, Question, StripCollection, StripTask},
        storage::StorageResult,
    },
    state::game::{ActivityKind, ContentRecord, Difficulty, Gender},
};

use super::{
    config::HttpContentConfig,
    error::{ContentStoreError, ContentStoreResult},
};

/// Content store reading the JSON collections from a static site.
#[derive(Clone)]
pub struct HttpContentStore {
    client: Client,
    base_url: Arc<str>,
}

impl HttpContentStore {
    /// Build the HTTP client for the configured site.
    pub fn new(config: HttpContentConfig) -> ContentStoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ContentStoreError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
        })
    }

    async fn get_collection<T>(&self, path: String) -> ContentStoreResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, "fetching content collection");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ContentStoreError::RequestSend {
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentStoreError::RequestStatus { path, status });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| ContentStoreError::DecodeResponse { path, source })
    }
}

impl ContentStore for HttpContentStore {
    fn fetch_records(
        &self,
        difficulty: Difficulty,
        kind: ActivityKind,
    ) -> BoxFuture<'static, StorageResult<Vec<ContentRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .get_collection(records_path(difficulty, kind))
                .await
                .map_err(Into::into)
        })
    }

    fn fetch_body_explorer(
        &self,
        partner: Gender,
    ) -> BoxFuture<'static, StorageResult<Vec<BodyPartRecord>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .get_collection(body_explorer_path(partner))
                .await
                .map_err(Into::into)
        })
    }

    fn fetch_strip_tasks(
        &self,
        collection: StripCollection,
    ) -> BoxFuture<'static, StorageResult<Vec<StripTask>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .get_collection(strip_tasks_path(collection))
                .await
                .map_err(Into::into)
        })
    }

    fn fetch_questions(
        &self,
        difficulty: Difficulty,
    ) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .get_collection(questions_path(difficulty))
                .await
                .map_err(Into::into)
        })
    }
}
