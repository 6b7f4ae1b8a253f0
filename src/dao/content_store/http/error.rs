//! Error types of the HTTP content store.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`ContentStoreError`] failures.
pub type ContentStoreResult<T> = Result<T, ContentStoreError>;

/// Failures that can occur while fetching content files.
#[derive(Debug, Error)]
pub enum ContentStoreError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build content HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("failed to fetch content at `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-success status.
    #[error("unexpected content response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// The body could not be decoded as the expected collection.
    #[error("failed to decode content at `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<ContentStoreError> for StorageError {
    fn from(err: ContentStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
