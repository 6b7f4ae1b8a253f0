use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::{
    dao::storage::StorageError,
    state::activities::{ActivityError, mini_game::MiniGameError, strip_game::StripGameError},
};

/// Errors that can occur in service layer operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage backend is unavailable.
    #[error("storage unavailable")]
    Unavailable(#[source] StorageError),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        ServiceError::Unavailable(err)
    }
}

impl From<ActivityError> for ServiceError {
    fn from(err: ActivityError) -> Self {
        match err {
            ActivityError::CardOutOfRange(_)
            | ActivityError::MiniGame(MiniGameError::CellOutOfRange(_)) => {
                ServiceError::InvalidInput(err.to_string())
            }
            ActivityError::NoEligibleContent(_) => ServiceError::NotFound(err.to_string()),
            other => ServiceError::InvalidState(other.to_string()),
        }
    }
}

impl From<MiniGameError> for ServiceError {
    fn from(err: MiniGameError) -> Self {
        ActivityError::from(err).into()
    }
}

impl From<StripGameError> for ServiceError {
    fn from(err: StripGameError) -> Self {
        match err {
            StripGameError::Wardrobe(_) => ServiceError::InvalidInput(err.to_string()),
            other => ServiceError::InvalidState(other.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        AppError::BadRequest(format!("validation failed: {}", err))
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
    /// Conflict with current state.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Service unavailable.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Unavailable(source) => AppError::ServiceUnavailable(source.to_string()),
            ServiceError::InvalidInput(message) => AppError::BadRequest(message),
            ServiceError::InvalidState(message) => AppError::Conflict(message),
            ServiceError::NotFound(message) => AppError::NotFound(message),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::game::ActivityKind;

    #[test]
    fn activity_errors_map_to_status_classes() {
        let missing: AppError =
            ServiceError::from(ActivityError::NoEligibleContent(ActivityKind::SpinWheel)).into();
        assert!(matches!(missing, AppError::NotFound(_)));

        let pending: AppError = ServiceError::from(ActivityError::CardPending(2)).into();
        assert!(matches!(pending, AppError::Conflict(_)));

        let cell: AppError = ServiceError::from(MiniGameError::CellOutOfRange(12)).into();
        assert!(matches!(cell, AppError::BadRequest(_)));
    }
}
