use tracing::warn;

use crate::{
    dto::health::{HealthResponse, HealthStatus},
    state::SharedState,
};

/// Probe the session slot; an unreadable slot reports degraded.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let session_active = state.session().read().await.is_active();
    match state.persistence().exists().await {
        Ok(saved) => HealthResponse {
            status: HealthStatus::Ok,
            session_active,
            saved_session: Some(saved),
        },
        Err(err) => {
            warn!(error = %err, "session slot health check failed");
            HealthResponse {
                status: HealthStatus::Degraded,
                session_active,
                saved_session: None,
            }
        }
    }
}
