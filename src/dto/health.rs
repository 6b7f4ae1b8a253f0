use serde::Serialize;
use utoipa::ToSchema;

/// Overall verdict of a health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// The session slot could not be read; the game still runs from memory.
    Degraded,
}

/// Body of `/healthcheck`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Whether a session is being played.
    pub session_active: bool,
    /// Whether the session slot holds a snapshot; absent when the probe failed.
    pub saved_session: Option<bool>,
}
