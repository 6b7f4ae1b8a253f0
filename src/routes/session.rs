use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use axum_valid::Valid;

use crate::{
    dto::session::{
        DifficultyRequest, FocusToggleRequest, GameModeRequest, RouteResponse, SessionView,
        SetupRequest, SetupValidation,
    },
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Setup screen and session lifecycle endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/route", get(route))
        .route("/setup/validate", post(validate_setup))
        .route(
            "/session",
            get(get_session).post(start_session).delete(reset_session),
        )
        .route("/session/turn", post(switch_turn))
        .route("/session/difficulty", put(change_difficulty))
        .route("/session/mode", put(set_mode))
        .route("/session/focus", post(toggle_focus))
        .route("/session/end", post(end_game))
}

/// Screen to open: the game when a session is live or saved, setup otherwise.
#[utoipa::path(
    get,
    path = "/route",
    tag = "session",
    responses((status = 200, description = "Screen to show", body = RouteResponse))
)]
pub async fn route(State(state): State<SharedState>) -> Json<RouteResponse> {
    Json(session_service::route(&state).await)
}

/// Check the setup form and report every inline error.
#[utoipa::path(
    post,
    path = "/setup/validate",
    tag = "session",
    request_body = SetupRequest,
    responses((status = 200, description = "Validation outcome", body = SetupValidation))
)]
pub async fn validate_setup(Json(payload): Json<SetupRequest>) -> Json<SetupValidation> {
    Json(session_service::validate_setup(&payload))
}

/// Current session.
#[utoipa::path(
    get,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Current session", body = SessionView))
)]
pub async fn get_session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(session_service::snapshot(&state).await)
}

/// Start a session from the setup form.
#[utoipa::path(
    post,
    path = "/session",
    tag = "session",
    request_body = SetupRequest,
    responses(
        (status = 200, description = "Session started", body = SessionView),
        (status = 400, description = "Invalid names or genders")
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    Json(payload): Json<SetupRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::start_session(&state, payload).await?))
}

/// Hand the turn to the other player.
#[utoipa::path(
    post,
    path = "/session/turn",
    tag = "session",
    responses(
        (status = 200, description = "Turn switched", body = SessionView),
        (status = 409, description = "No active session")
    )
)]
pub async fn switch_turn(
    State(state): State<SharedState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::switch_turn(&state).await?))
}

/// Change the difficulty of the running session.
#[utoipa::path(
    put,
    path = "/session/difficulty",
    tag = "session",
    request_body = DifficultyRequest,
    responses(
        (status = 200, description = "Difficulty changed", body = SessionView),
        (status = 409, description = "No active session")
    )
)]
pub async fn change_difficulty(
    State(state): State<SharedState>,
    Json(payload): Json<DifficultyRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        session_service::change_difficulty(&state, payload.difficulty).await?,
    ))
}

/// Switch between normal and focus selection.
#[utoipa::path(
    put,
    path = "/session/mode",
    tag = "session",
    request_body = GameModeRequest,
    responses(
        (status = 200, description = "Mode changed", body = SessionView),
        (status = 409, description = "No active session")
    )
)]
pub async fn set_mode(
    State(state): State<SharedState>,
    Json(payload): Json<GameModeRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::set_mode(&state, payload.mode).await?))
}

/// Add or remove a focus category.
#[utoipa::path(
    post,
    path = "/session/focus",
    tag = "session",
    request_body = FocusToggleRequest,
    responses(
        (status = 200, description = "Category toggled", body = SessionView),
        (status = 400, description = "Invalid category"),
        (status = 409, description = "No active session")
    )
)]
pub async fn toggle_focus(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<FocusToggleRequest>>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(
        session_service::toggle_focus(&state, payload.category).await?,
    ))
}

/// End the session, keeping its history.
#[utoipa::path(
    post,
    path = "/session/end",
    tag = "session",
    responses(
        (status = 200, description = "Session ended", body = SessionView),
        (status = 409, description = "No active session")
    )
)]
pub async fn end_game(State(state): State<SharedState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(session_service::end_game(&state).await?))
}

/// Discard the session and its saved snapshot.
#[utoipa::path(
    delete,
    path = "/session",
    tag = "session",
    responses((status = 200, description = "Blank session", body = SessionView))
)]
pub async fn reset_session(State(state): State<SharedState>) -> Json<SessionView> {
    Json(session_service::reset_game(&state).await)
}
