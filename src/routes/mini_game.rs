use axum::{Json, Router, extract::State, routing::post};
use axum_valid::Valid;

use crate::{
    dto::activity::{ActivityView, MoveRequest, SeatRequest, SelectGameRequest, TapResponse},
    error::AppError,
    services::mini_game_service,
    state::SharedState,
};

/// Mini-game selector and game inputs.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/activity/mini-game/select", post(select_game))
        .route("/activity/mini-game/deselect", post(deselect_game))
        .route("/activity/mini-game/tap-battle/start", post(start_tap_battle))
        .route("/activity/mini-game/tap-battle/tap", post(tap))
        .route("/activity/mini-game/reaction-test/start", post(start_reaction))
        .route("/activity/mini-game/reaction-test/click", post(click))
        .route("/activity/mini-game/tic-tac-toe/move", post(play))
}

/// Pick a game.
#[utoipa::path(
    post,
    path = "/activity/mini-game/select",
    tag = "mini-game",
    request_body = SelectGameRequest,
    responses(
        (status = 200, description = "Game selected", body = ActivityView),
        (status = 409, description = "A result must be acknowledged first")
    )
)]
pub async fn select_game(
    State(state): State<SharedState>,
    Json(payload): Json<SelectGameRequest>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(mini_game_service::select(&state, payload.game).await?))
}

/// Back to the selector.
#[utoipa::path(
    post,
    path = "/activity/mini-game/deselect",
    tag = "mini-game",
    responses((status = 200, description = "Selector shown", body = ActivityView))
)]
pub async fn deselect_game(
    State(state): State<SharedState>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(mini_game_service::deselect(&state).await?))
}

/// Start the tap battle countdown.
#[utoipa::path(
    post,
    path = "/activity/mini-game/tap-battle/start",
    tag = "mini-game",
    responses(
        (status = 200, description = "Countdown started", body = ActivityView),
        (status = 409, description = "Tap battle not selected or already running")
    )
)]
pub async fn start_tap_battle(
    State(state): State<SharedState>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(mini_game_service::start_tap_battle(&state).await?))
}

/// Count one tap.
#[utoipa::path(
    post,
    path = "/activity/mini-game/tap-battle/tap",
    tag = "mini-game",
    request_body = SeatRequest,
    responses(
        (status = 200, description = "Tap counted", body = TapResponse),
        (status = 409, description = "Taps are not accepted right now")
    )
)]
pub async fn tap(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<SeatRequest>>,
) -> Result<Json<TapResponse>, AppError> {
    Ok(Json(mini_game_service::tap(&state, payload.seat()).await?))
}

/// Start the current reaction attempt.
#[utoipa::path(
    post,
    path = "/activity/mini-game/reaction-test/start",
    tag = "mini-game",
    responses((status = 200, description = "Waiting for the signal", body = ActivityView))
)]
pub async fn start_reaction(
    State(state): State<SharedState>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(mini_game_service::start_reaction(&state).await?))
}

/// Register a reaction click.
#[utoipa::path(
    post,
    path = "/activity/mini-game/reaction-test/click",
    tag = "mini-game",
    responses((status = 200, description = "Click registered", body = ActivityView))
)]
pub async fn click(State(state): State<SharedState>) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(mini_game_service::click(&state).await?))
}

/// Place a tic-tac-toe mark.
#[utoipa::path(
    post,
    path = "/activity/mini-game/tic-tac-toe/move",
    tag = "mini-game",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Mark placed", body = ActivityView),
        (status = 400, description = "No such cell"),
        (status = 409, description = "Not this seat's turn or cell taken")
    )
)]
pub async fn play(
    State(state): State<SharedState>,
    Valid(Json(payload)): Valid<Json<MoveRequest>>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(
        mini_game_service::play(&state, payload.seat(), payload.cell).await?,
    ))
}
