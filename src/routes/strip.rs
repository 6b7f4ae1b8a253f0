use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use axum_valid::Valid;

use crate::{
    dto::strip::{AddItemRequest, GambleRequest, ShiftItemRequest, StripView},
    error::AppError,
    services::strip_game_service,
    state::{SharedState, game::Seat},
};

/// Strip game endpoints; the activity is opened through `/activity/strip-game/enter`.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/strip", get(current))
        .route("/strip/wardrobes/{seat}/items", post(add_item))
        .route("/strip/wardrobes/{seat}/items/{index}", delete(delete_item))
        .route(
            "/strip/wardrobes/{seat}/items/{index}/shift",
            post(shift_item),
        )
        .route("/strip/start", post(start))
        .route("/strip/players/{seat}/finish", post(finish))
        .route("/strip/take-it", post(take_it))
        .route("/strip/double-or-nothing", post(double_or_nothing))
        .route("/strip/gamble", post(gamble))
        .route("/strip/continue", post(proceed))
        .route("/strip/replay", post(replay))
}

fn seat(index: u8) -> Result<Seat, AppError> {
    Seat::try_from(index).map_err(AppError::BadRequest)
}

/// Current strip game.
#[utoipa::path(
    get,
    path = "/strip",
    tag = "strip",
    responses(
        (status = 200, description = "Strip game", body = StripView),
        (status = 409, description = "The strip game is not on screen")
    )
)]
pub async fn current(State(state): State<SharedState>) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::current(&state).await?))
}

/// Add a custom item to a wardrobe.
#[utoipa::path(
    post,
    path = "/strip/wardrobes/{seat}/items",
    tag = "strip",
    params(("seat" = u8, Path, description = "Seat index, 0 or 1")),
    request_body = AddItemRequest,
    responses(
        (status = 200, description = "Item added", body = StripView),
        (status = 400, description = "Invalid item name"),
        (status = 409, description = "Wardrobes are locked outside setup")
    )
)]
pub async fn add_item(
    State(state): State<SharedState>,
    Path(index): Path<u8>,
    Valid(Json(payload)): Valid<Json<AddItemRequest>>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(
        strip_game_service::add_item(&state, seat(index)?, payload.name.trim()).await?,
    ))
}

/// Remove a non-permanent item.
#[utoipa::path(
    delete,
    path = "/strip/wardrobes/{seat}/items/{index}",
    tag = "strip",
    params(
        ("seat" = u8, Path, description = "Seat index, 0 or 1"),
        ("index" = usize, Path, description = "Item position")
    ),
    responses(
        (status = 200, description = "Item removed", body = StripView),
        (status = 400, description = "No such item or item is permanent")
    )
)]
pub async fn delete_item(
    State(state): State<SharedState>,
    Path((seat_index, index)): Path<(u8, usize)>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(
        strip_game_service::delete_item(&state, seat(seat_index)?, index).await?,
    ))
}

/// Move an item one position up or down.
#[utoipa::path(
    post,
    path = "/strip/wardrobes/{seat}/items/{index}/shift",
    tag = "strip",
    params(
        ("seat" = u8, Path, description = "Seat index, 0 or 1"),
        ("index" = usize, Path, description = "Item position")
    ),
    request_body = ShiftItemRequest,
    responses(
        (status = 200, description = "Item moved", body = StripView),
        (status = 400, description = "Item cannot move that way")
    )
)]
pub async fn shift_item(
    State(state): State<SharedState>,
    Path((seat_index, index)): Path<(u8, usize)>,
    Json(payload): Json<ShiftItemRequest>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(
        strip_game_service::shift_item(&state, seat(seat_index)?, index, payload.direction)
            .await?,
    ))
}

/// Leave setup and play the first round.
#[utoipa::path(
    post,
    path = "/strip/start",
    tag = "strip",
    responses(
        (status = 200, description = "First round started", body = StripView),
        (status = 409, description = "A wardrobe has fewer than 2 items")
    )
)]
pub async fn start(State(state): State<SharedState>) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::start(&state).await?))
}

/// A player declares the task done.
#[utoipa::path(
    post,
    path = "/strip/players/{seat}/finish",
    tag = "strip",
    params(("seat" = u8, Path, description = "Seat index, 0 or 1")),
    responses(
        (status = 200, description = "Round won", body = StripView),
        (status = 409, description = "The task is not addressed to this player")
    )
)]
pub async fn finish(
    State(state): State<SharedState>,
    Path(index): Path<u8>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::finish(&state, seat(index)?).await?))
}

/// Winner removes one item from the loser.
#[utoipa::path(
    post,
    path = "/strip/take-it",
    tag = "strip",
    responses((status = 200, description = "Item removed", body = StripView))
)]
pub async fn take_it(State(state): State<SharedState>) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::take_it(&state).await?))
}

/// Winner gambles on a double task.
#[utoipa::path(
    post,
    path = "/strip/double-or-nothing",
    tag = "strip",
    responses(
        (status = 200, description = "Gamble started", body = StripView),
        (status = 409, description = "No double task for the winner")
    )
)]
pub async fn double_or_nothing(
    State(state): State<SharedState>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::double_or_nothing(&state).await?))
}

/// Report the outcome of the double task.
#[utoipa::path(
    post,
    path = "/strip/gamble",
    tag = "strip",
    request_body = GambleRequest,
    responses((status = 200, description = "Gamble settled", body = StripView))
)]
pub async fn gamble(
    State(state): State<SharedState>,
    Json(payload): Json<GambleRequest>,
) -> Result<Json<StripView>, AppError> {
    Ok(Json(
        strip_game_service::gamble(&state, payload.success).await?,
    ))
}

/// Leave the removal confirmation.
#[utoipa::path(
    post,
    path = "/strip/continue",
    tag = "strip",
    responses((status = 200, description = "Next round or game over", body = StripView))
)]
pub async fn proceed(State(state): State<SharedState>) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::proceed(&state).await?))
}

/// Start over from setup.
#[utoipa::path(
    post,
    path = "/strip/replay",
    tag = "strip",
    responses((status = 200, description = "Back to setup", body = StripView))
)]
pub async fn replay(State(state): State<SharedState>) -> Result<Json<StripView>, AppError> {
    Ok(Json(strip_game_service::replay(&state).await?))
}
