use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::{
        activity::{ActivityView, ChoiceRequest, ResolutionView},
        session::SessionView,
    },
    error::AppError,
    services::activity_service,
    state::{SharedState, activities::Acknowledgement, game::ActivityKind},
};

/// Activity picker and the resolving operations shared by every activity.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/activity", get(current_activity))
        .route("/activity/{kind}/enter", post(enter_activity))
        .route("/activity/exit", post(exit_activity))
        .route("/activity/complete", post(complete))
        .route("/activity/skip", post(skip))
        .route("/activity/spin", post(spin))
        .route("/activity/cards/{index}/reveal", post(reveal_card))
        .route("/activity/explore", post(explore))
        .route("/activity/choose", post(choose))
}

/// Activity on screen; the picker when `kind` is absent.
#[utoipa::path(
    get,
    path = "/activity",
    tag = "activity",
    responses((status = 200, description = "Current activity", body = ActivityView))
)]
pub async fn current_activity(State(state): State<SharedState>) -> Json<ActivityView> {
    Json(activity_service::current(&state).await)
}

/// Open an activity from the picker.
#[utoipa::path(
    post,
    path = "/activity/{kind}/enter",
    tag = "activity",
    params(("kind" = ActivityKind, Path, description = "Activity to open")),
    responses(
        (status = 200, description = "Activity opened", body = ActivityView),
        (status = 409, description = "No active session")
    )
)]
pub async fn enter_activity(
    State(state): State<SharedState>,
    Path(kind): Path<ActivityKind>,
) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(activity_service::enter(&state, kind).await?))
}

/// Leave the activity and return to the picker.
#[utoipa::path(
    post,
    path = "/activity/exit",
    tag = "activity",
    responses((status = 200, description = "Back on the picker", body = SessionView))
)]
pub async fn exit_activity(State(state): State<SharedState>) -> Json<SessionView> {
    Json(activity_service::exit(&state).await)
}

/// Mark the presented task as done.
#[utoipa::path(
    post,
    path = "/activity/complete",
    tag = "activity",
    responses(
        (status = 200, description = "Task completed", body = ActivityView),
        (status = 409, description = "Nothing to complete")
    )
)]
pub async fn complete(State(state): State<SharedState>) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(
        activity_service::acknowledge(&state, Acknowledgement::Complete).await?,
    ))
}

/// Pass on the current round.
#[utoipa::path(
    post,
    path = "/activity/skip",
    tag = "activity",
    responses(
        (status = 200, description = "Round skipped", body = ActivityView),
        (status = 409, description = "No activity in progress")
    )
)]
pub async fn skip(State(state): State<SharedState>) -> Result<Json<ActivityView>, AppError> {
    Ok(Json(
        activity_service::acknowledge(&state, Acknowledgement::Skip).await?,
    ))
}

/// Spin the wheel.
#[utoipa::path(
    post,
    path = "/activity/spin",
    tag = "activity",
    responses(
        (status = 200, description = "Wheel landed", body = ResolutionView),
        (status = 409, description = "The wheel is not on screen")
    )
)]
pub async fn spin(State(state): State<SharedState>) -> Result<Json<ResolutionView>, AppError> {
    Ok(Json(activity_service::spin(&state).await?))
}

/// Scratch a card.
#[utoipa::path(
    post,
    path = "/activity/cards/{index}/reveal",
    tag = "activity",
    params(("index" = usize, Path, description = "Card position in the deck")),
    responses(
        (status = 200, description = "Card revealed", body = ResolutionView),
        (status = 400, description = "No such card"),
        (status = 409, description = "Card already scratched or another card pending")
    )
)]
pub async fn reveal_card(
    State(state): State<SharedState>,
    Path(index): Path<usize>,
) -> Result<Json<ResolutionView>, AppError> {
    Ok(Json(activity_service::reveal_card(&state, index).await?))
}

/// Run the body explorer.
#[utoipa::path(
    post,
    path = "/activity/explore",
    tag = "activity",
    responses(
        (status = 200, description = "Part explored", body = ResolutionView),
        (status = 404, description = "No record for the selected part")
    )
)]
pub async fn explore(State(state): State<SharedState>) -> Result<Json<ResolutionView>, AppError> {
    Ok(Json(activity_service::explore(&state).await?))
}

/// Answer the would-you-rather question.
#[utoipa::path(
    post,
    path = "/activity/choose",
    tag = "activity",
    request_body = ChoiceRequest,
    responses(
        (status = 200, description = "Answer recorded", body = ResolutionView),
        (status = 404, description = "No question available")
    )
)]
pub async fn choose(
    State(state): State<SharedState>,
    Json(payload): Json<ChoiceRequest>,
) -> Result<Json<ResolutionView>, AppError> {
    Ok(Json(activity_service::choose(&state, payload.choice).await?))
}
