use std::convert::Infallible;

use axum::{
    Router,
    extract::State,
    response::sse::{Event, Sse},
    routing::get,
};
use futures::Stream;

use crate::{services::sse_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/sse/public",
    tag = "sse",
    responses((
        status = 200,
        description = "session.changed, activity.changed, strip.changed and timer.tick events; the current session and activity are sent on connect",
        content_type = "text/event-stream",
        body = String
    ))
)]
/// Live game events for the presentation client.
pub async fn public_stream(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    sse_service::open_public_stream(&state).await
}

/// SSE routes.
pub fn router() -> Router<SharedState> {
    Router::new().route("/sse/public", get(public_stream))
}
