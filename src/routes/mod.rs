use axum::Router;

use crate::state::SharedState;

pub mod activity;
pub mod docs;
pub mod health;
pub mod mini_game;
pub mod session;
pub mod sse;
pub mod strip;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(sse::router())
        .merge(session::router())
        .merge(activity::router())
        .merge(mini_game::router())
        .merge(strip::router());

    api_router.merge(docs::router()).with_state(state)
}
