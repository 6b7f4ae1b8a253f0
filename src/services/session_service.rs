//! Session lifecycle: setup, turn and difficulty changes, focus mode, end and reset.

use tracing::{info, warn};
use validator::Validate;

use crate::{
    dto::session::{
        RouteResponse, Screen, SessionView, SetupRequest, SetupValidation,
    },
    error::ServiceError,
    services::{activity_service, sse_events},
    state::{
        SharedState,
        activities::ActivityInstance,
        game::{Difficulty, GameMode},
        session::{GameSession, SessionAction},
    },
};

/// Queue a snapshot of the session; ended and blank sessions are never written.
pub(crate) fn persist(state: &SharedState, session: &GameSession) {
    if session.is_active() {
        state.persistence().save(session.to_stored());
    }
}

/// Current session.
pub async fn snapshot(state: &SharedState) -> SessionView {
    SessionView::from(&*state.session().read().await)
}

/// Check the setup form without touching the session.
pub fn validate_setup(request: &SetupRequest) -> SetupValidation {
    SetupValidation::check(request)
}

/// Which screen the client should open on.
///
/// A saved session is reloaded when none is being played, so the game screen
/// always has a live session behind it.
pub async fn route(state: &SharedState) -> RouteResponse {
    if state.session().read().await.is_active() {
        return RouteResponse {
            screen: Screen::Game,
        };
    }
    let screen = match restore(state).await {
        Ok(true) => Screen::Game,
        Ok(false) => Screen::Setup,
        Err(err) => {
            warn!(error = %err, "failed to reload saved session");
            Screen::Setup
        }
    };
    RouteResponse { screen }
}

/// Start a new session from a valid setup form, replacing any previous one.
pub async fn start_session(
    state: &SharedState,
    request: SetupRequest,
) -> Result<SessionView, ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::InvalidInput(err.to_string()))?;

    let mut slot = state.activity().lock().await;
    slot.clear();
    let mut session = state.session().write().await;
    session.initialize_players(
        request.player1.into_player(),
        request.player2.into_player(),
        request.difficulty,
    );
    info!(
        player1 = %session.players()[0].name,
        player2 = %session.players()[1].name,
        difficulty = session.difficulty().as_str(),
        "session started"
    );
    persist(state, &session);
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, None, &session);
    Ok(SessionView::from(&*session))
}

/// Hand the turn to the other player.
pub async fn switch_turn(state: &SharedState) -> Result<SessionView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();
    let selection = match slot.instance.as_ref() {
        Some(instance) => activity_service::load_selection(state, instance.kind(), difficulty).await,
        None => None,
    };

    let mut session = state.session().write().await;
    session.switch_turn();
    activity_service::prepare(&mut slot, &session, selection.as_ref());
    persist(state, &session);
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(SessionView::from(&*session))
}

/// Change the difficulty; turn-scoped selections are redrawn for the new level.
pub async fn change_difficulty(
    state: &SharedState,
    difficulty: Difficulty,
) -> Result<SessionView, ServiceError> {
    let mut slot = state.activity().lock().await;
    require_active(&*state.session().read().await)?;
    let selection = match slot.instance.as_ref() {
        Some(instance) => activity_service::load_selection(state, instance.kind(), difficulty).await,
        None => None,
    };

    let mut session = state.session().write().await;
    session.dispatch(SessionAction::ChangeDifficulty(difficulty));
    info!(difficulty = difficulty.as_str(), "difficulty changed");
    activity_service::prepare(&mut slot, &session, selection.as_ref());
    persist(state, &session);
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(SessionView::from(&*session))
}

/// Switch between normal and focus selection.
pub async fn set_mode(state: &SharedState, mode: GameMode) -> Result<SessionView, ServiceError> {
    let mut session = state.session().write().await;
    require_active(&session)?;
    session.dispatch(SessionAction::SetGameMode(mode));
    sse_events::broadcast_session_changed(state, &session);
    Ok(SessionView::from(&*session))
}

/// Add or remove a focus category.
pub async fn toggle_focus(
    state: &SharedState,
    category: String,
) -> Result<SessionView, ServiceError> {
    let category = category.trim().to_string();
    if category.is_empty() {
        return Err(ServiceError::InvalidInput(
            "focus category cannot be empty".into(),
        ));
    }
    let mut session = state.session().write().await;
    require_active(&session)?;
    session.dispatch(SessionAction::ToggleFocusCategory(category));
    sse_events::broadcast_session_changed(state, &session);
    Ok(SessionView::from(&*session))
}

/// Soft stop: the session becomes inactive and keeps its history.
pub async fn end_game(state: &SharedState) -> Result<SessionView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let mut session = state.session().write().await;
    require_active(&session)?;
    slot.clear();
    session.dispatch(SessionAction::EndGame);
    info!(rounds = session.history().len(), "session ended");
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, None, &session);
    Ok(SessionView::from(&*session))
}

/// Hard stop: back to a blank session and an empty slot.
pub async fn reset_game(state: &SharedState) -> SessionView {
    let mut slot = state.activity().lock().await;
    let mut session = state.session().write().await;
    slot.clear();
    session.dispatch(SessionAction::ResetGame);
    state.persistence().clear();
    info!("session reset");
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, None, &session);
    SessionView::from(&*session)
}

/// Reload the stored session, if any, back into the activity it was saved in.
/// Returns whether one was found.
pub async fn restore(state: &SharedState) -> Result<bool, ServiceError> {
    let Some(stored) = state.persistence().load().await? else {
        return Ok(false);
    };
    let activity = stored.current_activity;
    let selection = match activity {
        Some(kind) => activity_service::load_selection(state, kind, stored.difficulty).await,
        None => None,
    };

    let mut slot = state.activity().lock().await;
    let mut session = state.session().write().await;
    slot.clear();
    session.dispatch(SessionAction::Restore(stored));
    // Activity-local state is not snapshotted; the saved activity starts over.
    if let Some(kind) = activity {
        slot.instance = Some(ActivityInstance::enter(
            kind,
            &session,
            &state.config().activities,
        ));
        activity_service::prepare(&mut slot, &session, selection.as_ref());
    }
    info!(
        rounds = session.history().len(),
        turn = u8::from(session.current_turn()),
        activity = ?activity,
        "restored saved session"
    );
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(true)
}

pub(crate) fn require_active(session: &GameSession) -> Result<&GameSession, ServiceError> {
    if session.is_active() {
        Ok(session)
    } else {
        Err(ServiceError::InvalidState("no active session".into()))
    }
}
