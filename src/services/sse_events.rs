use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        activity::ActivityView,
        session::SessionView,
        sse::{ServerEvent, TimerTickEvent},
        strip::StripView,
    },
    state::{
        SharedState,
        activities::{ActivityInstance, strip_game::StripGame},
        game::ActivityKind,
        session::GameSession,
    },
};

const EVENT_SESSION_CHANGED: &str = "session.changed";
const EVENT_ACTIVITY_CHANGED: &str = "activity.changed";
const EVENT_STRIP_CHANGED: &str = "strip.changed";
const EVENT_TIMER_TICK: &str = "timer.tick";

/// Broadcast a snapshot of the session.
pub fn broadcast_session_changed(state: &SharedState, session: &GameSession) {
    send_public_event(state, EVENT_SESSION_CHANGED, &SessionView::from(session));
}

/// Broadcast a snapshot of the live activity; strip-game changes also emit `strip.changed`.
pub fn broadcast_activity_changed(
    state: &SharedState,
    instance: Option<&ActivityInstance>,
    session: &GameSession,
) {
    if let Some(ActivityInstance::StripGame(game)) = instance {
        broadcast_strip_changed(state, game);
    }
    send_public_event(
        state,
        EVENT_ACTIVITY_CHANGED,
        &ActivityView::build(instance, session),
    );
}

/// Broadcast a snapshot of the strip game.
pub fn broadcast_strip_changed(state: &SharedState, game: &StripGame) {
    send_public_event(state, EVENT_STRIP_CHANGED, &StripView::from(game));
}

/// Broadcast one second of a running countdown.
pub fn broadcast_timer_tick(state: &SharedState, activity: ActivityKind, remaining: u32) {
    let payload = TimerTickEvent {
        activity,
        remaining,
    };
    send_public_event(state, EVENT_TIMER_TICK, &payload);
}

/// Events replaying the current session and activity to a fresh subscriber.
pub fn snapshot_events(instance: Option<&ActivityInstance>, session: &GameSession) -> Vec<ServerEvent> {
    let mut events = Vec::with_capacity(3);
    events.extend(encode(EVENT_SESSION_CHANGED, &SessionView::from(session)));
    if let Some(ActivityInstance::StripGame(game)) = instance {
        events.extend(encode(EVENT_STRIP_CHANGED, &StripView::from(game)));
    }
    events.extend(encode(
        EVENT_ACTIVITY_CHANGED,
        &ActivityView::build(instance, session),
    ));
    events
}

fn encode(event: &str, payload: &impl Serialize) -> Option<ServerEvent> {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => Some(event),
        Err(err) => {
            warn!(event, error = %err, "failed to serialize public SSE payload");
            None
        }
    }
}

fn send_public_event(state: &SharedState, event: &str, payload: &impl Serialize) {
    if let Some(event) = encode(event, payload) {
        state.public_sse().broadcast(event);
    }
}
