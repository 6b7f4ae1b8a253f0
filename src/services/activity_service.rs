//! Orchestration of the activity on screen: entry and exit, turn-scoped
//! selections, the resolving operations and their acknowledgement.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::{
    dao::models::Question,
    dto::{
        activity::{ActivityView, ResolutionView},
        session::SessionView,
    },
    error::ServiceError,
    services::{
        session_service::{persist, require_active},
        sse_events,
    },
    state::{
        ActivitySlot, SharedState,
        activities::{
            Acknowledgement, ActivityError, ActivityInstance, Resolution,
            would_you_rather::Choice,
        },
        game::{ActivityKind, Difficulty},
        selection::ContentPool,
        session::{GameSession, SessionAction},
    },
};

/// Content backing a turn-scoped selection.
pub(crate) enum Selection {
    Pool(ContentPool),
    Questions(Arc<Vec<Question>>),
}

/// Load what `kind` draws its per-turn selection from, if it has one.
pub(crate) async fn load_selection(
    state: &SharedState,
    kind: ActivityKind,
    difficulty: Difficulty,
) -> Option<Selection> {
    match kind {
        ActivityKind::SpinWheel | ActivityKind::ScratchCard => Some(Selection::Pool(
            state.content().pool(difficulty, kind).await,
        )),
        ActivityKind::WouldYouRather => Some(Selection::Questions(
            state.content().questions(difficulty).await,
        )),
        ActivityKind::MiniGame | ActivityKind::BodyExplorer | ActivityKind::StripGame => None,
    }
}

/// Draw the wheel, deck, or question for the current turn unless it is already drawn.
pub(crate) fn prepare(slot: &mut ActivitySlot, session: &GameSession, selection: Option<&Selection>) {
    if !session.is_active() {
        return;
    }
    let result = match (slot.instance.as_mut(), selection) {
        (Some(ActivityInstance::SpinWheel(wheel)), Some(Selection::Pool(pool))) => {
            wheel.prepare(session, pool, &mut slot.rng).map(drop)
        }
        (Some(ActivityInstance::ScratchCard(cards)), Some(Selection::Pool(pool))) => {
            cards.prepare(session, pool, &mut slot.rng).map(drop)
        }
        (Some(ActivityInstance::WouldYouRather(quiz)), Some(Selection::Questions(questions))) => {
            quiz.prepare(session, questions, &mut slot.rng).map(drop)
        }
        _ => Ok(()),
    };
    if let Err(err) = result {
        warn!(error = %err, "failed to prepare activity");
    }
}

/// Error for an operation aimed at an activity that is not on screen.
pub(crate) fn not_live(expected: ActivityKind, actual: Option<ActivityKind>) -> ServiceError {
    match actual {
        Some(actual) => ActivityError::WrongActivity { expected, actual }.into(),
        None => ServiceError::InvalidState(format!("{expected} is not in progress")),
    }
}

/// Append a freshly resolved record to the history and publish it.
pub(crate) fn commit(state: &SharedState, session: &mut GameSession, resolution: &Resolution) {
    if !resolution.fresh {
        debug!(activity = %resolution.entry.activity, "replaying resolved record");
        return;
    }
    session.record_punishment(resolution.entry.clone());
    info!(
        activity = %resolution.entry.activity,
        player = %resolution.entry.player_name,
        record = resolution.entry.record.id,
        "punishment recorded"
    );
    persist(state, session);
    sse_events::broadcast_session_changed(state, session);
}

/// Open `kind`. Entering the activity already on screen keeps its state.
pub async fn enter(state: &SharedState, kind: ActivityKind) -> Result<ActivityView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();

    if slot.instance.as_ref().map(ActivityInstance::kind) == Some(kind) {
        let session = state.session().read().await;
        return Ok(ActivityView::build(slot.instance.as_ref(), &session));
    }

    let selection = load_selection(state, kind, difficulty).await;
    let mut session = state.session().write().await;
    slot.clear();
    slot.instance = Some(ActivityInstance::enter(
        kind,
        &session,
        &state.config().activities,
    ));
    session.dispatch(SessionAction::SetActivity(Some(kind)));
    prepare(&mut slot, &session, selection.as_ref());
    info!(activity = %kind, "activity entered");

    persist(state, &session);
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(ActivityView::build(slot.instance.as_ref(), &session))
}

/// Back to the picker; the activity's timers stop immediately.
pub async fn exit(state: &SharedState) -> SessionView {
    let mut slot = state.activity().lock().await;
    let mut session = state.session().write().await;
    if let Some(instance) = slot.clear() {
        info!(activity = %instance.kind(), "activity exited");
    }
    if session.current_activity().is_some() {
        session.dispatch(SessionAction::SetActivity(None));
        persist(state, &session);
        sse_events::broadcast_session_changed(state, &session);
    }
    sse_events::broadcast_activity_changed(state, None, &session);
    SessionView::from(&*session)
}

/// Activity on screen, drawing the current turn's selection if needed.
pub async fn current(state: &SharedState) -> ActivityView {
    let mut slot = state.activity().lock().await;
    let difficulty = state.session().read().await.difficulty();
    let selection = match slot.instance.as_ref() {
        Some(instance) => load_selection(state, instance.kind(), difficulty).await,
        None => None,
    };
    let session = state.session().read().await;
    prepare(&mut slot, &session, selection.as_ref());
    ActivityView::build(slot.instance.as_ref(), &session)
}

/// Acknowledge the presented record: the turn passes and the next round is drawn.
pub async fn acknowledge(
    state: &SharedState,
    ack: Acknowledgement,
) -> Result<ActivityView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();
    let Some(kind) = slot.instance.as_ref().map(ActivityInstance::kind) else {
        return Err(ServiceError::InvalidState("no activity in progress".into()));
    };
    let selection = load_selection(state, kind, difficulty).await;

    let mut session = state.session().write().await;
    let after = match slot.instance.as_mut() {
        Some(instance) => instance.acknowledge(&session, ack)?,
        None => return Err(ServiceError::InvalidState("no activity in progress".into())),
    };
    debug!(activity = %kind, ?ack, ?after, "activity acknowledged");

    if after.switch_turn {
        session.switch_turn();
    }
    if after.leave {
        slot.clear();
        session.dispatch(SessionAction::SetActivity(None));
    } else {
        if session.current_activity() != Some(kind) {
            session.dispatch(SessionAction::SetActivity(Some(kind)));
        }
        prepare(&mut slot, &session, selection.as_ref());
    }

    persist(state, &session);
    sse_events::broadcast_session_changed(state, &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(ActivityView::build(slot.instance.as_ref(), &session))
}

/// Spin the wheel. A wheel that already landed this turn replays its record.
pub async fn spin(state: &SharedState) -> Result<ResolutionView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();
    let pool = state.content().pool(difficulty, ActivityKind::SpinWheel).await;

    let mut session = state.session().write().await;
    let slot = &mut *guard;
    let actual = slot.instance.as_ref().map(ActivityInstance::kind);
    let Some(ActivityInstance::SpinWheel(wheel)) = slot.instance.as_mut() else {
        return Err(not_live(ActivityKind::SpinWheel, actual));
    };
    let (segment, resolution) = wheel.spin(&session, &pool, &mut slot.rng)?;
    debug!(segment, fresh = resolution.fresh, "wheel landed");

    commit(state, &mut session, &resolution);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(ResolutionView {
        segment: Some(segment),
        ..ResolutionView::from(resolution)
    })
}

/// Reveal card `index` of the current deck.
pub async fn reveal_card(state: &SharedState, index: usize) -> Result<ResolutionView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();
    let pool = state.content().pool(difficulty, ActivityKind::ScratchCard).await;

    let mut session = state.session().write().await;
    let slot = &mut *guard;
    let actual = slot.instance.as_ref().map(ActivityInstance::kind);
    let Some(ActivityInstance::ScratchCard(cards)) = slot.instance.as_mut() else {
        return Err(not_live(ActivityKind::ScratchCard, actual));
    };
    let resolution = cards.reveal(&session, &pool, index, &mut slot.rng)?;

    commit(state, &mut session, &resolution);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(resolution.into())
}

/// Pick a body part and a task from the partner's collection.
pub async fn explore(state: &SharedState) -> Result<ResolutionView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let partner = require_active(&*state.session().read().await)?
        .current_player()
        .gender
        .opposite();
    let records = state.content().body_parts(partner).await;

    let mut session = state.session().write().await;
    let slot = &mut *guard;
    let actual = slot.instance.as_ref().map(ActivityInstance::kind);
    let Some(ActivityInstance::BodyExplorer(explorer)) = slot.instance.as_mut() else {
        return Err(not_live(ActivityKind::BodyExplorer, actual));
    };
    let resolution = explorer.resolve(&session, &records, &mut slot.rng)?;

    commit(state, &mut session, &resolution);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(resolution.into())
}

/// Answer the would-you-rather question of the current turn.
pub async fn choose(state: &SharedState, choice: Choice) -> Result<ResolutionView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let difficulty = require_active(&*state.session().read().await)?.difficulty();
    let questions = state.content().questions(difficulty).await;

    let mut session = state.session().write().await;
    let slot = &mut *guard;
    let actual = slot.instance.as_ref().map(ActivityInstance::kind);
    let Some(ActivityInstance::WouldYouRather(quiz)) = slot.instance.as_mut() else {
        return Err(not_live(ActivityKind::WouldYouRather, actual));
    };
    let resolution = quiz.choose(&session, &questions, choice, &mut slot.rng)?;

    commit(state, &mut session, &resolution);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    Ok(resolution.into())
}
