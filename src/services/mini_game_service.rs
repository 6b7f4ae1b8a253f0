//! Mini-game selector and the three games behind it.
//!
//! A game that produces a loser resolves immediately: the loser's record is
//! drawn from the mini-game pool and appended to the history.

use std::time::Instant;

use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::{
    dto::activity::{ActivityView, TapResponse},
    error::ServiceError,
    services::{
        activity_service::{commit, not_live},
        session_service::require_active,
        sse_events, timers,
    },
    state::{
        ActivitySlot, SharedState,
        activities::{
            ActivityInstance,
            mini_game::{MiniGame, MiniGameKind, MiniGames},
            tap_battle::TapStage,
        },
        game::{ActivityKind, Seat},
    },
};

fn mini_games(instance: &mut Option<ActivityInstance>) -> Result<&mut MiniGames, ServiceError> {
    let actual = instance.as_ref().map(ActivityInstance::kind);
    match instance {
        Some(ActivityInstance::MiniGame(games)) => Ok(games),
        _ => Err(not_live(ActivityKind::MiniGame, actual)),
    }
}

async fn view(state: &SharedState, slot: &ActivitySlot) -> ActivityView {
    let session = state.session().read().await;
    let view = ActivityView::build(slot.instance.as_ref(), &session);
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
    view
}

/// Draw and record the loser's punishment.
async fn settle(state: &SharedState, slot: &mut ActivitySlot) {
    let difficulty = state.session().read().await.difficulty();
    let pool = state.content().pool(difficulty, ActivityKind::MiniGame).await;

    let mut session = state.session().write().await;
    if let Some(ActivityInstance::MiniGame(games)) = slot.instance.as_mut() {
        match games.resolve(&session, &pool, &mut slot.rng) {
            Ok(resolution) => {
                info!(
                    game = ?games.current().map(MiniGame::kind),
                    loser = %resolution.entry.player_name,
                    "mini-game finished"
                );
                commit(state, &mut session, &resolution);
            }
            Err(err) => warn!(error = %err, "mini-game finished without a record"),
        }
    }
    sse_events::broadcast_activity_changed(state, slot.instance.as_ref(), &session);
}

/// Pick a game from the selector.
pub async fn select(state: &SharedState, kind: MiniGameKind) -> Result<ActivityView, ServiceError> {
    let mut slot = state.activity().lock().await;
    require_active(&*state.session().read().await)?;
    mini_games(&mut slot.instance)?.select(kind)?;
    slot.timers.cancel();
    debug!(game = %kind, "mini-game selected");
    Ok(view(state, &slot).await)
}

/// Back to the selector, abandoning the current game.
pub async fn deselect(state: &SharedState) -> Result<ActivityView, ServiceError> {
    let mut slot = state.activity().lock().await;
    mini_games(&mut slot.instance)?.deselect()?;
    slot.timers.cancel();
    Ok(view(state, &slot).await)
}

/// Start the tap battle countdown.
pub async fn start_tap_battle(state: &SharedState) -> Result<ActivityView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let schedule = mini_games(&mut slot.instance)?.start_tap_battle()?;
    slot.timers
        .replace(timers::spawn(state, schedule, tap_battle_tick));
    Ok(view(state, &slot).await)
}

/// Count a tap.
pub async fn tap(state: &SharedState, seat: Seat) -> Result<TapResponse, ServiceError> {
    let mut slot = state.activity().lock().await;
    let score = mini_games(&mut slot.instance)?.tap(seat)?;
    Ok(TapResponse { score })
}

/// Start the current reaction attempt; the signal shows after a random wait.
pub async fn start_reaction(state: &SharedState) -> Result<ActivityView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let slot = &mut *guard;
    let schedule = mini_games(&mut slot.instance)?.start_reaction(&mut slot.rng)?;
    slot.timers
        .replace(timers::spawn(state, schedule, reaction_signal));
    Ok(view(state, slot).await)
}

/// Register a reaction click. Clicking before the signal loses.
pub async fn click(state: &SharedState) -> Result<ActivityView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let slot = &mut *guard;
    let loser = mini_games(&mut slot.instance)?.click(Instant::now())?;
    slot.timers.cancel();
    if loser.is_some() {
        settle(state, slot).await;
    }
    Ok(view(state, slot).await)
}

/// Place a tic-tac-toe mark.
pub async fn play(state: &SharedState, seat: Seat, cell: usize) -> Result<ActivityView, ServiceError> {
    let mut guard = state.activity().lock().await;
    let slot = &mut *guard;
    let loser = mini_games(&mut slot.instance)?.play(seat, cell, &mut slot.rng)?;
    if loser.is_some() {
        settle(state, slot).await;
    }
    Ok(view(state, slot).await)
}

fn tap_battle_tick(state: SharedState, generation: u64) -> BoxFuture<'static, bool> {
    Box::pin(on_tap_battle_tick(state, generation))
}

fn reaction_signal(state: SharedState, generation: u64) -> BoxFuture<'static, bool> {
    Box::pin(on_reaction_signal(state, generation))
}

async fn on_tap_battle_tick(state: SharedState, generation: u64) -> bool {
    let mut guard = state.activity().lock().await;
    let slot = &mut *guard;
    let Ok(games) = mini_games(&mut slot.instance) else {
        return false;
    };
    if games.generation() != generation {
        return false;
    }
    let loser = match games.tick(generation) {
        Ok(loser) => loser,
        Err(err) => {
            debug!(error = %err, "dropping tap battle tick");
            return false;
        }
    };
    let remaining = match games.current() {
        Some(MiniGame::TapBattle(battle)) => match battle.stage() {
            TapStage::Countdown(left) | TapStage::Playing(left) => left,
            TapStage::Ready | TapStage::Finished => 0,
        },
        _ => 0,
    };
    sse_events::broadcast_timer_tick(&state, ActivityKind::MiniGame, remaining);

    if loser.is_some() {
        settle(&state, slot).await;
        return false;
    }
    view(&state, slot).await;
    true
}

async fn on_reaction_signal(state: SharedState, generation: u64) -> bool {
    let mut slot = state.activity().lock().await;
    let Ok(games) = mini_games(&mut slot.instance) else {
        return false;
    };
    match games.signal(generation, Instant::now()) {
        Ok(true) => {
            view(&state, &slot).await;
            true
        }
        Ok(false) => false,
        Err(err) => {
            debug!(error = %err, "dropping reaction signal");
            false
        }
    }
}
