//! Strip game: wardrobe setup, timed task rounds, rewards and gambles.

use futures::future::BoxFuture;
use tracing::{debug, info};

use crate::{
    dto::strip::StripView,
    error::ServiceError,
    services::{activity_service::not_live, sse_events, timers},
    state::{
        ActivitySlot, SharedState,
        activities::{
            ActivityInstance, Schedule,
            strip_game::{StripDeck, StripEvent, StripGame, StripPhase},
        },
        game::{ActivityKind, Seat},
        wardrobe::Shift,
    },
};

fn strip_game(instance: &mut Option<ActivityInstance>) -> Result<&mut StripGame, ServiceError> {
    let actual = instance.as_ref().map(ActivityInstance::kind);
    match instance {
        Some(ActivityInstance::StripGame(game)) => Ok(game),
        _ => Err(not_live(ActivityKind::StripGame, actual)),
    }
}

fn publish(state: &SharedState, game: &StripGame) -> StripView {
    sse_events::broadcast_strip_changed(state, game);
    StripView::from(game)
}

/// Current strip game.
pub async fn current(state: &SharedState) -> Result<StripView, ServiceError> {
    let mut slot = state.activity().lock().await;
    Ok(StripView::from(&*strip_game(&mut slot.instance)?))
}

/// Append a custom item to a wardrobe during setup.
pub async fn add_item(state: &SharedState, seat: Seat, name: &str) -> Result<StripView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let game = strip_game(&mut slot.instance)?;
    let item = game.add_item(seat, name)?;
    debug!(seat = u8::from(seat), item = %item.name, "wardrobe item added");
    Ok(publish(state, game))
}

/// Remove a non-permanent item during setup.
pub async fn delete_item(
    state: &SharedState,
    seat: Seat,
    index: usize,
) -> Result<StripView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let game = strip_game(&mut slot.instance)?;
    let item = game.delete_item(seat, index)?;
    debug!(seat = u8::from(seat), item = %item.name, "wardrobe item removed");
    Ok(publish(state, game))
}

/// Move an item one position during setup.
pub async fn shift_item(
    state: &SharedState,
    seat: Seat,
    index: usize,
    direction: Shift,
) -> Result<StripView, ServiceError> {
    let mut slot = state.activity().lock().await;
    let game = strip_game(&mut slot.instance)?;
    game.shift_item(seat, index, direction)?;
    Ok(publish(state, game))
}

/// Leave setup and play the first round.
pub async fn start(state: &SharedState) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::Start).await
}

/// A player declares the task done.
pub async fn finish(state: &SharedState, seat: Seat) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::PlayerFinished(seat)).await
}

/// Winner removes one item from the loser.
pub async fn take_it(state: &SharedState) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::TakeIt).await
}

/// Winner gambles on a double task.
pub async fn double_or_nothing(state: &SharedState) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::DoubleOrNothing).await
}

/// Outcome of the double task.
pub async fn gamble(state: &SharedState, success: bool) -> Result<StripView, ServiceError> {
    let event = if success {
        StripEvent::GambleSucceeded
    } else {
        StripEvent::GambleFailed
    };
    apply(state, event).await
}

/// Leave the removal confirmation.
pub async fn proceed(state: &SharedState) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::Continue).await
}

/// Start over from setup after a game over.
pub async fn replay(state: &SharedState) -> Result<StripView, ServiceError> {
    apply(state, StripEvent::Replay).await
}

async fn apply(state: &SharedState, event: StripEvent) -> Result<StripView, ServiceError> {
    let mut guard = state.activity().lock().await;
    strip_game(&mut guard.instance)?;
    let deck = state.content().strip_deck().await;

    let slot = &mut *guard;
    let game = strip_game(&mut slot.instance)?;
    let before = (game.phase(), game.generation());
    let schedule = game.apply(event, &deck, &mut slot.rng)?;
    info!(?event, from = ?before.0, to = ?game.phase(), "strip game advanced");
    if game.phase() == StripPhase::GameOver && before.0 != StripPhase::GameOver {
        info!(rounds = game.round_count(), "strip game over");
    }
    let generation_changed = game.generation() != before.1;
    let view = publish(state, game);

    if generation_changed {
        slot.timers.cancel();
    }
    if let Some(schedule) = schedule {
        schedule_for(state, slot, schedule);
    }
    Ok(view)
}

fn schedule_for(state: &SharedState, slot: &mut ActivitySlot, schedule: Schedule) {
    let callback: timers::TimerCallback = match schedule {
        Schedule::Countdown { .. } => strip_tick,
        Schedule::After { .. } => strip_reveal,
    };
    slot.timers.replace(timers::spawn(state, schedule, callback));
}

fn strip_tick(state: SharedState, generation: u64) -> BoxFuture<'static, bool> {
    Box::pin(on_timer(state, StripEvent::Tick { generation }))
}

fn strip_reveal(state: SharedState, generation: u64) -> BoxFuture<'static, bool> {
    Box::pin(on_timer(state, StripEvent::RevealReward { generation }))
}

/// Apply a timer event. Returns false once the event is stale or ends the countdown.
///
/// Timer events never start a round, so they run without the task deck and
/// never wait on the content store while holding the activity lock.
async fn on_timer(state: SharedState, event: StripEvent) -> bool {
    let generation = match event {
        StripEvent::Tick { generation } | StripEvent::RevealReward { generation } => generation,
        _ => return false,
    };
    let mut guard = state.activity().lock().await;

    // No awaits past this point: replacing the timers aborts this task.
    let slot = &mut *guard;
    let game = match slot.instance.as_mut() {
        Some(ActivityInstance::StripGame(game)) if game.generation() == generation => game,
        _ => return false,
    };
    let schedule = match game.apply(event, &StripDeck::default(), &mut slot.rng) {
        Ok(schedule) => schedule,
        Err(err) => {
            debug!(error = %err, "dropping strip timer event");
            return false;
        }
    };
    let still_running = game.generation() == generation;
    if matches!(event, StripEvent::Tick { .. }) {
        sse_events::broadcast_timer_tick(&state, ActivityKind::StripGame, game.remaining());
    }
    publish(&state, game);

    if let Some(schedule) = schedule {
        schedule_for(&state, slot, schedule);
    }
    still_running
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            content_store::{ContentStore, memory::MemoryContentStore},
            models::{BodyPartRecord, Question, RecordId, StripCollection, StripTask, StripTaskKind},
            storage::StorageResult,
        },
        services::activity_service::{
            self,
            tests::{started, started_on},
        },
        state::{
            game::{ContentRecord, Difficulty, Gender},
            rules::TaskCategory,
        },
    };

    /// Counts strip-task fetches reaching the backing store.
    struct CountingStore {
        inner: MemoryContentStore,
        strip_fetches: AtomicUsize,
    }

    impl ContentStore for CountingStore {
        fn fetch_records(
            &self,
            difficulty: Difficulty,
            kind: ActivityKind,
        ) -> BoxFuture<'static, StorageResult<Vec<ContentRecord>>> {
            self.inner.fetch_records(difficulty, kind)
        }

        fn fetch_body_explorer(
            &self,
            partner: Gender,
        ) -> BoxFuture<'static, StorageResult<Vec<BodyPartRecord>>> {
            self.inner.fetch_body_explorer(partner)
        }

        fn fetch_strip_tasks(
            &self,
            collection: StripCollection,
        ) -> BoxFuture<'static, StorageResult<Vec<StripTask>>> {
            self.strip_fetches.fetch_add(1, Ordering::SeqCst);
            self.inner.fetch_strip_tasks(collection)
        }

        fn fetch_questions(
            &self,
            difficulty: Difficulty,
        ) -> BoxFuture<'static, StorageResult<Vec<Question>>> {
            self.inner.fetch_questions(difficulty)
        }
    }

    fn task(id: u64, text: &str, kind: StripTaskKind) -> StripTask {
        StripTask {
            id: RecordId::Number(id),
            text: text.into(),
            kind: Some(kind),
            timer: None,
        }
    }

    fn store() -> MemoryContentStore {
        MemoryContentStore::new()
            .with_strip_tasks(
                StripCollection::Common,
                vec![task(1, "Hold a plank", StripTaskKind::Regular)],
            )
            .with_strip_tasks(
                StripCollection::Male,
                vec![
                    task(2, "Twenty push-ups", StripTaskKind::Regular),
                    task(3, "Fifty push-ups", StripTaskKind::Double),
                ],
            )
            .with_strip_tasks(
                StripCollection::Female,
                vec![
                    task(4, "Twenty squats", StripTaskKind::Regular),
                    task(5, "Fifty squats", StripTaskKind::Double),
                ],
            )
    }

    async fn generation(state: &SharedState) -> u64 {
        let mut slot = state.activity().lock().await;
        strip_game(&mut slot.instance).unwrap().generation()
    }

    #[tokio::test]
    async fn round_runs_from_task_to_removal() {
        let (state, _) = started(store()).await;
        activity_service::enter(&state, ActivityKind::StripGame)
            .await
            .unwrap();
        assert_eq!(current(&state).await.unwrap().phase, StripPhase::Setup);

        let view = start(&state).await.unwrap();
        assert_eq!(view.phase, StripPhase::Task);
        assert_eq!(view.task_category, TaskCategory::Male);
        assert_eq!(view.round_count, 1);
        assert!(matches!(
            finish(&state, Seat::Second).await,
            Err(ServiceError::InvalidState(_))
        ));

        let view = finish(&state, Seat::First).await.unwrap();
        assert_eq!(view.phase, StripPhase::Winner);
        assert_eq!(view.winner, Some(0));

        let winner_generation = generation(&state).await;
        assert!(!on_timer(state.clone(), StripEvent::RevealReward { generation: winner_generation + 7 }).await);
        on_timer(state.clone(), StripEvent::RevealReward { generation: winner_generation }).await;
        assert_eq!(current(&state).await.unwrap().phase, StripPhase::Reward);

        let view = take_it(&state).await.unwrap();
        assert_eq!(view.phase, StripPhase::Removal);
        assert_eq!(view.removable[1], 3);

        let view = proceed(&state).await.unwrap();
        assert_eq!(view.phase, StripPhase::Task);
        assert_eq!(view.task_category, TaskCategory::Female);
        assert!(state.session().read().await.history().is_empty());
    }

    #[tokio::test]
    async fn countdown_expiry_picks_the_addressed_loser() {
        let (state, _) = started(store()).await;
        activity_service::enter(&state, ActivityKind::StripGame)
            .await
            .unwrap();
        let view = start(&state).await.unwrap();
        let seconds = view.remaining;
        let task_generation = generation(&state).await;

        for _ in 1..seconds {
            assert!(on_timer(state.clone(), StripEvent::Tick { generation: task_generation }).await);
        }
        assert!(!on_timer(state.clone(), StripEvent::Tick { generation: task_generation }).await);

        // Male task ran out: the male player loses.
        let view = current(&state).await.unwrap();
        assert_eq!(view.phase, StripPhase::Winner);
        assert_eq!(view.winner, Some(1));
    }

    #[tokio::test]
    async fn countdown_ticks_do_not_refetch_missing_collections() {
        // Only the male collection exists; the others fail on every fetch.
        let store = Arc::new(CountingStore {
            inner: MemoryContentStore::new().with_strip_tasks(
                StripCollection::Male,
                vec![task(2, "Twenty push-ups", StripTaskKind::Regular)],
            ),
            strip_fetches: AtomicUsize::new(0),
        });
        let (state, _) = started_on(AppConfig::default(), store.clone()).await;
        activity_service::enter(&state, ActivityKind::StripGame)
            .await
            .unwrap();
        start(&state).await.unwrap();
        let task_generation = generation(&state).await;
        let before = store.strip_fetches.load(Ordering::SeqCst);

        for _ in 0..10 {
            assert!(on_timer(state.clone(), StripEvent::Tick { generation: task_generation }).await);
        }
        assert_eq!(store.strip_fetches.load(Ordering::SeqCst), before);
        assert_eq!(current(&state).await.unwrap().phase, StripPhase::Task);
    }

    #[tokio::test]
    async fn failed_gamble_reverses_the_removal() {
        let (state, _) = started(store()).await;
        activity_service::enter(&state, ActivityKind::StripGame)
            .await
            .unwrap();
        start(&state).await.unwrap();
        finish(&state, Seat::First).await.unwrap();
        let winner_generation = generation(&state).await;
        on_timer(state.clone(), StripEvent::RevealReward { generation: winner_generation }).await;

        let view = double_or_nothing(&state).await.unwrap();
        assert_eq!(view.phase, StripPhase::Gamble);
        assert_eq!(view.task.unwrap().text, "Fifty push-ups");

        let view = gamble(&state, false).await.unwrap();
        assert_eq!(view.phase, StripPhase::Removal);
        assert!(view.is_gamble_fail);
        assert_eq!(view.winner, Some(1));

        let view = proceed(&state).await.unwrap();
        assert_eq!(view.removable[0], 3);
    }

    #[tokio::test]
    async fn exit_stops_the_countdown() {
        let (state, _) = started(store()).await;
        activity_service::enter(&state, ActivityKind::StripGame)
            .await
            .unwrap();
        start(&state).await.unwrap();
        assert!(state.activity().lock().await.timers.is_running());

        activity_service::exit(&state).await;
        assert!(!state.activity().lock().await.timers.is_running());
        assert!(matches!(
            current(&state).await,
            Err(ServiceError::InvalidState(_))
        ));
    }
}
