use std::{
    sync::{Arc, Weak},
    time::Duration,
};

use futures::future::BoxFuture;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval, sleep},
};

use crate::state::{AppState, SharedState, activities::Schedule};

/// Callback run by a timer task; returns false to stop a countdown early.
pub type TimerCallback = fn(SharedState, u64) -> BoxFuture<'static, bool>;

/// Spawn the task realising `schedule`, invoking `callback` with the schedule's generation.
///
/// Tasks hold a weak reference so a dropped state ends them.
pub fn spawn(state: &SharedState, schedule: Schedule, callback: TimerCallback) -> JoinHandle<()> {
    let weak = Arc::downgrade(state);
    match schedule {
        Schedule::Countdown {
            generation,
            seconds,
        } => countdown(weak, generation, seconds, callback),
        Schedule::After { generation, delay } => after(weak, generation, delay, callback),
    }
}

fn countdown(
    state: Weak<AppState>,
    generation: u64,
    seconds: u32,
    callback: TimerCallback,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(Duration::from_secs(1));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately.
        ticker.tick().await;

        for _ in 0..seconds {
            ticker.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            if !callback(state, generation).await {
                break;
            }
        }
    })
}

fn after(
    state: Weak<AppState>,
    generation: u64,
    delay: Duration,
    callback: TimerCallback,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        sleep(delay).await;
        if let Some(state) = state.upgrade() {
            callback(state, generation).await;
        }
    })
}
