use tokio::task::JoinHandle;

/// Tasks delivering countdown ticks and delayed wake-ups to the current activity.
///
/// Dropping the slot aborts every task it owns.
#[derive(Debug, Default)]
pub struct TimerSlot {
    handles: Vec<JoinHandle<()>>,
}

impl TimerSlot {
    /// Empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort the running timers and keep `handle` instead.
    pub fn replace(&mut self, handle: JoinHandle<()>) {
        self.cancel();
        self.handles.push(handle);
    }

    /// Abort every timer synchronously.
    pub fn cancel(&mut self) {
        for handle in self.handles.drain(..) {
            handle.abort();
        }
    }

    /// Whether a timer is still running.
    pub fn is_running(&self) -> bool {
        self.handles.iter().any(|handle| !handle.is_finished())
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn replace_aborts_previous_timer() {
        let mut slot = TimerSlot::new();
        let first = tokio::spawn(tokio::time::sleep(Duration::from_secs(60)));
        let first_aborted = first.abort_handle();
        slot.replace(first);
        assert!(slot.is_running());

        slot.replace(tokio::spawn(tokio::time::sleep(Duration::from_secs(60))));
        tokio::task::yield_now().await;
        assert!(first_aborted.is_finished());

        slot.cancel();
        assert!(!slot.is_running());
    }
}
