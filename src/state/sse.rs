use tokio::sync::broadcast;

use crate::dto::sse::ServerEvent;

/// Fan-out of public events to every connected SSE client.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers; with nobody listening the event is dropped.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }

    /// Connected subscribers.
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events_sent_after_subscribing() {
        let hub = SseHub::new(4);
        hub.broadcast(ServerEvent {
            event: Some("early".into()),
            data: "lost".into(),
        });

        let mut receiver = hub.subscribe();
        hub.broadcast(ServerEvent::json(Some("session.changed".to_string()), &serde_json::json!({})).unwrap());

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some("session.changed"));
        assert_eq!(event.data, "{}");
    }
}
