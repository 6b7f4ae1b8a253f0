use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};

use crate::{dto::sse::ServerEvent, services::sse_events, state::SharedState};

/// Buffer between the forwarder task and the response body.
const CLIENT_BUFFER: usize = 8;
/// Comment line sent while no event is due.
const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// Open the public stream: the current session and activity first, then live events.
///
/// The subscription is taken before the snapshot is read so nothing published
/// in between is lost; a client may see the same state twice.
pub async fn open_public_stream(
    state: &SharedState,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + use<>> {
    let receiver = state.public_sse().subscribe();
    let snapshot = {
        let slot = state.activity().lock().await;
        let session = state.session().read().await;
        sse_events::snapshot_events(slot.instance.as_ref(), &session)
    };
    info!(subscribers = state.public_sse().receiver_count(), "public SSE client connected");
    to_sse_stream(snapshot, receiver)
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

fn to_sse_stream(
    snapshot: Vec<ServerEvent>,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(CLIENT_BUFFER);

    tokio::spawn(async move {
        for payload in snapshot {
            if tx.send(Ok(to_event(payload))).await.is_err() {
                return;
            }
        }
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                received = receiver.recv() => match received {
                    Ok(payload) => {
                        if tx.send(Ok(to_event(payload))).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                    // Snapshots are full state; the next one catches the client up.
                    Err(RecvError::Lagged(skipped)) => debug!(skipped, "public SSE client lagged"),
                },
            }
        }
        info!("public SSE client disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE)
            .text("keep-alive"),
    )
}
