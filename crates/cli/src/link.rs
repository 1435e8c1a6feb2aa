//! Reconnecting WebSocket link to the relay.
//!
//! The link runs in its own task. It reports connection changes and inbound `staff:update`
//! payloads as [`LinkEvent`]s and forwards outbound events while a connection is up. Events
//! queued while offline are discarded on the next connect; the owner is expected to resend its
//! full state when it sees [`LinkEvent::Connected`].

use std::time::Duration;

use api_shared::{ClientEvent, ServerEvent};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;

/// How long [`Link::shutdown`] waits for the close handshake.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Clone, Debug, PartialEq)]
pub enum LinkEvent {
    Connected,
    Disconnected,
    /// Payload of a `staff:update` from the relay.
    Update(Value),
}

pub struct Link {
    events: mpsc::UnboundedReceiver<LinkEvent>,
    outbound: mpsc::UnboundedSender<ClientEvent>,
    task: JoinHandle<()>,
}

impl Link {
    /// Starts connecting to `url`, retrying every `reconnect_delay` after a failure or drop.
    pub fn spawn(url: String, reconnect_delay: Duration) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        let (outbound, outbound_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_link(url, reconnect_delay, events_tx, outbound_rx));
        Self {
            events,
            outbound,
            task,
        }
    }

    /// Queues an event for the relay. It is dropped if the link is currently down.
    pub fn send(&self, event: ClientEvent) {
        if self.outbound.send(event).is_err() {
            tracing::debug!("link task stopped; dropping outbound event");
        }
    }

    /// Waits for the next link event. Returns `None` once the link task has stopped.
    pub async fn next_event(&mut self) -> Option<LinkEvent> {
        self.events.recv().await
    }

    /// Closes the connection, giving the close handshake a short grace period.
    pub async fn shutdown(self) {
        let Link {
            events,
            outbound,
            mut task,
        } = self;
        drop(outbound);
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
            task.abort();
        }
        drop(events);
    }
}

async fn run_link(
    url: String,
    reconnect_delay: Duration,
    events: mpsc::UnboundedSender<LinkEvent>,
    mut outbound: mpsc::UnboundedReceiver<ClientEvent>,
) {
    loop {
        match tokio_tungstenite::connect_async(url.as_str()).await {
            Ok((ws, _)) => {
                // Anything queued while offline is stale; the owner resends on Connected.
                while outbound.try_recv().is_ok() {}

                if events.send(LinkEvent::Connected).is_err() {
                    return;
                }
                tracing::info!(url = %url, "connected to relay");

                let (mut sink, mut stream) = ws.split();
                loop {
                    tokio::select! {
                        frame = stream.next() => match frame {
                            Some(Ok(Message::Text(text))) => match ServerEvent::decode(&text) {
                                Ok(event) => {
                                    if events.send(LinkEvent::Update(event.into_payload())).is_err() {
                                        let _ = sink.close().await;
                                        return;
                                    }
                                }
                                Err(e) => tracing::debug!("ignoring frame from relay: {e}"),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                tracing::debug!("relay connection error: {e}");
                                break;
                            }
                        },
                        outgoing = outbound.recv() => match outgoing {
                            Some(event) => {
                                let text = match event.encode() {
                                    Ok(text) => text,
                                    Err(e) => {
                                        tracing::warn!("failed to encode outbound event: {e}");
                                        continue;
                                    }
                                };
                                if sink.send(Message::Text(text)).await.is_err() {
                                    break;
                                }
                            }
                            None => {
                                let _ = sink.close().await;
                                return;
                            }
                        },
                    }
                }

                tracing::warn!(url = %url, "disconnected from relay");
                if events.send(LinkEvent::Disconnected).is_err() {
                    return;
                }
            }
            Err(e) => tracing::debug!(url = %url, "relay connection failed: {e}"),
        }

        tokio::time::sleep(reconnect_delay).await;
        if events.is_closed() {
            return;
        }
    }
}
