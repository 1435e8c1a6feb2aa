//! Relay hub: the single owner of the stored snapshot and the connection table.
//!
//! [`RelayHub`] is a plain state machine. Connection tasks never touch it directly; they send
//! [`HubCommand`]s to the task started by [`spawn_hub`], which applies them one at a time in
//! arrival order. The store therefore has exactly one writer and needs no lock.
//!
//! Every connection is handed an unbounded outbound queue. The hub never waits on a slow
//! connection; flow control is left to the socket writer draining that queue.

use std::collections::HashMap;
use std::fmt;

use api_shared::ServerEvent;
use intake_core::{IntakeResult, SnapshotStore};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use crate::RelayError;

/// Identifier of one WebSocket connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Outbound queue of a single connection.
pub type Outbound = mpsc::UnboundedSender<ServerEvent>;

/// Snapshot store plus the set of live connections.
#[derive(Debug)]
pub struct RelayHub {
    store: SnapshotStore,
    peers: HashMap<ConnectionId, Outbound>,
}

impl RelayHub {
    /// Creates a hub holding the empty snapshot and no connections.
    pub fn new() -> IntakeResult<Self> {
        Ok(Self::with_store(SnapshotStore::new()?))
    }

    pub fn with_store(store: SnapshotStore) -> Self {
        Self {
            store,
            peers: HashMap::new(),
        }
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn connection_count(&self) -> usize {
        self.peers.len()
    }

    /// Registers a connection and sends it the current snapshot.
    pub fn connect(&mut self, id: ConnectionId, outbound: Outbound) {
        if let Some(current) = self.store.current() {
            if outbound.send(ServerEvent::StaffUpdate(current.clone())).is_err() {
                tracing::debug!(connection = %id, "connection closed before initial snapshot");
            }
        }
        self.peers.insert(id, outbound);
        tracing::debug!(connection = %id, peers = self.peers.len(), "connection registered");
    }

    /// Stores `payload` verbatim and broadcasts it to every connection except `from`.
    pub fn update(&mut self, from: ConnectionId, payload: Value) -> usize {
        let payload = self.store.replace(payload).clone();
        let delivered = self.broadcast(ServerEvent::StaffUpdate(payload), Some(from));
        tracing::debug!(connection = %from, delivered, "snapshot updated");
        delivered
    }

    /// Removes a connection, forces the stored status to `inactive` and broadcasts the result.
    ///
    /// The hub has no notion of roles, so an observer leaving has the same effect as the
    /// submitter leaving.
    pub fn disconnect(&mut self, id: ConnectionId) -> IntakeResult<usize> {
        self.peers.remove(&id);
        let payload = self.store.force_inactive()?.clone();
        let delivered = self.broadcast(ServerEvent::StaffUpdate(payload), None);
        tracing::debug!(connection = %id, delivered, "connection removed; snapshot inactive");
        Ok(delivered)
    }

    /// Sends `event` to every registered connection other than `except`.
    ///
    /// Returns the number of queues the event was handed to.
    pub fn broadcast(&self, event: ServerEvent, except: Option<ConnectionId>) -> usize {
        let mut delivered = 0;
        for (id, outbound) in &self.peers {
            if Some(*id) == except {
                continue;
            }
            if outbound.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::debug!(connection = %id, "outbound queue closed; skipping");
            }
        }
        delivered
    }

    fn handle(&mut self, command: HubCommand) {
        match command {
            HubCommand::Connect { id, outbound } => self.connect(id, outbound),
            HubCommand::Update { id, payload } => {
                self.update(id, payload);
            }
            HubCommand::Disconnect { id } => {
                if let Err(e) = self.disconnect(id) {
                    tracing::error!(connection = %id, "failed to mark snapshot inactive: {e}");
                }
            }
            HubCommand::Snapshot { reply } => {
                let _ = reply.send(self.store.current().cloned());
            }
        }
    }
}

/// Work item for the hub task.
#[derive(Debug)]
pub enum HubCommand {
    Connect { id: ConnectionId, outbound: Outbound },
    Update { id: ConnectionId, payload: Value },
    Disconnect { id: ConnectionId },
    Snapshot { reply: oneshot::Sender<Option<Value>> },
}

/// Cloneable handle used by connection tasks to reach the hub task.
#[derive(Clone, Debug)]
pub struct HubHandle {
    tx: mpsc::UnboundedSender<HubCommand>,
}

impl HubHandle {
    pub fn connect(&self, id: ConnectionId, outbound: Outbound) -> Result<(), RelayError> {
        self.send(HubCommand::Connect { id, outbound })
    }

    pub fn update(&self, id: ConnectionId, payload: Value) -> Result<(), RelayError> {
        self.send(HubCommand::Update { id, payload })
    }

    pub fn disconnect(&self, id: ConnectionId) -> Result<(), RelayError> {
        self.send(HubCommand::Disconnect { id })
    }

    /// The snapshot a newly connected party would receive.
    pub async fn current_snapshot(&self) -> Result<Option<Value>, RelayError> {
        let (reply, rx) = oneshot::channel();
        self.send(HubCommand::Snapshot { reply })?;
        rx.await.map_err(|_| RelayError::HubUnavailable)
    }

    fn send(&self, command: HubCommand) -> Result<(), RelayError> {
        self.tx
            .send(command)
            .map_err(|_| RelayError::HubUnavailable)
    }
}

/// Starts the hub task and returns a handle to it.
///
/// The task runs until every handle has been dropped.
pub fn spawn_hub(mut hub: RelayHub) -> HubHandle {
    let (tx, mut rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            hub.handle(command);
        }
        tracing::debug!("relay hub stopped");
    });
    HubHandle { tx }
}
