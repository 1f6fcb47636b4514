//! Channels into the hub's event loop.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::domain::ChatMessage;

use super::{
    client::{Client, ClientInfo},
    event_loop::RoomSummary,
};

/// Each event queue holds a single pending event, so a sender waits until the
/// hub has taken the previous one.
const EVENT_CHANNEL_CAPACITY: usize = 1;

/// Errors returned when talking to the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("hub event loop is not running")]
    Unavailable,
}

/// A registration paired with the acknowledgement sent once the client is in its room
pub(crate) type Registration = (Client, oneshot::Sender<()>);

/// Receiving ends owned by the event loop
pub(crate) struct HubEvents {
    pub register: mpsc::Receiver<Registration>,
    pub unregister: mpsc::Receiver<ClientInfo>,
    pub broadcast: mpsc::Receiver<ChatMessage>,
    pub inspect: mpsc::Receiver<oneshot::Sender<Vec<RoomSummary>>>,
}

/// Cloneable handle to a running hub
#[derive(Debug, Clone)]
pub struct HubHandle {
    register: mpsc::Sender<Registration>,
    unregister: mpsc::Sender<ClientInfo>,
    broadcast: mpsc::Sender<ChatMessage>,
    inspect: mpsc::Sender<oneshot::Sender<Vec<RoomSummary>>>,
}

pub(crate) fn channel() -> (HubHandle, HubEvents) {
    let (register_tx, register_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (unregister_tx, unregister_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (broadcast_tx, broadcast_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let (inspect_tx, inspect_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let handle = HubHandle {
        register: register_tx,
        unregister: unregister_tx,
        broadcast: broadcast_tx,
        inspect: inspect_tx,
    };
    let events = HubEvents {
        register: register_rx,
        unregister: unregister_rx,
        broadcast: broadcast_rx,
        inspect: inspect_rx,
    };
    (handle, events)
}

impl HubHandle {
    /// Hand a new client to the hub.
    ///
    /// Returns once the client is a member of its room, so anything the
    /// caller broadcasts afterwards is processed after the registration.
    pub async fn register(&self, client: Client) -> Result<(), HubError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.register
            .send((client, ack_tx))
            .await
            .map_err(|_| HubError::Unavailable)?;
        ack_rx.await.map_err(|_| HubError::Unavailable)
    }

    /// Ask the hub to drop the client from its room
    pub async fn unregister(&self, info: ClientInfo) -> Result<(), HubError> {
        self.unregister
            .send(info)
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Submit a message, waiting until the hub accepts it
    pub async fn broadcast(&self, message: ChatMessage) -> Result<(), HubError> {
        self.broadcast
            .send(message)
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Snapshot of the current rooms, sorted by room id
    pub async fn rooms(&self) -> Result<Vec<RoomSummary>, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.inspect
            .send(reply_tx)
            .await
            .map_err(|_| HubError::Unavailable)?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }
}
