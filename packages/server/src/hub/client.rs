//! Per-connection client state and its bounded outbound mailbox.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::{ChatMessage, ClientId, RoomId, UserId};

/// Mailbox size used when no capacity is configured
pub const DEFAULT_MAILBOX_CAPACITY: usize = 256;

/// Identity and room membership of a client.
///
/// Cloned into both pumps and carried by the unregister event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub id: ClientId,
    pub user_id: UserId,
    pub room_id: RoomId,
}

/// Why a message could not be put into a mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("mailbox is full")]
    Full,

    #[error("mailbox is closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for DeliveryError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        }
    }
}

/// A connected client as owned by the hub.
///
/// The hub holds the only strong producer handle of the mailbox, so dropping
/// the `Client` (on unregister or eviction) closes the mailbox and lets the
/// write pump drain and exit.
#[derive(Debug)]
pub struct Client {
    info: ClientInfo,
    mailbox: mpsc::Sender<ChatMessage>,
}

impl Client {
    /// Create a client with a fresh id and a mailbox of `capacity` messages.
    ///
    /// Returns the client (handed to the hub) and the consuming side of its
    /// mailbox (handed to the write pump). A zero capacity is raised to one.
    pub fn new(user_id: UserId, room_id: RoomId, capacity: usize) -> (Self, Mailbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let info = ClientInfo {
            id: ClientId::generate(),
            user_id,
            room_id,
        };
        (Self { info, mailbox: tx }, Mailbox { rx })
    }

    pub fn info(&self) -> &ClientInfo {
        &self.info
    }

    pub fn id(&self) -> ClientId {
        self.info.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.info.user_id
    }

    pub fn room_id(&self) -> &RoomId {
        &self.info.room_id
    }

    /// Enqueue without waiting
    pub fn try_deliver(&self, message: ChatMessage) -> Result<(), DeliveryError> {
        self.mailbox.try_send(message).map_err(DeliveryError::from)
    }

    /// Weak producer handle that does not keep the mailbox open
    pub fn mailbox_handle(&self) -> MailboxHandle {
        MailboxHandle(self.mailbox.downgrade())
    }

    /// Drop the client, closing its mailbox
    pub fn close(self) {
        tracing::debug!(
            "Closing mailbox of client {} (user '{}')",
            self.info.id,
            self.info.user_id
        );
    }
}

/// Producer handle used by history replay.
///
/// It only upgrades to a real sender for the duration of one enqueue, so a
/// client the hub has dropped is seen as closed right away.
#[derive(Debug, Clone)]
pub struct MailboxHandle(mpsc::WeakSender<ChatMessage>);

impl MailboxHandle {
    pub fn try_deliver(&self, message: ChatMessage) -> Result<(), DeliveryError> {
        let Some(sender) = self.0.upgrade() else {
            return Err(DeliveryError::Closed);
        };
        sender.try_send(message).map_err(DeliveryError::from)
    }
}

/// Consuming side of a client's mailbox, drained by the write pump
#[derive(Debug)]
pub struct Mailbox {
    rx: mpsc::Receiver<ChatMessage>,
}

impl Mailbox {
    /// Next message, or `None` once the mailbox is closed and drained
    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.rx.recv().await
    }

    /// Next buffered message without waiting
    pub fn try_recv(&mut self) -> Option<ChatMessage> {
        self.rx.try_recv().ok()
    }

    /// Whether the producer side has gone away
    pub fn is_closed(&self) -> bool {
        self.rx.is_closed()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
