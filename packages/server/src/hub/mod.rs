//! Real-time message hub.
//!
//! A [`Hub`] owns the room membership map and runs a single event loop that
//! serializes register, unregister and broadcast events. Each connected
//! client is served by a read pump and a write pump talking to the hub
//! through a [`HubHandle`]; messages reach a client through its bounded
//! [`Mailbox`].

pub mod client;
mod event_loop;
pub mod handle;
pub mod history;
pub mod pump;

pub use client::{
    Client, ClientInfo, DEFAULT_MAILBOX_CAPACITY, DeliveryError, Mailbox, MailboxHandle,
};
pub use event_loop::{BroadcastOutcome, Hub, RoomSummary};
pub use handle::{HubError, HubHandle};
pub use history::{HistoryReplay, ReplayOutcome};
pub use pump::{PumpOptions, read_pump, spawn_pumps, write_pump};
