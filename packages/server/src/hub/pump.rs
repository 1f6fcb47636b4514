//! Read and write pumps: the two tasks serving one client's connection.

use std::{sync::Arc, time::Duration};

use lobby_shared::time::{Clock, SystemClock};
use tokio::task::JoinHandle;

use crate::{
    domain::{ChatMessage, Connection, ConnectionError},
    infrastructure::dto::websocket::{InboundMessage, OutboundMessage},
};

use super::{
    client::{ClientInfo, Mailbox},
    handle::HubHandle,
};

/// Settings shared by every client's pumps
#[derive(Clone)]
pub struct PumpOptions {
    /// Stamps live messages
    pub clock: Arc<dyn Clock>,
    /// Drop connections that stay silent this long
    pub idle_timeout: Option<Duration>,
}

impl Default for PumpOptions {
    fn default() -> Self {
        Self {
            clock: Arc::new(SystemClock),
            idle_timeout: None,
        }
    }
}

async fn next_frame(
    connection: &dyn Connection,
    idle_timeout: Option<Duration>,
) -> Result<String, ConnectionError> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, connection.read_frame())
            .await
            .map_err(|_| ConnectionError::IdleTimeout(limit))?,
        None => connection.read_frame().await,
    }
}

/// Turn inbound frames into broadcast events until the connection fails.
///
/// Undecodable frames, including ones the connection rejects as
/// [`ConnectionError::InvalidFrame`], are skipped. Handing a message to the
/// hub waits until the hub takes it, which throttles reading from a fast
/// sender. On exit the client is always unregistered and the connection
/// closed.
pub async fn read_pump(
    client: ClientInfo,
    connection: Arc<dyn Connection>,
    hub: HubHandle,
    options: PumpOptions,
) {
    loop {
        let frame = match next_frame(connection.as_ref(), options.idle_timeout).await {
            Ok(frame) => frame,
            Err(ConnectionError::Closed) => {
                tracing::debug!("Connection of user '{}' closed", client.user_id);
                break;
            }
            Err(e @ ConnectionError::InvalidFrame(_)) => {
                tracing::warn!("Skipping frame from user '{}': {}", client.user_id, e);
                continue;
            }
            Err(e) => {
                tracing::warn!("Read error for user '{}': {}", client.user_id, e);
                break;
            }
        };

        let inbound: InboundMessage = match serde_json::from_str(&frame) {
            Ok(inbound) => inbound,
            Err(e) => {
                tracing::warn!("Skipping undecodable frame from user '{}': {}", client.user_id, e);
                continue;
            }
        };

        let message = ChatMessage::live(
            inbound.content,
            client.user_id.clone(),
            client.room_id.clone(),
            options.clock.now(),
        );
        if hub.broadcast(message).await.is_err() {
            tracing::error!("Hub is gone, dropping connection of user '{}'", client.user_id);
            break;
        }
    }

    let user_id = client.user_id.clone();
    if hub.unregister(client).await.is_err() {
        tracing::error!("Hub is gone, could not unregister user '{}'", user_id);
    }
    connection.close().await;
}

/// Drain the mailbox into outbound frames.
///
/// Ends when the mailbox is closed and empty, or at the first write error.
/// The connection is closed on exit.
pub async fn write_pump(
    client: ClientInfo,
    connection: Arc<dyn Connection>,
    mut mailbox: Mailbox,
) {
    while let Some(message) = mailbox.recv().await {
        let frame = match serde_json::to_string(&OutboundMessage::from(&message)) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!("Failed to encode message for user '{}': {}", client.user_id, e);
                continue;
            }
        };

        if let Err(e) = connection.write_frame(frame).await {
            tracing::warn!("Write error for user '{}': {}", client.user_id, e);
            break;
        }
    }

    tracing::debug!("Write pump of user '{}' finished", client.user_id);
    connection.close().await;
}

/// Spawn both pumps for a registered client
pub fn spawn_pumps(
    client: ClientInfo,
    connection: Arc<dyn Connection>,
    mailbox: Mailbox,
    hub: HubHandle,
    options: PumpOptions,
) -> (JoinHandle<()>, JoinHandle<()>) {
    let writer = tokio::spawn(write_pump(client.clone(), connection.clone(), mailbox));
    let reader = tokio::spawn(read_pump(client, connection, hub, options));
    (reader, writer)
}
