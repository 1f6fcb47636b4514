//! History replay for newly registered clients.

use std::sync::Arc;

use crate::domain::{ChatMessage, MessageStore, RoomId, UserDirectory, UserId};

use super::client::{Client, MailboxHandle};

/// Result of one replay, reported for logging and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayOutcome {
    /// Messages put into the mailbox
    pub delivered: usize,
    /// Replay stopped early because the mailbox was full or closed
    pub aborted: bool,
}

/// Resolve a display name, falling back to an empty one.
pub(crate) async fn resolve_sender_name(directory: &dyn UserDirectory, sender_id: u32) -> String {
    match directory.find_by_id(sender_id).await {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!("Could not resolve name of user {}: {}", sender_id, e);
            String::new()
        }
    }
}

/// One-shot delivery of a room's persisted messages into a client's mailbox.
///
/// Runs on its own task so the hub loop never waits on the store. Every
/// enqueue is non-blocking; the first full or closed mailbox ends the replay.
pub struct HistoryReplay {
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn UserDirectory>,
    user_id: UserId,
    room_id: RoomId,
    mailbox: MailboxHandle,
}

impl HistoryReplay {
    pub fn new(
        store: Arc<dyn MessageStore>,
        directory: Arc<dyn UserDirectory>,
        client: &Client,
    ) -> Self {
        Self {
            store,
            directory,
            user_id: client.user_id().clone(),
            room_id: client.room_id().clone(),
            mailbox: client.mailbox_handle(),
        }
    }

    pub async fn run(self) -> ReplayOutcome {
        let history = match self.store.find_by_room(&self.room_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!("Failed to load history of room '{}': {}", self.room_id, e);
                return ReplayOutcome::default();
            }
        };

        tracing::info!(
            "Replaying {} messages of room '{}' to user '{}'",
            history.len(),
            self.room_id,
            self.user_id
        );

        let mut outcome = ReplayOutcome::default();
        for stored in &history {
            let sender_name = resolve_sender_name(self.directory.as_ref(), stored.sender_id).await;
            let message = ChatMessage::history(stored, sender_name);

            if let Err(e) = self.mailbox.try_deliver(message) {
                tracing::warn!(
                    "Stopping history replay for user '{}' in room '{}' after {} messages: {}",
                    self.user_id,
                    self.room_id,
                    outcome.delivered,
                    e
                );
                outcome.aborted = true;
                return outcome;
            }
            outcome.delivered += 1;
        }

        outcome
    }
}
