//! The hub: single owner of room membership and the event loop serializing
//! register, unregister and broadcast events.

use std::{
    collections::{HashMap, hash_map::Entry},
    sync::Arc,
};

use tokio::task::JoinHandle;

use crate::domain::{ChatMessage, ClientId, MessageStore, RoomId, UserDirectory, UserId};

use super::{
    client::{Client, ClientInfo},
    handle::{HubEvents, HubHandle, channel},
    history::{HistoryReplay, ReplayOutcome, resolve_sender_name},
};

/// What happened to one broadcast event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BroadcastOutcome {
    /// The sender id was malformed; nothing was persisted or delivered
    Dropped,
    /// The message reached `delivered` members and `evicted` slow members were removed
    Delivered { delivered: usize, evicted: usize },
}

/// Point-in-time view of one room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSummary {
    pub room_id: RoomId,
    /// User ids of the members, sorted
    pub members: Vec<UserId>,
}

/// Room membership and the collaborators needed to broadcast.
///
/// The room map is touched only through `&mut self`, and [`Hub::spawn`] moves
/// the hub onto a single task, so no lock guards it.
pub struct Hub {
    rooms: HashMap<RoomId, HashMap<ClientId, Client>>,
    store: Arc<dyn MessageStore>,
    directory: Arc<dyn UserDirectory>,
}

impl Hub {
    pub fn new(store: Arc<dyn MessageStore>, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            rooms: HashMap::new(),
            store,
            directory,
        }
    }

    /// Move the hub onto its own task and return the handle used to reach it.
    ///
    /// The loop runs until every clone of the handle has been dropped.
    pub fn spawn(self) -> HubHandle {
        let (handle, events) = channel();
        tokio::spawn(self.run(events));
        handle
    }

    async fn run(mut self, mut events: HubEvents) {
        tracing::info!("Hub event loop started");
        loop {
            tokio::select! {
                Some((client, ack)) = events.register.recv() => {
                    // replay runs detached
                    drop(self.register(client));
                    let _ = ack.send(());
                }
                Some(info) = events.unregister.recv() => {
                    self.unregister(&info);
                }
                Some(message) = events.broadcast.recv() => {
                    self.broadcast(message).await;
                }
                Some(reply) = events.inspect.recv() => {
                    let _ = reply.send(self.rooms());
                }
                else => break,
            }
        }
        tracing::info!("Hub event loop stopped: all handles dropped");
    }

    /// Add the client to its room, creating the room if needed, and start
    /// history replay on a separate task.
    pub fn register(&mut self, client: Client) -> JoinHandle<ReplayOutcome> {
        let replay = HistoryReplay::new(self.store.clone(), self.directory.clone(), &client);
        let room_id = client.room_id().clone();
        let user_id = client.user_id().clone();

        let members = self.rooms.entry(room_id.clone()).or_default();
        members.insert(client.id(), client);
        tracing::info!(
            "User '{}' joined room '{}' ({} connected)",
            user_id,
            room_id,
            members.len()
        );

        tokio::spawn(replay.run())
    }

    /// Remove the client from its room and close its mailbox.
    ///
    /// Returns `false` when the client was not a member (already evicted or
    /// unregistered), in which case nothing changes.
    pub fn unregister(&mut self, info: &ClientInfo) -> bool {
        let Entry::Occupied(mut room) = self.rooms.entry(info.room_id.clone()) else {
            return false;
        };
        let Some(client) = room.get_mut().remove(&info.id) else {
            return false;
        };
        client.close();

        let remaining = room.get().len();
        tracing::info!(
            "User '{}' left room '{}' ({} remaining)",
            info.user_id,
            info.room_id,
            remaining
        );
        if remaining == 0 {
            room.remove();
            tracing::info!("Room '{}' is empty, removed", info.room_id);
        }
        true
    }

    /// Persist the message, resolve its sender's name and fan it out to the
    /// members of its room.
    ///
    /// Persistence and name resolution failures are logged and do not stop
    /// delivery. A member whose mailbox is full is evicted on the spot while
    /// the remaining members still receive the message.
    pub async fn broadcast(&mut self, message: ChatMessage) -> BroadcastOutcome {
        let sender_id = match message.sender_id.numeric() {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Dropping message for room '{}': {}", message.room_id, e);
                return BroadcastOutcome::Dropped;
            }
        };

        if let Err(e) = self
            .store
            .save(&message.room_id, &message.content, sender_id)
            .await
        {
            tracing::error!(
                "Failed to persist message for room '{}', delivering anyway: {}",
                message.room_id,
                e
            );
        }

        let sender_name = resolve_sender_name(self.directory.as_ref(), sender_id).await;
        let message = message.with_sender_name(sender_name);

        let Entry::Occupied(mut room) = self.rooms.entry(message.room_id.clone()) else {
            tracing::debug!("Room '{}' has no members, nothing to deliver", message.room_id);
            return BroadcastOutcome::Delivered {
                delivered: 0,
                evicted: 0,
            };
        };

        tracing::debug!(
            "Broadcasting message from '{}' to {} members of room '{}'",
            message.sender_id,
            room.get().len(),
            message.room_id
        );

        let mut delivered = 0;
        let mut slow = Vec::new();
        for (id, member) in room.get() {
            match member.try_deliver(message.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        "Evicting user '{}' from room '{}': {}",
                        member.user_id(),
                        message.room_id,
                        e
                    );
                    slow.push(*id);
                }
            }
        }

        for id in &slow {
            if let Some(client) = room.get_mut().remove(id) {
                client.close();
            }
        }
        if room.get().is_empty() {
            room.remove();
            tracing::info!("Room '{}' is empty after eviction, removed", message.room_id);
        }

        BroadcastOutcome::Delivered {
            delivered,
            evicted: slow.len(),
        }
    }

    /// Summaries of every room, sorted by room id
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let mut summaries: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|(room_id, members)| {
                let mut members: Vec<UserId> =
                    members.values().map(|c| c.user_id().clone()).collect();
                members.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                RoomSummary {
                    room_id: room_id.clone(),
                    members,
                }
            })
            .collect();
        summaries.sort_by(|a, b| a.room_id.cmp(&b.room_id));
        summaries
    }
}

/// Membership queries used by the tests
#[cfg(test)]
impl Hub {
    fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn member_count(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, HashMap::len)
    }

    fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    fn is_member(&self, info: &ClientInfo) -> bool {
        self.rooms
            .get(&info.room_id)
            .is_some_and(|members| members.contains_key(&info.id))
    }

    /// Number of rooms the client id appears in
    fn rooms_containing(&self, id: ClientId) -> usize {
        self.rooms
            .values()
            .filter(|members| members.contains_key(&id))
            .count()
    }
}
