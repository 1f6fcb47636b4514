//! Value objects: identifiers for users, rooms and client connections.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{AccessError, ValueObjectError};

/// Prefix marking a room restricted to two named participants
pub const PRIVATE_ROOM_PREFIX: &str = "private-";

/// Identity of an authenticated user.
///
/// The hub treats it as an opaque string; the collaborators key users by the
/// numeric form returned from [`UserId::numeric`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a user id from a numeric directory key
    pub fn from_numeric(value: u32) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the id as the unsigned 32-bit key used by the store and directory
    pub fn numeric(&self) -> Result<u32, ValueObjectError> {
        self.0
            .parse::<u32>()
            .map_err(|_| ValueObjectError::MalformedUserId(self.0.clone()))
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key of a room (broadcast domain).
///
/// Rooms are created implicitly on first join; the hub prunes them when the
/// last member leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RoomId(String);

impl RoomId {
    /// Room joined when the client does not ask for one
    pub const DEFAULT: &'static str = "general";

    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        Ok(Self(value))
    }

    pub fn general() -> Self {
        Self(Self::DEFAULT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_private(&self) -> bool {
        self.0.starts_with(PRIVATE_ROOM_PREFIX)
    }

    /// Participants named by a `private-<a>-<b>` room id.
    ///
    /// Returns `None` for public rooms. A private id that does not split into
    /// exactly three `-` separated parts is malformed.
    pub fn private_participants(&self) -> Option<Result<(&str, &str), AccessError>> {
        if !self.is_private() {
            return None;
        }
        let parts: Vec<&str> = self.0.split('-').collect();
        match parts.as_slice() {
            [_, first, second] if !first.is_empty() && !second.is_empty() => {
                Some(Ok((*first, *second)))
            }
            _ => Some(Err(AccessError::MalformedPrivateRoom(self.0.clone()))),
        }
    }

    /// Check that `user_id` may join this room.
    ///
    /// Public rooms admit everyone. Private rooms admit only the two named
    /// participants; the other participant is not verified any further.
    pub fn authorize(&self, user_id: &UserId) -> Result<(), AccessError> {
        match self.private_participants() {
            None => Ok(()),
            Some(Err(e)) => Err(e),
            Some(Ok((first, second))) => {
                if user_id.as_str() == first || user_id.as_str() == second {
                    Ok(())
                } else {
                    Err(AccessError::NotAParticipant {
                        user_id: user_id.as_str().to_string(),
                        room_id: self.0.clone(),
                    })
                }
            }
        }
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::general()
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RoomId> for String {
    fn from(value: RoomId) -> Self {
        value.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of one connection. A user connected twice is two clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
