//! Domain layer: identifiers, messages, and the collaborator interfaces the hub depends on.

pub mod connection;
pub mod entity;
pub mod error;
pub mod repository;
pub mod value_object;

pub use connection::Connection;
pub use entity::{ChatMessage, MessageKind, StoredMessage};
pub use error::{AccessError, ConnectionError, RepositoryError, ValueObjectError};
pub use repository::{MessageStore, UserDirectory};
pub use value_object::{ClientId, PRIVATE_ROOM_PREFIX, RoomId, UserId};

#[cfg(test)]
pub use repository::{MockMessageStore, MockUserDirectory};
