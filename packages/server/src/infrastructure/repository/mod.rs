//! Implementations of the message store and user directory collaborators.

pub mod cached_user_directory;
pub mod inmemory;

pub use cached_user_directory::CachedUserDirectory;
pub use inmemory::{InMemoryMessageStore, InMemoryUserDirectory};
