//! HTTP/WebSocket front of the chat hub.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::{Server, ServerError};
