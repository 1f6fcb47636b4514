//! [`Connection`](crate::domain::Connection) implementations.

pub mod websocket;

pub use websocket::WebSocketConnection;
