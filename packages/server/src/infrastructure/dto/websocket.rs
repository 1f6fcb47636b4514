//! WebSocket frame DTOs.

use serde::{Deserialize, Serialize};

/// Frame sent by a client. Only the text is taken from the client; sender,
/// room and time are filled in by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    ChatMessage,
    HistoryMessage,
}

/// Frame sent to a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub r#type: MessageType,
    pub content: String,
    pub sender_id: String,
    pub sender_name: String,
    pub room_id: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}
