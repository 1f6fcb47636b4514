//! Conversion logic between DTOs and domain entities.

use lobby_shared::time::to_rfc3339;

use crate::{
    domain::{ChatMessage, MessageKind},
    hub::RoomSummary,
    infrastructure::dto::{http, websocket as dto},
};

// ========================================
// Domain Entity → DTO
// ========================================

impl From<MessageKind> for dto::MessageType {
    fn from(kind: MessageKind) -> Self {
        match kind {
            MessageKind::Chat => dto::MessageType::ChatMessage,
            MessageKind::History => dto::MessageType::HistoryMessage,
        }
    }
}

impl From<&ChatMessage> for dto::OutboundMessage {
    fn from(model: &ChatMessage) -> Self {
        Self {
            r#type: model.kind.into(),
            content: model.content.clone(),
            sender_id: model.sender_id.as_str().to_string(),
            sender_name: model.sender_name.clone(),
            room_id: model.room_id.as_str().to_string(),
            timestamp: to_rfc3339(model.timestamp),
        }
    }
}

impl From<RoomSummary> for http::RoomSummaryDto {
    fn from(summary: RoomSummary) -> Self {
        Self {
            id: summary.room_id.into_string(),
            member_count: summary.members.len(),
            members: summary.members.into_iter().map(|m| m.into_string()).collect(),
        }
    }
}
