//! Domain entities: chat messages as delivered and as persisted.

use chrono::{DateTime, Utc};

use super::value_object::{RoomId, UserId};

/// Discriminates live traffic from replayed history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Chat,
    History,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Chat => "chat_message",
            MessageKind::History => "history_message",
        }
    }
}

/// A chat message travelling through the hub.
///
/// Immutable once built. Enrichment with the sender's display name produces
/// a new value via [`ChatMessage::with_sender_name`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    pub sender_id: UserId,
    /// Empty when the user directory could not resolve the sender
    pub sender_name: String,
    pub room_id: RoomId,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Message received from a connected client, stamped by the server
    pub fn live(
        content: String,
        sender_id: UserId,
        room_id: RoomId,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            kind: MessageKind::Chat,
            content,
            sender_id,
            sender_name: String::new(),
            room_id,
            timestamp,
        }
    }

    /// Message replayed from the store, keeping its original creation time
    pub fn history(stored: &StoredMessage, sender_name: String) -> Self {
        Self {
            kind: MessageKind::History,
            content: stored.content.clone(),
            sender_id: UserId::from_numeric(stored.sender_id),
            sender_name,
            room_id: stored.room_id.clone(),
            timestamp: stored.created_at,
        }
    }

    pub fn with_sender_name(self, sender_name: String) -> Self {
        Self {
            sender_name,
            ..self
        }
    }
}

/// A message as recorded by the message store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMessage {
    pub id: u64,
    pub room_id: RoomId,
    pub content: String,
    pub sender_id: u32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lobby_shared::time::{Clock, FixedClock};

    #[test]
    fn test_live_message_has_empty_sender_name() {
        // テスト項目: ライブメッセージは chat_message 種別で送信者名が空
        // given (前提条件):
        let now = FixedClock::from_millis(1_000).now();

        // when (操作):
        let message = ChatMessage::live(
            "hi".to_string(),
            UserId::from_numeric(1),
            RoomId::general(),
            now,
        );

        // then (期待する結果):
        assert_eq!(message.kind, MessageKind::Chat);
        assert_eq!(message.sender_name, "");
        assert_eq!(message.timestamp, now);
    }

    #[test]
    fn test_history_message_keeps_original_time() {
        // テスト項目: 履歴メッセージは保存時の作成時刻と送信者を引き継ぐ
        // given (前提条件):
        let created_at = FixedClock::from_millis(5_000).now();
        let stored = StoredMessage {
            id: 1,
            room_id: RoomId::new("r1".to_string()).unwrap(),
            content: "old".to_string(),
            sender_id: 9,
            created_at,
        };

        // when (操作):
        let message = ChatMessage::history(&stored, "Nine".to_string());

        // then (期待する結果):
        assert_eq!(message.kind, MessageKind::History);
        assert_eq!(message.kind.as_str(), "history_message");
        assert_eq!(message.sender_id.as_str(), "9");
        assert_eq!(message.sender_name, "Nine");
        assert_eq!(message.room_id.as_str(), "r1");
        assert_eq!(message.timestamp, created_at);
    }

    #[test]
    fn test_with_sender_name_leaves_other_fields() {
        // テスト項目: 送信者名の付与は他のフィールドを変更しない
        // given (前提条件):
        let message = ChatMessage::live(
            "hi".to_string(),
            UserId::from_numeric(1),
            RoomId::general(),
            FixedClock::from_millis(0).now(),
        );

        // when (操作):
        let named = message.clone().with_sender_name("Alice".to_string());

        // then (期待する結果):
        assert_eq!(named.sender_name, "Alice");
        assert_eq!(named.content, message.content);
        assert_eq!(named.timestamp, message.timestamp);
    }
}
