//! InMemory Message Store 実装
//!
//! ドメイン層が定義する MessageStore trait の具体的な実装。
//! Vec をインメモリ DB として使用します。
//!
//! ## 技術的負債
//!
//! プロセスが終了すると履歴は失われます。RDB 実装を追加する際は
//! `StoredMessage` への変換層を用意してください。

use std::sync::Arc;

use async_trait::async_trait;
use lobby_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{MessageStore, RepositoryError, RoomId, StoredMessage};

#[derive(Default)]
struct Inner {
    messages: Vec<StoredMessage>,
    next_id: u64,
}

/// インメモリ Message Store 実装
///
/// 作成時刻は注入された Clock で付与します。
pub struct InMemoryMessageStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageStore {
    /// 新しい InMemoryMessageStore を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock,
        }
    }

    /// 保存されているメッセージの総数
    pub async fn len(&self) -> usize {
        self.inner.lock().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(
        &self,
        room_id: &RoomId,
        content: &str,
        sender_id: u32,
    ) -> Result<StoredMessage, RepositoryError> {
        let mut inner = self.inner.lock().await;
        inner.next_id += 1;
        let message = StoredMessage {
            id: inner.next_id,
            room_id: room_id.clone(),
            content: content.to_string(),
            sender_id,
            created_at: self.clock.now(),
        };
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, RepositoryError> {
        let inner = self.inner.lock().await;
        let mut messages: Vec<StoredMessage> = inner
            .messages
            .iter()
            .filter(|m| &m.room_id == room_id)
            .cloned()
            .collect();
        // 作成時刻が同じ場合は保存順
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }
}
