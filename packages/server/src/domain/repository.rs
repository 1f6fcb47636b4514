//! Repository trait 定義
//!
//! Hub が必要とする外部コラボレーター（メッセージストア、ユーザーディレクトリ）の
//! インターフェースを定義します。具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::{RepositoryError, RoomId, StoredMessage};

/// Message Store trait
///
/// ルーム単位でチャットメッセージを永続化・取得する。
///
/// ## 依存性の逆転（DIP）
///
/// - Hub はこの trait にのみ依存し、保存先（RDB、インメモリなど）を知らない
/// - Infrastructure 層がこの trait を実装する
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// メッセージを追記し、保存されたレコードを返す
    async fn save(
        &self,
        room_id: &RoomId,
        content: &str,
        sender_id: u32,
    ) -> Result<StoredMessage, RepositoryError>;

    /// ルームのメッセージ履歴を作成時刻の昇順で取得
    async fn find_by_room(&self, room_id: &RoomId) -> Result<Vec<StoredMessage>, RepositoryError>;
}

/// User Directory trait
///
/// 数値のユーザー ID から表示名を解決する。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 表示名を取得（存在しない場合は `RepositoryError::UserNotFound`）
    async fn find_by_id(&self, user_id: u32) -> Result<String, RepositoryError>;
}
