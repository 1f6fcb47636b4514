//! InMemory User Directory 実装

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{RepositoryError, UserDirectory};

/// 数値のユーザー ID と表示名の対応を保持する
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<u32, String>>,
}

impl InMemoryUserDirectory {
    pub fn new(users: HashMap<u32, String>) -> Self {
        Self {
            users: RwLock::new(users),
        }
    }

    /// ユーザーを追加（既存の場合は表示名を上書き）
    pub async fn insert(&self, user_id: u32, name: String) {
        self.users.write().await.insert(user_id, name);
    }
}

impl FromIterator<(u32, String)> for InMemoryUserDirectory {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, user_id: u32) -> Result<String, RepositoryError> {
        self.users
            .read()
            .await
            .get(&user_id)
            .cloned()
            .ok_or(RepositoryError::UserNotFound(user_id))
    }
}
