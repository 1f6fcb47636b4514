//! Bounded display-name cache in front of another [`UserDirectory`].

use std::{
    collections::{HashMap, VecDeque},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RepositoryError, UserDirectory};

#[derive(Default)]
struct NameCache {
    names: HashMap<u32, String>,
    /// Insertion order, oldest first
    order: VecDeque<u32>,
}

/// Caches successful lookups, evicting the oldest entry once `capacity` is
/// reached. Failed lookups are never cached. A capacity of zero disables
/// caching.
pub struct CachedUserDirectory {
    inner: Arc<dyn UserDirectory>,
    capacity: usize,
    cache: Mutex<NameCache>,
}

impl CachedUserDirectory {
    pub fn new(inner: Arc<dyn UserDirectory>, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            cache: Mutex::new(NameCache::default()),
        }
    }

    pub async fn cached_len(&self) -> usize {
        self.cache.lock().await.names.len()
    }
}

#[async_trait]
impl UserDirectory for CachedUserDirectory {
    async fn find_by_id(&self, user_id: u32) -> Result<String, RepositoryError> {
        if self.capacity == 0 {
            return self.inner.find_by_id(user_id).await;
        }

        if let Some(name) = self.cache.lock().await.names.get(&user_id) {
            return Ok(name.clone());
        }

        // not holding the lock across the lookup
        let name = self.inner.find_by_id(user_id).await?;

        let mut cache = self.cache.lock().await;
        if !cache.names.contains_key(&user_id) {
            if cache.names.len() >= self.capacity
                && let Some(oldest) = cache.order.pop_front()
            {
                cache.names.remove(&oldest);
            }
            cache.order.push_back(user_id);
            cache.names.insert(user_id, name.clone());
        }
        Ok(name)
    }
}
