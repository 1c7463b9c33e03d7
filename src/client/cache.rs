//! Bounded memoization cache for prompt pairs
//!
//! Keyed on the exact (system prompt, user prompt) pair. Population is
//! single-flight: concurrent first requests for the same key run one
//! network call and the rest await its result. Failed population is not
//! cached, so a transient backend error does not poison the key.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Cache key: the exact prompt pair as sent to the backend
pub type PromptKey = (String, String);

struct CacheInner<V> {
    entries: HashMap<PromptKey, Arc<OnceCell<V>>>,
    order: VecDeque<PromptKey>,
}

/// Fixed-capacity prompt-pair cache with FIFO eviction
pub struct PromptCache<V> {
    capacity: usize,
    inner: Mutex<CacheInner<V>>,
}

impl<V: Clone> PromptCache<V> {
    /// Create a cache holding at most `capacity` distinct prompt pairs
    ///
    /// # Panics
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "cache capacity must be non-zero");
        Self {
            capacity,
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Number of cached keys (including keys still being populated)
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    /// Whether the cache currently holds no keys
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Return the cached value for `key`, populating it with `init` on a miss
    ///
    /// An evicted key may still be awaited by in-flight callers; their cell
    /// stays alive through its Arc until they complete.
    pub async fn get_or_try_populate<F, Fut, E>(&self, key: PromptKey, init: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut inner = self.inner.lock().await;
            if let Some(cell) = inner.entries.get(&key) {
                cell.clone()
            } else {
                if inner.entries.len() >= self.capacity
                    && let Some(oldest) = inner.order.pop_front()
                {
                    inner.entries.remove(&oldest);
                }
                let cell = Arc::new(OnceCell::new());
                inner.entries.insert(key.clone(), cell.clone());
                inner.order.push_back(key);
                cell
            }
        };

        cell.get_or_try_init(init).await.cloned()
    }
}
