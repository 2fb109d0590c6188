//! A small concurrency-safe memo table.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use tokio::sync::Mutex;

/// A map from keys to lazily computed values, never invalidated.
///
/// The lock is only ever taken to read or to insert; computation happens
/// outside of it, so concurrent misses on different keys proceed
/// independently. Concurrent misses on the same key may each compute, in
/// which case the first value to land wins.
pub struct Cache<K, V> {
    map: Mutex<HashMap<K, V>>,
}

impl<K, V> Default for Cache<K, V> {
    fn default() -> Self {
        Cache {
            map: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `key`, or compute and cache it. Failed
    /// computations aren't cached.
    pub async fn get_or_try_compute<F, Fut, E>(&self, key: &K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.map.lock().await.get(key) {
            return Ok(v.clone());
        }

        let v = compute().await?;

        Ok(self
            .map
            .lock()
            .await
            .entry(key.clone())
            .or_insert(v)
            .clone())
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.map.lock().await.len()
    }
}
