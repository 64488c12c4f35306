use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

use tokio::task::JoinHandle;

/// Background collectors owned by a controller, at most one per key.
///
/// Starting a new collector for a key aborts the previous one. Dropping the
/// set aborts everything still running.
pub struct Subscriptions<K> {
    handles: Mutex<HashMap<K, JoinHandle<()>>>,
}

impl<K: Eq + Hash + std::fmt::Debug> Subscriptions<K> {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    pub fn replace(&self, key: K, handle: JoinHandle<()>) {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = handles.insert(key, handle) {
            previous.abort();
        }
    }

    pub fn cancel(&self, key: &K) -> bool {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        match handles.remove(key) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        let mut handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        for (key, handle) in handles.drain() {
            tracing::debug!("SUBSCRIPTIONS: Cancelling {:?}", key);
            handle.abort();
        }
    }

    /// Keys whose collector has not finished yet.
    pub fn active_count(&self) -> usize {
        let handles = self.handles.lock().unwrap_or_else(|e| e.into_inner());
        handles.values().filter(|h| !h.is_finished()).count()
    }
}

impl<K: Eq + Hash + std::fmt::Debug> Default for Subscriptions<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Drop for Subscriptions<K> {
    fn drop(&mut self) {
        let handles = self.handles.get_mut().unwrap_or_else(|e| e.into_inner());
        for (_, handle) in handles.drain() {
            handle.abort();
        }
    }
}
