use crate::error::{Result, WorkflowError};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::warn;

/// Held locks for one or more keys. Released on drop.
#[derive(Debug)]
pub struct KeyGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

/// Per-key mutual exclusion for read-validate-write critical sections.
///
/// Entries nobody holds or waits on are pruned on the next acquisition.
#[derive(Debug, Clone)]
pub struct KeyedLocks {
    slots: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    timeout: Duration,
}

impl KeyedLocks {
    pub fn new(timeout: Duration) -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
            timeout,
        }
    }

    async fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock().await;
        slots.retain(|k, slot| k == key || Arc::strong_count(slot) > 1);
        slots
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub async fn lock(&self, key: &str) -> Result<KeyGuard> {
        self.lock_many([key]).await
    }

    /// Acquires several keys in sorted order so overlapping callers cannot
    /// deadlock.
    pub async fn lock_many<'a, I>(&self, keys: I) -> Result<KeyGuard>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut keys: Vec<&str> = keys.into_iter().collect();
        keys.sort_unstable();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let slot = self.slot(key).await;
            match tokio::time::timeout(self.timeout, slot.lock_owned()).await {
                Ok(guard) => guards.push(guard),
                Err(_) => {
                    warn!(key, "lock wait timed out");
                    return Err(WorkflowError::UpstreamTimeout(format!(
                        "Timed out waiting for lock on {key}"
                    )));
                }
            }
        }
        Ok(KeyGuard { _guards: guards })
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_holder_times_out() {
        let locks = KeyedLocks::new(Duration::from_millis(20));
        let _held = locks.lock("RB-1").await.unwrap();

        let err = locks.lock("RB-1").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(locks.lock("RB-2").await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_released_on_drop() {
        let locks = KeyedLocks::new(Duration::from_millis(20));
        drop(locks.lock("RB-1").await.unwrap());
        assert!(locks.lock("RB-1").await.is_ok());
    }

    #[tokio::test]
    async fn test_lock_many_dedups_keys() {
        let locks = KeyedLocks::new(Duration::from_millis(20));
        let guard = locks.lock_many(["b", "a", "b"]).await;
        assert!(guard.is_ok());
    }

    #[tokio::test]
    async fn test_idle_slots_are_pruned() {
        let locks = KeyedLocks::new(Duration::from_millis(20));
        for i in 0..10 {
            drop(locks.lock(&format!("K{i}")).await.unwrap());
        }
        drop(locks.lock("last").await.unwrap());
        assert_eq!(locks.len().await, 1);
    }
}
