// ABOUTME: In-memory key-value store backed by a sharded concurrent map
// ABOUTME: Versioned compare-and-swap implemented on the map's entry API
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{CasOutcome, KeyValueStore, Versioned};
use crate::errors::AppResult;

/// Process-local store; contents are lost on restart
#[derive(Debug)]
pub struct MemoryStore<V> {
    entries: DashMap<String, Versioned<V>>,
}

impl<V> MemoryStore<V> {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Number of stored records
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> AppResult<Option<Versioned<V>>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<u64>,
        value: Option<V>,
    ) -> AppResult<CasOutcome> {
        let outcome = match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                let stored = occupied.get().version;
                if expected != Some(stored) {
                    CasOutcome::Conflict
                } else if let Some(value) = value {
                    let version = stored + 1;
                    occupied.insert(Versioned { version, value });
                    CasOutcome::Swapped(version)
                } else {
                    occupied.remove();
                    CasOutcome::Swapped(0)
                }
            }
            Entry::Vacant(vacant) => match (expected, value) {
                (Some(_), _) => CasOutcome::Conflict,
                (None, Some(value)) => {
                    vacant.insert(Versioned { version: 1, value });
                    CasOutcome::Swapped(1)
                }
                (None, None) => CasOutcome::Swapped(0),
            },
        };
        Ok(outcome)
    }

    async fn entries(&self) -> AppResult<Vec<(String, V)>> {
        Ok(self
            .entries
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().value.clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::errors::AppError;
    use crate::store::{remove, update};

    #[tokio::test]
    async fn test_cas_rejects_stale_version() -> AppResult<()> {
        let store: MemoryStore<u32> = MemoryStore::new();
        assert_eq!(
            store.compare_and_swap("k", None, Some(1)).await?,
            CasOutcome::Swapped(1)
        );
        assert_eq!(
            store.compare_and_swap("k", None, Some(2)).await?,
            CasOutcome::Conflict
        );
        assert_eq!(
            store.compare_and_swap("k", Some(1), Some(3)).await?,
            CasOutcome::Swapped(2)
        );
        assert_eq!(store.get("k").await?.map(|v| v.value), Some(3));
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_updates_are_not_lost() -> Result<(), AppError> {
        let store: Arc<MemoryStore<u64>> = Arc::new(MemoryStore::new());
        let mut handles = Vec::new();
        for _ in 0..4 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                for _ in 0..25 {
                    update(store.as_ref(), "counter", || 0, |v| *v += 1).await?;
                }
                Ok::<(), AppError>(())
            }));
        }
        for handle in handles {
            handle
                .await
                .map_err(|e| AppError::internal(e.to_string()))??;
        }
        assert_eq!(store.get("counter").await?.map(|v| v.value), Some(100));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() -> AppResult<()> {
        let store: MemoryStore<u32> = MemoryStore::new();
        remove(&store, "absent").await?;
        update(&store, "k", || 7, |_| ()).await?;
        remove(&store, "k").await?;
        assert!(store.is_empty());
        Ok(())
    }
}
