// ABOUTME: Key-value store abstraction with versioned compare-and-swap for per-user state
// ABOUTME: Pluggable backend trait plus an optimistic read-modify-write helper
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # State Store
//!
//! Conversation memory and session modes are mutated by concurrent turns and
//! by the escalation coordinator. Every mutation goes through [`update`],
//! which reads a versioned record, applies the change and writes it back
//! with [`KeyValueStore::compare_and_swap`], retrying on conflict. No caller
//! ever performs an unconditional write.

/// In-memory backend
pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use tracing::debug;

use crate::constants::limits::STORE_UPDATE_ATTEMPTS;
use crate::errors::{AppError, AppResult};

/// A stored value and the version it was read at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<V> {
    /// Monotonic per-key version, starting at 1
    pub version: u64,
    /// Stored value
    pub value: V,
}

/// Result of a conditional write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasOutcome {
    /// Write applied; carries the new version (0 after a delete)
    Swapped(u64),
    /// Stored version did not match the expected one
    Conflict,
}

/// Backend for versioned per-key records
#[async_trait]
pub trait KeyValueStore<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Read a record with its version
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn get(&self, key: &str) -> AppResult<Option<Versioned<V>>>;

    /// Write `value` (or delete when `None`) only if the stored version equals
    /// `expected` (`None` meaning "absent")
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<u64>,
        value: Option<V>,
    ) -> AppResult<CasOutcome>;

    /// Snapshot of all records
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend fails
    async fn entries(&self) -> AppResult<Vec<(String, V)>>;
}

/// Atomically read-modify-write the record at `key`
///
/// `init` seeds the record when absent. The closure may run more than once
/// when a concurrent writer wins the race, so it must be free of side effects
/// beyond the value it is given.
///
/// # Errors
///
/// Returns `ResourceConflict` when every attempt loses the race, or the
/// backend's error
pub async fn update<V, S, I, F, R>(store: &S, key: &str, init: I, mut mutate: F) -> AppResult<(V, R)>
where
    V: Clone + Send + Sync + 'static,
    S: KeyValueStore<V> + ?Sized,
    I: Fn() -> V + Send,
    F: FnMut(&mut V) -> R + Send,
{
    for attempt in 1..=STORE_UPDATE_ATTEMPTS {
        let current = store.get(key).await?;
        let (expected, mut value) = match current {
            Some(versioned) => (Some(versioned.version), versioned.value),
            None => (None, init()),
        };
        let output = mutate(&mut value);

        match store
            .compare_and_swap(key, expected, Some(value.clone()))
            .await?
        {
            CasOutcome::Swapped(_) => return Ok((value, output)),
            CasOutcome::Conflict => {
                debug!(key = %key, attempt, "Concurrent update detected, retrying");
            }
        }
    }

    Err(AppError::conflict(format!(
        "Record {key} kept changing after {STORE_UPDATE_ATTEMPTS} attempts"
    ))
    .with_resource_id(key))
}

/// Remove the record at `key` regardless of its version
///
/// # Errors
///
/// Returns `ResourceConflict` when every attempt loses the race, or the
/// backend's error
pub async fn remove<V, S>(store: &S, key: &str) -> AppResult<()>
where
    V: Clone + Send + Sync + 'static,
    S: KeyValueStore<V> + ?Sized,
{
    for _ in 0..STORE_UPDATE_ATTEMPTS {
        let Some(current) = store.get(key).await? else {
            return Ok(());
        };
        if let CasOutcome::Swapped(_) = store
            .compare_and_swap(key, Some(current.version), None)
            .await?
        {
            return Ok(());
        }
    }

    Err(AppError::conflict(format!("Record {key} could not be removed")).with_resource_id(key))
}
