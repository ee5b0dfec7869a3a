// ABOUTME: Per-user session mode store shared by dispatch, generation and escalation
// ABOUTME: Atomic conditional updates of UserSessionMode records over the versioned key-value store
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

//! # Session Store
//!
//! Thin typed wrapper over [`KeyValueStore<UserSessionMode>`]. Every change
//! is applied through [`store::update`], so the chat pipeline and the
//! escalation coordinator can touch the same record without lost updates.

use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::errors::AppResult;
use crate::models::{SessionMode, UserSessionMode};
use crate::store::{self, KeyValueStore};

/// Session mode records keyed by user ID
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore<UserSessionMode>>,
}

impl SessionStore {
    /// Wrap a backend
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore<UserSessionMode>>) -> Self {
        Self { store }
    }

    /// Session of `user_id`, if one exists
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn get(&self, user_id: &str) -> AppResult<Option<UserSessionMode>> {
        Ok(self.store.get(user_id).await?.map(|versioned| versioned.value))
    }

    /// Session of `user_id`, created in character mode when absent
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn get_or_create(&self, user_id: &str) -> AppResult<UserSessionMode> {
        if let Some(existing) = self.get(user_id).await? {
            return Ok(existing);
        }
        let (session, ()) = self.update(user_id, |_| ()).await?;
        debug!(user_id = %user_id, "Session created");
        Ok(session)
    }

    /// Atomically apply `mutate` to the session, creating it when absent
    ///
    /// `mutate` may run more than once under contention.
    ///
    /// # Errors
    ///
    /// Returns the store's error, or `ResourceConflict` under sustained contention
    pub async fn update<F, R>(&self, user_id: &str, mutate: F) -> AppResult<(UserSessionMode, R)>
    where
        F: FnMut(&mut UserSessionMode) -> R + Send,
        R: Send,
    {
        store::update(
            self.store.as_ref(),
            user_id,
            || UserSessionMode::new(user_id, Utc::now()),
            mutate,
        )
        .await
    }

    /// Switch the user's persona, returning the previous one
    ///
    /// A user in info mode goes back to character mode.
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn set_persona(&self, user_id: &str, persona_id: &str) -> AppResult<Option<String>> {
        let (_, previous) = self
            .update(user_id, |session| {
                session.last_activity = Utc::now();
                if session.mode == SessionMode::MedicalInfo {
                    session.mode = SessionMode::Character;
                }
                session.current_persona_id.replace(persona_id.to_owned())
            })
            .await?;
        Ok(previous)
    }

    /// Sessions currently in `mode`
    ///
    /// # Errors
    ///
    /// Returns the store's error
    pub async fn in_mode(&self, mode: SessionMode) -> AppResult<Vec<UserSessionMode>> {
        Ok(self
            .store
            .entries()
            .await?
            .into_iter()
            .map(|(_, session)| session)
            .filter(|session| session.mode == mode)
            .collect())
    }
}
