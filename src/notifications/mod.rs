// ABOUTME: Operator-facing notification sink for escalation requests
// ABOUTME: Sink trait plus an in-memory queue polled by the admin dashboard endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::AppResult;
use crate::models::AdminNotification;

/// Destination of escalation notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Queue a notification for operators
    ///
    /// # Errors
    ///
    /// Returns `ExternalServiceError` or `StorageError` if delivery fails
    async fn enqueue(&self, notification: AdminNotification) -> AppResult<()>;

    /// Notifications not yet resolved, oldest first
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the queue cannot be read
    async fn list_pending(&self) -> AppResult<Vec<AdminNotification>>;

    /// Drop every pending notification of `user_id`
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the queue cannot be updated
    async fn resolve(&self, user_id: &str) -> AppResult<()>;
}

/// Notification queue held in memory
#[derive(Debug, Default)]
pub struct InMemoryNotificationSink {
    queue: RwLock<Vec<AdminNotification>>,
}

impl InMemoryNotificationSink {
    /// Empty queue
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotificationSink {
    async fn enqueue(&self, notification: AdminNotification) -> AppResult<()> {
        info!(
            user_id = %notification.user_id,
            priority = ?notification.priority,
            "Admin notification queued"
        );
        self.queue.write().await.push(notification);
        Ok(())
    }

    async fn list_pending(&self) -> AppResult<Vec<AdminNotification>> {
        Ok(self.queue.read().await.clone())
    }

    async fn resolve(&self, user_id: &str) -> AppResult<()> {
        self.queue
            .write()
            .await
            .retain(|notification| notification.user_id != user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::Priority;

    fn notification(user_id: &str) -> AdminNotification {
        AdminNotification {
            user_id: user_id.to_owned(),
            user_message: "help".to_owned(),
            timestamp: Utc::now(),
            priority: Priority::Medium,
        }
    }

    #[tokio::test]
    async fn test_enqueue_and_resolve() -> AppResult<()> {
        let sink = InMemoryNotificationSink::new();
        sink.enqueue(notification("u1")).await?;
        sink.enqueue(notification("u2")).await?;
        sink.enqueue(notification("u1")).await?;
        assert_eq!(sink.list_pending().await?.len(), 3);

        sink.resolve("u1").await?;
        let pending = sink.list_pending().await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].user_id, "u2");
        Ok(())
    }
}
