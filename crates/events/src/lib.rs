//! Notification queue shared by every SenseLib controller.
//!
//! Controllers publish through one [`Notifier`]; views either subscribe to the
//! broadcast stream or read the pending queue and dismiss entries.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use uuid::{NoContext, Timestamp, Uuid};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub level: Level,
    /// Entity or widget that raised the notification.
    pub source: String,
    pub message: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Cloneable handle to the shared notification queue.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

struct Inner {
    sender: broadcast::Sender<Notification>,
    pending: Mutex<VecDeque<Notification>>,
    capacity: usize,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(Inner {
                sender,
                pending: Mutex::new(VecDeque::with_capacity(capacity)),
                capacity,
            }),
        }
    }

    /// Log, queue and broadcast a notification. Returns its id.
    pub fn publish(
        &self,
        level: Level,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Uuid {
        let notification = Notification {
            id: Uuid::new_v7(Timestamp::now(NoContext)),
            level,
            source: source.into(),
            message: message.into(),
            created_at: OffsetDateTime::now_utc(),
        };

        match level {
            Level::Error => tracing::error!(
                source = %notification.source,
                id = %notification.id,
                "{}",
                notification.message
            ),
            Level::Warning => tracing::warn!(
                source = %notification.source,
                id = %notification.id,
                "{}",
                notification.message
            ),
            Level::Success | Level::Info => tracing::info!(
                source = %notification.source,
                id = %notification.id,
                "{}",
                notification.message
            ),
        }

        let id = notification.id;
        {
            let mut pending = self.pending();
            if pending.len() == self.inner.capacity {
                pending.pop_front();
            }
            pending.push_back(notification.clone());
        }

        // No subscribers is fine; the pending queue still holds it.
        let _ = self.inner.sender.send(notification);
        id
    }

    pub fn success(&self, source: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.publish(Level::Success, source, message)
    }

    pub fn info(&self, source: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.publish(Level::Info, source, message)
    }

    pub fn warning(&self, source: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.publish(Level::Warning, source, message)
    }

    pub fn error(&self, source: impl Into<String>, message: impl Into<String>) -> Uuid {
        self.publish(Level::Error, source, message)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.inner.sender.subscribe()
    }

    /// Snapshot of undismissed notifications, oldest first.
    pub fn pending_notifications(&self) -> Vec<Notification> {
        self.pending().iter().cloned().collect()
    }

    /// Remove one notification; false if it was already gone.
    pub fn dismiss(&self, id: Uuid) -> bool {
        let mut pending = self.pending();
        match pending.iter().position(|n| n.id == id) {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn drain(&self) -> Vec<Notification> {
        self.pending().drain(..).collect()
    }

    fn pending(&self) -> MutexGuard<'_, VecDeque<Notification>> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_queue_is_bounded() {
        let notifier = Notifier::new(2);
        notifier.info("categories", "first");
        notifier.info("categories", "second");
        notifier.error("categories", "third");

        let pending = notifier.pending_notifications();
        let messages: Vec<_> = pending.iter().map(|n| n.message.as_str()).collect();
        assert_eq!(messages, vec!["second", "third"]);
        assert_eq!(pending[1].level, Level::Error);
    }

    #[test]
    fn dismiss_removes_only_the_matching_entry() {
        let notifier = Notifier::default();
        let first = notifier.success("users", "saved");
        notifier.warning("users", "slow response");

        assert!(notifier.dismiss(first));
        assert!(!notifier.dismiss(first));
        assert_eq!(notifier.pending_notifications().len(), 1);
        assert_eq!(notifier.drain().len(), 1);
        assert!(notifier.pending_notifications().is_empty());
    }

    #[tokio::test]
    async fn subscribers_receive_published_notifications() {
        let notifier = Notifier::new(8);
        let mut receiver = notifier.subscribe();

        let id = notifier.error("books", "Failed to load books");
        let received = receiver.recv().await.unwrap();
        assert_eq!(received.id, id);
        assert_eq!(received.source, "books");
        assert_eq!(received.level, Level::Error);
    }

    #[test]
    fn notification_serializes_for_views() {
        let notifier = Notifier::default();
        notifier.success("slides", "Slide created");
        let value = serde_json::to_value(&notifier.pending_notifications()[0]).unwrap();
        assert_eq!(value["level"], "success");
        assert!(value["createdAt"].is_string());
    }
}
