//! Transient user-facing notices
//!
//! Failures that the user should see (and successes such as a copied link)
//! are published here; front ends subscribe and display them for
//! [`Notice::duration`].

use std::time::Duration;

use tokio::sync::broadcast;

use crate::config;

const CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration: Duration,
}

/// Broadcasts notices to any number of subscribers
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message.into(), config::notify::ERROR_DURATION);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Success, message.into(), config::notify::SUCCESS_DURATION);
    }

    /// Short-lived error, used for copy failures
    pub fn brief_error(&self, message: impl Into<String>) {
        self.publish(NoticeLevel::Error, message.into(), config::notify::SUCCESS_DURATION);
    }

    fn publish(&self, level: NoticeLevel, message: String, duration: Duration) {
        // No subscribers is fine; the notice is simply dropped
        let _ = self.tx.send(Notice {
            level,
            message,
            duration,
        });
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
