//! User-facing notifications
//!
//! Fire-and-forget toasts shown in the status line until they expire.

use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

/// Default time a toast stays on screen
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(4);

/// Toasts kept at once; older ones are dropped first
const MAX_NOTIFICATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub expires_at: Instant,
}

/// Notification collaborator
pub trait Notifier {
    fn success(&mut self, message: &str);

    /// Report an error returned by the data layer
    fn server_error(&mut self, error: &dyn fmt::Display);
}

#[derive(Debug)]
pub struct NotificationCenter {
    ttl: Duration,
    queue: VecDeque<Notification>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(NOTIFICATION_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            queue: VecDeque::new(),
        }
    }

    fn push(&mut self, level: NotificationLevel, message: String, now: Instant) {
        if self.queue.len() == MAX_NOTIFICATIONS {
            self.queue.pop_front();
        }
        self.queue.push_back(Notification {
            level,
            message,
            expires_at: now + self.ttl,
        });
    }

    /// Drop toasts whose time is up
    pub fn prune(&mut self, now: Instant) {
        self.queue.retain(|n| n.expires_at > now);
    }

    /// Newest toast, shown in the status line
    pub fn latest(&self) -> Option<&Notification> {
        self.queue.back()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl Notifier for NotificationCenter {
    fn success(&mut self, message: &str) {
        tracing::info!(message, "notify success");
        self.push(NotificationLevel::Success, message.to_string(), Instant::now());
    }

    fn server_error(&mut self, error: &dyn fmt::Display) {
        let message = error.to_string();
        tracing::warn!(error = %message, "notify server error");
        self.push(NotificationLevel::Error, message, Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_and_expiry() {
        let mut center = NotificationCenter::new(Duration::from_secs(2));
        center.success("Saved");
        center.server_error(&"Network unreachable");

        let latest = center.latest().unwrap();
        assert_eq!(latest.level, NotificationLevel::Error);
        assert_eq!(latest.message, "Network unreachable");

        center.prune(Instant::now());
        assert_eq!(center.len(), 2);

        center.prune(Instant::now() + Duration::from_secs(3));
        assert!(center.is_empty());
    }

    #[test]
    fn test_queue_is_bounded() {
        let mut center = NotificationCenter::default();
        for i in 0..8 {
            center.success(&format!("message {}", i));
        }
        assert_eq!(center.len(), MAX_NOTIFICATIONS);
        assert_eq!(center.latest().map(|n| n.message.as_str()), Some("message 7"));
    }
}
