//! Notifications - operator alerts raised by the session engine.
//!
//! - **Notification**: an alert in the pending queue
//! - **NotificationDispatcher**: FIFO queue with cancellable auto-dismissal
//! - **Clock**: time source injected into the dispatcher

mod clock;
mod dispatcher;

pub use clock::*;
pub use dispatcher::*;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationId(pub Uuid);

impl NotificationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How loudly the presentation layer should show an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Critical,
}

/// What raised a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    #[default]
    General,
    /// Cupid completed a pair.
    Lovers,
    /// A lover died; the partner must follow.
    LoverGrief,
    /// The wild child's model died.
    WildChildConversion,
    /// The hunter died and must shoot.
    HunterShot,
}

impl NotificationCategory {
    /// Cascades wait for the moderator to act on them and never expire.
    pub fn is_cascade(self) -> bool {
        matches!(
            self,
            NotificationCategory::LoverGrief
                | NotificationCategory::WildChildConversion
                | NotificationCategory::HunterShot
        )
    }
}

/// A notification before it enters the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub message: String,
    pub severity: Severity,
    pub category: NotificationCategory,
    pub auto_dismiss_after: Option<Duration>,
}

impl NotificationDraft {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Info,
            category: NotificationCategory::General,
            auto_dismiss_after: None,
        }
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }

    /// Remove the notification automatically after `delay`.
    ///
    /// Ignored for cascade categories.
    pub fn auto_dismiss_after(mut self, delay: Duration) -> Self {
        self.auto_dismiss_after = Some(delay);
        self
    }
}

/// A queued operator alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub category: NotificationCategory,
    pub created_at: DateTime<Utc>,
    /// Milliseconds until automatic removal, when scheduled.
    pub auto_dismiss_after_ms: Option<i64>,
}

impl Notification {
    pub fn requires_acknowledgement(&self) -> bool {
        self.auto_dismiss_after_ms.is_none()
    }
}
