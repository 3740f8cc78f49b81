//! Notification queue with cancellable auto-dismissal.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use super::{Clock, Notification, NotificationDraft, NotificationId, SystemClock};

/// A pending automatic dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledDismissal {
    pub notification_id: NotificationId,
    pub due_at: DateTime<Utc>,
}

/// FIFO queue of operator alerts.
///
/// Timed notifications get a [`ScheduledDismissal`]; a manual dismiss cancels
/// it, and [`expire_due`](Self::expire_due) fires the ones whose deadline
/// passed.
pub struct NotificationDispatcher {
    clock: Box<dyn Clock>,
    queue: VecDeque<Notification>,
    scheduled: Vec<ScheduledDismissal>,
}

impl NotificationDispatcher {
    pub fn new(clock: Box<dyn Clock>) -> Self {
        Self {
            clock,
            queue: VecDeque::new(),
            scheduled: Vec::new(),
        }
    }

    /// Dispatcher reading the wall clock.
    pub fn with_system_clock() -> Self {
        Self::new(Box::new(SystemClock))
    }

    /// Append a notification and return its id.
    pub fn enqueue(&mut self, draft: NotificationDraft) -> NotificationId {
        let id = NotificationId::new();
        let created_at = self.clock.now();

        // A deadline past the end of representable time never expires.
        let timer = draft
            .auto_dismiss_after
            .filter(|_| !draft.category.is_cascade())
            .and_then(|delay| Some((delay, created_at.checked_add_signed(delay)?)));

        if let Some((_, due_at)) = timer {
            self.scheduled.push(ScheduledDismissal {
                notification_id: id,
                due_at,
            });
        }

        log::debug!(
            "notification {} queued ({:?}/{:?}): {}",
            id,
            draft.category,
            draft.severity,
            draft.message
        );

        self.queue.push_back(Notification {
            id,
            message: draft.message,
            severity: draft.severity,
            category: draft.category,
            created_at,
            auto_dismiss_after_ms: timer.map(|(delay, _)| delay.num_milliseconds()),
        });
        id
    }

    /// Remove a notification and cancel its dismissal timer.
    ///
    /// Returns `false` if it was already gone.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.scheduled.retain(|s| s.notification_id != id);

        match self.queue.iter().position(|n| n.id == id) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    /// Fire every scheduled dismissal whose deadline has passed.
    pub fn expire_due(&mut self) -> Vec<NotificationId> {
        let now = self.clock.now();
        let due: Vec<NotificationId> = self
            .scheduled
            .iter()
            .filter(|s| s.due_at <= now)
            .map(|s| s.notification_id)
            .collect();

        due.into_iter().filter(|id| self.dismiss(*id)).collect()
    }

    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.queue.iter().find(|n| n.id == id)
    }

    /// Pending notifications, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn scheduled(&self) -> &[ScheduledDismissal] {
        &self.scheduled
    }

    /// Number of live auto-dismiss timers.
    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every notification and timer.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.scheduled.clear();
    }
}

impl std::fmt::Debug for NotificationDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationDispatcher")
            .field("queue", &self.queue)
            .field("scheduled", &self.scheduled)
            .finish()
    }
}
