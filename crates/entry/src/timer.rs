//! Operator inactivity tracking.

use chrono::{DateTime, Duration, Utc};

/// Deadline that moves forward on every bit of operator activity.
///
/// There is no background thread: the host asks [`InactivityTimer::is_expired`]
/// whenever it gets control (a tick, a key press).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityTimer {
    timeout: Duration,
    last_activity: DateTime<Utc>,
}

impl InactivityTimer {
    pub fn new(timeout: Duration, now: DateTime<Utc>) -> Self {
        Self {
            timeout,
            last_activity: now,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Record activity. Times earlier than the last activity are ignored.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        if now > self.last_activity {
            self.last_activity = now;
        }
    }

    pub fn deadline(&self) -> DateTime<Utc> {
        self.last_activity + self.timeout
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.deadline()
    }
}
