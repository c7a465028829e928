//! Time sources for session deadline checks
//!
//! Every expiration decision reads the current instant from a [`Clock`] so that
//! tests can pin time to any past or future instant. Production code uses
//! [`SystemClock`].

use chrono::{DateTime, Duration, Utc};

/// Source of the current instant.
///
/// Implementations are read-only and shared across request-handling threads.
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock backed by the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    instant: DateTime<Utc>,
}

impl FixedClock {
    #[must_use]
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self { instant }
    }

    /// Return a new clock shifted by `delta` (negative values move into the past)
    #[must_use]
    pub fn offset(&self, delta: Duration) -> Self {
        Self {
            instant: self.instant + delta,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
    }
}
