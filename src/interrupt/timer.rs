//! Deferred resume with an explicit wake time.

use std::time::{Duration, Instant};

/// A scheduled clearing of the stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingResume {
    /// When the resume was scheduled.
    pub scheduled_at: Instant,
    /// When it fires.
    pub fire_at: Instant,
}

impl PendingResume {
    pub fn new(now: Instant, delay: Duration) -> Self {
        Self {
            scheduled_at: now,
            fire_at: now + delay,
        }
    }

    /// Whether the resume fires at `now`.
    #[inline]
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.fire_at
    }

    /// Merges a new schedule into an existing one; the earliest fire time wins.
    pub fn merge(existing: Option<Self>, next: Self) -> Self {
        match existing {
            Some(cur) if cur.fire_at <= next.fire_at => cur,
            _ => next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_at_exact_delay() {
        let now = Instant::now();
        let pending = PendingResume::new(now, Duration::from_secs(5));
        assert!(!pending.is_due(now + Duration::from_millis(4999)));
        assert!(pending.is_due(now + Duration::from_secs(5)));
    }

    #[test]
    fn earliest_schedule_wins() {
        let now = Instant::now();
        let early = PendingResume::new(now, Duration::from_secs(2));
        let late = PendingResume::new(now, Duration::from_secs(9));
        assert_eq!(PendingResume::merge(Some(early), late), early);
        assert_eq!(PendingResume::merge(Some(late), early), early);
        assert_eq!(PendingResume::merge(None, late), late);
    }
}
