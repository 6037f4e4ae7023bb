//! Single-slot cancellable deadline used to clear a stale pending chord from
//! the display when no further key arrives.
//!
//! The host event loop owns the clock: it asks for [`ExpiryTimer::time_until`]
//! to size its poll timeout and calls [`ExpiryTimer::fire_due`] afterwards.
//! Arming replaces whatever was scheduled, so a stale deadline can never fire
//! against a newer chord.

use std::time::{Duration, Instant};

/// Identifies one arming of the timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Copy)]
struct Scheduled {
    handle: TimerHandle,
    deadline: Instant,
}

#[derive(Debug, Default)]
pub struct ExpiryTimer {
    slot: Option<Scheduled>,
    generation: u64,
}

impl ExpiryTimer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules the deadline, cancelling any previous one.
    pub fn arm(&mut self, deadline: Instant) -> TimerHandle {
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        self.slot = Some(Scheduled { handle, deadline });
        handle
    }

    /// Cancels the scheduled deadline. Returns true if one was live.
    pub fn cancel(&mut self) -> bool {
        self.slot.take().is_some()
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.slot.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.slot.map(|s| s.deadline)
    }

    /// Handle of the live arming, if any.
    #[must_use]
    pub fn handle(&self) -> Option<TimerHandle> {
        self.slot.map(|s| s.handle)
    }

    /// Remaining time before the deadline, zero if already due.
    #[must_use]
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Disarms and returns the handle if the deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> Option<TimerHandle> {
        match self.slot {
            Some(scheduled) if now >= scheduled.deadline => {
                self.slot = None;
                Some(scheduled.handle)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_deadline() {
        let mut timer = ExpiryTimer::new();
        let t0 = Instant::now();
        let handle = timer.arm(t0 + Duration::from_millis(50));

        assert_eq!(timer.fire_due(t0), None);
        assert_eq!(timer.time_until(t0), Some(Duration::from_millis(50)));
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(50)), Some(handle));
        assert!(!timer.is_armed());
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(60)), None);
    }

    #[test]
    fn test_rearm_replaces_previous() {
        let mut timer = ExpiryTimer::new();
        let t0 = Instant::now();
        let first = timer.arm(t0 + Duration::from_millis(10));
        let second = timer.arm(t0 + Duration::from_millis(100));
        assert_ne!(first, second);

        // The first deadline passing must not fire anything
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(20)), None);
        assert_eq!(timer.handle(), Some(second));
        assert_eq!(timer.fire_due(t0 + Duration::from_millis(100)), Some(second));
    }

    #[test]
    fn test_cancel() {
        let mut timer = ExpiryTimer::new();
        let t0 = Instant::now();
        assert!(!timer.cancel());
        timer.arm(t0);
        assert!(timer.cancel());
        assert_eq!(timer.deadline(), None);
        assert_eq!(timer.time_until(t0), None);
        assert_eq!(timer.fire_due(t0 + Duration::from_secs(1)), None);
    }
}
