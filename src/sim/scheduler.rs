//! Single-threaded deferred callback queue
//!
//! The session schedules tasks ("flip these back in 0.5s") and the host
//! advances the clock. Tasks fire in due-time order, ties in scheduling
//! order, one at a time. Nothing runs outside of [`Scheduler::pop_due`].

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::time::Duration;

#[derive(Debug)]
struct Scheduled<T> {
    due: Duration,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Scheduled<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Scheduled<T> {}

impl<T> PartialOrd for Scheduled<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Scheduled<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Timer queue on a virtual clock
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    next_seq: u64,
    queue: BinaryHeap<Reverse<Scheduled<T>>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Current virtual time
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run `task` once `delay` has elapsed from now
    pub fn schedule(&mut self, delay: Duration, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due: self.now.saturating_add(delay),
            seq,
            task,
        }));
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock
    /// to its due time. Tasks scheduled while handling it are seen by the
    /// next call.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<T> {
        let due = self.queue.peek()?.0.due;
        if due > deadline {
            return None;
        }
        let Reverse(entry) = self.queue.pop()?;
        self.now = self.now.max(entry.due);
        Some(entry.task)
    }

    /// Move the clock forward to `deadline` once all due tasks are handled
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Drop every pending task without running it
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &mut Scheduler<&'static str>, dt: Duration) -> Vec<&'static str> {
        let deadline = s.now().saturating_add(dt);
        let mut fired = Vec::new();
        while let Some(t) = s.pop_due(deadline) {
            fired.push(t);
        }
        s.settle(deadline);
        fired
    }

    #[test]
    fn test_fires_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(500), "late");
        s.schedule(Duration::from_millis(100), "early");
        s.schedule(Duration::from_millis(100), "early2");

        assert!(drain(&mut s, Duration::from_millis(50)).is_empty());
        assert_eq!(drain(&mut s, Duration::from_millis(100)), vec!["early", "early2"]);
        assert_eq!(s.pending(), 1);
        assert_eq!(drain(&mut s, Duration::from_secs(1)), vec!["late"]);
        assert!(s.is_idle());
        assert_eq!(s.now(), Duration::from_millis(1150));
    }

    #[test]
    fn test_delay_is_relative_to_fire_time() {
        let mut s = Scheduler::new();
        s.schedule(Duration::from_millis(100), "first");
        let deadline = Duration::from_secs(1);

        assert_eq!(s.pop_due(deadline), Some("first"));
        assert_eq!(s.now(), Duration::from_millis(100));
        // Scheduled from inside a callback
        s.schedule(Duration::from_millis(200), "chained");
        assert_eq!(s.pop_due(deadline), Some("chained"));
        assert_eq!(s.now(), Duration::from_millis(300));
    }

    #[test]
    fn test_clock_saturates_at_max() {
        let mut s = Scheduler::new();
        let huge = Duration::from_secs(u64::MAX / 2 + 1);
        s.schedule(huge, "far");
        s.schedule(huge, "farther");
        assert_eq!(s.pop_due(Duration::MAX), Some("far"));
        // Scheduling past the end of the clock pins the due time to the end
        s.schedule(Duration::MAX, "end");
        assert_eq!(s.pop_due(Duration::MAX), Some("farther"));
        assert_eq!(s.pop_due(Duration::MAX), Some("end"));
        s.settle(Duration::MAX);
        assert_eq!(s.now(), Duration::MAX);
    }

    #[test]
    fn test_clear_drops_tasks() {
        let mut s = Scheduler::new();
        s.schedule(Duration::ZERO, "x");
        s.clear();
        assert!(drain(&mut s, Duration::from_secs(1)).is_empty());
    }
}
