//! Time management utilities

use super::collections::{SlotMap, TimerId};
use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    start: Instant,
    last_frame: Instant,
    delta_time: f64,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_frame: now,
            delta_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        self.delta_time = now.duration_since(self.last_frame).as_secs_f64();
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub const fn delta_time(&self) -> f64 {
        self.delta_time
    }

    /// Seconds since the timer was created
    pub fn total_time(&self) -> f64 {
        self.last_frame.duration_since(self.start).as_secs_f64()
    }

    /// Get the current frame count
    pub const fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

struct Scheduled<T> {
    due: f64,
    seq: u64,
    tag: T,
}

/// One-shot timers keyed by [`TimerId`]
///
/// The queue never reads a clock itself. The owner feeds it the current time
/// (seconds) and collects whatever became due, which keeps every timer
/// deterministic under test.
pub struct TimerQueue<T> {
    timers: SlotMap<TimerId, Scheduled<T>>,
    current_time: f64,
    next_seq: u64,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TimerQueue<T> {
    /// Create an empty queue at time zero
    pub fn new() -> Self {
        Self {
            timers: SlotMap::with_key(),
            current_time: 0.0,
            next_seq: 0,
        }
    }

    /// Current time as last seen by [`advance`](Self::advance)
    pub const fn now(&self) -> f64 {
        self.current_time
    }

    /// Schedule `tag` to fire `delay` seconds from now
    pub fn schedule(&mut self, delay: f64, tag: T) -> TimerId {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.timers.insert(Scheduled {
            due: self.current_time + delay.max(0.0),
            seq,
            tag,
        })
    }

    /// Cancel a pending timer; returns its tag if it had not fired yet
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        self.timers.remove(id).map(|s| s.tag)
    }

    /// Whether the timer is still pending
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.contains_key(id)
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// True when nothing is scheduled
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every pending timer
    pub fn clear(&mut self) {
        self.timers.clear();
    }

    /// Move the clock to `now` and return the tags of every timer that fell due,
    /// ordered by due time then by scheduling order
    pub fn advance(&mut self, now: f64) -> Vec<T> {
        if now > self.current_time {
            self.current_time = now;
        }
        let current = self.current_time;

        let mut due: Vec<(TimerId, f64, u64)> = self
            .timers
            .iter()
            .filter(|(_, s)| s.due <= current)
            .map(|(id, s)| (id, s.due, s.seq))
            .collect();
        due.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.2.cmp(&b.2)));

        due.into_iter()
            .filter_map(|(id, _, _)| self.timers.remove(id).map(|s| s.tag))
            .collect()
    }
}
