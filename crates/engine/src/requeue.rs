// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-window requeue timers
//!
//! A window is either queued (waiting for its deadline), in flight (a tick
//! is running), or unknown. Scheduling a queued window replaces its
//! deadline, and scheduling an in-flight window is refused, so at most one
//! tick per window ever runs at a time.

use snooze_core::WindowRef;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    fire_at: Instant,
    id: WindowRef,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap: earliest first
        Reverse(self.fire_at)
            .cmp(&Reverse(other.fire_at))
            .then_with(|| other.id.cmp(&self.id))
    }
}

#[derive(Debug, Default)]
pub struct RequeueQueue {
    heap: BinaryHeap<Entry>,
    /// Live deadline per queued window; heap entries that disagree are stale
    deadlines: HashMap<WindowRef, Instant>,
    in_flight: HashSet<WindowRef>,
}

impl RequeueQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `id` to fire at `fire_at`, replacing any earlier deadline.
    ///
    /// Returns false if a tick for `id` is in flight.
    pub fn schedule(&mut self, id: WindowRef, fire_at: Instant) -> bool {
        if self.in_flight.contains(&id) {
            return false;
        }
        self.deadlines.insert(id.clone(), fire_at);
        self.heap.push(Entry { fire_at, id });
        true
    }

    /// Queue `id` unless it is already queued or in flight
    pub fn schedule_if_absent(&mut self, id: WindowRef, fire_at: Instant) -> bool {
        if self.contains(&id) {
            return false;
        }
        self.schedule(id, fire_at)
    }

    /// Take every window due at or before `now` and mark it in flight
    pub fn poll(&mut self, now: Instant) -> Vec<WindowRef> {
        let mut due = Vec::new();

        while let Some(entry) = self.heap.peek() {
            if entry.fire_at > now {
                break;
            }
            let Some(entry) = self.heap.pop() else {
                break;
            };
            if self.deadlines.get(&entry.id) != Some(&entry.fire_at) {
                continue;
            }
            self.deadlines.remove(&entry.id);
            self.in_flight.insert(entry.id.clone());
            due.push(entry.id);
        }

        due
    }

    /// A tick finished; queue the window again after `delay`
    pub fn complete(&mut self, id: &WindowRef, now: Instant, delay: Duration) {
        self.in_flight.remove(id);
        self.schedule(id.clone(), now + delay);
    }

    /// Drop a window entirely, e.g. once it has been deleted
    pub fn forget(&mut self, id: &WindowRef) {
        self.in_flight.remove(id);
        self.deadlines.remove(id);
    }

    pub fn contains(&self, id: &WindowRef) -> bool {
        self.deadlines.contains_key(id) || self.in_flight.contains(id)
    }

    pub fn is_in_flight(&self, id: &WindowRef) -> bool {
        self.in_flight.contains(id)
    }

    /// Earliest live deadline
    pub fn next_deadline(&mut self) -> Option<Instant> {
        while let Some(entry) = self.heap.peek() {
            if self.deadlines.get(&entry.id) == Some(&entry.fire_at) {
                return Some(entry.fire_at);
            }
            self.heap.pop();
        }
        None
    }

    /// Number of queued windows, not counting in-flight ones
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

#[cfg(test)]
#[path = "requeue_tests.rs"]
mod tests;
