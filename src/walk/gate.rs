//! Bounded-permit limiter shared by an entire walk

use std::sync::{Condvar, Mutex, PoisonError};

/// Caps the number of traversal units running at once.
///
/// An unlimited gate hands out permits without any bookkeeping. A gate with
/// a limit of one behaves like a mutex.
#[derive(Debug)]
pub struct Gate {
    limit: Option<usize>,
    active: Mutex<usize>,
    released: Condvar,
}

/// A held permit; released on drop.
#[derive(Debug)]
#[must_use = "the permit is released as soon as it is dropped"]
pub struct Permit<'g> {
    gate: &'g Gate,
}

impl Gate {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            limit,
            active: Mutex::new(0),
            released: Condvar::new(),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Block until a permit is available.
    pub fn acquire(&self) -> Permit<'_> {
        if let Some(limit) = self.limit {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            while *active >= limit {
                active = self
                    .released
                    .wait(active)
                    .unwrap_or_else(PoisonError::into_inner);
            }
            *active += 1;
        }
        Permit { gate: self }
    }

    /// Number of permits currently held. Always 0 for an unlimited gate.
    pub fn active(&self) -> usize {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        if self.limit.is_some() {
            let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
            *active -= 1;
            drop(active);
            self.released.notify_one();
        }
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.gate.release();
    }
}
