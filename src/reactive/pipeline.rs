use std::time::{Duration, Instant};

use super::{debounce::Debounce, distinct::DistinctUntilChanged};

/// Debounce followed by duplicate suppression.
///
/// A value reaches the consumer only after `delay` of inactivity and only when it
/// differs from the previous value that reached it.
#[derive(Debug, Clone)]
pub struct QuietPeriod<T> {
    debounce: Debounce<T>,
    distinct: DistinctUntilChanged<T>,
}

impl<T: PartialEq + Clone> QuietPeriod<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            debounce: Debounce::new(delay),
            distinct: DistinctUntilChanged::new(),
        }
    }

    pub fn push(&mut self, value: T, at: Instant) {
        self.debounce.push(value, at);
    }

    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let settled = self.debounce.poll(now)?;
        self.distinct.accept(settled)
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// Drops the pending value and forgets the last emitted one.
    pub fn cancel(&mut self) {
        self.debounce.cancel();
        self.distinct.reset();
    }
}
