//! Cooperative deadline, checked by the search algorithms between recursion frames.

use std::time::{Duration, Instant};

crate::prelude!();

/// A wall-clock deadline, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    end: Option<Instant>,
}
impl Deadline {
    /// No deadline.
    pub fn none() -> Self {
        Self { end: None }
    }
    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self {
            end: Instant::now().checked_add(timeout),
        }
    }
    /// Deadline from an optional timeout.
    pub fn from_timeout(timeout: Option<Duration>) -> Self {
        timeout.map(Self::after).unwrap_or_else(Self::none)
    }

    /// True if the deadline is passed.
    pub fn is_over(&self) -> bool {
        self.end.map(|end| Instant::now() >= end).unwrap_or(false)
    }

    /// Fails with [`ErrorKind::Timeout`] if the deadline is passed.
    pub fn check(&self) -> Res<()> {
        if self.is_over() {
            Err(ErrorKind::Timeout.into())
        } else {
            Ok(())
        }
    }
}
impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}
