//! Time budget of a cooperative scheduling slice.

use std::time::{Duration, Instant};

/// Remaining time in a scheduling slice.
///
/// `time_remaining() <= 0.0` means "yield now".
pub trait Deadline {
    /// Remaining budget, in milliseconds.
    fn time_remaining(&self) -> f64;
}

impl<F> Deadline for F
where
    F: Fn() -> f64,
{
    fn time_remaining(&self) -> f64 {
        self()
    }
}

/// A budget that never runs out. Used to drain work at synchronisation points.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl Deadline for Unbounded {
    fn time_remaining(&self) -> f64 {
        f64::INFINITY
    }
}

/// Budget ending at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct InstantDeadline {
    end: Instant,
}

impl InstantDeadline {
    /// Budget of `budget` starting now.
    pub fn after(budget: Duration) -> Self {
        Self {
            end: Instant::now() + budget,
        }
    }
}

impl Deadline for InstantDeadline {
    fn time_remaining(&self) -> f64 {
        let now = Instant::now();
        if now >= self.end {
            0.0
        } else {
            (self.end - now).as_secs_f64() * 1000.0
        }
    }
}
