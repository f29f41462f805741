//! Simulation clock and per-tick context.
//!
//! The clock is the single source of truth for simulated time. It counts
//! ticks and accumulates the elapsed duration; each call to
//! [`SimClock::advance`] produces the [`SimContext`] handed to every state
//! machine during that tick. Nothing in the simulation reads time from
//! anywhere else.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,

    /// Accumulated simulated time would overflow.
    #[error("elapsed time overflow")]
    ElapsedOverflow,
}

/// Read-only view of simulated time for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimContext {
    /// Current tick number (the first advanced tick is 1).
    pub tick: u64,
    /// Simulated time covered by this tick.
    pub delta: Duration,
    /// Total simulated time including this tick.
    pub elapsed: Duration,
}

/// Tick counter plus accumulated simulated time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    tick: u64,
    elapsed: Duration,
}

impl SimClock {
    /// A clock at tick 0 with nothing elapsed.
    pub const fn new() -> Self {
        Self {
            tick: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Restore a clock from saved parts.
    pub const fn from_parts(tick: u64, elapsed: Duration) -> Self {
        Self { tick, elapsed }
    }

    /// Advance by one tick covering `delta` of simulated time.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] or [`ClockError::ElapsedOverflow`]
    /// if either counter would overflow. The clock is unchanged on error.
    pub fn advance(&mut self, delta: Duration) -> Result<SimContext, ClockError> {
        let tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        let elapsed = self
            .elapsed
            .checked_add(delta)
            .ok_or(ClockError::ElapsedOverflow)?;
        self.tick = tick;
        self.elapsed = elapsed;
        Ok(self.context(delta))
    }

    /// Context for the current tick without advancing.
    pub const fn context(&self, delta: Duration) -> SimContext {
        SimContext {
            tick: self.tick,
            delta,
            elapsed: self.elapsed,
        }
    }

    /// Current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Total simulated time.
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
