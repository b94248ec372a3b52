/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Engine builder for fluent configuration.

use crate::clock::{Clock, SystemClock};
use crate::duty_cycle::{DutyCycle, Pollable};
use std::time::Duration;

/// Builder for a [`DutyCycle`].
pub struct EngineBuilder<C: Clock = SystemClock> {
    clock: C,
    idle_backoff: Duration,
    sessions: Vec<Box<dyn Pollable + Send>>,
}

impl EngineBuilder<SystemClock> {
    /// Creates a builder polling against the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            clock: SystemClock,
            idle_backoff: Duration::from_millis(1),
            sessions: Vec::new(),
        }
    }
}

impl Default for EngineBuilder<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> EngineBuilder<C> {
    /// Swaps the time source (synthetic clocks in tests).
    #[must_use]
    pub fn with_clock<D: Clock>(self, clock: D) -> EngineBuilder<D> {
        EngineBuilder {
            clock,
            idle_backoff: self.idle_backoff,
            sessions: self.sessions,
        }
    }

    /// Sets how long an idle pass sleeps before the next one.
    #[must_use]
    pub const fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff;
        self
    }

    /// Registers a session for polling.
    #[must_use]
    pub fn add_session(mut self, session: Box<dyn Pollable + Send>) -> Self {
        self.sessions.push(session);
        self
    }

    /// Builds the duty cycle.
    #[must_use]
    pub fn build(self) -> DutyCycle<C> {
        let mut cycle = DutyCycle::new(self.clock, self.idle_backoff);
        for session in self.sessions {
            cycle.add_session(session);
        }
        cycle
    }
}
