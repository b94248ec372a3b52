/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! The polling duty cycle.
//!
//! Sessions are passive: all time-driven behavior happens inside
//! `poll(now)`. [`DutyCycle`] owns a set of live sessions, samples its
//! [`Clock`] once per pass, and polls each session with that timestamp. The
//! per-pass action count decides whether to keep busy-polling or back off;
//! an idle pass costs one short sleep, never a spin.
//!
//! Sessions are independent: an error inside one session's processing never
//! affects another's state, and no cross-session ordering is guaranteed.

use crate::clock::Clock;
use ferrofix_core::types::{SessionIdentity, Timestamp};
use ferrofix_session::proxy::{EventNotifier, MessageSink};
use ferrofix_session::role::Role;
use ferrofix_session::session::Session;
use ferrofix_session::state::SessionState;
use std::time::Duration;
use tracing::debug;

/// Object-safe view of a session the duty cycle can drive.
pub trait Pollable {
    /// Advances time-driven behavior; returns the number of actions taken.
    fn poll(&mut self, now: Timestamp) -> u32;

    /// Current protocol state.
    fn state(&self) -> SessionState;

    /// Current identity bundle.
    fn identity(&self) -> SessionIdentity;
}

impl<R, S, N> Pollable for Session<R, S, N>
where
    R: Role,
    S: MessageSink,
    N: EventNotifier,
{
    fn poll(&mut self, now: Timestamp) -> u32 {
        Session::poll(self, now)
    }

    fn state(&self) -> SessionState {
        Session::state(self)
    }

    fn identity(&self) -> SessionIdentity {
        Session::identity(self)
    }
}

/// Polls a set of sessions against a shared clock.
pub struct DutyCycle<C: Clock> {
    clock: C,
    sessions: Vec<Box<dyn Pollable + Send>>,
    idle_backoff: Duration,
}

impl<C: Clock> DutyCycle<C> {
    /// Creates a duty cycle with the given clock and idle backoff.
    #[must_use]
    pub fn new(clock: C, idle_backoff: Duration) -> Self {
        Self {
            clock,
            sessions: Vec::new(),
            idle_backoff,
        }
    }

    /// Registers a session for polling.
    pub fn add_session(&mut self, session: Box<dyn Pollable + Send>) {
        self.sessions.push(session);
    }

    /// Number of registered sessions, terminal ones included.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Returns true once every registered session is terminal.
    #[must_use]
    pub fn all_terminal(&self) -> bool {
        self.sessions.iter().all(|s| s.state().is_terminal())
    }

    /// Runs one polling pass over every session.
    ///
    /// Returns the total number of actions taken; zero means the pass was
    /// idle and the caller may yield.
    pub fn pass(&mut self) -> u32 {
        let now = self.clock.now();
        self.sessions.iter_mut().map(|s| s.poll(now)).sum()
    }

    /// Drops sessions that reached their terminal state.
    ///
    /// A disconnected session never re-emits traffic; reconnecting means
    /// registering a brand new session.
    pub fn remove_disconnected(&mut self) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|s| {
            let terminal = s.state().is_terminal();
            if terminal {
                debug!(identity = %s.identity(), "pruning disconnected session");
            }
            !terminal
        });
        before - self.sessions.len()
    }

    /// Polls until every registered session has disconnected.
    ///
    /// Busy passes yield to the runtime; idle passes sleep for the configured
    /// backoff so a quiet engine does not spin.
    pub async fn run(&mut self) {
        while !self.all_terminal() {
            let actions = self.pass();
            if actions == 0 {
                tokio::time::sleep(self.idle_backoff).await;
            } else {
                tokio::task::yield_now().await;
            }
        }
    }
}
