/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! # FerroFIX Session
//!
//! FIX session layer protocol implementation for the FerroFIX engine.
//!
//! This crate provides:
//! - **State machine**: Poll-driven session FSM merging inbound protocol
//!   events and injected wall-clock time
//! - **Sequence tracking**: Gap and duplicate detection with resend recovery
//! - **Heartbeat supervision**: Heartbeat/TestRequest liveness with forced
//!   logout on timeout
//! - **Roles**: Initiator and acceptor handshake policies over a shared core
//! - **Collaborator traits**: Message sink and lifecycle notifier seams
//! - **Configuration**: Session configuration options
//!
//! The core is single-threaded, non-blocking, and never reads a clock: all
//! time arrives through `poll(now)`, which makes every scenario replayable
//! with synthetic timestamps.

pub mod config;
pub mod heartbeat;
pub mod proxy;
pub mod role;
pub mod sequence;
pub mod session;
pub mod state;

#[cfg(test)]
mod testutil;

pub use config::{SessionConfig, SessionConfigBuilder};
pub use heartbeat::HeartbeatSupervisor;
pub use proxy::{EventNotifier, MessageSink, NoOpNotifier};
pub use role::{Acceptor, AcceptorSession, Initiator, InitiatorSession, Role};
pub use sequence::{SequenceTracker, Sequencing};
pub use session::{LogonEvent, MessageKind, Session, SessionCore};
pub use state::{DisconnectReason, SessionState};
