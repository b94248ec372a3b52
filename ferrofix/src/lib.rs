/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! # FerroFIX
//!
//! A FIX session-layer protocol engine for Rust.
//!
//! FerroFIX establishes, maintains, and recovers ordered,
//! heartbeat-supervised FIX sessions: logon handshake, sequence-numbered
//! delivery, gap detection and resend, heartbeat/test-request liveness, and
//! graceful or forced logout. Wire encoding, transport, and persistence are
//! deliberately out of scope — the engine operates on decoded session-layer
//! fields and talks to its surroundings through sink and notifier seams.
//!
//! ## Design
//!
//! - **Poll-driven**: A session is a passive state machine; all time-driven
//!   behavior runs inside `poll(now)` with an injected timestamp, so every
//!   scenario replays deterministically under synthetic clocks
//! - **Single-threaded**: No internal threads, locks, or blocking calls in
//!   the core; a session is owned by exactly one polling context
//! - **Role-parameterized**: Initiator and acceptor differ only in handshake
//!   policy; sequencing, heartbeating, and recovery are shared
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ferrofix::prelude::*;
//!
//! let sink = Arc::new(BufferingSink::new());
//! let session = Session::new(
//!     SessionConfig::new(
//!         CompId::new("BUY").unwrap(),
//!         CompId::new("SELL").unwrap(),
//!         "FIX.4.4",
//!     ),
//!     ConnectionId::new(1),
//!     Initiator::new(),
//!     Arc::clone(&sink),
//!     Arc::new(LoggingNotifier),
//!     clock.now(),
//! );
//!
//! let mut cycle = EngineBuilder::new().add_session(Box::new(session)).build();
//! cycle.run().await;
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`]: Identity, sequencing, and time types plus the error hierarchy
//! - [`session`]: The session state machine, sequence tracker, heartbeat
//!   supervisor, and roles
//! - [`engine`]: Duty cycle, clocks, buffering sink, and notifiers

pub mod core {
    //! Core types and error definitions.
    pub use ferrofix_core::*;
}

pub mod session {
    //! Session layer state machine and recovery.
    pub use ferrofix_session::*;
}

pub mod engine {
    //! Duty cycle and collaborator implementations.
    pub use ferrofix_engine::*;
}

/// Commonly used items.
pub mod prelude {
    pub use ferrofix_core::error::{FixError, Result, SessionError};
    pub use ferrofix_core::types::{
        CompId, ConnectionId, SeqNum, SessionId, SessionIdentity, SessionKey, Timestamp,
    };
    pub use ferrofix_engine::{
        BufferingSink, Clock, DutyCycle, EngineBuilder, LoggingNotifier, ManualClock,
        OutboundMessage, SystemClock,
    };
    pub use ferrofix_session::{
        Acceptor, AcceptorSession, DisconnectReason, EventNotifier, Initiator, InitiatorSession,
        LogonEvent, MessageSink, Session, SessionConfig, SessionState,
    };
}
