/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! # FerroFIX Core
//!
//! Core types and error definitions for the FerroFIX session engine.
//!
//! This crate provides the building blocks shared across the workspace:
//! - **Error types**: Unified error handling with `thiserror`
//! - **Core types**: `SeqNum`, `Timestamp`, `CompId`, `SessionKey`,
//!   `ConnectionId`, `SessionId`, `SessionIdentity`
//!
//! The session state machine itself lives in `ferrofix-session`; this crate
//! deliberately contains no protocol logic so that collaborators (sinks,
//! notifiers, transports) can depend on the vocabulary types alone.

pub mod error;
pub mod types;

pub use error::{FixError, Result, SessionError};
pub use types::{
    CompId, ConnectionId, SeqNum, SessionId, SessionIdentity, SessionKey, Timestamp,
};
