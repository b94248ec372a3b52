/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! # FerroFIX Engine
//!
//! Duty cycle and collaborator implementations for FerroFIX sessions.
//!
//! This crate provides the surroundings the session core is polled from:
//! - **Duty cycle**: Polls registered sessions against a shared clock,
//!   backing off when a pass takes no actions
//! - **Clocks**: Wall-clock and manually driven time sources
//! - **Buffering sink**: Lock-guarded outbound queue drained by the
//!   transport layer
//! - **Notifiers**: Lifecycle event reporting
//! - **Builder API**: Fluent engine setup

pub mod builder;
pub mod clock;
pub mod duty_cycle;
pub mod notify;
pub mod sink;

pub use builder::EngineBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use duty_cycle::{DutyCycle, Pollable};
pub use notify::LoggingNotifier;
pub use sink::{BufferingSink, OutboundMessage};
