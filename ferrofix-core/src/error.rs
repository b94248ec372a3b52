/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Error types for the FerroFIX session engine.
//!
//! This module provides a unified error hierarchy using `thiserror` for
//! typed, domain-specific errors. Session-layer failures split into three
//! families: protocol violations (always answered with a Logout carrying the
//! reason text), timeouts (forced progress toward disconnect), and transport
//! failures (immediate disconnect, no further sends).

use thiserror::Error;

/// Result type alias using [`FixError`] as the error type.
pub type Result<T> = std::result::Result<T, FixError>;

/// Top-level error type for all FerroFIX operations.
#[derive(Debug, Error)]
pub enum FixError {
    /// Error in session layer operations.
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// I/O error from the surrounding transport.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors in FIX session layer operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Sequence number lower than expected without PossDupFlag.
    #[error("msgseqnum too low: expected {expected}, received {received}")]
    SequenceTooLow {
        /// Minimum expected sequence number.
        expected: u64,
        /// Received sequence number.
        received: u64,
    },

    /// Sequence number is not a positive integer.
    #[error("invalid msgseqnum: {received}, must be positive")]
    InvalidSequenceNumber {
        /// Received sequence number.
        received: u64,
    },

    /// Logon received on a session that already completed its handshake.
    #[error("logon received while session already active")]
    DuplicateLogon,

    /// Proposed heartbeat interval outside the accepted bounds.
    #[error("heartbeat interval {proposed_ms} ms outside accepted range {min_ms}..={max_ms} ms")]
    HeartbeatIntervalOutOfBounds {
        /// Proposed interval in milliseconds.
        proposed_ms: u64,
        /// Minimum accepted interval in milliseconds.
        min_ms: u64,
        /// Maximum accepted interval in milliseconds.
        max_ms: u64,
    },

    /// No answer to an outstanding TestRequest within the grace period.
    #[error("heartbeat timeout after {elapsed_ms} ms without inbound traffic")]
    HeartbeatTimeout {
        /// Milliseconds since the last inbound message.
        elapsed_ms: u64,
    },

    /// Counterparty never completed the logon handshake.
    #[error("logon timeout after {elapsed_ms} ms")]
    LogonTimeout {
        /// Milliseconds since the handshake began.
        elapsed_ms: u64,
    },

    /// Counterparty never acknowledged a Logout.
    #[error("logout not acknowledged after {elapsed_ms} ms")]
    LogoutTimeout {
        /// Milliseconds since the Logout was sent.
        elapsed_ms: u64,
    },

    /// Transport failure detected by the surrounding system.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Operation invalid in the current session state.
    #[error("invalid operation {operation} in state {state}")]
    InvalidState {
        /// The attempted operation.
        operation: &'static str,
        /// The state the session was in.
        state: &'static str,
    },

    /// Session configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Returns true if this error is a counterparty protocol violation.
    ///
    /// Protocol violations are answered with a Logout carrying the reason
    /// text; they never abort the process.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::SequenceTooLow { .. }
                | Self::InvalidSequenceNumber { .. }
                | Self::DuplicateLogon
                | Self::HeartbeatIntervalOutOfBounds { .. }
        )
    }

    /// Returns true if this error is a liveness or handshake timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::HeartbeatTimeout { .. } | Self::LogonTimeout { .. } | Self::LogoutTimeout { .. }
        )
    }
}
