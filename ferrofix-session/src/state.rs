/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Session protocol states and disconnect reasons.
//!
//! The session state machine is a tagged enum driven by `(state, event)`
//! dispatch in the session module; this module holds the vocabulary. Every
//! transition is a total, deterministic function — including "ignore" — and
//! [`SessionState::Disconnected`] is terminal: a disconnected session never
//! re-emits outbound traffic and must be replaced to reconnect.

use std::fmt;

/// Protocol state of a FIX session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Transport up, no logon exchanged yet (initiator before first poll).
    Connected,
    /// Initiator sent Logon, awaiting the counterparty's response.
    SentLogon,
    /// Acceptor holds a fresh connection, awaiting the counterparty's Logon.
    AwaitingLogon,
    /// Logon complete, application traffic flows.
    Active,
    /// Gap detected, a ResendRequest is outstanding.
    AwaitingResend,
    /// Logout sent, awaiting acknowledgment or timeout.
    LoggingOut,
    /// Terminal. No further outbound traffic, all events ignored.
    Disconnected,
}

impl SessionState {
    /// Returns the state name used in logs and error text.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::SentLogon => "sent-logon",
            Self::AwaitingLogon => "awaiting-logon",
            Self::Active => "active",
            Self::AwaitingResend => "awaiting-resend",
            Self::LoggingOut => "logging-out",
            Self::Disconnected => "disconnected",
        }
    }

    /// Returns true if the logon handshake has completed on this connection.
    #[must_use]
    pub const fn is_established(self) -> bool {
        matches!(self, Self::Active | Self::AwaitingResend)
    }

    /// Returns true if this is the terminal state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a session reached [`SessionState::Disconnected`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisconnectReason {
    /// Counterparty initiated a Logout and we acknowledged it.
    RemoteLogout,
    /// Local party initiated the Logout and it completed.
    LocalLogout,
    /// Counterparty never completed the logon handshake.
    LogonTimeout,
    /// Counterparty never acknowledged our Logout.
    LogoutTimeout,
    /// TestRequest went unanswered for the grace period.
    HeartbeatTimeout,
    /// Counterparty violated the session protocol.
    ProtocolViolation,
    /// Transport failure reported by the surrounding system.
    TransportFailure,
}

impl DisconnectReason {
    /// Returns the reason name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RemoteLogout => "remote-logout",
            Self::LocalLogout => "local-logout",
            Self::LogonTimeout => "logon-timeout",
            Self::LogoutTimeout => "logout-timeout",
            Self::HeartbeatTimeout => "heartbeat-timeout",
            Self::ProtocolViolation => "protocol-violation",
            Self::TransportFailure => "transport-failure",
        }
    }
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_classification() {
        assert!(SessionState::Active.is_established());
        assert!(SessionState::AwaitingResend.is_established());
        assert!(!SessionState::Connected.is_established());
        assert!(!SessionState::LoggingOut.is_established());

        assert!(SessionState::Disconnected.is_terminal());
        assert!(!SessionState::Active.is_terminal());
    }

    #[test]
    fn test_state_display() {
        assert_eq!(SessionState::AwaitingResend.to_string(), "awaiting-resend");
        assert_eq!(SessionState::SentLogon.to_string(), "sent-logon");
    }

    #[test]
    fn test_disconnect_reason_display() {
        assert_eq!(DisconnectReason::HeartbeatTimeout.to_string(), "heartbeat-timeout");
        assert_eq!(DisconnectReason::RemoteLogout.to_string(), "remote-logout");
    }
}
