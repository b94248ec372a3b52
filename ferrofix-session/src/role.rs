/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Session roles: who initiates the logon handshake and how activation is
//! reported.
//!
//! The inheritance the protocol suggests (a base session specialized by
//! initiator/acceptor subclasses) is expressed here as a small capability
//! trait. All sequencing, heartbeat, and resend logic lives in the shared
//! core; a [`Role`] contributes only the handshake tick, inbound-Logon
//! dispatch, and the activation callback — none of which sit on the hot
//! per-message path.

use crate::proxy::{EventNotifier, MessageSink};
use crate::session::{LogonEvent, MessageKind, SessionCore};
use crate::state::SessionState;
use ferrofix_core::error::SessionError;
use ferrofix_core::types::{SessionIdentity, Timestamp};
use tracing::{debug, warn};

/// Handshake policy of a session.
pub trait Role {
    /// State a session starts in before any event or tick.
    fn initial_state() -> SessionState
    where
        Self: Sized;

    /// Time-driven handshake step, run on every poll before the shared
    /// timers. Returns the number of actions taken.
    fn on_handshake_tick<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        now: Timestamp,
    ) -> u32;

    /// Inbound Logon dispatch.
    fn on_logon<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        event: &LogonEvent,
        now: Timestamp,
    );

    /// Called once when the session becomes active, so the role can report
    /// which of potentially many pending sessions completed its handshake.
    fn on_activated(&mut self, identity: &SessionIdentity);
}

/// Active role: connects out and sends the first Logon.
#[derive(Debug, Default)]
pub struct Initiator {
    logon_sent_at: Option<Timestamp>,
}

impl Initiator {
    /// Creates a new initiator role.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Role for Initiator {
    fn initial_state() -> SessionState {
        SessionState::Connected
    }

    fn on_handshake_tick<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        now: Timestamp,
    ) -> u32 {
        match core.state() {
            SessionState::Connected => {
                core.send_logon_msg(now);
                core.set_state(SessionState::SentLogon);
                self.logon_sent_at = Some(now);
                debug!("logon sent");
                1
            }
            SessionState::SentLogon => {
                let timeout_ms = core.config().logon_timeout.as_millis() as u64;
                match self.logon_sent_at {
                    Some(sent_at) if now.millis_since(sent_at) >= timeout_ms => {
                        core.send_logon_msg(now);
                        self.logon_sent_at = Some(now);
                        debug!("logon unanswered, re-sent");
                        1
                    }
                    _ => 0,
                }
            }
            _ => 0,
        }
    }

    fn on_logon<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        event: &LogonEvent,
        now: Timestamp,
    ) {
        match core.state() {
            SessionState::SentLogon => {
                core.note_inbound(now);
                if event.reset_seq_num {
                    core.apply_sequence_reset();
                }
                if !event.msg_seq_num.is_valid() {
                    core.reject_invalid_seq(event.msg_seq_num, now);
                    return;
                }
                if event.msg_seq_num == core.expected_received() {
                    core.mark_received_in_order(event.msg_seq_num);
                    core.adopt_counterparty(event);
                    core.enter_active();
                } else {
                    // Out-of-order Logon: adopt the counterparty, then let
                    // generic sequencing open the recovery path.
                    core.adopt_counterparty(event);
                    core.sequence_message(event.msg_seq_num, false, MessageKind::Application, now);
                }
            }
            SessionState::Disconnected | SessionState::LoggingOut => {}
            _ => core.violation(&SessionError::DuplicateLogon, now),
        }
    }

    fn on_activated(&mut self, identity: &SessionIdentity) {
        debug!(%identity, "initiator session active");
    }
}

/// Passive role: waits for the counterparty's Logon and answers it.
#[derive(Debug, Default)]
pub struct Acceptor;

impl Acceptor {
    /// Creates a new acceptor role.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Role for Acceptor {
    fn initial_state() -> SessionState {
        SessionState::AwaitingLogon
    }

    fn on_handshake_tick<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        now: Timestamp,
    ) -> u32 {
        if core.state() == SessionState::AwaitingLogon {
            let timeout_ms = core.config().logon_timeout.as_millis() as u64;
            let elapsed_ms = now.millis_since(core.created_at());
            if elapsed_ms >= timeout_ms {
                warn!(
                    %elapsed_ms,
                    "no logon received within the logon timeout, disconnecting"
                );
                core.disconnect(crate::state::DisconnectReason::LogonTimeout);
                return 1;
            }
        }
        0
    }

    fn on_logon<S: MessageSink, N: EventNotifier>(
        &mut self,
        core: &mut SessionCore<S, N>,
        event: &LogonEvent,
        now: Timestamp,
    ) {
        match core.state() {
            SessionState::AwaitingLogon => {
                core.note_inbound(now);
                if event.reset_seq_num {
                    core.apply_sequence_reset();
                }
                if !event.msg_seq_num.is_valid() {
                    core.reject_invalid_seq(event.msg_seq_num, now);
                    return;
                }

                let min_ms = core.config().min_heartbeat_interval.as_millis() as u64;
                let max_ms = core.config().max_heartbeat_interval.as_millis() as u64;
                if event.heartbeat_interval_ms < min_ms || event.heartbeat_interval_ms > max_ms {
                    let err = SessionError::HeartbeatIntervalOutOfBounds {
                        proposed_ms: event.heartbeat_interval_ms,
                        min_ms,
                        max_ms,
                    };
                    core.violation(&err, now);
                    return;
                }

                let expected = core.expected_received();
                if event.msg_seq_num == expected {
                    core.mark_received_in_order(event.msg_seq_num);
                    core.adopt_counterparty(event);
                    core.send_logon_reply(event, now);
                    core.enter_active();
                } else if event.msg_seq_num > expected {
                    // Answer the logon first, then recover the gap.
                    core.adopt_counterparty(event);
                    core.send_logon_reply(event, now);
                    core.sequence_message(event.msg_seq_num, false, MessageKind::Application, now);
                } else {
                    let err = SessionError::SequenceTooLow {
                        expected: expected.value(),
                        received: event.msg_seq_num.value(),
                    };
                    core.violation(&err, now);
                }
            }
            SessionState::Disconnected | SessionState::LoggingOut => {}
            _ => core.violation(&SessionError::DuplicateLogon, now),
        }
    }

    fn on_activated(&mut self, identity: &SessionIdentity) {
        debug!(%identity, "acceptor session active");
    }
}

/// A session in the initiator role.
pub type InitiatorSession<S, N> = crate::session::Session<Initiator, S, N>;

/// A session in the acceptor role.
pub type AcceptorSession<S, N> = crate::session::Session<Acceptor, S, N>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::Session;
    use crate::state::DisconnectReason;
    use crate::testutil::{RecordingNotifier, RecordingSink, Sent};
    use ferrofix_core::types::{CompId, ConnectionId, SeqNum, SessionId, SessionKey, Timestamp};
    use std::sync::Arc;
    use std::time::Duration;

    const T0: Timestamp = Timestamp::from_millis(50_000);

    fn test_config() -> SessionConfig {
        SessionConfig::new(
            CompId::new("LOCAL").unwrap(),
            CompId::new("REMOTE").unwrap(),
            "FIX.4.4",
        )
        .with_heartbeat_interval(Duration::from_secs(30))
        .with_logon_timeout(Duration::from_secs(10))
    }

    fn logon_event(seq: u64, heartbeat_ms: u64) -> LogonEvent {
        LogonEvent {
            heartbeat_interval_ms: heartbeat_ms,
            msg_seq_num: SeqNum::new(seq),
            session_id: SessionId::new(3),
            session_key: SessionKey::new(
                CompId::new("REMOTE").unwrap(),
                CompId::new("LOCAL").unwrap(),
            ),
            reset_seq_num: false,
        }
    }

    fn new_session<R: Role>(
        role: R,
    ) -> (
        Session<R, RecordingSink, RecordingNotifier>,
        Arc<RecordingSink>,
        Arc<RecordingNotifier>,
    ) {
        let sink = Arc::new(RecordingSink::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Session::new(
            test_config(),
            ConnectionId::new(9),
            role,
            Arc::clone(&sink),
            Arc::clone(&notifier),
            T0,
        );
        (session, sink, notifier)
    }

    #[test]
    fn test_initial_states() {
        assert_eq!(Initiator::initial_state(), SessionState::Connected);
        assert_eq!(Acceptor::initial_state(), SessionState::AwaitingLogon);
    }

    #[test]
    fn test_initiator_resends_logon_after_timeout() {
        let (mut session, sink, _) = new_session(Initiator::new());

        assert_eq!(session.poll(T0), 1);
        assert_eq!(session.poll(T0.plus_millis(9_999)), 0);
        assert_eq!(session.poll(T0.plus_millis(10_000)), 1);

        let sent = sink.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(sent[0], Sent::Logon { seq: 1, .. }));
        assert!(matches!(sent[1], Sent::Logon { seq: 2, .. }));
        assert_eq!(session.state(), SessionState::SentLogon);
    }

    #[test]
    fn test_acceptor_disconnects_when_no_logon_arrives() {
        let (mut session, sink, notifier) = new_session(Acceptor::new());

        assert_eq!(session.poll(T0.plus_millis(9_999)), 0);
        assert_eq!(session.poll(T0.plus_millis(10_000)), 1);

        assert_eq!(session.state(), SessionState::Disconnected);
        assert_eq!(sink.count(), 0);
        assert_eq!(
            notifier.disconnect_reason(),
            Some(DisconnectReason::LogonTimeout)
        );
    }

    #[test]
    fn test_acceptor_rejects_out_of_bounds_heartbeat() {
        let (mut session, sink, _) = new_session(Acceptor::new());

        // 500 seconds is beyond the default 120 second ceiling.
        session.on_logon(&logon_event(1, 500_000), T0.plus_millis(5));

        assert_eq!(session.state(), SessionState::LoggingOut);
        assert!(matches!(
            &sink.sent()[0],
            Sent::Logout { reason, .. } if reason.contains("heartbeat interval")
        ));
    }

    #[test]
    fn test_acceptor_logon_with_gap_answers_then_recovers() {
        let (mut session, sink, notifier) = new_session(Acceptor::new());

        // First logon carries sequence 3: 1..=2 were lost.
        session.on_logon(&logon_event(3, 30_000), T0.plus_millis(5));

        assert_eq!(session.state(), SessionState::AwaitingResend);
        let sent = sink.sent();
        assert!(matches!(sent[0], Sent::Logon { seq: 1, .. }));
        assert!(matches!(
            sent[1],
            Sent::ResendRequest {
                begin: 1,
                end: 2,
                ..
            }
        ));
        // Activation is reported only once the gap closes.
        assert_eq!(notifier.active_count(), 0);

        session.on_message(SeqNum::new(1), true, T0.plus_millis(10));
        session.on_message(SeqNum::new(2), true, T0.plus_millis(11));

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.expected_received_seq_num().value(), 4);
        assert_eq!(notifier.active_count(), 1);
    }

    #[test]
    fn test_acceptor_rejects_non_positive_logon_sequence() {
        let (mut session, sink, _) = new_session(Acceptor::new());

        session.on_logon(&logon_event(0, 30_000), T0.plus_millis(5));

        assert_eq!(session.state(), SessionState::LoggingOut);
        let sent = sink.sent();
        assert!(matches!(sent[0], Sent::Reject { ref_seq: 0, .. }));
        assert!(matches!(sent[1], Sent::Logout { .. }));
    }

    #[test]
    fn test_initiator_logon_with_gap_enters_recovery() {
        let (mut session, sink, notifier) = new_session(Initiator::new());
        session.poll(T0);

        // The counterparty's logon reply jumps to 4: its 1..=3 were lost.
        session.on_logon(&logon_event(4, 30_000), T0.plus_millis(5));

        assert_eq!(session.state(), SessionState::AwaitingResend);
        let sent = sink.sent();
        assert!(matches!(
            sent[1],
            Sent::ResendRequest {
                begin: 1,
                end: 3,
                ..
            }
        ));
        assert_eq!(notifier.active_count(), 0);

        for seq in 1..=3u64 {
            session.on_message(SeqNum::new(seq), true, T0.plus_millis(10 + seq));
        }

        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.expected_received_seq_num().value(), 5);
        assert_eq!(notifier.active_count(), 1);
        assert_eq!(session.heartbeat_interval_ms(), 30_000);
    }
}
