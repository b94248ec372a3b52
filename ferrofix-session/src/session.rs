/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! The session protocol state machine.
//!
//! [`SessionCore`] merges the two event sources a FIX session lives on:
//! inbound protocol events delivered through the `on_*` methods, and
//! wall-clock progress delivered through `poll`. It owns the
//! [`SequenceTracker`] and [`HeartbeatSupervisor`], holds the authoritative
//! [`SessionState`], and emits every outbound administrative message through
//! the injected [`MessageSink`].
//!
//! [`Session`] wraps the core together with a [`Role`] implementation
//! (initiator or acceptor); the role contributes only handshake initiation
//! and activation reporting, everything else is shared.
//!
//! Gap recovery: on a sequence gap the session emits one ResendRequest for
//! the missing range and enters `AwaitingResend`. Messages that arrive ahead
//! of the expectation while the gap is open are queued, not discarded, and
//! replayed in strict arrival order once the counterparty's replay has filled
//! the gap.

use crate::config::SessionConfig;
use crate::heartbeat::{HeartbeatSupervisor, test_req_id_at};
use crate::proxy::{EventNotifier, MessageSink};
use crate::role::Role;
use crate::sequence::{SequenceTracker, Sequencing};
use crate::state::{DisconnectReason, SessionState};
use ferrofix_core::error::SessionError;
use ferrofix_core::types::{ConnectionId, SeqNum, SessionId, SessionIdentity, SessionKey, Timestamp};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Decoded session-layer fields of an inbound Logon.
#[derive(Debug, Clone)]
pub struct LogonEvent {
    /// Heartbeat interval proposed (initiator) or echoed (acceptor reply).
    pub heartbeat_interval_ms: u64,
    /// MsgSeqNum of the Logon itself.
    pub msg_seq_num: SeqNum,
    /// Logical session identity assigned by the surrounding system.
    pub session_id: SessionId,
    /// Counterparty key carried by the Logon.
    pub session_key: SessionKey,
    /// Whether ResetSeqNumFlag (tag 141) was set.
    pub reset_seq_num: bool,
}

/// Kind of an inbound sequenced message, kept for deferred replay.
#[derive(Debug, Clone)]
pub enum MessageKind {
    /// Application-level message; content is handled outside the core.
    Application,
    /// Heartbeat, possibly answering a TestRequest.
    Heartbeat {
        /// Echoed TestReqID, if present.
        test_req_id: Option<String>,
    },
    /// TestRequest soliciting a Heartbeat.
    TestRequest {
        /// TestReqID to echo back.
        test_req_id: String,
    },
}

impl MessageKind {
    /// Returns true for session-administrative kinds.
    ///
    /// Administrative duplicates are tolerated without PossDupFlag; an
    /// application duplicate without the flag is a protocol violation.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        !matches!(self, Self::Application)
    }
}

/// A message received ahead of the expectation while a gap is open.
#[derive(Debug, Clone)]
struct PendingMessage {
    seq: SeqNum,
    poss_dup: bool,
    kind: MessageKind,
}

/// An outstanding ResendRequest.
#[derive(Debug, Clone, Copy)]
struct ResendInFlight {
    /// Last sequence number of the requested range.
    end: SeqNum,
    /// When the request was (last) sent.
    requested_at: Timestamp,
}

/// Whether a dispatched message was fully processed or must be queued.
enum Disposition {
    Consumed,
    Deferred(MessageKind),
}

/// Shared state machine core, independent of session role.
#[derive(Debug)]
pub struct SessionCore<S, N> {
    config: SessionConfig,
    state: SessionState,
    sequences: SequenceTracker,
    heartbeat: HeartbeatSupervisor,
    sink: Arc<S>,
    notifier: Arc<N>,
    connection_id: ConnectionId,
    session_id: Option<SessionId>,
    session_key: Option<SessionKey>,
    activated: bool,
    pending: VecDeque<PendingMessage>,
    resend: Option<ResendInFlight>,
    logout_sent_at: Option<Timestamp>,
    disconnect_reason: Option<DisconnectReason>,
    created_at: Timestamp,
}

impl<S: MessageSink, N: EventNotifier> SessionCore<S, N> {
    fn new(
        config: SessionConfig,
        connection_id: ConnectionId,
        initial_state: SessionState,
        sink: Arc<S>,
        notifier: Arc<N>,
        now: Timestamp,
    ) -> Self {
        let heartbeat = HeartbeatSupervisor::new(config.heartbeat_interval_ms(), now);
        Self {
            config,
            state: initial_state,
            sequences: SequenceTracker::new(),
            heartbeat,
            sink,
            notifier,
            connection_id,
            session_id: None,
            session_key: None,
            activated: false,
            pending: VecDeque::new(),
            resend: None,
            logout_sent_at: None,
            disconnect_reason: None,
            created_at: now,
        }
    }

    /// Returns the current protocol state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the session configuration.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the time the session was constructed.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns true once the activation event has been reported.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        self.activated
    }

    /// Returns the next expected inbound sequence number.
    #[must_use]
    pub const fn expected_received(&self) -> SeqNum {
        self.sequences.expected_received()
    }

    /// Returns the last allocated outbound sequence number.
    #[must_use]
    pub const fn last_sent(&self) -> SeqNum {
        self.sequences.last_sent()
    }

    /// Returns the current identity bundle.
    #[must_use]
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity {
            connection_id: self.connection_id,
            session_id: self.session_id,
            session_key: self.session_key.clone(),
        }
    }

    /// Forces the protocol state. Only roles drive this directly.
    pub fn set_state(&mut self, state: SessionState) {
        debug!(from = %self.state, to = %state, "state transition");
        self.state = state;
    }

    /// Records inbound activity against the liveness clock.
    pub fn note_inbound(&mut self, now: Timestamp) {
        self.heartbeat.on_message_received(now);
    }

    /// Consumes the expected inbound sequence number for an in-order Logon.
    pub fn mark_received_in_order(&mut self, seq: SeqNum) {
        let outcome = self.sequences.on_received(seq);
        debug_assert!(outcome.is_in_order());
    }

    /// Adopts counterparty identity and heartbeat interval from a Logon.
    pub fn adopt_counterparty(&mut self, event: &LogonEvent) {
        self.session_id = Some(event.session_id);
        self.session_key = Some(event.session_key.clone());
        self.heartbeat.set_interval_ms(event.heartbeat_interval_ms);
    }

    /// Resets both sequence directions for an authenticated reset logon.
    pub fn apply_sequence_reset(&mut self) {
        info!(identity = %self.identity(), "sequence numbers reset");
        self.sequences.reset_sent(SeqNum::new(1));
        self.sequences.reset_received(SeqNum::new(1));
    }

    /// Sends a Logon carrying the configured interval and the next sequence number.
    pub fn send_logon_msg(&mut self, now: Timestamp) {
        let seq = self.sequences.next_sent_seq();
        self.sink.send_logon(
            seq,
            self.config.heartbeat_interval_secs(),
            self.config.reset_seq_num_on_logon,
        );
        self.heartbeat.on_message_sent(now);
    }

    /// Sends the acceptor's Logon reply, echoing the adopted interval.
    pub fn send_logon_reply(&mut self, event: &LogonEvent, now: Timestamp) {
        let seq = self.sequences.next_sent_seq();
        self.sink
            .send_logon(seq, event.heartbeat_interval_ms / 1000, event.reset_seq_num);
        self.heartbeat.on_message_sent(now);
    }

    /// Moves to `Active`, reporting activation exactly once per session.
    pub fn enter_active(&mut self) {
        self.state = SessionState::Active;
        if !self.activated {
            self.activated = true;
            info!(identity = %self.identity(), "session active");
            self.notifier.on_session_active(&self.identity());
        }
    }

    /// Answers a protocol violation with a Logout carrying the reason text.
    pub fn violation(&mut self, err: &SessionError, now: Timestamp) {
        warn!(identity = %self.identity(), %err, "protocol violation");
        self.begin_logout(&err.to_string(), DisconnectReason::ProtocolViolation, now);
    }

    /// Rejects a non-positive sequence number, then logs out.
    pub fn reject_invalid_seq(&mut self, received: SeqNum, now: Timestamp) {
        let err = SessionError::InvalidSequenceNumber {
            received: received.value(),
        };
        warn!(identity = %self.identity(), %err, "protocol violation");
        let seq = self.sequences.next_sent_seq();
        self.sink.send_reject(seq, received, &err.to_string());
        self.heartbeat.on_message_sent(now);
        self.begin_logout(&err.to_string(), DisconnectReason::ProtocolViolation, now);
    }

    /// Sends a Logout and starts awaiting acknowledgment.
    pub fn begin_logout(&mut self, reason: &str, outcome: DisconnectReason, now: Timestamp) {
        let seq = self.sequences.next_sent_seq();
        self.sink.send_logout(seq, reason);
        self.heartbeat.on_message_sent(now);
        self.logout_sent_at = Some(now);
        self.disconnect_reason = Some(outcome);
        self.set_state(SessionState::LoggingOut);
    }

    /// Terminal transition. Emits nothing, reports once, ignores repeats.
    pub fn disconnect(&mut self, reason: DisconnectReason) {
        if self.state.is_terminal() {
            return;
        }
        self.state = SessionState::Disconnected;
        self.pending.clear();
        self.resend = None;
        info!(identity = %self.identity(), %reason, "session disconnected");
        self.notifier.on_session_disconnected(&self.identity(), reason);
    }

    /// Sequences an inbound message without the pre-handshake guard.
    ///
    /// Used by roles to delegate out-of-order Logons to generic handling.
    pub fn sequence_message(
        &mut self,
        seq: SeqNum,
        poss_dup: bool,
        kind: MessageKind,
        now: Timestamp,
    ) {
        self.heartbeat.on_message_received(now);
        if !seq.is_valid() {
            self.reject_invalid_seq(seq, now);
            return;
        }
        match self.dispatch_sequenced(seq, poss_dup, kind, now) {
            Disposition::Consumed => self.maybe_close_gap(now),
            Disposition::Deferred(kind) => {
                self.pending.push_back(PendingMessage { seq, poss_dup, kind });
            }
        }
    }

    fn dispatch_sequenced(
        &mut self,
        seq: SeqNum,
        poss_dup: bool,
        kind: MessageKind,
        now: Timestamp,
    ) -> Disposition {
        match self.sequences.on_received(seq) {
            Sequencing::InOrder => {
                self.deliver(kind, now);
                Disposition::Consumed
            }
            Sequencing::Duplicate { expected, received } => {
                if poss_dup || kind.is_admin() {
                    debug!(%expected, %received, "duplicate ignored");
                    Disposition::Consumed
                } else {
                    let err = SessionError::SequenceTooLow {
                        expected: expected.value(),
                        received: received.value(),
                    };
                    self.violation(&err, now);
                    Disposition::Consumed
                }
            }
            Sequencing::Gap { begin, end } => {
                if self.state == SessionState::LoggingOut {
                    debug!(%begin, %end, "gap ignored while logging out");
                    return Disposition::Consumed;
                }
                if self.resend.is_none() {
                    let out_seq = self.sequences.next_sent_seq();
                    debug!(%begin, %end, "sequence gap, requesting resend");
                    self.sink.send_resend_request(out_seq, begin, end);
                    self.heartbeat.on_message_sent(now);
                    self.resend = Some(ResendInFlight {
                        end,
                        requested_at: now,
                    });
                    self.set_state(SessionState::AwaitingResend);
                }
                Disposition::Deferred(kind)
            }
        }
    }

    /// Consumes queued messages once the counterparty's replay filled the gap.
    ///
    /// Replay preserves strict arrival order; a message that opens a fresh
    /// gap goes back to the front of the queue and recovery starts over.
    fn maybe_close_gap(&mut self, now: Timestamp) {
        'outer: loop {
            let Some(resend) = self.resend else { return };
            if self.sequences.expected_received() <= resend.end {
                return;
            }
            self.resend = None;
            debug!(queued = self.pending.len(), "gap closed, replaying queue");
            self.enter_active();
            while let Some(msg) = self.pending.pop_front() {
                match self.dispatch_sequenced(msg.seq, msg.poss_dup, msg.kind, now) {
                    Disposition::Deferred(kind) => {
                        self.pending.push_front(PendingMessage {
                            seq: msg.seq,
                            poss_dup: msg.poss_dup,
                            kind,
                        });
                        continue 'outer;
                    }
                    Disposition::Consumed => {
                        if !self.state.is_established() {
                            self.pending.clear();
                            return;
                        }
                    }
                }
            }
            return;
        }
    }

    fn deliver(&mut self, kind: MessageKind, now: Timestamp) {
        match kind {
            // Content of application messages is handled outside the core.
            MessageKind::Application => {}
            MessageKind::Heartbeat { test_req_id } => {
                self.heartbeat
                    .on_heartbeat_received(now, test_req_id.as_deref());
            }
            MessageKind::TestRequest { test_req_id } => {
                let seq = self.sequences.next_sent_seq();
                self.sink.send_heartbeat(seq, Some(&test_req_id));
                self.heartbeat.on_message_sent(now);
            }
        }
    }

    /// Inbound entry for sequenced non-logon messages, with state guard.
    fn handle_inbound(&mut self, seq: SeqNum, poss_dup: bool, kind: MessageKind, now: Timestamp) {
        match self.state {
            SessionState::Disconnected => {}
            SessionState::Connected | SessionState::AwaitingLogon | SessionState::SentLogon => {
                self.heartbeat.on_message_received(now);
                let err = SessionError::InvalidState {
                    operation: "sequenced message",
                    state: self.state.name(),
                };
                warn!(%err, "message received before logon completed");
                self.begin_logout(
                    "message received before logon completed",
                    DisconnectReason::ProtocolViolation,
                    now,
                );
            }
            SessionState::Active | SessionState::AwaitingResend | SessionState::LoggingOut => {
                self.sequence_message(seq, poss_dup, kind, now);
            }
        }
    }

    /// Inbound Logout: acknowledgment of ours, or a remote-initiated close.
    fn handle_logout(&mut self, now: Timestamp) {
        match self.state {
            SessionState::Disconnected => {}
            SessionState::LoggingOut => {
                self.heartbeat.on_message_received(now);
                let reason = self
                    .disconnect_reason
                    .take()
                    .unwrap_or(DisconnectReason::LocalLogout);
                self.disconnect(reason);
            }
            _ => {
                self.heartbeat.on_message_received(now);
                let seq = self.sequences.next_sent_seq();
                self.sink.send_logout(seq, "acknowledging logout");
                self.heartbeat.on_message_sent(now);
                self.disconnect(DisconnectReason::RemoteLogout);
            }
        }
    }

    /// Local request to close the session gracefully.
    fn request_logout(&mut self, reason: &str, now: Timestamp) {
        match self.state {
            SessionState::Disconnected | SessionState::LoggingOut => {}
            _ => self.begin_logout(reason, DisconnectReason::LocalLogout, now),
        }
    }

    /// Advances every time-driven behavior shared across roles.
    fn poll_timers(&mut self, now: Timestamp) -> u32 {
        match self.state {
            SessionState::Active | SessionState::AwaitingResend => {
                if self.heartbeat.is_timed_out(now) {
                    let err = SessionError::HeartbeatTimeout {
                        elapsed_ms: self.heartbeat.millis_since_received(now),
                    };
                    warn!(identity = %self.identity(), %err, "liveness lost");
                    self.begin_logout(&err.to_string(), DisconnectReason::HeartbeatTimeout, now);
                    return 1;
                }

                let mut actions = 0;
                if self.heartbeat.is_test_request_due(now) {
                    let id = test_req_id_at(now);
                    let seq = self.sequences.next_sent_seq();
                    self.sink.send_test_request(seq, &id);
                    self.heartbeat.on_test_request_sent(id, now);
                    actions += 1;
                }
                if self.heartbeat.is_heartbeat_due(now) {
                    let seq = self.sequences.next_sent_seq();
                    self.sink.send_heartbeat(seq, None);
                    self.heartbeat.on_message_sent(now);
                    actions += 1;
                }
                if self.state == SessionState::AwaitingResend
                    && let Some(resend) = self.resend
                    && now.millis_since(resend.requested_at)
                        >= self.config.resend_request_timeout.as_millis() as u64
                {
                    let begin = self.sequences.expected_received();
                    let seq = self.sequences.next_sent_seq();
                    debug!(%begin, end = %resend.end, "resend request timed out, re-issuing");
                    self.sink.send_resend_request(seq, begin, resend.end);
                    self.heartbeat.on_message_sent(now);
                    self.resend = Some(ResendInFlight {
                        end: resend.end,
                        requested_at: now,
                    });
                    actions += 1;
                }
                actions
            }
            SessionState::LoggingOut => {
                if let Some(sent_at) = self.logout_sent_at
                    && now.millis_since(sent_at) >= self.config.logout_timeout.as_millis() as u64
                {
                    let reason = self
                        .disconnect_reason
                        .take()
                        .unwrap_or(DisconnectReason::LogoutTimeout);
                    warn!(identity = %self.identity(), "logout not acknowledged, disconnecting");
                    self.disconnect(reason);
                    return 1;
                }
                0
            }
            _ => 0,
        }
    }
}

/// A FIX session: shared core plus a role.
///
/// Mutated exclusively through `poll` and the `on_*` event methods, from a
/// single polling context. A session that reached `Disconnected` ignores all
/// further calls; construct a new one to reconnect.
#[derive(Debug)]
pub struct Session<R, S, N> {
    core: SessionCore<S, N>,
    role: R,
}

impl<R: Role, S: MessageSink, N: EventNotifier> Session<R, S, N> {
    /// Creates a session in the role's initial state.
    ///
    /// # Arguments
    /// * `config` - Session configuration
    /// * `connection_id` - Transport connection identity
    /// * `role` - Handshake role (initiator or acceptor)
    /// * `sink` - Outbound message sink, shared with the transport layer
    /// * `notifier` - Lifecycle event notifier
    /// * `now` - Current time
    #[must_use]
    pub fn new(
        config: SessionConfig,
        connection_id: ConnectionId,
        role: R,
        sink: Arc<S>,
        notifier: Arc<N>,
        now: Timestamp,
    ) -> Self {
        let core = SessionCore::new(config, connection_id, R::initial_state(), sink, notifier, now);
        Self { core, role }
    }

    /// Advances all time-driven behavior.
    ///
    /// Returns the number of actions taken; zero means nothing was due and
    /// the call had no observable side effect.
    pub fn poll(&mut self, now: Timestamp) -> u32 {
        if self.core.state.is_terminal() {
            return 0;
        }
        let was_activated = self.core.activated;
        let mut actions = self.role.on_handshake_tick(&mut self.core, now);
        actions += self.core.poll_timers(now);
        self.report_activation(was_activated);
        actions
    }

    /// Delivers an inbound Logon.
    pub fn on_logon(&mut self, event: &LogonEvent, now: Timestamp) {
        if self.core.state.is_terminal() {
            return;
        }
        let was_activated = self.core.activated;
        self.role.on_logon(&mut self.core, event, now);
        self.report_activation(was_activated);
    }

    /// Delivers a generic sequenced inbound message (any non-logon type).
    pub fn on_message(&mut self, seq: SeqNum, poss_dup: bool, now: Timestamp) {
        let was_activated = self.core.activated;
        self.core
            .handle_inbound(seq, poss_dup, MessageKind::Application, now);
        self.report_activation(was_activated);
    }

    /// Delivers an inbound Heartbeat.
    pub fn on_heartbeat(&mut self, seq: SeqNum, test_req_id: Option<&str>, now: Timestamp) {
        let was_activated = self.core.activated;
        let kind = MessageKind::Heartbeat {
            test_req_id: test_req_id.map(str::to_owned),
        };
        self.core.handle_inbound(seq, false, kind, now);
        self.report_activation(was_activated);
    }

    /// Delivers an inbound TestRequest.
    pub fn on_test_request(&mut self, seq: SeqNum, test_req_id: &str, now: Timestamp) {
        let was_activated = self.core.activated;
        let kind = MessageKind::TestRequest {
            test_req_id: test_req_id.to_owned(),
        };
        self.core.handle_inbound(seq, false, kind, now);
        self.report_activation(was_activated);
    }

    /// Delivers an inbound Logout.
    pub fn on_logout(&mut self, now: Timestamp) {
        self.core.handle_logout(now);
    }

    /// Reports a transport failure. Transitions straight to `Disconnected`
    /// without attempting further sends.
    pub fn on_disconnect(&mut self) {
        self.core.disconnect(DisconnectReason::TransportFailure);
    }

    /// Requests a graceful local logout.
    pub fn start_logout(&mut self, reason: &str, now: Timestamp) {
        self.core.request_logout(reason, now);
    }

    /// Returns the current protocol state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.core.state()
    }

    /// Returns the current identity bundle.
    #[must_use]
    pub fn identity(&self) -> SessionIdentity {
        self.core.identity()
    }

    /// Returns the last allocated outbound sequence number.
    #[must_use]
    pub const fn last_sent_seq_num(&self) -> SeqNum {
        self.core.last_sent()
    }

    /// Returns the next expected inbound sequence number.
    #[must_use]
    pub const fn expected_received_seq_num(&self) -> SeqNum {
        self.core.expected_received()
    }

    /// Returns the heartbeat interval currently in force, in milliseconds.
    #[must_use]
    pub const fn heartbeat_interval_ms(&self) -> u64 {
        self.core.heartbeat.interval_ms()
    }

    fn report_activation(&mut self, was_activated: bool) {
        if !was_activated && self.core.activated {
            self.role.on_activated(&self.core.identity());
        }
    }
}
