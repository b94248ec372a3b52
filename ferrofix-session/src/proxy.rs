/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Collaborator interfaces the session state machine calls out to.
//!
//! The state machine never touches the wire or the surrounding system
//! directly. Outbound administrative messages go through a [`MessageSink`]
//! (a non-blocking enqueue; failures surface asynchronously through the
//! transport layer, never as return values the state machine branches on),
//! and lifecycle events go through an [`EventNotifier`].
//!
//! Both are injected as shared handles at session construction; the session
//! does not own their lifecycle and must never be the one to close the
//! transport or the audit log behind them.

use crate::state::DisconnectReason;
use ferrofix_core::types::{SeqNum, SessionIdentity};

/// Outbound administrative message sink.
///
/// Every method is fire-and-forget from the state machine's perspective and
/// must not block. The sequence number passed to each call has already been
/// allocated from the session's tracker.
pub trait MessageSink {
    /// Enqueues a Logon message.
    ///
    /// # Arguments
    /// * `seq_num` - Allocated outbound sequence number
    /// * `heartbeat_secs` - Proposed heartbeat interval in seconds (tag 108)
    /// * `reset_seq_num` - Whether ResetSeqNumFlag (tag 141) is set
    fn send_logon(&self, seq_num: SeqNum, heartbeat_secs: u64, reset_seq_num: bool);

    /// Enqueues a Heartbeat, echoing `test_req_id` when answering a TestRequest.
    fn send_heartbeat(&self, seq_num: SeqNum, test_req_id: Option<&str>);

    /// Enqueues a TestRequest carrying `test_req_id` (tag 112).
    fn send_test_request(&self, seq_num: SeqNum, test_req_id: &str);

    /// Enqueues a ResendRequest for the inclusive range `begin..=end`.
    fn send_resend_request(&self, seq_num: SeqNum, begin: SeqNum, end: SeqNum);

    /// Enqueues a Logout carrying a human-readable reason (tag 58).
    fn send_logout(&self, seq_num: SeqNum, reason: &str);

    /// Enqueues a session-level Reject referencing `ref_seq_num` (tag 45).
    fn send_reject(&self, seq_num: SeqNum, ref_seq_num: SeqNum, reason: &str);
}

/// Lifecycle event notifier.
///
/// Announces session activation and disconnection to the surrounding system
/// (which may be tracking many pending sessions).
pub trait EventNotifier {
    /// Called exactly once when the logon handshake completes.
    fn on_session_active(&self, identity: &SessionIdentity);

    /// Called exactly once when the session reaches its terminal state.
    fn on_session_disconnected(&self, identity: &SessionIdentity, reason: DisconnectReason);
}

/// Notifier that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl EventNotifier for NoOpNotifier {
    fn on_session_active(&self, _identity: &SessionIdentity) {}

    fn on_session_disconnected(&self, _identity: &SessionIdentity, _reason: DisconnectReason) {}
}
