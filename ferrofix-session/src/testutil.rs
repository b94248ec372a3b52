/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Recording collaborators used by the session tests.

use crate::proxy::{EventNotifier, MessageSink};
use crate::state::DisconnectReason;
use ferrofix_core::types::{SeqNum, SessionIdentity};
use parking_lot::Mutex;

/// One outbound administrative message captured by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Logon {
        seq: u64,
        heartbeat_secs: u64,
        reset_seq_num: bool,
    },
    Heartbeat {
        seq: u64,
        test_req_id: Option<String>,
    },
    TestRequest {
        seq: u64,
        test_req_id: String,
    },
    ResendRequest {
        seq: u64,
        begin: u64,
        end: u64,
    },
    Logout {
        seq: u64,
        reason: String,
    },
    Reject {
        seq: u64,
        ref_seq: u64,
        reason: String,
    },
}

/// Sink that records every send for later assertions.
#[derive(Debug, Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingSink {
    /// Returns a snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    /// Drains and returns everything sent so far.
    pub fn take(&self) -> Vec<Sent> {
        std::mem::take(&mut *self.sent.lock())
    }

    /// Number of messages sent so far.
    pub fn count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl MessageSink for RecordingSink {
    fn send_logon(&self, seq_num: SeqNum, heartbeat_secs: u64, reset_seq_num: bool) {
        self.sent.lock().push(Sent::Logon {
            seq: seq_num.value(),
            heartbeat_secs,
            reset_seq_num,
        });
    }

    fn send_heartbeat(&self, seq_num: SeqNum, test_req_id: Option<&str>) {
        self.sent.lock().push(Sent::Heartbeat {
            seq: seq_num.value(),
            test_req_id: test_req_id.map(str::to_owned),
        });
    }

    fn send_test_request(&self, seq_num: SeqNum, test_req_id: &str) {
        self.sent.lock().push(Sent::TestRequest {
            seq: seq_num.value(),
            test_req_id: test_req_id.to_owned(),
        });
    }

    fn send_resend_request(&self, seq_num: SeqNum, begin: SeqNum, end: SeqNum) {
        self.sent.lock().push(Sent::ResendRequest {
            seq: seq_num.value(),
            begin: begin.value(),
            end: end.value(),
        });
    }

    fn send_logout(&self, seq_num: SeqNum, reason: &str) {
        self.sent.lock().push(Sent::Logout {
            seq: seq_num.value(),
            reason: reason.to_owned(),
        });
    }

    fn send_reject(&self, seq_num: SeqNum, ref_seq_num: SeqNum, reason: &str) {
        self.sent.lock().push(Sent::Reject {
            seq: seq_num.value(),
            ref_seq: ref_seq_num.value(),
            reason: reason.to_owned(),
        });
    }
}

/// One lifecycle event captured by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    Active(SessionIdentity),
    Disconnected(SessionIdentity, DisconnectReason),
}

/// Notifier that records lifecycle events for later assertions.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<Lifecycle>>,
}

impl RecordingNotifier {
    /// Returns a snapshot of the recorded events.
    pub fn events(&self) -> Vec<Lifecycle> {
        self.events.lock().clone()
    }

    /// Number of activation events recorded.
    pub fn active_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Lifecycle::Active(_)))
            .count()
    }

    /// Returns the reason of the first disconnect event, if any.
    pub fn disconnect_reason(&self) -> Option<DisconnectReason> {
        self.events.lock().iter().find_map(|e| match e {
            Lifecycle::Disconnected(_, reason) => Some(*reason),
            Lifecycle::Active(_) => None,
        })
    }
}

impl EventNotifier for RecordingNotifier {
    fn on_session_active(&self, identity: &SessionIdentity) {
        self.events.lock().push(Lifecycle::Active(identity.clone()));
    }

    fn on_session_disconnected(&self, identity: &SessionIdentity, reason: DisconnectReason) {
        self.events
            .lock()
            .push(Lifecycle::Disconnected(identity.clone(), reason));
    }
}
