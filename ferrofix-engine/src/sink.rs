/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Buffering message sink.
//!
//! Sessions treat their sink as a fire-and-forget, non-blocking enqueue;
//! [`BufferingSink`] implements exactly that contract with a lock-guarded
//! queue the transport layer drains for framing and transmission. One sink
//! may be shared by many sessions.

use ferrofix_core::types::SeqNum;
use ferrofix_session::proxy::MessageSink;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// A decoded outbound administrative message awaiting transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Logon (MsgType A).
    Logon {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// HeartBtInt in seconds (tag 108).
        heartbeat_secs: u64,
        /// ResetSeqNumFlag (tag 141).
        reset_seq_num: bool,
    },
    /// Heartbeat (MsgType 0).
    Heartbeat {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// Echoed TestReqID (tag 112), if answering a TestRequest.
        test_req_id: Option<String>,
    },
    /// TestRequest (MsgType 1).
    TestRequest {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// TestReqID (tag 112).
        test_req_id: String,
    },
    /// ResendRequest (MsgType 2).
    ResendRequest {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// BeginSeqNo (tag 7).
        begin: SeqNum,
        /// EndSeqNo (tag 16).
        end: SeqNum,
    },
    /// Logout (MsgType 5).
    Logout {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// Text (tag 58).
        reason: String,
    },
    /// Session-level Reject (MsgType 3).
    Reject {
        /// MsgSeqNum.
        seq_num: SeqNum,
        /// RefSeqNum (tag 45).
        ref_seq_num: SeqNum,
        /// Text (tag 58).
        reason: String,
    },
}

/// Message sink backed by an in-memory queue.
#[derive(Debug, Default)]
pub struct BufferingSink {
    queue: Mutex<VecDeque<OutboundMessage>>,
}

impl BufferingSink {
    /// Creates a new empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the oldest queued message.
    pub fn pop(&self) -> Option<OutboundMessage> {
        self.queue.lock().pop_front()
    }

    /// Drains the whole queue in enqueue order.
    pub fn drain(&self) -> Vec<OutboundMessage> {
        self.queue.lock().drain(..).collect()
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns true if no messages are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.lock().is_empty()
    }

    fn push(&self, message: OutboundMessage) {
        self.queue.lock().push_back(message);
    }
}

impl MessageSink for BufferingSink {
    fn send_logon(&self, seq_num: SeqNum, heartbeat_secs: u64, reset_seq_num: bool) {
        self.push(OutboundMessage::Logon {
            seq_num,
            heartbeat_secs,
            reset_seq_num,
        });
    }

    fn send_heartbeat(&self, seq_num: SeqNum, test_req_id: Option<&str>) {
        self.push(OutboundMessage::Heartbeat {
            seq_num,
            test_req_id: test_req_id.map(str::to_owned),
        });
    }

    fn send_test_request(&self, seq_num: SeqNum, test_req_id: &str) {
        self.push(OutboundMessage::TestRequest {
            seq_num,
            test_req_id: test_req_id.to_owned(),
        });
    }

    fn send_resend_request(&self, seq_num: SeqNum, begin: SeqNum, end: SeqNum) {
        self.push(OutboundMessage::ResendRequest {
            seq_num,
            begin,
            end,
        });
    }

    fn send_logout(&self, seq_num: SeqNum, reason: &str) {
        self.push(OutboundMessage::Logout {
            seq_num,
            reason: reason.to_owned(),
        });
    }

    fn send_reject(&self, seq_num: SeqNum, ref_seq_num: SeqNum, reason: &str) {
        self.push(OutboundMessage::Reject {
            seq_num,
            ref_seq_num,
            reason: reason.to_owned(),
        });
    }
}
