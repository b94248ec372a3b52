/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Heartbeat and TestRequest supervision.
//!
//! [`HeartbeatSupervisor`] derives liveness deadlines from the negotiated
//! heartbeat interval and the last-observed activity times:
//! - An outbound Heartbeat is due when nothing has been sent for one interval
//! - A TestRequest is due when nothing has been received for one interval
//! - The session has timed out when a TestRequest went unanswered for a
//!   further interval
//!
//! All time is injected. The supervisor never reads a clock, so every
//! predicate is a pure function of the timestamps it was fed.

use ferrofix_core::types::Timestamp;

/// Supervises heartbeat timing for one FIX session.
#[derive(Debug)]
pub struct HeartbeatSupervisor {
    /// Negotiated heartbeat interval in milliseconds.
    interval_ms: u64,
    /// Time the last message was sent.
    last_sent: Timestamp,
    /// Time the last message was received.
    last_received: Timestamp,
    /// Pending TestRequest ID, if one is outstanding.
    pending_test_request: Option<String>,
    /// Time the outstanding TestRequest was sent.
    test_request_sent_at: Option<Timestamp>,
}

impl HeartbeatSupervisor {
    /// Creates a supervisor with the given interval, anchored at `now`.
    ///
    /// # Arguments
    /// * `interval_ms` - Heartbeat interval in milliseconds
    /// * `now` - Current time, used as the initial activity anchor
    #[must_use]
    pub const fn new(interval_ms: u64, now: Timestamp) -> Self {
        Self {
            interval_ms,
            last_sent: now,
            last_received: now,
            pending_test_request: None,
            test_request_sent_at: None,
        }
    }

    /// Returns the heartbeat interval in milliseconds.
    #[must_use]
    pub const fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Adopts a newly negotiated heartbeat interval.
    pub fn set_interval_ms(&mut self, interval_ms: u64) {
        self.interval_ms = interval_ms;
    }

    /// Records that a message was sent.
    #[inline]
    pub fn on_message_sent(&mut self, now: Timestamp) {
        self.last_sent = now;
    }

    /// Records that a message of any kind was received.
    ///
    /// Every inbound message resets the waiting-for-life clock, not just
    /// heartbeats. An outstanding TestRequest is only cleared by a Heartbeat
    /// carrying the matching ID, via [`Self::on_heartbeat_received`].
    #[inline]
    pub fn on_message_received(&mut self, now: Timestamp) {
        self.last_received = now;
    }

    /// Records an inbound Heartbeat.
    ///
    /// Clears the outstanding TestRequest when `test_req_id` matches the one
    /// that was sent.
    ///
    /// # Arguments
    /// * `now` - Current time
    /// * `test_req_id` - The TestReqID echoed in the Heartbeat, if present
    pub fn on_heartbeat_received(&mut self, now: Timestamp, test_req_id: Option<&str>) {
        self.last_received = now;

        if let (Some(pending), Some(received)) = (&self.pending_test_request, test_req_id)
            && pending == received
        {
            self.pending_test_request = None;
            self.test_request_sent_at = None;
        }
    }

    /// Records that a TestRequest was sent.
    ///
    /// # Arguments
    /// * `test_req_id` - The TestReqID that was sent
    /// * `now` - Current time
    pub fn on_test_request_sent(&mut self, test_req_id: String, now: Timestamp) {
        self.pending_test_request = Some(test_req_id);
        self.test_request_sent_at = Some(now);
        self.last_sent = now;
    }

    /// Checks if an outbound Heartbeat is due.
    #[must_use]
    pub fn is_heartbeat_due(&self, now: Timestamp) -> bool {
        now.millis_since(self.last_sent) >= self.interval_ms
    }

    /// Checks if a TestRequest is due.
    ///
    /// Due when nothing has been received for one interval and no TestRequest
    /// is already outstanding.
    #[must_use]
    pub fn is_test_request_due(&self, now: Timestamp) -> bool {
        self.pending_test_request.is_none()
            && now.millis_since(self.last_received) >= self.interval_ms
    }

    /// Checks if the session has timed out.
    ///
    /// A timeout occurs when a TestRequest is outstanding and a further grace
    /// period of one interval has elapsed since it was sent.
    #[must_use]
    pub fn is_timed_out(&self, now: Timestamp) -> bool {
        match self.test_request_sent_at {
            Some(sent_at) => now.millis_since(sent_at) >= self.interval_ms,
            None => false,
        }
    }

    /// Returns the pending TestRequest ID, if any.
    #[must_use]
    pub fn pending_test_request(&self) -> Option<&str> {
        self.pending_test_request.as_deref()
    }

    /// Returns milliseconds elapsed since the last inbound message.
    #[must_use]
    pub fn millis_since_received(&self, now: Timestamp) -> u64 {
        now.millis_since(self.last_received)
    }

    /// Re-anchors both activity clocks and clears any outstanding TestRequest.
    pub fn reset(&mut self, now: Timestamp) {
        self.last_sent = now;
        self.last_received = now;
        self.pending_test_request = None;
        self.test_request_sent_at = None;
    }
}

/// Derives a TestReqID from the injected time.
///
/// Deterministic for a given timestamp, which keeps replayed scenarios
/// reproducible.
#[must_use]
pub fn test_req_id_at(now: Timestamp) -> String {
    format!("TEST{}", now.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: Timestamp = Timestamp::from_millis(10_000);

    #[test]
    fn test_supervisor_new() {
        let sup = HeartbeatSupervisor::new(1000, T0);
        assert_eq!(sup.interval_ms(), 1000);
        assert!(sup.pending_test_request().is_none());
        assert!(!sup.is_heartbeat_due(T0));
        assert!(!sup.is_test_request_due(T0));
        assert!(!sup.is_timed_out(T0));
    }

    #[test]
    fn test_heartbeat_due_after_interval() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        assert!(!sup.is_heartbeat_due(T0.plus_millis(999)));
        assert!(sup.is_heartbeat_due(T0.plus_millis(1000)));

        sup.on_message_sent(T0.plus_millis(1000));
        assert!(!sup.is_heartbeat_due(T0.plus_millis(1500)));
    }

    #[test]
    fn test_test_request_due_after_silence() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        assert!(sup.is_test_request_due(T0.plus_millis(1000)));

        sup.on_message_received(T0.plus_millis(800));
        assert!(!sup.is_test_request_due(T0.plus_millis(1000)));
        assert!(sup.is_test_request_due(T0.plus_millis(1800)));
    }

    #[test]
    fn test_no_second_test_request_while_pending() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        sup.on_test_request_sent("TEST1".to_string(), T0.plus_millis(1000));
        assert!(!sup.is_test_request_due(T0.plus_millis(2500)));
    }

    #[test]
    fn test_timeout_after_unanswered_test_request() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        sup.on_test_request_sent("TEST1".to_string(), T0.plus_millis(1000));
        assert!(!sup.is_timed_out(T0.plus_millis(1999)));
        assert!(sup.is_timed_out(T0.plus_millis(2000)));
    }

    #[test]
    fn test_matching_heartbeat_clears_pending() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        sup.on_test_request_sent("TEST1".to_string(), T0.plus_millis(1000));
        sup.on_heartbeat_received(T0.plus_millis(1500), Some("TEST1"));

        assert!(sup.pending_test_request().is_none());
        assert!(!sup.is_timed_out(T0.plus_millis(5000)));
    }

    #[test]
    fn test_mismatched_heartbeat_keeps_pending() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        sup.on_test_request_sent("TEST1".to_string(), T0.plus_millis(1000));
        sup.on_heartbeat_received(T0.plus_millis(1500), Some("OTHER"));

        assert_eq!(sup.pending_test_request(), Some("TEST1"));
        assert!(sup.is_timed_out(T0.plus_millis(2000)));
        // The received clock still refreshed.
        assert_eq!(sup.millis_since_received(T0.plus_millis(1500)), 0);
    }

    #[test]
    fn test_non_heartbeat_traffic_resets_liveness_clock() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);

        sup.on_message_received(T0.plus_millis(900));
        assert!(!sup.is_test_request_due(T0.plus_millis(1500)));
    }

    #[test]
    fn test_reset() {
        let mut sup = HeartbeatSupervisor::new(1000, T0);
        sup.on_test_request_sent("TEST1".to_string(), T0.plus_millis(1000));

        let t = T0.plus_millis(3000);
        sup.reset(t);
        assert!(sup.pending_test_request().is_none());
        assert!(!sup.is_timed_out(t.plus_millis(5000)));
        assert!(!sup.is_heartbeat_due(t.plus_millis(999)));
    }

    #[test]
    fn test_test_req_id_is_deterministic() {
        assert_eq!(test_req_id_at(Timestamp::from_millis(42)), "TEST42");
        assert_eq!(
            test_req_id_at(Timestamp::from_millis(42)),
            test_req_id_at(Timestamp::from_millis(42))
        );
    }
}
