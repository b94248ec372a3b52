/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Session configuration.
//!
//! This module provides configuration options for FIX sessions: the local
//! party's key, the proposed heartbeat interval, and the timeouts that drive
//! the time-based transitions of the state machine.

use ferrofix_core::types::{CompId, SessionKey};
use std::time::Duration;

/// Configuration for a FIX session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Sender CompID (tag 49).
    pub sender_comp_id: CompId,
    /// Target CompID (tag 56).
    pub target_comp_id: CompId,
    /// FIX version BeginString (e.g., "FIX.4.4").
    pub begin_string: String,
    /// Heartbeat interval proposed at logon.
    pub heartbeat_interval: Duration,
    /// How long an initiator waits for a Logon response before re-sending,
    /// and how long an acceptor waits for the first Logon before tearing the
    /// connection down.
    pub logon_timeout: Duration,
    /// How long to wait for a Logout acknowledgment before forcing disconnect.
    pub logout_timeout: Duration,
    /// How long to wait for gap replay before re-issuing a ResendRequest.
    pub resend_request_timeout: Duration,
    /// Whether to set ResetSeqNumFlag on the outbound Logon.
    pub reset_seq_num_on_logon: bool,
    /// Lowest counterparty heartbeat interval an acceptor will accept.
    pub min_heartbeat_interval: Duration,
    /// Highest counterparty heartbeat interval an acceptor will accept.
    pub max_heartbeat_interval: Duration,
}

impl SessionConfig {
    /// Creates a new session configuration with required fields.
    ///
    /// # Arguments
    /// * `sender_comp_id` - The sender CompID
    /// * `target_comp_id` - The target CompID
    /// * `begin_string` - The FIX version string
    #[must_use]
    pub fn new(
        sender_comp_id: CompId,
        target_comp_id: CompId,
        begin_string: impl Into<String>,
    ) -> Self {
        Self {
            sender_comp_id,
            target_comp_id,
            begin_string: begin_string.into(),
            heartbeat_interval: Duration::from_secs(30),
            logon_timeout: Duration::from_secs(10),
            logout_timeout: Duration::from_secs(10),
            resend_request_timeout: Duration::from_secs(5),
            reset_seq_num_on_logon: false,
            min_heartbeat_interval: Duration::from_secs(1),
            max_heartbeat_interval: Duration::from_secs(120),
        }
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub fn with_logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = timeout;
        self
    }

    /// Sets the logout timeout.
    #[must_use]
    pub fn with_logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = timeout;
        self
    }

    /// Sets the resend-request timeout.
    #[must_use]
    pub fn with_resend_request_timeout(mut self, timeout: Duration) -> Self {
        self.resend_request_timeout = timeout;
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn with_reset_seq_num_on_logon(mut self, reset: bool) -> Self {
        self.reset_seq_num_on_logon = reset;
        self
    }

    /// Sets the heartbeat interval bounds an acceptor will tolerate.
    #[must_use]
    pub fn with_heartbeat_bounds(mut self, min: Duration, max: Duration) -> Self {
        self.min_heartbeat_interval = min;
        self.max_heartbeat_interval = max;
        self
    }

    /// Returns the local party's session key.
    #[must_use]
    pub fn session_key(&self) -> SessionKey {
        SessionKey::new(self.sender_comp_id.clone(), self.target_comp_id.clone())
    }

    /// Returns the heartbeat interval in milliseconds.
    #[must_use]
    pub fn heartbeat_interval_ms(&self) -> u64 {
        self.heartbeat_interval.as_millis() as u64
    }

    /// Returns the heartbeat interval in whole seconds, as sent on the wire.
    #[must_use]
    pub fn heartbeat_interval_secs(&self) -> u64 {
        self.heartbeat_interval.as_secs()
    }
}

/// Builder for session configuration.
#[derive(Debug, Default)]
pub struct SessionConfigBuilder {
    sender_comp_id: Option<CompId>,
    target_comp_id: Option<CompId>,
    begin_string: Option<String>,
    heartbeat_interval: Option<Duration>,
    logon_timeout: Option<Duration>,
    logout_timeout: Option<Duration>,
    resend_request_timeout: Option<Duration>,
    reset_seq_num_on_logon: bool,
}

impl SessionConfigBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sender CompID.
    #[must_use]
    pub fn sender_comp_id(mut self, id: CompId) -> Self {
        self.sender_comp_id = Some(id);
        self
    }

    /// Sets the target CompID.
    #[must_use]
    pub fn target_comp_id(mut self, id: CompId) -> Self {
        self.target_comp_id = Some(id);
        self
    }

    /// Sets the FIX version.
    #[must_use]
    pub fn begin_string(mut self, version: impl Into<String>) -> Self {
        self.begin_string = Some(version.into());
        self
    }

    /// Sets the heartbeat interval.
    #[must_use]
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = Some(interval);
        self
    }

    /// Sets the logon timeout.
    #[must_use]
    pub fn logon_timeout(mut self, timeout: Duration) -> Self {
        self.logon_timeout = Some(timeout);
        self
    }

    /// Sets the logout timeout.
    #[must_use]
    pub fn logout_timeout(mut self, timeout: Duration) -> Self {
        self.logout_timeout = Some(timeout);
        self
    }

    /// Sets the resend-request timeout.
    #[must_use]
    pub fn resend_request_timeout(mut self, timeout: Duration) -> Self {
        self.resend_request_timeout = Some(timeout);
        self
    }

    /// Sets whether to reset sequence numbers on logon.
    #[must_use]
    pub const fn reset_seq_num_on_logon(mut self, reset: bool) -> Self {
        self.reset_seq_num_on_logon = reset;
        self
    }

    /// Builds the configuration.
    ///
    /// # Panics
    /// Panics if required fields are not set.
    #[must_use]
    pub fn build(self) -> SessionConfig {
        let sender = self.sender_comp_id.expect("sender_comp_id is required");
        let target = self.target_comp_id.expect("target_comp_id is required");
        let begin_string = self.begin_string.unwrap_or_else(|| "FIX.4.4".to_string());

        let mut config = SessionConfig::new(sender, target, begin_string);

        if let Some(interval) = self.heartbeat_interval {
            config.heartbeat_interval = interval;
        }
        if let Some(timeout) = self.logon_timeout {
            config.logon_timeout = timeout;
        }
        if let Some(timeout) = self.logout_timeout {
            config.logout_timeout = timeout;
        }
        if let Some(timeout) = self.resend_request_timeout {
            config.resend_request_timeout = timeout;
        }
        config.reset_seq_num_on_logon = self.reset_seq_num_on_logon;

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_new() {
        let sender = CompId::new("SENDER").unwrap();
        let target = CompId::new("TARGET").unwrap();
        let config = SessionConfig::new(sender, target, "FIX.4.4");

        assert_eq!(config.sender_comp_id.as_str(), "SENDER");
        assert_eq!(config.target_comp_id.as_str(), "TARGET");
        assert_eq!(config.begin_string, "FIX.4.4");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.heartbeat_interval_ms(), 30_000);
        assert_eq!(config.heartbeat_interval_secs(), 30);
    }

    #[test]
    fn test_session_key_from_config() {
        let config = SessionConfig::new(
            CompId::new("LOCAL").unwrap(),
            CompId::new("REMOTE").unwrap(),
            "FIX.4.4",
        );
        assert_eq!(config.session_key().to_string(), "LOCAL->REMOTE");
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfigBuilder::new()
            .sender_comp_id(CompId::new("SENDER").unwrap())
            .target_comp_id(CompId::new("TARGET").unwrap())
            .begin_string("FIX.4.2")
            .heartbeat_interval(Duration::from_secs(60))
            .logon_timeout(Duration::from_secs(5))
            .reset_seq_num_on_logon(true)
            .build();

        assert_eq!(config.begin_string, "FIX.4.2");
        assert_eq!(config.heartbeat_interval, Duration::from_secs(60));
        assert_eq!(config.logon_timeout, Duration::from_secs(5));
        assert!(config.reset_seq_num_on_logon);
    }
}
