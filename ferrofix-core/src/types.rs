/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 3/2/26
******************************************************************************/

//! Core types for the FIX session layer.
//!
//! This module provides the fundamental types used throughout the FerroFIX
//! engine:
//! - [`SeqNum`]: Message sequence number
//! - [`Timestamp`]: Millisecond-precision point in time, always injected
//! - [`CompId`]: Component identifier (SenderCompID, TargetCompID)
//! - [`SessionKey`]: Counterparty-identifying compound key
//! - [`ConnectionId`] / [`SessionId`]: Transport and logical identities
//! - [`SessionIdentity`]: Identity bundle handed to lifecycle callbacks

use arrayvec::ArrayString;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum length for CompID strings in bytes.
pub const COMP_ID_MAX_LEN: usize = 32;

/// FIX message sequence number.
///
/// Sequence numbers identify messages within a FIX session. They start at 1
/// and increment for each message sent; zero is never a valid value on the
/// wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SeqNum(u64);

impl SeqNum {
    /// Creates a new sequence number.
    ///
    /// # Arguments
    /// * `value` - The sequence number value (>= 1 for valid FIX messages)
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the next sequence number.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Returns the previous sequence number, saturating at zero.
    #[inline]
    #[must_use]
    pub const fn prev(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    /// Checks if this sequence number is valid (>= 1).
    #[inline]
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }
}

impl Default for SeqNum {
    fn default() -> Self {
        Self(1)
    }
}

impl From<u64> for SeqNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SeqNum> for u64 {
    fn from(seq: SeqNum) -> Self {
        seq.0
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A point in time with millisecond precision.
///
/// The session core never reads the wall clock; every timestamp is injected
/// through `poll` or an event callback, which keeps the state machine a
/// deterministic function of its inputs. Conversion to and from [`chrono`]
/// exists for display and for the engine-side clock.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[repr(transparent)]
#[serde(transparent)]
pub struct Timestamp {
    millis_since_epoch: u64,
}

impl Timestamp {
    /// Creates a timestamp from milliseconds since Unix epoch.
    ///
    /// # Arguments
    /// * `millis` - Milliseconds since 1970-01-01 00:00:00 UTC
    #[inline]
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self {
            millis_since_epoch: millis,
        }
    }

    /// Returns milliseconds since Unix epoch.
    #[inline]
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.millis_since_epoch
    }

    /// Returns this timestamp advanced by `millis` milliseconds.
    #[inline]
    #[must_use]
    pub const fn plus_millis(self, millis: u64) -> Self {
        Self {
            millis_since_epoch: self.millis_since_epoch.saturating_add(millis),
        }
    }

    /// Returns the number of milliseconds elapsed since `earlier`.
    ///
    /// Saturates at zero if `earlier` is in the future.
    #[inline]
    #[must_use]
    pub const fn millis_since(self, earlier: Self) -> u64 {
        self.millis_since_epoch
            .saturating_sub(earlier.millis_since_epoch)
    }

    /// Converts to a chrono `DateTime<Utc>`.
    #[must_use]
    pub fn to_datetime(self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis_since_epoch as i64).unwrap_or_default()
    }

    /// Formats the timestamp in FIX sending-time format.
    ///
    /// Format: `YYYYMMDD-HH:MM:SS.sss`
    #[must_use]
    pub fn format_fix(self) -> ArrayString<21> {
        let dt = self.to_datetime();
        let mut buf = ArrayString::new();
        let _ = std::fmt::write(
            &mut buf,
            format_args!("{}", dt.format("%Y%m%d-%H:%M:%S%.3f")),
        );
        buf
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self {
            millis_since_epoch: dt.timestamp_millis().max(0) as u64,
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_fix())
    }
}

/// Component identifier for FIX sessions.
///
/// Used for SenderCompID (tag 49) and TargetCompID (tag 56). Maximum length
/// is 32 characters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct CompId(ArrayString<COMP_ID_MAX_LEN>);

impl CompId {
    /// Creates a new CompId from a string slice.
    ///
    /// # Arguments
    /// * `s` - The component identifier string
    ///
    /// # Returns
    /// `Some(CompId)` if the string fits within the maximum length, `None` otherwise.
    #[must_use]
    pub fn new(s: &str) -> Option<Self> {
        ArrayString::from(s).ok().map(Self)
    }

    /// Returns the CompId as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the length of the CompId in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the CompId is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<str> for CompId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for CompId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CompId {
    type Err = arrayvec::CapacityError<()>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArrayString::try_from(s)
            .map(Self)
            .map_err(|_| arrayvec::CapacityError::new(()))
    }
}

/// Transport-level connection identity.
///
/// Assigned when a connection is accepted or an outbound connect succeeds,
/// and stable for the lifetime of that connection. A reconnect produces a new
/// `ConnectionId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new connection identifier.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical session identity, stable across reconnects.
///
/// Assigned after a successful logon; two connections carrying the same
/// counterparty key map to the same `SessionId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
#[serde(transparent)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new session identifier.
    #[inline]
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw identifier value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counterparty-identifying compound key negotiated at logon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    /// Local party CompID (tag 49 on outbound messages).
    pub sender_comp_id: CompId,
    /// Counterparty CompID (tag 56 on outbound messages).
    pub target_comp_id: CompId,
}

impl SessionKey {
    /// Creates a new session key.
    ///
    /// # Arguments
    /// * `sender_comp_id` - The local party CompID
    /// * `target_comp_id` - The counterparty CompID
    #[must_use]
    pub const fn new(sender_comp_id: CompId, target_comp_id: CompId) -> Self {
        Self {
            sender_comp_id,
            target_comp_id,
        }
    }

    /// Returns the key with sender and target swapped.
    ///
    /// An acceptor sees the initiator's key mirrored.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            sender_comp_id: self.target_comp_id.clone(),
            target_comp_id: self.sender_comp_id.clone(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.sender_comp_id, self.target_comp_id)
    }
}

/// Identity bundle for a session, handed to lifecycle callbacks.
///
/// The logical identity and key are absent until the logon handshake has
/// assigned them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionIdentity {
    /// Transport-level connection identity.
    pub connection_id: ConnectionId,
    /// Logical session identity, if logon has completed.
    pub session_id: Option<SessionId>,
    /// Counterparty key, if negotiated.
    pub session_key: Option<SessionKey>,
}

impl SessionIdentity {
    /// Creates an identity for a connection that has not logged on yet.
    #[must_use]
    pub const fn connected(connection_id: ConnectionId) -> Self {
        Self {
            connection_id,
            session_id: None,
            session_key: None,
        }
    }
}

impl fmt::Display for SessionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.session_id, &self.session_key) {
            (Some(id), Some(key)) => write!(f, "conn={} session={} {}", self.connection_id, id, key),
            (Some(id), None) => write!(f, "conn={} session={}", self.connection_id, id),
            _ => write!(f, "conn={}", self.connection_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_num_operations() {
        let seq = SeqNum::new(5);
        assert_eq!(seq.value(), 5);
        assert_eq!(seq.next().value(), 6);
        assert_eq!(seq.prev().value(), 4);
        assert!(seq.is_valid());
        assert!(!SeqNum::new(0).is_valid());
    }

    #[test]
    fn test_seq_num_default() {
        let seq = SeqNum::default();
        assert_eq!(seq.value(), 1);
    }

    #[test]
    fn test_timestamp_arithmetic() {
        let t0 = Timestamp::from_millis(1000);
        let t1 = t0.plus_millis(500);
        assert_eq!(t1.as_millis(), 1500);
        assert_eq!(t1.millis_since(t0), 500);
        assert_eq!(t0.millis_since(t1), 0);
    }

    #[test]
    fn test_timestamp_format() {
        let ts = Timestamp::from_millis(0);
        let formatted = ts.format_fix();
        assert!(formatted.starts_with("19700101-00:00:00"));
    }

    #[test]
    fn test_comp_id() {
        let id = CompId::new("SENDER").unwrap();
        assert_eq!(id.as_str(), "SENDER");
        assert_eq!(id.len(), 6);
        assert!(!id.is_empty());
    }

    #[test]
    fn test_comp_id_too_long() {
        let long_str = "A".repeat(COMP_ID_MAX_LEN + 1);
        assert!(CompId::new(&long_str).is_none());
    }

    #[test]
    fn test_session_key_reversed() {
        let key = SessionKey::new(
            CompId::new("LOCAL").unwrap(),
            CompId::new("REMOTE").unwrap(),
        );
        let rev = key.reversed();
        assert_eq!(rev.sender_comp_id.as_str(), "REMOTE");
        assert_eq!(rev.target_comp_id.as_str(), "LOCAL");
        assert_eq!(key.to_string(), "LOCAL->REMOTE");
    }

    #[test]
    fn test_session_identity_display() {
        let mut identity = SessionIdentity::connected(ConnectionId::new(7));
        assert_eq!(identity.to_string(), "conn=7");

        identity.session_id = Some(SessionId::new(42));
        assert_eq!(identity.to_string(), "conn=7 session=42");
    }
}
