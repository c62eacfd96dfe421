//! Raw device history records.
//!
//! Records are read once per sync pass and never persisted by the engine.
//! They keep the device-supplied counterparty string untouched; keying
//! happens later during matching.

use crate::{Channel, Direction, EpochMillis};
use serde::{Deserialize, Serialize};

/// OS classification of a call log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CallKind {
    Incoming,
    Outgoing,
    Missed,
    Unknown,
}

impl CallKind {
    /// Classifies the provider's type label (`"INCOMING"`, `"MISSED"`, ...).
    /// Anything unrecognised is `Unknown`.
    #[must_use]
    pub fn from_native(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "INCOMING" => CallKind::Incoming,
            "OUTGOING" => CallKind::Outgoing,
            "MISSED" => CallKind::Missed,
            _ => CallKind::Unknown,
        }
    }

    /// Conversation direction for this kind of call.
    ///
    /// A missed call is logged as incoming even though nothing connected.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            CallKind::Incoming | CallKind::Missed => Direction::Incoming,
            CallKind::Outgoing | CallKind::Unknown => Direction::Outgoing,
        }
    }
}

/// One entry of the OS call log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallLogEntry {
    /// Phone string exactly as the device reported it.
    pub counterparty_raw: String,
    pub timestamp: EpochMillis,
    pub duration_seconds: u64,
    pub kind: CallKind,
    /// The provider's type label, kept verbatim for metadata.
    pub raw_type: String,
    /// Cached display name from the device, if any.
    pub name: Option<String>,
}

/// SMS mailbox a message was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mailbox {
    Inbox,
    Sent,
}

impl Mailbox {
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self {
            Mailbox::Inbox => Direction::Incoming,
            Mailbox::Sent => Direction::Outgoing,
        }
    }
}

/// One message from the OS SMS store. The body is never truncated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsEntry {
    pub counterparty_raw: String,
    pub timestamp: EpochMillis,
    pub body: String,
    pub mailbox: Mailbox,
    pub read: bool,
    /// The provider's numeric message type (1 = inbox, 2 = sent).
    pub raw_type: i64,
}

/// A device history record from either channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", rename_all = "lowercase")]
pub enum RawActivityRecord {
    Call(CallLogEntry),
    Sms(SmsEntry),
}

impl RawActivityRecord {
    #[must_use]
    pub fn channel(&self) -> Channel {
        match self {
            RawActivityRecord::Call(_) => Channel::Call,
            RawActivityRecord::Sms(_) => Channel::Sms,
        }
    }

    /// The device-supplied phone string of the other party.
    #[must_use]
    pub fn counterparty_raw(&self) -> &str {
        match self {
            RawActivityRecord::Call(call) => &call.counterparty_raw,
            RawActivityRecord::Sms(sms) => &sms.counterparty_raw,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> EpochMillis {
        match self {
            RawActivityRecord::Call(call) => call.timestamp,
            RawActivityRecord::Sms(sms) => sms.timestamp,
        }
    }

    #[must_use]
    pub fn direction(&self) -> Direction {
        match self {
            RawActivityRecord::Call(call) => call.kind.direction(),
            RawActivityRecord::Sms(sms) => sms.mailbox.direction(),
        }
    }
}

impl From<CallLogEntry> for RawActivityRecord {
    fn from(entry: CallLogEntry) -> Self {
        RawActivityRecord::Call(entry)
    }
}

impl From<SmsEntry> for RawActivityRecord {
    fn from(entry: SmsEntry) -> Self {
        RawActivityRecord::Sms(entry)
    }
}
