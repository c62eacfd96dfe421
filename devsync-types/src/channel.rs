//! Synchronization channels.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the independent device history streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// The OS call log.
    Call,
    /// The OS SMS store.
    Sms,
}

impl Channel {
    /// All channels, in the order a pass processes them.
    pub const ALL: [Channel; 2] = [Channel::Call, Channel::Sms];

    /// Durable storage key holding this channel's cursor.
    #[must_use]
    pub const fn cursor_key(&self) -> &'static str {
        match self {
            Channel::Call => "last_call_sync_timestamp",
            Channel::Sms => "last_sms_sync_timestamp",
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Channel::Call => "call",
            Channel::Sms => "sms",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "call" | "calls" => Ok(Channel::Call),
            "sms" => Ok(Channel::Sms),
            _ => Err(Error::UnknownChannel(s.to_string())),
        }
    }
}
