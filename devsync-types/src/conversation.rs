//! Conversation append requests.
//!
//! The unit of output of a sync pass: one request per matched device
//! record, sent once to the contact backend. The JSON shape of
//! [`ConversationMetadata`] is what the backend stores verbatim.

use crate::{Channel, ContactId, EpochMillis};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of conversation entry on the contact timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationType {
    Call,
    Sms,
}

impl ConversationType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConversationType::Call => "call",
            ConversationType::Sms => "sms",
        }
    }
}

impl From<Channel> for ConversationType {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Call => ConversationType::Call,
            Channel::Sms => ConversationType::Sms,
        }
    }
}

impl fmt::Display for ConversationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side initiated the communication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel-specific metadata fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChannelMetadata {
    Call {
        duration: u64,
        #[serde(rename = "callType")]
        call_type: String,
    },
    Sms {
        #[serde(rename = "fullMessage")]
        full_message: String,
        read: bool,
        #[serde(rename = "messageType")]
        message_type: i64,
    },
}

/// Metadata attached to every synced conversation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    #[serde(flatten)]
    pub detail: ChannelMetadata,
    /// Always `true` for entries produced by this engine.
    pub synced_from_device: bool,
    /// Device timestamp of the source record.
    pub original_timestamp: EpochMillis,
}

/// One append against a contact's conversation timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationAppendRequest {
    pub contact_id: ContactId,
    #[serde(rename = "type")]
    pub kind: ConversationType,
    pub direction: Direction,
    pub preview_content: String,
    pub metadata: ConversationMetadata,
}
