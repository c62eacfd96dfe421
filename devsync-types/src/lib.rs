//! Core type definitions for the device activity sync engine.
//!
//! This crate defines the plain data model shared by the engine and its
//! hosts:
//! - Channels and millisecond epoch timestamps (cursor values)
//! - Platform identity and the per-pass capability vector
//! - Raw device history records (call log entries, SMS messages)
//! - Conversation append requests sent to the contact backend
//!
//! Nothing here performs I/O. Phone normalization, directory lookup and
//! orchestration live in `devsync-engine`.

mod capability;
mod channel;
mod conversation;
mod ids;
mod record;
mod timestamp;

pub use capability::{CapabilityVector, Platform};
pub use channel::Channel;
pub use conversation::{
    ChannelMetadata, ConversationAppendRequest, ConversationMetadata, ConversationType, Direction,
};
pub use ids::ContactId;
pub use record::{CallKind, CallLogEntry, Mailbox, RawActivityRecord, SmsEntry};
pub use timestamp::EpochMillis;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),
}
