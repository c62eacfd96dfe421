//! Channel readers.
//!
//! A reader pulls raw device history newer than a cursor. Readers never
//! touch the cursor store and have no side effects. A platform without a
//! provider for a channel gets an [`UnsupportedReader`], which returns an
//! empty batch, so the orchestrator's control flow is the same everywhere.

pub mod call_log;
pub mod sms;

pub use call_log::{AndroidCallLogReader, CallLogProvider, NativeCallLogEntry};
pub use sms::{AndroidSmsReader, NativeSmsMessage, SmsErrorCallback, SmsProvider, SmsSuccessCallback};

use crate::config::EngineConfig;
use crate::error::SyncResult;
use async_trait::async_trait;
use devsync_types::{Channel, EpochMillis, Platform, RawActivityRecord};
use serde::Deserialize;
use std::sync::Arc;

/// Reads one channel's device history.
#[async_trait]
pub trait ChannelReader: Send + Sync {
    fn channel(&self) -> Channel;

    /// Records at or after `since`.
    async fn read(&self, since: EpochMillis) -> SyncResult<Vec<RawActivityRecord>>;
}

/// Reader for a channel the platform cannot provide.
#[derive(Debug, Clone, Copy)]
pub struct UnsupportedReader {
    channel: Channel,
}

impl UnsupportedReader {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl ChannelReader for UnsupportedReader {
    fn channel(&self) -> Channel {
        self.channel
    }

    async fn read(&self, _since: EpochMillis) -> SyncResult<Vec<RawActivityRecord>> {
        Ok(Vec::new())
    }
}

/// The reader chosen for each channel.
#[derive(Clone)]
pub struct ChannelReaders {
    call: Arc<dyn ChannelReader>,
    sms: Arc<dyn ChannelReader>,
}

impl ChannelReaders {
    pub fn new(call: Arc<dyn ChannelReader>, sms: Arc<dyn ChannelReader>) -> Self {
        Self { call, sms }
    }

    /// Selects readers by platform. Android wires whichever native
    /// providers are available; every other platform reads nothing.
    pub fn for_platform(
        platform: Platform,
        call_log: Option<Arc<dyn CallLogProvider>>,
        sms: Option<Arc<dyn SmsProvider>>,
        config: &EngineConfig,
    ) -> Self {
        if !platform.exposes_device_history() {
            return Self::unsupported();
        }

        let call: Arc<dyn ChannelReader> = match call_log {
            Some(provider) => Arc::new(AndroidCallLogReader::new(provider, config.call_log_limit)),
            None => Arc::new(UnsupportedReader::new(Channel::Call)),
        };
        let sms: Arc<dyn ChannelReader> = match sms {
            Some(provider) => Arc::new(AndroidSmsReader::new(provider)),
            None => Arc::new(UnsupportedReader::new(Channel::Sms)),
        };
        Self { call, sms }
    }

    /// Readers that never return anything.
    pub fn unsupported() -> Self {
        Self {
            call: Arc::new(UnsupportedReader::new(Channel::Call)),
            sms: Arc::new(UnsupportedReader::new(Channel::Sms)),
        }
    }

    pub fn get(&self, channel: Channel) -> &Arc<dyn ChannelReader> {
        match channel {
            Channel::Call => &self.call,
            Channel::Sms => &self.sms,
        }
    }
}

/// Native bridges are loose about number encoding: timestamps arrive as
/// `"1700000000000"` from one provider and `1700000000000` from another.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(i64),
    Text(String),
}

impl LooseNumber {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Number(n) => Some(*n),
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Default for LooseNumber {
    fn default() -> Self {
        LooseNumber::Number(0)
    }
}
