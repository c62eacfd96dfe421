//! Android SMS reader.
//!
//! The native SMS bridge is callback based: `list(filter, on_error,
//! on_success)`. [`list_messages`] wraps it in a single-shot future so the
//! rest of the engine stays uniformly async.

use super::{ChannelReader, LooseNumber};
use crate::error::{SyncError, SyncResult};
use async_trait::async_trait;
use devsync_types::{Channel, EpochMillis, Mailbox, RawActivityRecord, SmsEntry};
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

/// Native message type for received messages.
pub const SMS_TYPE_INBOX: i64 = 1;
/// Native message type for sent messages.
pub const SMS_TYPE_SENT: i64 = 2;

pub type SmsErrorCallback = Box<dyn FnOnce(String) + Send>;
pub type SmsSuccessCallback = Box<dyn FnOnce(usize, String) + Send>;

/// The native SMS bridge.
///
/// Exactly one of the callbacks is expected to fire. `on_success` receives
/// the row count and a JSON array of [`NativeSmsMessage`].
pub trait SmsProvider: Send + Sync {
    fn list(&self, filter_json: String, on_error: SmsErrorCallback, on_success: SmsSuccessCallback);
}

/// A message as the native SMS bridge returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NativeSmsMessage {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub body: String,
    pub date: LooseNumber,
    #[serde(rename = "type", default)]
    pub message_type: LooseNumber,
    #[serde(default)]
    pub read: LooseFlag,
}

impl NativeSmsMessage {
    /// Converts to the engine's record. Messages outside the inbox and
    /// sent boxes (drafts, outbox, failed) are not history and are dropped,
    /// as are rows without a usable date.
    pub fn into_entry(self) -> Option<SmsEntry> {
        let timestamp = EpochMillis::new(self.date.as_i64()?);
        let raw_type = self.message_type.as_i64()?;
        let mailbox = match raw_type {
            SMS_TYPE_INBOX => Mailbox::Inbox,
            SMS_TYPE_SENT => Mailbox::Sent,
            _ => return None,
        };
        Some(SmsEntry {
            counterparty_raw: self.address,
            timestamp,
            body: self.body,
            mailbox,
            read: self.read.is_set(),
            raw_type,
        })
    }
}

/// Read flags arrive as `0`/`1` or as booleans depending on the bridge.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseFlag {
    Bool(bool),
    Number(i64),
}

impl LooseFlag {
    pub fn is_set(&self) -> bool {
        match self {
            LooseFlag::Bool(b) => *b,
            LooseFlag::Number(n) => *n != 0,
        }
    }
}

impl Default for LooseFlag {
    fn default() -> Self {
        LooseFlag::Bool(false)
    }
}

/// Filter asking for both mailboxes from `since` on.
pub fn sms_filter(since: EpochMillis) -> String {
    json!({ "box": "", "minDate": since.as_millis() }).to_string()
}

/// Runs one `list` call on the provider and waits for whichever callback
/// fires first.
pub async fn list_messages(
    provider: &dyn SmsProvider,
    filter_json: String,
) -> SyncResult<Vec<NativeSmsMessage>> {
    let (tx, rx) = oneshot::channel::<Result<(usize, String), String>>();
    let slot = Arc::new(Mutex::new(Some(tx)));
    let error_slot = Arc::clone(&slot);

    provider.list(
        filter_json,
        Box::new(move |message| {
            if let Some(tx) = take_sender(&error_slot) {
                let _ = tx.send(Err(message));
            }
        }),
        Box::new(move |count, rows| {
            if let Some(tx) = take_sender(&slot) {
                let _ = tx.send(Ok((count, rows)));
            }
        }),
    );

    match rx.await {
        Ok(Ok((count, rows))) => {
            let messages: Vec<NativeSmsMessage> = serde_json::from_str(&rows)?;
            debug!("SMS provider returned {} rows (reported {})", messages.len(), count);
            Ok(messages)
        }
        Ok(Err(message)) => Err(SyncError::Provider(format!("sms list failed: {message}"))),
        Err(_) => Err(SyncError::ChannelClosed),
    }
}

fn take_sender<T>(slot: &Mutex<Option<oneshot::Sender<T>>>) -> Option<oneshot::Sender<T>> {
    slot.lock().ok().and_then(|mut guard| guard.take())
}

/// Reads Android SMS history through an [`SmsProvider`].
pub struct AndroidSmsReader {
    provider: Arc<dyn SmsProvider>,
}

impl AndroidSmsReader {
    pub fn new(provider: Arc<dyn SmsProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl ChannelReader for AndroidSmsReader {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    async fn read(&self, since: EpochMillis) -> SyncResult<Vec<RawActivityRecord>> {
        let messages = list_messages(self.provider.as_ref(), sms_filter(since)).await?;
        let records: Vec<RawActivityRecord> = messages
            .into_iter()
            .filter_map(NativeSmsMessage::into_entry)
            .filter(|entry| entry.timestamp >= since)
            .map(RawActivityRecord::from)
            .collect();
        debug!("Read {} SMS messages since {}", records.len(), since);
        Ok(records)
    }
}
