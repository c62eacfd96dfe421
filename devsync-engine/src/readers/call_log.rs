//! Android call log reader.

use super::{ChannelReader, LooseNumber};
use crate::error::SyncResult;
use async_trait::async_trait;
use devsync_types::{CallKind, CallLogEntry, Channel, EpochMillis, RawActivityRecord};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

/// A row as the native call log bridge returns it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeCallLogEntry {
    #[serde(default)]
    pub phone_number: String,
    /// `"INCOMING"`, `"OUTGOING"`, `"MISSED"` or `"UNKNOWN"`.
    #[serde(rename = "type", default)]
    pub call_type: String,
    #[serde(default)]
    pub duration: LooseNumber,
    pub timestamp: LooseNumber,
    #[serde(default)]
    pub name: Option<String>,
}

impl NativeCallLogEntry {
    /// Converts to the engine's record. Rows without a usable timestamp
    /// are dropped.
    pub fn into_entry(self) -> Option<CallLogEntry> {
        let timestamp = EpochMillis::new(self.timestamp.as_i64()?);
        let duration_seconds = self
            .duration
            .as_i64()
            .and_then(|d| u64::try_from(d).ok())
            .unwrap_or(0);
        Some(CallLogEntry {
            counterparty_raw: self.phone_number,
            timestamp,
            duration_seconds,
            kind: CallKind::from_native(&self.call_type),
            raw_type: self.call_type,
            name: self.name.filter(|n| !n.is_empty()),
        })
    }
}

/// The native call log bridge: `load(limit, {minTimestamp})`.
#[async_trait]
pub trait CallLogProvider: Send + Sync {
    async fn load(
        &self,
        limit: usize,
        min_timestamp: EpochMillis,
    ) -> SyncResult<Vec<NativeCallLogEntry>>;
}

/// Reads the Android call log through a [`CallLogProvider`].
///
/// The provider returns the newest `limit` rows at or after the cursor. A
/// full page may have cut off older rows, so the limit is doubled and the
/// load repeated until a page comes back short.
pub struct AndroidCallLogReader {
    provider: Arc<dyn CallLogProvider>,
    limit: usize,
}

impl AndroidCallLogReader {
    pub fn new(provider: Arc<dyn CallLogProvider>, limit: usize) -> Self {
        Self { provider, limit }
    }
}

#[async_trait]
impl ChannelReader for AndroidCallLogReader {
    fn channel(&self) -> Channel {
        Channel::Call
    }

    async fn read(&self, since: EpochMillis) -> SyncResult<Vec<RawActivityRecord>> {
        let mut limit = self.limit.max(1);
        let rows = loop {
            let rows = self.provider.load(limit, since).await?;
            if rows.len() < limit {
                break rows;
            }
            debug!("Call log page of {} is full, widening", limit);
            limit = limit.saturating_mul(2);
        };
        let total = rows.len();
        let records: Vec<RawActivityRecord> = rows
            .into_iter()
            .filter_map(NativeCallLogEntry::into_entry)
            .filter(|entry| entry.timestamp >= since)
            .map(RawActivityRecord::from)
            .collect();
        debug!(
            "Read {} call log entries since {} ({} returned by provider)",
            records.len(),
            since,
            total
        );
        Ok(records)
    }
}
