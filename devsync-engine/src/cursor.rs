//! Per-channel sync cursors and user-level sync settings.
//!
//! Both live in the durable key-value store under fixed keys. Cursors are
//! written only by the orchestrator, after a channel's batch is fully
//! processed; the store itself does not enforce monotonicity.

use crate::clock::Clock;
use crate::error::{SyncError, SyncResult};
use crate::storage::KeyValueStore;
use devsync_types::{Channel, EpochMillis};
use std::sync::Arc;
use tracing::warn;

/// `"true"` / `"false"`; absent means disabled.
pub const SYNC_ENABLED_KEY: &str = "device_sync_enabled";
/// Retention window in whole days, stored as a decimal string.
pub const SYNC_PERIOD_KEY: &str = "device_sync_period";

/// User-level sync settings.
#[derive(Clone)]
pub struct SyncSettings {
    kv: Arc<dyn KeyValueStore>,
    default_period_days: u32,
}

impl SyncSettings {
    pub fn new(kv: Arc<dyn KeyValueStore>, default_period_days: u32) -> Self {
        Self {
            kv,
            default_period_days,
        }
    }

    /// Whether the user turned device sync on. Read failures count as off.
    pub fn is_enabled(&self) -> bool {
        match self.kv.get(SYNC_ENABLED_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!("Failed to read sync enabled flag: {}", e);
                false
            }
        }
    }

    pub fn set_enabled(&self, enabled: bool) -> SyncResult<()> {
        self.kv
            .set(SYNC_ENABLED_KEY, if enabled { "true" } else { "false" })
    }

    /// The look-back window for channels without a cursor.
    ///
    /// Missing, unparseable or zero values fall back to the configured
    /// default.
    pub fn period_days(&self) -> u32 {
        let stored = match self.kv.get(SYNC_PERIOD_KEY) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read sync period: {}", e);
                None
            }
        };
        stored
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|days| *days > 0)
            .unwrap_or(self.default_period_days)
    }

    pub fn set_period_days(&self, days: u32) -> SyncResult<()> {
        if days == 0 {
            return Err(SyncError::Config(
                "sync period must be at least one day".to_string(),
            ));
        }
        self.kv.set(SYNC_PERIOD_KEY, &days.to_string())
    }
}

/// Persists, per channel, the time of the last successful sync.
#[derive(Clone)]
pub struct CursorStore {
    kv: Arc<dyn KeyValueStore>,
    settings: SyncSettings,
    clock: Arc<dyn Clock>,
}

impl CursorStore {
    pub fn new(kv: Arc<dyn KeyValueStore>, settings: SyncSettings, clock: Arc<dyn Clock>) -> Self {
        Self { kv, settings, clock }
    }

    /// Returns the channel's cursor, or "now minus the retention window"
    /// when none has been stored yet.
    pub fn get(&self, channel: Channel) -> SyncResult<EpochMillis> {
        match self.stored(channel)? {
            Some(cursor) => Ok(cursor),
            None => Ok(self.clock.now().minus_days(self.settings.period_days())),
        }
    }

    /// The stored cursor, if any. Unparseable values read as absent.
    pub fn stored(&self, channel: Channel) -> SyncResult<Option<EpochMillis>> {
        let Some(raw) = self.kv.get(channel.cursor_key())? else {
            return Ok(None);
        };
        match raw.parse::<EpochMillis>() {
            Ok(cursor) => Ok(Some(cursor)),
            Err(e) => {
                warn!("Ignoring corrupt {} cursor: {}", channel, e);
                Ok(None)
            }
        }
    }

    pub fn set(&self, channel: Channel, cursor: EpochMillis) -> SyncResult<()> {
        self.kv.set(channel.cursor_key(), &cursor.to_string())
    }

    /// Forgets the channel's cursor so the next pass starts from the
    /// retention window again.
    pub fn reset(&self, channel: Channel) -> SyncResult<()> {
        self.kv.remove(channel.cursor_key())
    }
}
