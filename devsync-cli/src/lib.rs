//! Host adapters for running the sync engine outside a phone.
//!
//! A desktop host has no OS call log or SMS store, so history is replayed
//! from JSON exports in the same shape the native bridges return.

use anyhow::{Context, Result};
use async_trait::async_trait;
use devsync_engine::readers::{
    CallLogProvider, NativeCallLogEntry, SmsErrorCallback, SmsProvider, SmsSuccessCallback,
};
use devsync_engine::{ContactServiceConfig, EngineConfig, SyncError, SyncOrchestrator, SyncResult};
use devsync_types::{CapabilityVector, Channel, EpochMillis, Platform};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Everything the CLI reads from its config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub engine: EngineConfig,
    pub contacts: ContactServiceConfig,
    /// Where cursors and settings are kept. Defaults to `devsync.db` in the
    /// working directory.
    pub db_path: Option<PathBuf>,
}

impl CliConfig {
    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("devsync.db"))
    }
}

/// Loads the config file, or defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<CliConfig> {
    let Some(path) = path else {
        return Ok(CliConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid config {}", path.display()))
}

/// Capabilities of a replay host: a channel is readable when its export
/// was supplied, and only on platforms that expose device history.
pub fn replay_capabilities(platform: Platform, calls: bool, sms: bool) -> CapabilityVector {
    let history = platform.exposes_device_history();
    CapabilityVector {
        call_log_readable: history && calls,
        sms_readable: history && sms,
        contacts_readable: true,
    }
}

/// Call log provider over a JSON array of native call log rows.
pub struct JsonCallLogProvider {
    path: PathBuf,
}

impl JsonCallLogProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CallLogProvider for JsonCallLogProvider {
    async fn load(
        &self,
        limit: usize,
        min_timestamp: EpochMillis,
    ) -> SyncResult<Vec<NativeCallLogEntry>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SyncError::Provider(format!("failed to read {}: {e}", self.path.display()))
        })?;
        let mut rows: Vec<NativeCallLogEntry> = serde_json::from_str(&raw)?;
        rows.retain(|row| {
            row.timestamp
                .as_i64()
                .is_some_and(|ts| ts >= min_timestamp.as_millis())
        });
        // The device provider answers newest first.
        rows.sort_by_key(|row| std::cmp::Reverse(row.timestamp.as_i64()));
        rows.truncate(limit);
        debug!("Loaded {} call log rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }
}

/// SMS provider over a JSON array of native SMS rows.
pub struct JsonSmsProvider {
    path: PathBuf,
}

impl JsonSmsProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn rows(&self, filter_json: &str) -> Result<Vec<Value>> {
        let filter: Value = serde_json::from_str(filter_json).context("Invalid SMS filter")?;
        let min_date = filter.get("minDate").and_then(Value::as_i64).unwrap_or(0);
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        let rows: Vec<Value> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid SMS export {}", self.path.display()))?;
        Ok(rows
            .into_iter()
            .filter(|row| date_of(row).is_some_and(|date| date >= min_date))
            .collect())
    }
}

fn date_of(row: &Value) -> Option<i64> {
    match row.get("date")? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl SmsProvider for JsonSmsProvider {
    fn list(&self, filter_json: String, on_error: SmsErrorCallback, on_success: SmsSuccessCallback) {
        match self.rows(&filter_json) {
            Ok(rows) => match serde_json::to_string(&rows) {
                Ok(payload) => on_success(rows.len(), payload),
                Err(e) => on_error(e.to_string()),
            },
            Err(e) => on_error(format!("{e:#}")),
        }
    }
}

/// What `devsync status` prints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub platform: Platform,
    pub enabled: bool,
    pub period_days: u32,
    pub call_cursor: Option<EpochMillis>,
    pub sms_cursor: Option<EpochMillis>,
}

impl StatusReport {
    pub fn collect(orchestrator: &SyncOrchestrator) -> Result<Self> {
        let cursors = orchestrator.cursors();
        Ok(Self {
            platform: orchestrator.platform(),
            enabled: orchestrator.is_sync_enabled(),
            period_days: orchestrator.sync_period_days(),
            call_cursor: cursors.stored(Channel::Call)?,
            sms_cursor: cursors.stored(Channel::Sms)?,
        })
    }
}
