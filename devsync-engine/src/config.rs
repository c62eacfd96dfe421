//! Engine configuration.

use crate::phone::Region;
use devsync_types::Platform;
use serde::{Deserialize, Serialize};

/// Retention window used when a channel has never been synced.
pub const DEFAULT_RETENTION_DAYS: u32 = 7;
/// SMS previews are cut to this many characters.
pub const DEFAULT_PREVIEW_MAX_CHARS: usize = 50;
/// Upper bound on call log rows fetched per pass.
pub const DEFAULT_CALL_LOG_LIMIT: usize = 100;

/// Configuration for the sync engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Host platform; selects readers and permission semantics.
    pub platform: Platform,
    /// Region used to read phone numbers written without a country code.
    pub default_region: Region,
    /// Fallback look-back when no cursor or user period is stored.
    pub default_retention_days: u32,
    /// Maximum characters of an SMS body kept in the preview.
    pub preview_max_chars: usize,
    /// First page size asked of the OS call log provider. Doubled while
    /// pages come back full.
    pub call_log_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            platform: Platform::current(),
            default_region: Region::default(),
            default_retention_days: DEFAULT_RETENTION_DAYS,
            preview_max_chars: DEFAULT_PREVIEW_MAX_CHARS,
            call_log_limit: DEFAULT_CALL_LOG_LIMIT,
        }
    }
}
