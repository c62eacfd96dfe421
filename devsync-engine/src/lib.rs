//! Device call and SMS history sync engine.
//!
//! Pulls a phone's call log and SMS history into the contact backend's
//! per-contact conversation timeline, incrementally and idempotently.
//!
//! # Architecture
//!
//! Every collaborator is injected, so the engine has no compile-time
//! dependency on a UI toolkit or a mobile runtime.
//!
//! ## Components
//!
//! - **Gatekeeper**: OS permissions to a per-pass capability vector
//! - **Phone**: normalizes device phone strings into comparable keys
//! - **Directory**: phone key to contact index, rebuilt every pass
//! - **Readers**: per-channel device history since a cursor
//! - **Cursor**: per-channel watermarks and user sync settings
//! - **Notify**: success / error / info sink for the host UI
//! - **Orchestrator**: runs passes under a reentrancy guard
//!
//! ## Sync Pass
//!
//! 1. **Check**: skip if a pass is running or sync is disabled
//! 2. **Capabilities**: ask the gatekeeper which channels are readable
//! 3. **Directory**: fetch contacts and index every phone number
//! 4. **Read**: each readable channel since its cursor
//! 5. **Match & Append**: one conversation entry per matched record
//! 6. **Advance**: move the channel's cursor to now, only on success
//!
//! # Example
//!
//! ```
//! use devsync_engine::phone::{normalize, Region};
//!
//! let a = normalize("(555) 123-4567", Some(Region::US));
//! let b = normalize("+1 555 123 4567", None);
//! assert_eq!(a, b);
//! ```

pub mod clock;
pub mod config;
pub mod contacts;
pub mod conversation;
pub mod cursor;
pub mod directory;
mod error;
pub mod gatekeeper;
pub mod notify;
mod orchestrator;
pub mod phone;
pub mod readers;
pub mod storage;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use contacts::{Contact, ContactService, ContactServiceConfig, HttpContactService};
pub use cursor::{CursorStore, SyncSettings, SYNC_ENABLED_KEY, SYNC_PERIOD_KEY};
pub use directory::{ContactDirectory, ContactRef};
pub use error::{SyncError, SyncResult};
pub use gatekeeper::{
    Permission, PermissionGatekeeper, PermissionProvider, PermissionStatus, PlatformGatekeeper,
    StaticGatekeeper,
};
pub use notify::{NoopNotifier, NotificationHook, TracingNotifier};
pub use orchestrator::{AppState, SyncDependencies, SyncOrchestrator, SyncPhase, SyncSummary};
pub use phone::{NormalizedPhoneKey, PhoneNormalizer, Region};
pub use readers::{ChannelReader, ChannelReaders, UnsupportedReader};
pub use storage::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
