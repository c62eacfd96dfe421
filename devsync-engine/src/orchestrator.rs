//! Sync orchestrator.
//!
//! Runs one sync pass at a time:
//!
//! 1. **Checking**: reentrancy flag, user enablement, capability vector
//! 2. **Directory**: one contact directory snapshot shared by all channels
//! 3. Per readable channel: **Reading** since the stored cursor,
//!    **Matching** counterparties to contacts, **Appending** one
//!    conversation entry per match (oldest first), then
//!    **AdvancingCursor** to "now"
//!
//! A failure inside a channel stops that channel without advancing its
//! cursor, so the same window is read again next pass. Other channels are
//! unaffected.

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::contacts::ContactService;
use crate::conversation::build_append_request;
use crate::cursor::{CursorStore, SyncSettings};
use crate::directory::ContactDirectory;
use crate::error::SyncResult;
use crate::gatekeeper::PermissionGatekeeper;
use crate::notify::NotificationHook;
use crate::phone::PhoneNormalizer;
use crate::readers::ChannelReaders;
use crate::storage::KeyValueStore;
use devsync_types::{CapabilityVector, Channel, EpochMillis, Platform, RawActivityRecord};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Where the orchestrator currently is in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Idle,
    Checking,
    Reading(Channel),
    Matching(Channel),
    Appending(Channel),
    AdvancingCursor(Channel),
}

/// Result of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    /// Call log entries appended.
    pub calls: usize,
    /// SMS messages appended.
    pub sms: usize,
    /// Channels whose processing failed; their cursors were not advanced.
    pub failed_channels: Vec<Channel>,
}

impl SyncSummary {
    pub fn total(&self) -> usize {
        self.calls + self.sms
    }

    pub fn count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Call => self.calls,
            Channel::Sms => self.sms,
        }
    }

    fn record(&mut self, channel: Channel, appended: usize) {
        match channel {
            Channel::Call => self.calls += appended,
            Channel::Sms => self.sms += appended,
        }
    }
}

/// Application lifecycle state as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Active,
    Inactive,
    Background,
}

/// Everything the orchestrator talks to.
pub struct SyncDependencies {
    pub contacts: Arc<dyn ContactService>,
    pub gatekeeper: Arc<dyn PermissionGatekeeper>,
    pub readers: ChannelReaders,
    pub store: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn NotificationHook>,
    pub clock: Arc<dyn Clock>,
}

/// Top-level entry point of the engine.
pub struct SyncOrchestrator {
    config: EngineConfig,
    normalizer: PhoneNormalizer,
    contacts: Arc<dyn ContactService>,
    gatekeeper: Arc<dyn PermissionGatekeeper>,
    readers: ChannelReaders,
    notifier: Arc<dyn NotificationHook>,
    clock: Arc<dyn Clock>,
    settings: SyncSettings,
    cursors: CursorStore,
    /// Set before the first await of a pass, cleared by [`InFlightGuard`].
    in_flight: AtomicBool,
    phase: watch::Sender<SyncPhase>,
    app_state: Mutex<AppState>,
}

/// Clears the reentrancy flag and resets the phase however a pass ends.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
    phase: &'a watch::Sender<SyncPhase>,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.phase.send_replace(SyncPhase::Idle);
        self.flag.store(false, Ordering::Release);
    }
}

impl SyncOrchestrator {
    pub fn new(config: EngineConfig, deps: SyncDependencies) -> Self {
        let settings = SyncSettings::new(Arc::clone(&deps.store), config.default_retention_days);
        let cursors = CursorStore::new(deps.store, settings.clone(), Arc::clone(&deps.clock));
        let (phase, _) = watch::channel(SyncPhase::Idle);

        Self {
            normalizer: PhoneNormalizer::new(config.default_region),
            config,
            contacts: deps.contacts,
            gatekeeper: deps.gatekeeper,
            readers: deps.readers,
            notifier: deps.notifier,
            clock: deps.clock,
            settings,
            cursors,
            in_flight: AtomicBool::new(false),
            phase,
            app_state: Mutex::new(AppState::Active),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.config.platform
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn cursors(&self) -> &CursorStore {
        &self.cursors
    }

    // ── Settings ─────────────────────────────────────────────────

    pub fn is_sync_enabled(&self) -> bool {
        self.settings.is_enabled()
    }

    pub fn set_sync_enabled(&self, enabled: bool) -> SyncResult<()> {
        self.settings.set_enabled(enabled)?;
        info!("Device sync {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    pub fn sync_period_days(&self) -> u32 {
        self.settings.period_days()
    }

    pub fn set_sync_period_days(&self, days: u32) -> SyncResult<()> {
        self.settings.set_period_days(days)
    }

    // ── Permissions ──────────────────────────────────────────────

    pub async fn check_permissions(&self) -> CapabilityVector {
        self.gatekeeper.check_permissions().await
    }

    pub async fn request_permissions(&self) -> bool {
        self.gatekeeper.request_permissions().await
    }

    /// Explains on the info channel what device sync can do here.
    pub fn show_setup_instructions(&self) {
        let message = match self.config.platform {
            Platform::Ios => {
                "Due to iOS privacy restrictions, the app cannot read your call history or \
                 text messages. Communications with contacts are logged when you interact \
                 with them through the app."
            }
            Platform::Android => {
                "To sync calls and texts automatically, allow access to your call log and \
                 SMS messages. Only activity with saved contacts is logged."
            }
            Platform::Other => "Call and SMS history is not available on this device.",
        };
        self.notifier.show_info(message);
    }

    // ── State ────────────────────────────────────────────────────

    /// Whether a pass is running.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn phase(&self) -> SyncPhase {
        *self.phase.borrow()
    }

    /// Watches phase transitions.
    pub fn subscribe_phase(&self) -> watch::Receiver<SyncPhase> {
        self.phase.subscribe()
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.phase.send_replace(phase);
    }

    // ── Triggers ─────────────────────────────────────────────────

    /// Feeds a lifecycle transition. Returning to the foreground runs a
    /// pass; every other transition is ignored.
    ///
    /// The orchestrator starts out `Active`, so reporting `Active` at cold
    /// start does nothing. Hosts run the launch pass by calling
    /// [`sync`](Self::sync) directly.
    pub async fn handle_app_state(&self, next: AppState) -> Option<SyncSummary> {
        let previous = {
            let mut state = self.app_state.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *state, next)
        };
        if next == AppState::Active && previous != AppState::Active {
            Some(self.sync().await)
        } else {
            None
        }
    }

    /// Runs one sync pass.
    ///
    /// A call made while another pass is in flight is dropped, not queued:
    /// it reports on the info channel and returns an empty summary.
    pub async fn sync(&self) -> SyncSummary {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Sync already in progress, skipping");
            self.notifier.show_info("Sync already in progress");
            return SyncSummary::default();
        }
        let _guard = InFlightGuard {
            flag: &self.in_flight,
            phase: &self.phase,
        };

        self.set_phase(SyncPhase::Checking);
        if !self.settings.is_enabled() {
            debug!("Device sync is disabled");
            return SyncSummary::default();
        }

        let capabilities = self.gatekeeper.check_permissions().await;
        let channels: Vec<Channel> = Channel::ALL
            .into_iter()
            .filter(|channel| capabilities.allows(*channel))
            .collect();
        if channels.is_empty() {
            debug!("No readable channels: {:?}", capabilities);
            return SyncSummary::default();
        }

        let mut summary = SyncSummary::default();
        let directory =
            match ContactDirectory::build(self.contacts.as_ref(), self.normalizer).await {
                Ok(directory) => directory,
                Err(e) => {
                    warn!("Failed to build contact directory: {}", e);
                    self.notifier
                        .show_error(&format!("Device sync failed to load contacts: {e}"));
                    summary.failed_channels = channels;
                    return summary;
                }
            };

        for channel in channels {
            match self.sync_channel(channel, &directory).await {
                Ok(appended) => summary.record(channel, appended),
                Err(e) => {
                    warn!("Failed to sync {} history: {}", channel, e);
                    self.notifier
                        .show_error(&format!("Failed to sync {channel} history: {e}"));
                    summary.failed_channels.push(channel);
                }
            }
        }

        info!("Sync complete: {} calls, {} SMS", summary.calls, summary.sms);
        if summary.total() > 0 {
            self.notifier.show_success(&format!(
                "Synced {} calls and {} messages from this device",
                summary.calls, summary.sms
            ));
        }
        summary
    }

    /// Processes one channel. The cursor moves only after every matched
    /// record has been appended, and only up to the instant the read began:
    /// records written while the pass runs are picked up by the next one.
    async fn sync_channel(
        &self,
        channel: Channel,
        directory: &ContactDirectory,
    ) -> SyncResult<usize> {
        self.set_phase(SyncPhase::Reading(channel));
        let since = self.cursors.get(channel)?;
        let pass_now = self.clock.now();
        let mut records = self.readers.get(channel).read(since).await?;
        records.sort_by_key(RawActivityRecord::timestamp);

        self.set_phase(SyncPhase::Matching(channel));
        let matched: Vec<_> = records
            .iter()
            .filter_map(|record| {
                directory
                    .resolve(record.counterparty_raw())
                    .map(|contact| (contact, record))
            })
            .collect();
        debug!(
            "{}: {} of {} records matched a contact",
            channel,
            matched.len(),
            records.len()
        );

        self.set_phase(SyncPhase::Appending(channel));
        for (contact, record) in &matched {
            let request =
                build_append_request(contact.id.clone(), record, self.config.preview_max_chars);
            self.contacts.add_conversation(&request).await?;
        }

        self.set_phase(SyncPhase::AdvancingCursor(channel));
        let next: EpochMillis = pass_now.max(since);
        self.cursors.set(channel, next)?;
        Ok(matched.len())
    }
}
