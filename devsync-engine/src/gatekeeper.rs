//! Permission gatekeeper.
//!
//! Turns platform identity and live OS permission state into the
//! [`CapabilityVector`] a sync pass runs under. iOS never exposes call or
//! SMS history to apps, so only the contacts flag can be true there.

use crate::error::SyncResult;
use crate::notify::NotificationHook;
use async_trait::async_trait;
use devsync_types::{CapabilityVector, Platform};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// OS-level permissions the engine cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ReadCallLog,
    ReadSms,
    ReadContacts,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Permission::ReadCallLog => "READ_CALL_LOG",
            Permission::ReadSms => "READ_SMS",
            Permission::ReadContacts => "READ_CONTACTS",
        };
        f.write_str(name)
    }
}

/// Outcome of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and the OS will not prompt again.
    NeverAskAgain,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// The OS permission API.
#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Reads the current grant without prompting.
    async fn check(&self, permission: Permission) -> SyncResult<bool>;

    /// Prompts for the given permissions in one batch.
    async fn request(
        &self,
        permissions: &[Permission],
    ) -> SyncResult<HashMap<Permission, PermissionStatus>>;
}

/// Source of the per-pass capability vector.
#[async_trait]
pub trait PermissionGatekeeper: Send + Sync {
    /// Current capabilities. Never prompts, never fails: anything that
    /// cannot be confirmed reads as denied.
    async fn check_permissions(&self) -> CapabilityVector;

    /// Prompts the user. Returns whether the restrictable history
    /// capabilities were (at least partly) granted; on iOS, whether
    /// contacts access was granted.
    async fn request_permissions(&self) -> bool;
}

/// Gatekeeper backed by the real OS permission API.
pub struct PlatformGatekeeper {
    platform: Platform,
    provider: Arc<dyn PermissionProvider>,
    notifier: Arc<dyn NotificationHook>,
}

impl PlatformGatekeeper {
    pub fn new(
        platform: Platform,
        provider: Arc<dyn PermissionProvider>,
        notifier: Arc<dyn NotificationHook>,
    ) -> Self {
        Self {
            platform,
            provider,
            notifier,
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    async fn granted(&self, permission: Permission) -> bool {
        match self.provider.check(permission).await {
            Ok(granted) => granted,
            Err(e) => {
                warn!("Permission check for {} failed: {}", permission, e);
                self.notifier
                    .show_error(&format!("Could not check {permission} permission: {e}"));
                false
            }
        }
    }
}

#[async_trait]
impl PermissionGatekeeper for PlatformGatekeeper {
    async fn check_permissions(&self) -> CapabilityVector {
        match self.platform {
            Platform::Android => CapabilityVector {
                call_log_readable: self.granted(Permission::ReadCallLog).await,
                sms_readable: self.granted(Permission::ReadSms).await,
                contacts_readable: self.granted(Permission::ReadContacts).await,
            },
            Platform::Ios => CapabilityVector {
                call_log_readable: false,
                sms_readable: false,
                contacts_readable: self.granted(Permission::ReadContacts).await,
            },
            Platform::Other => CapabilityVector::denied(),
        }
    }

    async fn request_permissions(&self) -> bool {
        let requested: &[Permission] = match self.platform {
            Platform::Android => &[
                Permission::ReadCallLog,
                Permission::ReadSms,
                Permission::ReadContacts,
            ],
            Platform::Ios => &[Permission::ReadContacts],
            Platform::Other => {
                debug!("No device permissions to request on this platform");
                return false;
            }
        };

        let grants = match self.provider.request(requested).await {
            Ok(grants) => grants,
            Err(e) => {
                warn!("Permission request failed: {}", e);
                self.notifier
                    .show_error(&format!("Permission request failed: {e}"));
                return false;
            }
        };
        let is_granted =
            |p: Permission| grants.get(&p).is_some_and(PermissionStatus::is_granted);

        let call_log = is_granted(Permission::ReadCallLog);
        let sms = is_granted(Permission::ReadSms);
        let contacts = is_granted(Permission::ReadContacts);
        info!(
            "Permissions granted: call_log={} sms={} contacts={}",
            call_log, sms, contacts
        );

        let ok = match self.platform {
            Platform::Ios => contacts,
            _ => call_log || sms,
        };
        if !ok {
            let message = match self.platform {
                Platform::Ios => "Contacts access was denied",
                _ => "Call log and SMS access were denied",
            };
            self.notifier.show_error(message);
        }
        ok
    }
}

/// Gatekeeper with a fixed capability vector, for hosts whose
/// capabilities are known up front (desktop replays, tests).
#[derive(Debug, Clone, Copy)]
pub struct StaticGatekeeper {
    capabilities: CapabilityVector,
}

impl StaticGatekeeper {
    pub fn new(capabilities: CapabilityVector) -> Self {
        Self { capabilities }
    }
}

#[async_trait]
impl PermissionGatekeeper for StaticGatekeeper {
    async fn check_permissions(&self) -> CapabilityVector {
        self.capabilities
    }

    async fn request_permissions(&self) -> bool {
        self.capabilities.any_channel()
    }
}
