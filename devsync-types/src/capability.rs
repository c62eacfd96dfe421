//! Platform identity and the capability vector.

use crate::{Channel, Error};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The host operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
    /// Desktop and server hosts. No device history providers exist here.
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_os = "ios") {
            Platform::Ios
        } else {
            Platform::Other
        }
    }

    /// Whether the OS lets third-party apps read call and SMS history at all.
    #[must_use]
    pub const fn exposes_device_history(&self) -> bool {
        matches!(self, Platform::Android)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
            Platform::Other => "other",
        };
        f.write_str(name)
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "android" => Ok(Platform::Android),
            "ios" => Ok(Platform::Ios),
            "other" | "desktop" => Ok(Platform::Other),
            _ => Err(Error::UnknownPlatform(s.to_string())),
        }
    }
}

/// What the current sync pass is allowed to read.
///
/// Computed once per pass from platform identity and live permission
/// state. The default is the conservative all-denied vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilityVector {
    pub call_log_readable: bool,
    pub sms_readable: bool,
    pub contacts_readable: bool,
}

impl CapabilityVector {
    /// Nothing granted.
    #[must_use]
    pub const fn denied() -> Self {
        Self {
            call_log_readable: false,
            sms_readable: false,
            contacts_readable: false,
        }
    }

    /// Whether the given channel may be read this pass.
    #[must_use]
    pub const fn allows(&self, channel: Channel) -> bool {
        match channel {
            Channel::Call => self.call_log_readable,
            Channel::Sms => self.sms_readable,
        }
    }

    /// Whether any history channel is readable.
    #[must_use]
    pub const fn any_channel(&self) -> bool {
        self.call_log_readable || self.sms_readable
    }
}
