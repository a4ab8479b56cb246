//! Bind-time configuration.
//!
//! Read once when the device is probed. The structs serialize with postcard
//! so a firmware can keep them next to its other persistent settings.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogConfig {
    pub enabled: bool,
    /// Once started, the watchdog refuses to stop.
    pub nowayout: bool,
    /// Takes priority over the timeout stored on the device.
    pub timeout_override: Option<u32>,
    /// Takes priority over the device wait only when it is at least
    /// [`MIN_WDOG_WAIT`](crate::regs::MIN_WDOG_WAIT) seconds.
    pub wait_override: Option<u32>,
    pub min_timeout: u32,
    pub max_timeout: u32,
}

impl WatchdogConfig {
    pub const fn new() -> Self {
        Self {
            enabled: false,
            nowayout: false,
            timeout_override: None,
            wait_override: None,
            min_timeout: 0,
            max_timeout: 255,
        }
    }
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DriverConfig {
    pub voltage_enabled: bool,
    pub clock_enabled: bool,
    pub watchdog: WatchdogConfig,
}

impl DriverConfig {
    pub const fn new() -> Self {
        Self {
            voltage_enabled: true,
            clock_enabled: false,
            watchdog: WatchdogConfig::new(),
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }

    /// Serialize into `buf`, returning the used part.
    pub fn to_slice<'a>(&self, buf: &'a mut [u8]) -> Result<&'a mut [u8], postcard::Error> {
        postcard::to_slice(self, buf)
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
