//! Driver for the SD109 companion controller.
//!
//! The controller sits on an I2C bus and exposes board voltages, a hardware
//! watchdog and a real-time clock with a wake alarm as 16-bit registers. It
//! also powers the host off, reboots or halts it on command.
//!
//! [`Sd109::probe`] identifies the controller and returns a device whose
//! [`voltage`](Sd109::voltage), [`watchdog`](Sd109::watchdog) and
//! [`clock`](Sd109::clock) facades are enabled by [`DriverConfig`]. System
//! power events reach the device through a [`PowerEventDispatcher`].

#![no_std]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod client;
pub mod config;
pub mod device;
pub mod error;
pub mod identity;
pub mod power;
pub mod regs;
pub mod rtc;
pub mod time;
pub mod voltage;
pub mod watchdog;

pub use client::{I2cRegisterClient, RegisterClient};
pub use config::{DriverConfig, WatchdogConfig};
pub use device::{Clock, Sd109, Voltage, Watchdog};
pub use error::{Error, Result};
pub use identity::{BootStatus, DeviceIdentity};
pub use power::{PowerEvent, PowerEventDispatcher, ShutdownHook, SlotOccupied};
pub use rtc::WakeAlarm;
pub use time::{TimeOutOfRange, TimeValue48};
pub use voltage::{NUM_CHANNELS, REFRESH_INTERVAL, VoltageAttr, VoltageChannel, VoltageKind};
pub use watchdog::{WatchdogInfo, WatchdogOptions, WatchdogParams, WatchdogState};
