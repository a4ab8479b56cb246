//! System power events forwarded to the controller.
//!
//! The OS signals power-off, restart and halt without saying which device
//! should act on it, so a single device is registered in a
//! [`PowerEventDispatcher`] slot at bind time and removed at unbind. Only one
//! device can be registered at a time.

use core::cell::Cell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::regs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerEvent {
    PowerOff,
    Restart,
    Halt,
}

impl PowerEvent {
    /// Value written to the command register.
    pub const fn command(self) -> u16 {
        match self {
            PowerEvent::PowerOff => regs::CMD_POWEROFF,
            PowerEvent::Restart => regs::CMD_REBOOT,
            PowerEvent::Halt => regs::CMD_HALT,
        }
    }
}

/// Receiver of power events. Implementations must not block on state that
/// may already be held and must not fail; errors end as diagnostics.
pub trait ShutdownHook {
    fn on_power_event(&self, event: PowerEvent);
}

/// Returned by [`PowerEventDispatcher::register`] when a device is already
/// registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlotOccupied;

impl core::fmt::Display for SlotOccupied {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("a device is already registered for power events")
    }
}

impl core::error::Error for SlotOccupied {}

type Hook<'d> = &'d (dyn ShutdownHook + Sync);

/// Slot holding the one device that receives power events.
pub struct PowerEventDispatcher<'d, M: RawMutex> {
    slot: Mutex<M, Cell<Option<Hook<'d>>>>,
}

impl<'d, M: RawMutex> PowerEventDispatcher<'d, M> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Cell::new(None)),
        }
    }

    pub fn register(&self, hook: Hook<'d>) -> Result<(), SlotOccupied> {
        self.slot.lock(|slot| {
            if slot.get().is_some() {
                return Err(SlotOccupied);
            }
            slot.set(Some(hook));
            Ok(())
        })
    }

    /// Clear the slot. Returns whether a device was registered.
    pub fn unregister(&self) -> bool {
        self.slot.lock(|slot| slot.take().is_some())
    }

    pub fn is_registered(&self) -> bool {
        self.slot.lock(|slot| slot.get().is_some())
    }

    /// Forward `event` to the registered device, if any. Never fails.
    pub fn notify(&self, event: PowerEvent) {
        match self.slot.lock(|slot| slot.get()) {
            Some(hook) => hook.on_power_event(event),
            None => debug!("no device registered for power events"),
        }
    }
}

impl<M: RawMutex> Default for PowerEventDispatcher<'_, M> {
    fn default() -> Self {
        Self::new()
    }
}
