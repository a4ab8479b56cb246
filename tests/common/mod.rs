//! In-memory SD109 register file shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use sd109::{RegisterClient, Sd109, regs};

pub type Device = Sd109<CriticalSectionRawMutex, FakeBus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusError;

#[derive(Default)]
pub struct BusState {
    pub regs: [u16; regs::NUM_REGS as usize],
    /// Every read attempt, in order.
    pub reads: Vec<u8>,
    /// Every write attempt, in order, including failed ones.
    pub writes: Vec<(u8, u16)>,
    pub fail_read: Option<u8>,
    pub fail_write: Option<u8>,
    /// Time every read spends on the bus.
    pub read_delay: Option<Duration>,
    /// Called on every read before the delay, outside the state lock.
    pub on_read: Option<Arc<dyn Fn() + Send + Sync>>,
}

/// Cloneable handle; the driver owns one clone, the test keeps another.
#[derive(Clone, Default)]
pub struct FakeBus {
    state: Arc<Mutex<BusState>>,
}

impl FakeBus {
    /// A healthy controller: firmware 0x0102, booted from power-up, watchdog
    /// programmed to 30 s timeout and 45 s wait.
    pub fn sd109() -> Self {
        let bus = Self::default();
        {
            let mut s = bus.state();
            s.regs[regs::CHIP_ID as usize] = regs::CHIP_ID_VALUE;
            s.regs[regs::FIRMWARE_VERSION as usize] = 0x0102;
            s.regs[regs::STATUS as usize] = regs::STATUS_POWERUP;
            s.regs[regs::WDOG_TIMEOUT as usize] = 0x091e;
            for ch in 0..5u8 {
                let base = regs::VOLTAGE_BASE + ch * 3;
                s.regs[base as usize] = 5000 + ch as u16;
                s.regs[base as usize + 1] = 4900 + ch as u16;
                s.regs[base as usize + 2] = 5100 + ch as u16;
            }
        }
        bus
    }

    pub fn state(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap()
    }

    pub fn set(&self, reg: u8, value: u16) {
        self.state().regs[reg as usize] = value;
    }

    pub fn get(&self, reg: u8) -> u16 {
        self.state().regs[reg as usize]
    }

    pub fn reads(&self) -> Vec<u8> {
        self.state().reads.clone()
    }

    pub fn writes(&self) -> Vec<(u8, u16)> {
        self.state().writes.clone()
    }

    pub fn clear_log(&self) {
        let mut s = self.state();
        s.reads.clear();
        s.writes.clear();
    }

    pub fn fail_read_at(&self, reg: Option<u8>) {
        self.state().fail_read = reg;
    }

    pub fn fail_write_at(&self, reg: Option<u8>) {
        self.state().fail_write = reg;
    }

    pub fn set_read_delay(&self, delay: Duration) {
        self.state().read_delay = Some(delay);
    }

    pub fn on_read(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.state().on_read = Some(Arc::new(hook));
    }
}

impl RegisterClient for FakeBus {
    type Error = BusError;

    fn read(&mut self, addr: u8) -> Result<u16, BusError> {
        let (result, delay, hook) = {
            let mut s = self.state();
            s.reads.push(addr);
            let result = if s.fail_read == Some(addr) || addr > regs::MAX_REGISTER {
                Err(BusError)
            } else {
                Ok(s.regs[addr as usize])
            };
            (result, s.read_delay, s.on_read.clone())
        };
        if let Some(hook) = hook {
            hook();
        }
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        result
    }

    fn write(&mut self, addr: u8, value: u16) -> Result<(), BusError> {
        let mut s = self.state();
        s.writes.push((addr, value));
        if s.fail_write == Some(addr) || addr > regs::MAX_REGISTER {
            return Err(BusError);
        }
        s.regs[addr as usize] = value;
        Ok(())
    }
}

/// Probe a fresh fake controller, returning the device and the test handle.
/// The probe traffic is cleared from the log.
pub fn probe(config: sd109::DriverConfig) -> (Device, FakeBus) {
    let bus = FakeBus::sd109();
    let device = Device::probe(bus.clone(), config).expect("probe");
    bus.clear_log();
    (device, bus)
}

pub fn all_enabled() -> sd109::DriverConfig {
    let mut config = sd109::DriverConfig::new();
    config.clock_enabled = true;
    config.watchdog.enabled = true;
    config
}
