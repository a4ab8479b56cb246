//! Bound device and its voltage, watchdog and clock facades.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_time::Instant;

use crate::client::RegisterClient;
use crate::config::DriverConfig;
use crate::error::Error;
use crate::identity::DeviceIdentity;
use crate::power::{PowerEvent, ShutdownHook};
use crate::regs;
use crate::rtc::{self, AlarmShadow, WakeAlarm};
use crate::time::TimeValue48;
use crate::voltage::{VoltageAttr, VoltageCache, VoltageChannel, VoltageKind};
use crate::watchdog::{
    IDENTITY, WatchdogCore, WatchdogInfo, WatchdogOptions, WatchdogParams, WatchdogState,
};

/// Mutable per-device state, guarded by the device lock.
struct Inner<C> {
    client: C,
    voltages: VoltageCache,
    watchdog: Option<WatchdogCore>,
    alarm: AlarmShadow,
}

/// A probed SD109 controller.
///
/// Every facade goes through one lock, so register sequences issued from
/// different facades never interleave. The raw mutex `M` is held only while
/// the lock changes hands, never across a bus transaction.
pub struct Sd109<M: RawMutex, C: RegisterClient> {
    identity: DeviceIdentity,
    config: DriverConfig,
    inner: Mutex<M, Inner<C>>,
}

impl<M: RawMutex, C: RegisterClient> Sd109<M, C> {
    /// Identify the controller and, if enabled, reconcile the watchdog
    /// parameters. Any failure aborts the probe.
    pub fn probe(mut client: C, config: DriverConfig) -> Result<Self, Error<C::Error>> {
        let identity = DeviceIdentity::read(&mut client)?;
        info!("firmware version {:x}", identity.firmware_version);

        let watchdog = if config.watchdog.enabled {
            let core = WatchdogCore::reconcile(&mut client, &config.watchdog)?;
            info!("Watchdog registered!");
            Some(core)
        } else {
            None
        };

        Ok(Self {
            identity,
            config,
            inner: Mutex::new(Inner {
                client,
                voltages: VoltageCache::new(),
                watchdog,
                alarm: AlarmShadow::default(),
            }),
        })
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn voltage(&self) -> Option<Voltage<'_, M, C>> {
        self.config.voltage_enabled.then_some(Voltage { dev: self })
    }

    pub fn watchdog(&self) -> Option<Watchdog<'_, M, C>> {
        self.config.watchdog.enabled.then_some(Watchdog { dev: self })
    }

    pub fn clock(&self) -> Option<Clock<'_, M, C>> {
        self.config.clock_enabled.then_some(Clock { dev: self })
    }

    /// Tear down and hand back the transport. The device must have been
    /// removed from any power event dispatcher first, which the borrow
    /// checker enforces.
    pub fn release(self) -> C {
        self.inner.into_inner().client
    }

    /// Run `f` with the device state, spinning while another context holds it.
    fn lock<R>(&self, f: impl FnOnce(&mut Inner<C>) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut *guard)
    }

    fn acquire(&self) -> MutexGuard<'_, M, Inner<C>> {
        loop {
            if let Ok(guard) = self.inner.try_lock() {
                return guard;
            }
            core::hint::spin_loop();
        }
    }
}

impl<M: RawMutex, C: RegisterClient> ShutdownHook for Sd109<M, C> {
    /// Best effort: gives up at once if the device state is held by any
    /// context, and downgrades a failed write to a warning.
    fn on_power_event(&self, event: PowerEvent) {
        let Ok(mut inner) = self.inner.try_lock() else {
            warn!("device busy, shutdown command not sent");
            return;
        };
        if inner.client.write(regs::COMMAND, event.command()).is_err() {
            warn!("Unable to write shutdown command");
        }
    }
}

/// Read-only voltage telemetry.
pub struct Voltage<'a, M: RawMutex, C: RegisterClient> {
    dev: &'a Sd109<M, C>,
}

impl<M: RawMutex, C: RegisterClient> Voltage<'_, M, C> {
    /// Millivolts, at most one second old.
    pub fn read(&self, channel: u8, kind: VoltageKind) -> Result<u16, Error<C::Error>> {
        self.dev.lock(|inner| {
            let now = Instant::now();
            inner.voltages.get(&mut inner.client, channel, kind, now)
        })
    }

    pub fn read_attr(&self, channel: u8, attr: VoltageAttr) -> Result<u16, Error<C::Error>> {
        let kind = attr.kind().ok_or(Error::Unsupported)?;
        self.read(channel, kind)
    }

    pub fn label(&self, channel: u8) -> Result<&'static str, Error<C::Error>> {
        VoltageChannel::new(channel)
            .map(VoltageChannel::label)
            .ok_or(Error::Unsupported)
    }
}

/// Hardware watchdog control.
pub struct Watchdog<'a, M: RawMutex, C: RegisterClient> {
    dev: &'a Sd109<M, C>,
}

impl<M: RawMutex, C: RegisterClient> Watchdog<'_, M, C> {
    fn with_core<R>(
        &self,
        f: impl FnOnce(&mut WatchdogCore, &mut C) -> Result<R, Error<C::Error>>,
    ) -> Result<R, Error<C::Error>> {
        self.dev.lock(|inner| match inner.watchdog.as_mut() {
            Some(core) => f(core, &mut inner.client),
            None => Err(Error::Unsupported),
        })
    }

    pub fn info(&self) -> WatchdogInfo {
        WatchdogInfo {
            identity: IDENTITY,
            firmware_version: self.dev.identity.firmware_version,
            options: WatchdogOptions::KEEPALIVEPING
                | WatchdogOptions::MAGICCLOSE
                | WatchdogOptions::SETTIMEOUT,
        }
    }

    pub fn start(&self) -> Result<(), Error<C::Error>> {
        self.with_core(|core, client| core.start(client))
    }

    pub fn stop(&self) -> Result<(), Error<C::Error>> {
        self.with_core(|core, client| core.stop(client))
    }

    pub fn ping(&self) -> Result<(), Error<C::Error>> {
        self.with_core(|core, client| core.ping(client))
    }

    /// Change the timeout, keeping the current wait.
    pub fn set_timeout(&self, timeout: u32) -> Result<(), Error<C::Error>> {
        self.with_core(|core, client| {
            let wait = core.params().wait;
            core.set_timeout(client, timeout, wait)
        })
    }

    pub fn set_timeout_and_wait(&self, timeout: u32, wait: u32) -> Result<(), Error<C::Error>> {
        self.with_core(|core, client| core.set_timeout(client, timeout, wait))
    }

    pub fn state(&self) -> WatchdogState {
        self.with_core(|core, _| Ok(core.state()))
            .unwrap_or(WatchdogState::Stopped)
    }

    /// Parameters currently programmed into the device.
    pub fn params(&self) -> Option<WatchdogParams> {
        self.with_core(|core, _| Ok(core.params())).ok()
    }

    /// Parameters found on the device at probe time, before overrides.
    pub fn device_params(&self) -> Option<WatchdogParams> {
        self.with_core(|core, _| Ok(core.device_params())).ok()
    }

    pub fn nowayout(&self) -> bool {
        self.dev.config.watchdog.nowayout
    }
}

/// Clock and wake alarm.
pub struct Clock<'a, M: RawMutex, C: RegisterClient> {
    dev: &'a Sd109<M, C>,
}

impl<M: RawMutex, C: RegisterClient> Clock<'_, M, C> {
    pub fn read_time(&self) -> Result<TimeValue48, Error<C::Error>> {
        self.dev.lock(|inner| rtc::read_time(&mut inner.client))
    }

    /// Seconds since the epoch. Values above 48 bits are rejected before any
    /// write; a bus failure may leave only the lower words updated.
    pub fn set_time(&self, secs: u64) -> Result<(), Error<C::Error>> {
        self.dev.lock(|inner| rtc::set_time(&mut inner.client, secs))
    }

    pub fn read_alarm(&self) -> Result<WakeAlarm, Error<C::Error>> {
        self.dev
            .lock(|inner| inner.alarm.read_alarm(&mut inner.client))
    }

    pub fn set_alarm(&self, secs: u64, enabled: bool, pending: bool) -> Result<(), Error<C::Error>> {
        self.dev.lock(|inner| {
            inner
                .alarm
                .set_alarm(&mut inner.client, secs, enabled, pending)
        })
    }

    pub fn alarm_irq_enable(&self, enabled: bool) -> Result<(), Error<C::Error>> {
        self.dev
            .lock(|inner| rtc::alarm_irq_enable(&mut inner.client, enabled))
    }
}
