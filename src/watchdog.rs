//! Hardware watchdog: timeout/wait register packing and controller state.

use bitflags::bitflags;

use crate::client::RegisterClient;
use crate::config::WatchdogConfig;
use crate::error::Error;
use crate::regs;

/// Wait values are stored in units of this many seconds.
pub const WAIT_GRANULARITY: u32 = 5;

pub const IDENTITY: &str = "SD109 Watchdog";

bitflags! {
    /// Capabilities advertised to the watchdog framework.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WatchdogOptions: u32 {
        const SETTIMEOUT = 0x0080;
        const MAGICCLOSE = 0x0100;
        const KEEPALIVEPING = 0x8000;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogInfo {
    pub identity: &'static str,
    pub firmware_version: u16,
    pub options: WatchdogOptions,
}

/// Timeout and wait as stored in the combined watchdog register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WatchdogParams {
    pub timeout: u8,
    pub wait: u32,
}

impl WatchdogParams {
    /// Returns `None` if `timeout` does not fit in a byte or `wait / 5` does
    /// not fit in a byte.
    pub const fn new(timeout: u32, wait: u32) -> Option<Self> {
        if timeout > 0xff || wait / WAIT_GRANULARITY > 0xff {
            return None;
        }
        Some(Self {
            timeout: timeout as u8,
            wait,
        })
    }

    pub const fn encode(self) -> u16 {
        let wait = (((self.wait / WAIT_GRANULARITY) as u16) << regs::WDOG_WAIT_POS)
            & regs::WDOG_WAIT_MASK;
        let timeout = ((self.timeout as u16) << regs::WDOG_TIMEOUT_POS) & regs::WDOG_TIMEOUT_MASK;
        wait | timeout
    }

    pub const fn decode(reg: u16) -> Self {
        Self {
            timeout: ((reg & regs::WDOG_TIMEOUT_MASK) >> regs::WDOG_TIMEOUT_POS) as u8,
            wait: ((reg & regs::WDOG_WAIT_MASK) >> regs::WDOG_WAIT_POS) as u32 * WAIT_GRANULARITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WatchdogState {
    Stopped,
    Running,
}

/// Controller bookkeeping. Lives inside the device lock.
pub(crate) struct WatchdogCore {
    state: WatchdogState,
    params: WatchdogParams,
    device_params: WatchdogParams,
    nowayout: bool,
    min_timeout: u32,
    max_timeout: u32,
}

impl WatchdogCore {
    /// Read the parameters stored on the device and merge them with the
    /// configured overrides. A timeout override always wins; a wait override
    /// wins only when it reaches the minimum wait. The merged value is written
    /// back if any override won.
    pub(crate) fn reconcile<C: RegisterClient>(
        client: &mut C,
        config: &WatchdogConfig,
    ) -> Result<Self, Error<C::Error>> {
        let raw = client.read(regs::WDOG_TIMEOUT).map_err(|e| {
            error!("failed to read watchdog parameters");
            Error::Comm(e)
        })?;
        let device_params = WatchdogParams::decode(raw);

        let mut update_device = false;

        let timeout_override = config.timeout_override;
        let timeout = match timeout_override {
            Some(timeout) => {
                update_device = true;
                timeout
            }
            None => device_params.timeout as u32,
        };

        let wait = match config.wait_override {
            Some(wait) if wait >= regs::MIN_WDOG_WAIT => {
                update_device = true;
                wait
            }
            _ => device_params.wait,
        };

        let mut core = Self {
            state: WatchdogState::Stopped,
            params: device_params,
            device_params,
            nowayout: config.nowayout,
            min_timeout: config.min_timeout,
            max_timeout: config.max_timeout,
        };

        // A timeout adopted from the device is not held to the min/max
        // policy; only an override is.
        if update_device {
            match timeout_override {
                Some(_) => core.set_timeout(client, timeout, wait)?,
                None => core.program(client, timeout, wait)?,
            }
        }

        debug!(
            "watchdog timeout {} s, wait {} s",
            core.params.timeout,
            core.params.wait
        );
        Ok(core)
    }

    pub(crate) fn state(&self) -> WatchdogState {
        self.state
    }

    pub(crate) fn params(&self) -> WatchdogParams {
        self.params
    }

    pub(crate) fn device_params(&self) -> WatchdogParams {
        self.device_params
    }

    pub(crate) fn start<C: RegisterClient>(&mut self, client: &mut C) -> Result<(), Error<C::Error>> {
        client
            .write(regs::COMMAND, regs::CMD_WDOG_ENABLE)
            .map_err(Error::Comm)?;
        self.state = WatchdogState::Running;
        debug!("watchdog started");
        Ok(())
    }

    pub(crate) fn stop<C: RegisterClient>(&mut self, client: &mut C) -> Result<(), Error<C::Error>> {
        if self.nowayout && self.state == WatchdogState::Running {
            return Err(Error::NoWayOut);
        }
        client
            .write(regs::COMMAND, regs::CMD_WDOG_DISABLE)
            .map_err(Error::Comm)?;
        self.state = WatchdogState::Stopped;
        debug!("watchdog stopped");
        Ok(())
    }

    /// Restart the device countdown. Does nothing while stopped.
    pub(crate) fn ping<C: RegisterClient>(&mut self, client: &mut C) -> Result<(), Error<C::Error>> {
        if self.state == WatchdogState::Stopped {
            return Ok(());
        }
        client
            .write(regs::WDOG_REFRESH, regs::WDOG_REFRESH_MAGIC)
            .map_err(Error::Comm)
    }

    pub(crate) fn set_timeout<C: RegisterClient>(
        &mut self,
        client: &mut C,
        timeout: u32,
        wait: u32,
    ) -> Result<(), Error<C::Error>> {
        if timeout < self.min_timeout || timeout > self.max_timeout {
            return Err(Error::InvalidArgument);
        }
        self.program(client, timeout, wait)
    }

    /// Write `timeout` and `wait` if they fit the register.
    fn program<C: RegisterClient>(
        &mut self,
        client: &mut C,
        timeout: u32,
        wait: u32,
    ) -> Result<(), Error<C::Error>> {
        let params = WatchdogParams::new(timeout, wait).ok_or(Error::InvalidArgument)?;

        client
            .write(regs::WDOG_TIMEOUT, params.encode())
            .map_err(|e| {
                error!("failed to write watchdog timeout");
                Error::Comm(e)
            })?;
        self.params = params;
        Ok(())
    }
}
