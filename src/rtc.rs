//! Real-time clock and wake alarm.
//!
//! The device keeps only the alarm time. Whether the alarm is enabled or
//! pending is known to the host alone and is reported back as last set.

use crate::client::RegisterClient;
use crate::error::Error;
use crate::regs;
use crate::time::{self, TimeValue48};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WakeAlarm {
    pub time: TimeValue48,
    pub enabled: bool,
    pub pending: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct AlarmShadow {
    enabled: bool,
    pending: bool,
}

pub(crate) fn set_time<C: RegisterClient>(client: &mut C, secs: u64) -> Result<(), Error<C::Error>> {
    let t = TimeValue48::try_from(secs)?;
    time::write_words(client, regs::RTC_WORDS, t)
}

pub(crate) fn read_time<C: RegisterClient>(client: &mut C) -> Result<TimeValue48, Error<C::Error>> {
    time::read_words(client, regs::RTC_WORDS)
}

impl AlarmShadow {
    /// The flags are recorded even if `secs` is rejected or the write fails.
    pub(crate) fn set_alarm<C: RegisterClient>(
        &mut self,
        client: &mut C,
        secs: u64,
        enabled: bool,
        pending: bool,
    ) -> Result<(), Error<C::Error>> {
        self.enabled = enabled;
        self.pending = pending;

        let t = TimeValue48::try_from(secs)?;
        time::write_words(client, regs::WAKEUP_WORDS, t)
    }

    pub(crate) fn read_alarm<C: RegisterClient>(
        &self,
        client: &mut C,
    ) -> Result<WakeAlarm, Error<C::Error>> {
        let time = time::read_words(client, regs::WAKEUP_WORDS)?;
        Ok(WakeAlarm {
            time,
            enabled: self.enabled,
            pending: self.pending,
        })
    }
}

/// Disabling clears the alarm time on the device; the shadowed flags are
/// left as they were. Enabling needs no register access: writing a non-zero
/// alarm time is what arms the device.
pub(crate) fn alarm_irq_enable<C: RegisterClient>(
    client: &mut C,
    enabled: bool,
) -> Result<(), Error<C::Error>> {
    if enabled {
        return Ok(());
    }
    time::write_words(client, regs::WAKEUP_WORDS, TimeValue48::ZERO)
}
