use crate::client::RegisterClient;
use crate::error::Error;
use crate::regs;

/// Why the controller last started, as reported in the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootStatus {
    PowerUp,
    PowerOff,
    Reboot,
    Halt,
    Wakeup,
    Unknown(u16),
}

impl From<u16> for BootStatus {
    fn from(value: u16) -> Self {
        match value {
            regs::STATUS_POWERUP => BootStatus::PowerUp,
            regs::STATUS_POWEROFF => BootStatus::PowerOff,
            regs::STATUS_REBOOT => BootStatus::Reboot,
            regs::STATUS_HALT => BootStatus::Halt,
            regs::STATUS_WAKEUP => BootStatus::Wakeup,
            other => BootStatus::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceIdentity {
    pub chip_id: u16,
    pub firmware_version: u16,
    pub boot_status: BootStatus,
}

impl DeviceIdentity {
    /// Identify the controller. Fails with [`Error::DeviceMismatch`] before
    /// touching any other register if the chip id is wrong.
    pub(crate) fn read<C: RegisterClient>(client: &mut C) -> Result<Self, Error<C::Error>> {
        let chip_id = client.read(regs::CHIP_ID).map_err(|e| {
            error!("failed to read chip id");
            Error::Comm(e)
        })?;
        if chip_id != regs::CHIP_ID_VALUE {
            error!("Invalid chip id: {:x}", chip_id);
            return Err(Error::DeviceMismatch(chip_id));
        }

        let firmware_version = client.read(regs::FIRMWARE_VERSION).map_err(|e| {
            error!("failed to read firmware version");
            Error::Comm(e)
        })?;

        let status = client.read(regs::STATUS).map_err(|e| {
            error!("failed to read status");
            Error::Comm(e)
        })?;
        let boot_status = BootStatus::from(status);
        match boot_status {
            BootStatus::PowerUp => info!("start from POWER-UP"),
            BootStatus::PowerOff => info!("start from POWER-OFF"),
            BootStatus::Reboot => info!("start from REBOOT"),
            BootStatus::Halt => info!("start from HALT"),
            BootStatus::Wakeup => info!("start from WAKEUP"),
            BootStatus::Unknown(code) => error!("start from unknown {:x}", code),
        }

        Ok(Self {
            chip_id,
            firmware_version,
            boot_status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_status() {
        assert_eq!(BootStatus::from(1), BootStatus::PowerUp);
        assert_eq!(BootStatus::from(5), BootStatus::Wakeup);
        assert_eq!(BootStatus::from(0), BootStatus::Unknown(0));
        // The watchdog-enabled bit is not masked off.
        assert_eq!(BootStatus::from(0x0009), BootStatus::Unknown(0x0009));
    }
}
