//! SD109 register map.
//!
//! Every register is 16 bits wide and addressed with a single byte.

/// Number of registers exposed by the controller.
pub const NUM_REGS: u8 = 32;
/// Highest valid register address.
pub const MAX_REGISTER: u8 = NUM_REGS - 1;

/// Chip identification (read-only).
pub const CHIP_ID: u8 = 0x00;
/// Value the chip identification register must hold.
pub const CHIP_ID_VALUE: u16 = 0xd109;

/// Firmware version (read-only).
pub const FIRMWARE_VERSION: u8 = 0x01;

/// Status register. The low bits hold the reason for the last start.
pub const STATUS: u8 = 0x02;
pub const STATUS_POWERUP: u16 = 0x0001;
pub const STATUS_POWEROFF: u16 = 0x0002;
pub const STATUS_REBOOT: u16 = 0x0003;
pub const STATUS_HALT: u16 = 0x0004;
pub const STATUS_WAKEUP: u16 = 0x0005;
pub const STATUS_BOOT_MASK: u16 = 0x0007;
pub const STATUS_WDOG_EN: u16 = 0x0008;

/// Command register (write-only).
pub const COMMAND: u8 = 0x06;
pub const CMD_WDOG_ENABLE: u16 = 0x01;
pub const CMD_WDOG_DISABLE: u16 = 0x02;
pub const CMD_POWEROFF: u16 = 0x03;
pub const CMD_REBOOT: u16 = 0x04;
pub const CMD_HALT: u16 = 0x05;

/// Watchdog refresh. Writing the magic value restarts the countdown.
pub const WDOG_REFRESH: u8 = 0x08;
pub const WDOG_REFRESH_MAGIC: u16 = 0x0d1e;

/// Watchdog timeout (low byte, seconds) and wait (high byte, units of 5 s).
pub const WDOG_TIMEOUT: u8 = 0x09;
pub const WDOG_TIMEOUT_MASK: u16 = 0x00ff;
pub const WDOG_TIMEOUT_POS: u16 = 0;
pub const WDOG_WAIT_MASK: u16 = 0xff00;
pub const WDOG_WAIT_POS: u16 = 8;

/// First voltage register (channel 0 input). Min and max follow, then the
/// next channel starts three registers further.
pub const VOLTAGE_BASE: u8 = 0x0a;
pub const VOLTAGE_MIN_BASE: u8 = 0x0b;
pub const VOLTAGE_MAX_BASE: u8 = 0x0c;
pub const VOLTAGE_CHANNEL_STRIDE: u8 = 3;

/// Clock, 48-bit seconds split LSB first over three words.
pub const RTC0: u8 = 0x1a;
pub const RTC1: u8 = 0x1b;
pub const RTC2: u8 = 0x1c;

/// Wake alarm, same layout as the clock.
pub const WAKEUP0: u8 = 0x1d;
pub const WAKEUP1: u8 = 0x1e;
pub const WAKEUP2: u8 = 0x1f;

pub const RTC_WORDS: [u8; 3] = [RTC0, RTC1, RTC2];
pub const WAKEUP_WORDS: [u8; 3] = [WAKEUP0, WAKEUP1, WAKEUP2];

/// Shortest wait the firmware honours, in seconds.
pub const MIN_WDOG_WAIT: u32 = 45;
