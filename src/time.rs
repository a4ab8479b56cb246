//! 48-bit time values split over three 16-bit registers.

use crate::client::RegisterClient;
use crate::error::Error;

/// Seconds since the epoch, limited to 48 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeValue48(u64);

impl TimeValue48 {
    pub const MAX: u64 = 0x0000_ffff_ffff_ffff;
    pub const ZERO: Self = Self(0);

    /// Returns `None` if `secs` does not fit in 48 bits.
    pub const fn new(secs: u64) -> Option<Self> {
        if secs > Self::MAX { None } else { Some(Self(secs)) }
    }

    pub const fn as_secs(self) -> u64 {
        self.0
    }

    /// Register words, least significant first.
    pub const fn encode(self) -> [u16; 3] {
        [
            (self.0 & 0xffff) as u16,
            ((self.0 >> 16) & 0xffff) as u16,
            ((self.0 >> 32) & 0xffff) as u16,
        ]
    }

    pub const fn decode(words: [u16; 3]) -> Self {
        Self(words[0] as u64 | (words[1] as u64) << 16 | (words[2] as u64) << 32)
    }
}

/// A seconds value did not fit in 48 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeOutOfRange;

impl core::fmt::Display for TimeOutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("time does not fit in 48 bits")
    }
}

impl core::error::Error for TimeOutOfRange {}

impl<E> From<TimeOutOfRange> for Error<E> {
    fn from(_: TimeOutOfRange) -> Self {
        Error::InvalidArgument
    }
}

impl TryFrom<u64> for TimeValue48 {
    type Error = TimeOutOfRange;

    fn try_from(secs: u64) -> Result<Self, Self::Error> {
        Self::new(secs).ok_or(TimeOutOfRange)
    }
}

impl From<TimeValue48> for u64 {
    fn from(t: TimeValue48) -> u64 {
        t.0
    }
}

/// Write `t` to a register triple in word order 0, 1, 2.
///
/// Stops at the first failed write, so the device may be left holding a mix
/// of old and new words.
pub(crate) fn write_words<C: RegisterClient>(
    client: &mut C,
    regs: [u8; 3],
    t: TimeValue48,
) -> Result<(), Error<C::Error>> {
    for (i, (reg, word)) in regs.into_iter().zip(t.encode()).enumerate() {
        client.write(reg, word).map_err(|e| {
            error!("Unable to write time word {}", i);
            Error::Comm(e)
        })?;
    }
    Ok(())
}

pub(crate) fn read_words<C: RegisterClient>(
    client: &mut C,
    regs: [u8; 3],
) -> Result<TimeValue48, Error<C::Error>> {
    let mut words = [0u16; 3];
    for (i, (reg, word)) in regs.into_iter().zip(words.iter_mut()).enumerate() {
        *word = client.read(reg).map_err(|e| {
            error!("Unable to read time word {}", i);
            Error::Comm(e)
        })?;
    }
    Ok(TimeValue48::decode(words))
}
