use core::fmt;

/// Errors returned by the driver. `E` is the transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// A register read or write failed on the bus.
    Comm(E),
    /// The chip identification register did not hold the expected value.
    DeviceMismatch(u16),
    /// Channel or attribute outside the supported set.
    Unsupported,
    /// Argument out of range; nothing was written.
    InvalidArgument,
    /// The watchdog cannot be stopped once started.
    NoWayOut,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comm(e) => write!(f, "register access failed: {e:?}"),
            Self::DeviceMismatch(id) => write!(f, "invalid chip id: {id:#06x}"),
            Self::Unsupported => write!(f, "operation not supported"),
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::NoWayOut => write!(f, "watchdog cannot be stopped"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

pub type Result<T, E> = core::result::Result<T, Error<E>>;
