//! Driver result type

use core::fmt;

/// Errors returned by the peripheral drivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// A value is outside the range of the register field it configures.
    InvalidParameter,
    /// The operation is not available on this instance or in the current mode.
    InvalidMode,
    /// An address is not aligned to the unit the hardware requires.
    AddressAlignment,
    /// A polled status flag did not change within the given budget.
    Timeout,
    /// Flash contents differ from the data just programmed.
    Mismatch,
    /// The target is locked or write protected.
    Protected,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidParameter => "invalid parameter",
            Error::InvalidMode => "invalid mode",
            Error::AddressAlignment => "misaligned address",
            Error::Timeout => "timeout",
            Error::Mismatch => "readback mismatch",
            Error::Protected => "protected",
        };
        f.write_str(msg)
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Busy-waits until `done` returns true, at most `timeout` iterations.
pub(crate) fn poll(mut timeout: u32, mut done: impl FnMut() -> bool) -> Result<()> {
    loop {
        if done() {
            return Ok(());
        }
        if timeout == 0 {
            return Err(Error::Timeout);
        }
        timeout -= 1;
        core::hint::spin_loop();
    }
}
