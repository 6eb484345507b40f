//! Clock frequencies
//!
//! Drivers that convert between ticks and time need to know the bus clocks they
//! run from. The HC32M120 feeds every timer from PCLK1 and the ADC from PCLK4,
//! both divided down from HCLK by a power of two.
//!
//! ```rust
//! use embedded_time::rate::Extensions;
//! use hc32m120_hal::clock::ClockConfig;
//!
//! let clocks = ClockConfig::new()
//!     .hclk(48_000_000_u32.Hz())
//!     .pclk1_div(2)
//!     .freeze()
//!     .unwrap();
//! assert_eq!(clocks.pclk1().0, 24_000_000);
//! ```

use crate::error::{Error, Result};
use embedded_time::rate::Hertz;

/// Highest HCLK the core supports.
pub const HCLK_MAX: u32 = 48_000_000;

/// Frequency of the internal high speed RC oscillator selected after reset.
pub const HRC_FREQ: u32 = 32_000_000;

/// Frozen clock frequencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clocks {
    hclk: u32,
    pclk1: u32,
    pclk4: u32,
}

impl Clocks {
    /// Core and AHB clock.
    pub const fn hclk(&self) -> Hertz {
        Hertz(self.hclk)
    }

    /// Peripheral clock of the timers, SPI and the comparator filters.
    pub const fn pclk1(&self) -> Hertz {
        Hertz(self.pclk1)
    }

    /// Peripheral clock of the ADC.
    pub const fn pclk4(&self) -> Hertz {
        Hertz(self.pclk4)
    }
}

impl Default for Clocks {
    fn default() -> Self {
        Clocks {
            hclk: HRC_FREQ,
            pclk1: HRC_FREQ,
            pclk4: HRC_FREQ,
        }
    }
}

/// Clock configurator.
///
/// Only records frequencies already programmed into the clock unit; it does
/// not touch the oscillators.
#[derive(Debug, Clone, Copy)]
pub struct ClockConfig {
    hclk: u32,
    pclk1_div: u32,
    pclk4_div: u32,
}

impl ClockConfig {
    pub const fn new() -> Self {
        ClockConfig {
            hclk: HRC_FREQ,
            pclk1_div: 1,
            pclk4_div: 1,
        }
    }

    pub fn hclk(mut self, freq: impl Into<Hertz>) -> Self {
        self.hclk = freq.into().0;
        self
    }

    pub fn pclk1_div(mut self, div: u32) -> Self {
        self.pclk1_div = div;
        self
    }

    pub fn pclk4_div(mut self, div: u32) -> Self {
        self.pclk4_div = div;
        self
    }

    /// Checks the configuration and returns the resulting frequencies.
    pub fn freeze(self) -> Result<Clocks> {
        if self.hclk == 0 || self.hclk > HCLK_MAX {
            return Err(Error::InvalidParameter);
        }
        for div in [self.pclk1_div, self.pclk4_div] {
            if !div.is_power_of_two() || div > 64 {
                return Err(Error::InvalidParameter);
            }
        }
        Ok(Clocks {
            hclk: self.hclk,
            pclk1: self.hclk / self.pclk1_div,
            pclk4: self.hclk / self.pclk4_div,
        })
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Encodes a power-of-two divider as the exponent stored in `CKDIV` fields.
pub(crate) fn divider_exponent(div: u32, max_exp: u32) -> Result<u32> {
    if !div.is_power_of_two() {
        return Err(Error::InvalidParameter);
    }
    let exp = div.trailing_zeros();
    if exp > max_exp {
        return Err(Error::InvalidParameter);
    }
    Ok(exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_time::rate::Extensions;

    #[test]
    fn freeze_divides_peripheral_clocks() {
        let clocks = ClockConfig::new()
            .hclk(48_000_000_u32.Hz())
            .pclk1_div(2)
            .pclk4_div(4)
            .freeze()
            .unwrap();
        assert_eq!(clocks.hclk(), Hertz(48_000_000_u32));
        assert_eq!(clocks.pclk1(), Hertz(24_000_000_u32));
        assert_eq!(clocks.pclk4(), Hertz(12_000_000_u32));
    }

    #[test]
    fn freeze_rejects_bad_settings() {
        assert_eq!(
            ClockConfig::new().hclk(64_000_000_u32.Hz()).freeze(),
            Err(Error::InvalidParameter)
        );
        assert_eq!(
            ClockConfig::new().pclk1_div(3).freeze(),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn divider_exponents() {
        assert_eq!(divider_exponent(1, 10), Ok(0));
        assert_eq!(divider_exponent(1024, 10), Ok(10));
        assert_eq!(divider_exponent(2048, 10), Err(Error::InvalidParameter));
        assert_eq!(divider_exponent(6, 10), Err(Error::InvalidParameter));
    }
}
