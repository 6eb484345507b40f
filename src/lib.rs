//! # HAL for the HC32M120 microcontroller
//!
//! Drivers for the HC32M120 peripherals, with [`embedded-hal`] trait
//! implementations where a matching trait exists.
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal
//!
//! # Usage
//!
//! ## Commonly used setup
//!
//! ```ignore
//! // Take the register blocks, each of them exactly once
//! let dp = pac::Peripherals::take().unwrap();
//!
//! // Record the clock tree configured by the startup code
//! let clocks = ClockConfig::new().hclk(32_u32.MHz()).pclk1_div(1).freeze()?;
//!
//! let mut aos = Aos::new(dp.AOS);
//! let channels = Dma::new(dp.DMA).split();
//! ```
//!
//! Drivers report failures through [`error::Error`]. Every flag that is
//! polled takes a loop budget and returns [`error::Error::Timeout`] once it
//! is spent.
//!
//! With the `defmt` feature enabled, configuration types derive
//! `defmt::Format` and drivers log their configuration and failures.

#![cfg_attr(not(test), no_std)]

pub mod pac;

pub mod adc;
pub mod aos;
pub mod clock;
pub mod cmp;
pub mod dma;
pub mod efm;
pub mod emb;
pub mod error;
pub mod event_port;
pub mod spi;
pub mod timer2;
pub mod timer4;
pub mod timera;
pub mod typelevel;

/// HAL crate prelude
pub mod prelude {
    pub use crate::dma::DMAExt as _hc32m120_hal_dma_DMAExt;
    pub use crate::dma::SingleChannel as _hc32m120_hal_dma_SingleChannel;
    pub use embedded_time::duration::Extensions as _embedded_time_duration_Extensions;
    pub use embedded_time::rate::Extensions;
}
