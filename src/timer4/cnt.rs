//! TIMER4 counter
//!
//! Counts in sawtooth (up, reload at the period) or triangle (up to the
//! period, back down to zero) mode. Zero and peak interrupts can be thinned
//! out by the mask counters: with a mask of `n`, only every `n + 1`th match
//! raises the interrupt.

use crate::clock::{divider_exponent, Clocks};
use crate::error::{Error, Result};
use crate::pac::timer4::{RegisterBlock, CCSR, CVPR};
use crate::pac::{ReadWriteable, Readable, Shared, Writeable};
use embedded_time::duration::Microseconds;
use embedded_time::rate::Hertz;
use void::Void;

/// Largest value of an interrupt mask counter.
pub const MAX_INTERRUPT_MASK: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountMode {
    #[default]
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountClock {
    /// PCLK1 through the prescaler
    #[default]
    Pclk1,
    /// External count clock input
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Zero,
    Peak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterConfig {
    pub period: u16,
    pub mode: CountMode,
    /// PCLK1 divider, a power of two up to 1024.
    pub divider: u16,
    pub clock: CountClock,
    /// Load period writes at the next zero match instead of immediately.
    pub buffer: bool,
    /// Zero matches skipped between interrupts, 0..=15.
    pub zero_mask: u8,
    /// Peak matches skipped between interrupts, 0..=15.
    pub peak_mask: u8,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            period: 0xFFFF,
            mode: CountMode::Sawtooth,
            divider: 1,
            clock: CountClock::Pclk1,
            buffer: false,
            zero_mask: 0,
            peak_mask: 0,
        }
    }
}

/// TIMER4 counter.
pub struct Counter {
    tmr: Shared<RegisterBlock>,
    tick: Option<Hertz>,
    countdown: Option<u32>,
}

impl Counter {
    pub(super) fn new(tmr: Shared<RegisterBlock>) -> Self {
        Self {
            tmr,
            tick: None,
            countdown: None,
        }
    }

    /// Stops and clears the counter, then applies `config`.
    pub fn init(&mut self, config: &CounterConfig) -> Result<()> {
        let ckdiv = divider_exponent(config.divider as u32, 10)?;
        if config.zero_mask > MAX_INTERRUPT_MASK || config.peak_mask > MAX_INTERRUPT_MASK {
            return Err(Error::InvalidParameter);
        }
        let mode = match config.mode {
            CountMode::Sawtooth => CCSR::MODE::Sawtooth,
            CountMode::Triangle => CCSR::MODE::Triangle,
        };
        self.tmr.ccsr.write(
            CCSR::STOP::SET
                + CCSR::CLEAR::SET
                + CCSR::CKDIV.val(ckdiv)
                + mode
                + CCSR::BUFEN.val(config.buffer as u32)
                + CCSR::ECKEN.val((config.clock == CountClock::External) as u32),
        );
        self.tmr.cpsr.set(config.period as u32);
        self.tmr.cvpr.write(
            CVPR::ZIM.val(config.zero_mask as u32) + CVPR::PIM.val(config.peak_mask as u32),
        );
        #[cfg(feature = "defmt")]
        defmt::debug!("tmr4 cnt: {}", config);
        Ok(())
    }

    /// Stops the counter and restores the reset state.
    pub fn deinit(&mut self) {
        self.tmr.ccsr.write(CCSR::STOP::SET + CCSR::CLEAR::SET);
        self.tmr.cpsr.set(0xFFFF);
        self.tmr.cntr.set(0);
        self.tmr.cvpr.set(0);
        self.countdown = None;
    }

    pub fn start(&mut self) {
        self.tmr.ccsr.modify(CCSR::STOP::CLEAR);
    }

    pub fn stop(&mut self) {
        self.tmr.ccsr.modify(CCSR::STOP::SET);
    }

    pub fn is_running(&self) -> bool {
        !self.tmr.ccsr.is_set(CCSR::STOP)
    }

    /// Resets the count to zero.
    pub fn clear(&mut self) {
        self.tmr.ccsr.modify(CCSR::CLEAR::SET);
    }

    pub fn period(&self) -> u16 {
        self.tmr.cpsr.get() as u16
    }

    pub fn set_period(&mut self, period: u16) {
        self.tmr.cpsr.set(period as u32);
    }

    pub fn counter(&self) -> u16 {
        self.tmr.cntr.get() as u16
    }

    /// Only takes effect while the counter is stopped.
    pub fn set_counter(&mut self, value: u16) {
        self.tmr.cntr.set(value as u32);
    }

    pub fn mode(&self) -> CountMode {
        if self.tmr.ccsr.is_set(CCSR::MODE) {
            CountMode::Triangle
        } else {
            CountMode::Sawtooth
        }
    }

    /// Counting frequency when clocked from PCLK1.
    pub fn tick_rate(&self, clocks: &Clocks) -> Hertz {
        Hertz(clocks.pclk1().0 >> self.tmr.ccsr.read(CCSR::CKDIV))
    }

    /// Lets [`CountDown`](embedded_hal_zero::timer::CountDown) convert
    /// durations into counts.
    pub fn set_clocks(&mut self, clocks: &Clocks) {
        self.tick = Some(self.tick_rate(clocks));
    }

    /// Number of matches skipped between interrupts, 0..=15.
    pub fn set_interrupt_mask(&mut self, event: Event, mask: u8) -> Result<()> {
        if mask > MAX_INTERRUPT_MASK {
            return Err(Error::InvalidParameter);
        }
        match event {
            Event::Zero => self.tmr.cvpr.modify(CVPR::ZIM.val(mask as u32)),
            Event::Peak => self.tmr.cvpr.modify(CVPR::PIM.val(mask as u32)),
        }
        Ok(())
    }

    pub fn interrupt_mask(&self, event: Event) -> u8 {
        match event {
            Event::Zero => self.tmr.cvpr.read(CVPR::ZIM) as u8,
            Event::Peak => self.tmr.cvpr.read(CVPR::PIM) as u8,
        }
    }

    /// Current value of the mask counter of `event`.
    pub fn interrupt_mask_counter(&self, event: Event) -> u8 {
        match event {
            Event::Zero => self.tmr.cvpr.read(CVPR::ZIC) as u8,
            Event::Peak => self.tmr.cvpr.read(CVPR::PIC) as u8,
        }
    }

    pub fn listen(&mut self, event: Event) {
        match event {
            Event::Zero => self.tmr.ccsr.modify(CCSR::IRQZEN::SET),
            Event::Peak => self.tmr.ccsr.modify(CCSR::IRQPEN::SET),
        }
    }

    pub fn unlisten(&mut self, event: Event) {
        match event {
            Event::Zero => self.tmr.ccsr.modify(CCSR::IRQZEN::CLEAR),
            Event::Peak => self.tmr.ccsr.modify(CCSR::IRQPEN::CLEAR),
        }
    }

    pub fn flag(&self, event: Event) -> bool {
        match event {
            Event::Zero => self.tmr.ccsr.is_set(CCSR::IRQZF),
            Event::Peak => self.tmr.ccsr.is_set(CCSR::IRQPF),
        }
    }

    /// Flags are cleared by writing 0.
    pub fn clear_flag(&mut self, event: Event) {
        match event {
            Event::Zero => self.tmr.ccsr.modify(CCSR::IRQZF::CLEAR),
            Event::Peak => self.tmr.ccsr.modify(CCSR::IRQPF::CLEAR),
        }
    }
}

impl embedded_hal_zero::timer::CountDown for Counter {
    type Time = Microseconds;

    /// Runs one sawtooth period of `count`. Without [`Counter::set_clocks`]
    /// the tick rate of the reset clock tree is assumed.
    fn start<T>(&mut self, count: T)
    where
        T: Into<Self::Time>,
    {
        let tick = self.tick.unwrap_or_else(|| self.tick_rate(&Clocks::default()));
        let ticks = (count.into().0 as u64 * tick.0 as u64 / 1_000_000).clamp(1, 0x1_0000);
        self.stop();
        self.tmr.ccsr.modify(CCSR::MODE::Sawtooth + CCSR::IRQZF::CLEAR + CCSR::CLEAR::SET);
        self.set_period((ticks - 1) as u16);
        self.countdown = Some(ticks as u32);
        self.start();
    }

    fn wait(&mut self) -> nb::Result<(), Void> {
        if self.countdown.is_none() || self.flag(Event::Zero) {
            self.clear_flag(Event::Zero);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl embedded_hal_zero::timer::Periodic for Counter {}
