/*!
  # TIMER2
  Two independent 16-bit up-counters, A and B. Each counter is cleared when it
  matches its compare value, and can capture its count on a hardware trigger
  instead.

  ## Example
  ```ignore
    let timer2 = Timer2::new(dp.TMR2);
    let Channels { mut a, .. } = timer2.split();

    a.init(&ChannelConfig {
        divider: 16,
        compare: 999,
        ..Default::default()
    })?;
    a.listen(Event::Compare);
    a.start();
  ```
*/

use crate::clock::{divider_exponent, Clocks};
use crate::error::Result;
use crate::pac::{self, timer2::*, ReadWriteable, Readable, Shared, Writeable};
use embedded_time::rate::Hertz;
use paste::paste;

/// Counter clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// PCLK1 divided by [`ChannelConfig::divider`]
    #[default]
    Pclk1,
    /// Rising edges of the routed hardware trigger event
    TriggerEvent,
    /// Overflow of the other channel
    ChainedOverflow,
    /// Low speed RC oscillator, asynchronous
    Lrc,
    /// 32.768 kHz crystal, asynchronous
    Xtal32,
    /// Clock input pin, asynchronous
    ClockPin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    #[default]
    Compare,
    Capture,
}

/// Output pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortLevel {
    #[default]
    Low,
    High,
    Hold,
    /// Only meaningful on compare match
    Invert,
}

impl PortLevel {
    fn bits(self) -> u32 {
        self as u32
    }
}

/// Output pin behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortConfig {
    pub on_start: PortLevel,
    pub on_stop: PortLevel,
    pub on_compare: PortLevel,
}

/// Noise filter clock for the capture pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterClock {
    Pclk1,
    Pclk1Div4,
    Pclk1Div16,
    Pclk1Div64,
}

/// Hardware conditions that can start, stop, clear or capture a counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwTrigger {
    /// The event routed to the timer trigger input
    pub event: bool,
    pub pin_rising: bool,
    pub pin_falling: bool,
}

impl HwTrigger {
    pub const NONE: HwTrigger = HwTrigger {
        event: false,
        pin_rising: false,
        pin_falling: false,
    };

    pub fn bits(&self) -> u32 {
        self.event as u32 | (self.pin_rising as u32) << 1 | (self.pin_falling as u32) << 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Compare,
    Overflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub clock: ClockSource,
    /// PCLK1 divider, a power of two up to 1024.
    pub divider: u16,
    pub function: Function,
    /// Start together with the other channel.
    pub sync_start: bool,
    pub compare: u16,
    pub counter: u16,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            clock: ClockSource::Pclk1,
            divider: 1,
            function: Function::Compare,
            sync_start: false,
            compare: 0xFFFF,
            counter: 0,
        }
    }
}

/// TIMER2 unit.
pub struct Timer2 {
    tmr: pac::TMR2,
}

/// Channels obtained from [`Timer2::split`].
pub struct Channels {
    pub a: ChannelA,
    pub b: ChannelB,
}

impl Timer2 {
    pub fn new(tmr: pac::TMR2) -> Self {
        Self { tmr }
    }

    /// Splits the unit into its two channels.
    pub fn split(self) -> Channels {
        let tmr = self.tmr.share();
        Channels {
            a: ChannelA { tmr },
            b: ChannelB { tmr },
        }
    }

    /// Stops both channels and frees the underlying object.
    pub fn free(self) -> pac::TMR2 {
        self.tmr.bconr.modify(BCONR::CSTA::CLEAR + BCONR::CSTB::CLEAR);
        self.tmr
    }
}

macro_rules! impl_timer_channel {
    ($name: ident, $x: ident, $X: ident) => {
        /// One TIMER2 channel.
        pub struct $name {
            tmr: Shared<RegisterBlock>,
        }

        paste! {
            impl $name {
                /// Stops the counter and applies `config`.
                pub fn init(&mut self, config: &ChannelConfig) -> Result<()> {
                    let ckdiv = divider_exponent(config.divider as u32, 10)?;
                    self.stop();
                    let (cksel, synclk, asynclk) = match config.clock {
                        ClockSource::Pclk1 => (0, 0, 0),
                        ClockSource::TriggerEvent => (0, 1, 0),
                        ClockSource::ChainedOverflow => (0, 2, 0),
                        ClockSource::Lrc => (1, 0, 0),
                        ClockSource::Xtal32 => (1, 0, 1),
                        ClockSource::ClockPin => (1, 0, 2),
                    };
                    self.tmr.bconr.modify(
                        BCONR::[<CKDIV $X>].val(ckdiv)
                            + BCONR::[<CKSEL $X>].val(cksel)
                            + BCONR::[<SYNCLK $X>].val(synclk)
                            + BCONR::[<ASYNCLK $X>].val(asynclk)
                            + BCONR::[<SYNS $X>].val(config.sync_start as u32),
                    );
                    self.set_function(config.function);
                    self.set_compare(config.compare);
                    self.set_counter(config.counter);
                    #[cfg(feature = "defmt")]
                    defmt::debug!("tmr2 {}: {}", stringify!($X), config);
                    Ok(())
                }

                /// Restores the reset state of this channel.
                pub fn deinit(&mut self) {
                    self.stop();
                    self.tmr.bconr.modify(
                        BCONR::[<CAPMD $X>]::CLEAR
                            + BCONR::[<SYNS $X>]::CLEAR
                            + BCONR::[<CKDIV $X>].val(0)
                            + BCONR::[<SYNCLK $X>].val(0)
                            + BCONR::[<ASYNCLK $X>].val(0)
                            + BCONR::[<CKSEL $X>]::CLEAR,
                    );
                    self.tmr.pconr.modify(
                        PCONR::[<STAC $X>].val(0)
                            + PCONR::[<STPC $X>].val(0)
                            + PCONR::[<CMPC $X>].val(0)
                            + PCONR::[<OUTEN $X>]::CLEAR
                            + PCONR::[<NOFICK $X>].val(0)
                            + PCONR::[<NOFIEN $X>]::CLEAR,
                    );
                    self.tmr.hconr.modify(
                        HCONR::[<HSTA $X>].val(0)
                            + HCONR::[<HSTP $X>].val(0)
                            + HCONR::[<HCLE $X>].val(0)
                            + HCONR::[<HICP $X>].val(0),
                    );
                    self.unlisten(Event::Compare);
                    self.unlisten(Event::Overflow);
                    self.clear_flag(Event::Compare);
                    self.clear_flag(Event::Overflow);
                    self.set_compare(0xFFFF);
                    self.set_counter(0);
                }

                pub fn start(&mut self) {
                    self.tmr.bconr.modify(BCONR::[<CST $X>]::SET);
                }

                pub fn stop(&mut self) {
                    self.tmr.bconr.modify(BCONR::[<CST $X>]::CLEAR);
                }

                pub fn is_running(&self) -> bool {
                    self.tmr.bconr.is_set(BCONR::[<CST $X>])
                }

                pub fn counter(&self) -> u16 {
                    self.tmr.[<cnt $x r>].get() as u16
                }

                pub fn set_counter(&mut self, value: u16) {
                    self.tmr.[<cnt $x r>].set(value as u32);
                }

                /// Compare value, or the captured count in capture mode.
                pub fn compare(&self) -> u16 {
                    self.tmr.[<cmp $x r>].get() as u16
                }

                pub fn set_compare(&mut self, value: u16) {
                    self.tmr.[<cmp $x r>].set(value as u32);
                }

                pub fn set_function(&mut self, function: Function) {
                    self.tmr
                        .bconr
                        .modify(BCONR::[<CAPMD $X>].val((function == Function::Capture) as u32));
                }

                /// Counting frequency when clocked from PCLK1.
                pub fn tick_rate(&self, clocks: &Clocks) -> Hertz {
                    Hertz(clocks.pclk1().0 >> self.tmr.bconr.read(BCONR::[<CKDIV $X>]))
                }

                pub fn set_port_output(&mut self, config: &PortConfig) {
                    self.tmr.pconr.modify(
                        PCONR::[<STAC $X>].val(config.on_start.bits())
                            + PCONR::[<STPC $X>].val(config.on_stop.bits())
                            + PCONR::[<CMPC $X>].val(config.on_compare.bits()),
                    );
                }

                pub fn enable_port_output(&mut self, enable: bool) {
                    self.tmr.pconr.modify(PCONR::[<OUTEN $X>].val(enable as u32));
                }

                /// Filters the capture input, `None` disables the filter.
                pub fn set_filter(&mut self, filter: Option<FilterClock>) {
                    match filter {
                        Some(clock) => self.tmr.pconr.modify(
                            PCONR::[<NOFICK $X>].val(clock as u32) + PCONR::[<NOFIEN $X>]::SET,
                        ),
                        None => self.tmr.pconr.modify(PCONR::[<NOFIEN $X>]::CLEAR),
                    }
                }

                pub fn set_hw_start(&mut self, trigger: HwTrigger) {
                    self.tmr.hconr.modify(HCONR::[<HSTA $X>].val(trigger.bits()));
                }

                pub fn set_hw_stop(&mut self, trigger: HwTrigger) {
                    self.tmr.hconr.modify(HCONR::[<HSTP $X>].val(trigger.bits()));
                }

                pub fn set_hw_clear(&mut self, trigger: HwTrigger) {
                    self.tmr.hconr.modify(HCONR::[<HCLE $X>].val(trigger.bits()));
                }

                pub fn set_hw_capture(&mut self, trigger: HwTrigger) {
                    self.tmr.hconr.modify(HCONR::[<HICP $X>].val(trigger.bits()));
                }

                pub fn listen(&mut self, event: Event) {
                    match event {
                        Event::Compare => self.tmr.iconr.modify(ICONR::[<CM $X>]::SET),
                        Event::Overflow => self.tmr.iconr.modify(ICONR::[<OV $X>]::SET),
                    }
                }

                pub fn unlisten(&mut self, event: Event) {
                    match event {
                        Event::Compare => self.tmr.iconr.modify(ICONR::[<CM $X>]::CLEAR),
                        Event::Overflow => self.tmr.iconr.modify(ICONR::[<OV $X>]::CLEAR),
                    }
                }

                pub fn flag(&self, event: Event) -> bool {
                    match event {
                        Event::Compare => self.tmr.stflr.is_set(ICONR::[<CM $X>]),
                        Event::Overflow => self.tmr.stflr.is_set(ICONR::[<OV $X>]),
                    }
                }

                /// Flags are cleared by writing 0.
                pub fn clear_flag(&mut self, event: Event) {
                    match event {
                        Event::Compare => self.tmr.stflr.modify(ICONR::[<CM $X>]::CLEAR),
                        Event::Overflow => self.tmr.stflr.modify(ICONR::[<OV $X>]::CLEAR),
                    }
                }
            }
        }
    };
}

impl_timer_channel!(ChannelA, a, A);
impl_timer_channel!(ChannelB, b, B);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::pac::testing;

    fn channels() -> (Channels, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (Timer2::new(regs).split(), rb)
    }

    #[test]
    fn channels_are_send() {
        testing::assert_send::<ChannelA>();
        testing::assert_send::<ChannelB>();
    }

    #[test]
    fn init_packs_channel_b_into_high_half() {
        let (Channels { mut a, mut b }, rb) = channels();
        b.init(&ChannelConfig {
            clock: ClockSource::Xtal32,
            divider: 256,
            function: Function::Capture,
            compare: 500,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rb.bconr.get() & 0xFFFF, 0);
        assert_eq!(rb.bconr.read(BCONR::CKDIVB), 8);
        assert!(rb.bconr.is_set(BCONR::CKSELB));
        assert_eq!(rb.bconr.read(BCONR::ASYNCLKB), 1);
        assert!(rb.bconr.is_set(BCONR::CAPMDB));
        assert_eq!(rb.cmpbr.get(), 500);

        a.init(&ChannelConfig::default()).unwrap();
        assert_eq!(rb.cmpar.get(), 0xFFFF);
        assert_eq!(rb.bconr.get() & 0xFFFF, 0);
    }

    #[test]
    fn init_rejects_bad_divider() {
        let (Channels { mut a, .. }, rb) = channels();
        a.start();
        let cfg = ChannelConfig {
            divider: 3,
            ..Default::default()
        };
        assert_eq!(a.init(&cfg), Err(Error::InvalidParameter));
        let cfg = ChannelConfig {
            divider: 2048,
            ..Default::default()
        };
        assert_eq!(a.init(&cfg), Err(Error::InvalidParameter));
        assert!(rb.bconr.is_set(BCONR::CSTA));
    }

    #[test]
    fn start_stop_and_counter() {
        let (Channels { mut a, b }, rb) = channels();
        a.start();
        assert!(a.is_running());
        assert!(!b.is_running());
        a.set_counter(42);
        assert_eq!(rb.cntar.get(), 42);
        assert_eq!(a.counter(), 42);
        a.stop();
        assert_eq!(rb.bconr.get(), 0);
    }

    #[test]
    fn tick_rate_follows_divider() {
        let (Channels { mut a, .. }, _) = channels();
        a.init(&ChannelConfig {
            divider: 32,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(a.tick_rate(&Clocks::default()), Hertz(1_000_000_u32));
    }

    #[test]
    fn port_filter_and_hw_triggers() {
        let (Channels { mut a, mut b }, rb) = channels();
        a.set_port_output(&PortConfig {
            on_start: PortLevel::High,
            on_stop: PortLevel::Low,
            on_compare: PortLevel::Invert,
        });
        a.enable_port_output(true);
        assert_eq!(rb.pconr.get(), 0x1 | 0x3 << 4 | 1 << 8);
        b.set_filter(Some(FilterClock::Pclk1Div16));
        assert_eq!(rb.pconr.read(PCONR::NOFICKB), 2);
        assert!(rb.pconr.is_set(PCONR::NOFIENB));

        b.set_hw_capture(HwTrigger {
            pin_rising: true,
            ..HwTrigger::NONE
        });
        a.set_hw_start(HwTrigger {
            event: true,
            ..HwTrigger::NONE
        });
        assert_eq!(rb.hconr.get(), 1 | 0b010 << 28);
    }

    #[test]
    fn flags_are_per_channel() {
        let (Channels { mut a, mut b }, rb) = channels();
        rb.stflr.set(1 << 16 | 1 << 1);
        assert!(b.flag(Event::Compare));
        assert!(!a.flag(Event::Compare));
        assert!(a.flag(Event::Overflow));
        b.clear_flag(Event::Compare);
        assert_eq!(rb.stflr.get(), 1 << 1);
        a.listen(Event::Compare);
        b.listen(Event::Overflow);
        assert_eq!(rb.iconr.get(), 1 | 1 << 17);
        a.deinit();
        assert_eq!(rb.iconr.get(), 1 << 17);
        assert_eq!(rb.stflr.get(), 0);
    }
}
