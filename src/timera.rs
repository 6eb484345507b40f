/*!
  # TIMERA
  General purpose 16-bit timer with four compare/capture channels. The counter
  runs in sawtooth or triangle mode, in either direction, and can be started,
  stopped, cleared or clocked by hardware conditions such as the CLKA/CLKB
  pins of a quadrature encoder.

  ## Example
  ```ignore
    let mut tmra = TimerA::new(dp.TMRA);
    tmra.init(&CounterConfig::default())?;
    tmra.set_period_hz(20_000_u32.Hz(), &clocks)?;
    tmra.init_pwm(Channel::Ch1, &PwmConfig::default());

    let mut pwm = tmra.pwm_channel(Channel::Ch1);
    pwm.set_duty_cycle_percent(25)?;
    tmra.start();
  ```
*/

use crate::clock::{divider_exponent, Clocks};
use crate::error::{Error, Result};
use crate::pac::{self, timera::*, ReadWriteable, Readable, Writeable};
use core::convert::Infallible;
use embedded_time::rate::Hertz;

/// Compare/capture channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

impl Channel {
    pub const fn index(self) -> usize {
        self as usize
    }

    const fn mask(self) -> u32 {
        1 << self.index()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountMode {
    #[default]
    Sawtooth,
    Triangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CounterConfig {
    pub mode: CountMode,
    pub direction: Direction,
    /// PCLK1 divider, a power of two up to 1024.
    pub divider: u16,
    pub period: u16,
    pub counter: u16,
    /// Stop counting at the first overflow or underflow.
    pub overflow_stop: bool,
    /// Start together with the other TIMERA units.
    pub sync_start: bool,
}

impl Default for CounterConfig {
    fn default() -> Self {
        CounterConfig {
            mode: CountMode::Sawtooth,
            direction: Direction::Up,
            divider: 1,
            period: 0xFFFF,
            counter: 0,
            overflow_stop: false,
            sync_start: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Function {
    #[default]
    Compare,
    Capture,
}

/// Output pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortLevel {
    Low = 0,
    High = 1,
    Hold = 2,
    Invert = 3,
}

/// Forced output level, overriding compare and period actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Force {
    #[default]
    None,
    Low,
    High,
}

/// PWM output of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    pub on_start: PortLevel,
    pub on_stop: PortLevel,
    pub on_compare: PortLevel,
    pub on_period: PortLevel,
    pub force: Force,
}

impl Default for PwmConfig {
    /// High from the period match to the compare match.
    fn default() -> Self {
        PwmConfig {
            on_start: PortLevel::High,
            on_stop: PortLevel::Low,
            on_compare: PortLevel::Low,
            on_period: PortLevel::High,
            force: Force::None,
        }
    }
}

/// Hardware conditions for start, stop, clear and capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HwTrigger {
    pub trig_rising: bool,
    pub trig_falling: bool,
    /// The event routed to the timer trigger input
    pub event: bool,
}

impl HwTrigger {
    pub fn bits(&self) -> u32 {
        self.trig_rising as u32 | (self.trig_falling as u32) << 1 | (self.event as u32) << 2
    }
}

/// Count conditions for hardware up and down counting, combined with `|`.
pub mod count_condition {
    pub const CLKB_LOW_CLKA_RISING: u16 = 1 << 0;
    pub const CLKB_LOW_CLKA_FALLING: u16 = 1 << 1;
    pub const CLKB_HIGH_CLKA_RISING: u16 = 1 << 2;
    pub const CLKB_HIGH_CLKA_FALLING: u16 = 1 << 3;
    pub const CLKA_LOW_CLKB_RISING: u16 = 1 << 4;
    pub const CLKA_LOW_CLKB_FALLING: u16 = 1 << 5;
    pub const CLKA_HIGH_CLKB_RISING: u16 = 1 << 6;
    pub const CLKA_HIGH_CLKB_FALLING: u16 = 1 << 7;
    pub const TRIG_RISING: u16 = 1 << 8;
    pub const TRIG_FALLING: u16 = 1 << 9;
    pub const EVENT: u16 = 1 << 10;
    pub const ALL: u16 = 0x7FF;
}

/// Noise filter clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterClock {
    Pclk1 = 0,
    Pclk1Div4 = 1,
    Pclk1Div16 = 2,
    Pclk1Div64 = 3,
}

/// Input with a noise filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterInput {
    Trig,
    /// CLKA and CLKB
    Clk,
    Capture(Channel),
}

/// When a buffered compare value moves into its compare register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferTransfer {
    /// At the peak in triangle mode
    pub peak: bool,
    /// At the valley in triangle mode
    pub valley: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Overflow,
    Underflow,
    Compare(Channel),
}

fn forc_bits(force: Force) -> u32 {
    match force {
        Force::None => 0,
        Force::Low => 2,
        Force::High => 3,
    }
}

pub struct TimerA {
    tmr: pac::TMRA,
}

impl TimerA {
    pub fn new(tmr: pac::TMRA) -> Self {
        Self { tmr }
    }

    pub fn free(self) -> pac::TMRA {
        self.stop_counter();
        self.tmr
    }

    /// Stops the counter and applies `config`.
    pub fn init(&mut self, config: &CounterConfig) -> Result<()> {
        let ckdiv = divider_exponent(config.divider as u32, 10)?;
        let mode = match config.mode {
            CountMode::Sawtooth => BCSTR::MODE::Sawtooth,
            CountMode::Triangle => BCSTR::MODE::Triangle,
        };
        self.tmr.bcstr.write(
            mode + BCSTR::DIR.val((config.direction == Direction::Up) as u32)
                + BCSTR::CKDIV.val(ckdiv)
                + BCSTR::OVSTP.val(config.overflow_stop as u32)
                + BCSTR::SYNST.val(config.sync_start as u32),
        );
        self.tmr.perar.set(config.period as u32);
        self.tmr.cnter.set(config.counter as u32);
        #[cfg(feature = "defmt")]
        defmt::debug!("tmra: {}", config);
        Ok(())
    }

    /// Stops the counter and restores the reset state.
    pub fn deinit(&mut self) {
        self.tmr.bcstr.set(0);
        self.tmr.cnter.set(0);
        self.tmr.perar.set(0xFFFF);
        for ch in 0..CHANNELS {
            self.tmr.cmpar[ch].set(0xFFFF);
            self.tmr.cconr[ch].set(0);
            self.tmr.pconr[ch].set(0);
        }
        self.tmr.bconr[0].set(0);
        self.tmr.bconr[1].set(0);
        self.tmr.hconr.set(0);
        self.tmr.hcupr.set(0);
        self.tmr.hcdor.set(0);
        self.tmr.iconr.set(0);
        self.tmr.econr.set(0);
        self.tmr.fconr.set(0);
        self.tmr.stflr.set(0);
    }

    pub fn start(&mut self) {
        self.tmr.bcstr.modify(BCSTR::START::SET);
    }

    pub fn stop(&mut self) {
        self.stop_counter();
    }

    fn stop_counter(&self) {
        self.tmr.bcstr.modify(BCSTR::START::CLEAR);
    }

    pub fn is_running(&self) -> bool {
        self.tmr.bcstr.is_set(BCSTR::START)
    }

    pub fn counter(&self) -> u16 {
        self.tmr.cnter.get() as u16
    }

    pub fn set_counter(&mut self, value: u16) {
        self.tmr.cnter.set(value as u32);
    }

    pub fn period(&self) -> u16 {
        self.tmr.perar.get() as u16
    }

    pub fn set_period(&mut self, period: u16) {
        self.tmr.perar.set(period as u32);
    }

    /// Counting frequency.
    pub fn tick_rate(&self, clocks: &Clocks) -> Hertz {
        Hertz(clocks.pclk1().0 >> self.tmr.bcstr.read(BCSTR::CKDIV))
    }

    /// Picks the smallest divider that reaches `freq` and sets the period.
    /// A triangle wave counts the period twice per cycle.
    pub fn set_period_hz(&mut self, freq: impl Into<Hertz>, clocks: &Clocks) -> Result<()> {
        let freq = freq.into().0;
        if freq == 0 {
            return Err(Error::InvalidParameter);
        }
        let triangle = self.tmr.bcstr.is_set(BCSTR::MODE);
        for ckdiv in 0..=10 {
            let mut ticks = (clocks.pclk1().0 >> ckdiv) / freq;
            if triangle {
                ticks /= 2;
            }
            if ticks == 0 {
                break;
            }
            if ticks <= 0x1_0000 {
                let period = if triangle { ticks } else { ticks - 1 };
                self.tmr.bcstr.modify(BCSTR::CKDIV.val(ckdiv));
                self.tmr.perar.set(period.min(0xFFFF));
                return Ok(());
            }
        }
        #[cfg(feature = "defmt")]
        defmt::warn!("tmra: {=u32} Hz out of range", freq);
        Err(Error::InvalidParameter)
    }

    /// Compare value, or the captured count in capture mode.
    pub fn compare(&self, ch: Channel) -> u16 {
        self.tmr.cmpar[ch.index()].get() as u16
    }

    pub fn set_compare(&mut self, ch: Channel, value: u16) {
        self.tmr.cmpar[ch.index()].set(value as u32);
    }

    pub fn set_channel_function(&mut self, ch: Channel, function: Function) {
        self.tmr.cconr[ch.index()]
            .modify(CCONR::CAPMD.val((function == Function::Capture) as u32));
    }

    /// Configures the output of `ch` for PWM and switches it to compare mode.
    pub fn init_pwm(&mut self, ch: Channel, config: &PwmConfig) {
        self.set_channel_function(ch, Function::Compare);
        self.tmr.pconr[ch.index()].modify(
            PCONR::STAC.val(config.on_start as u32)
                + PCONR::STPC.val(config.on_stop as u32)
                + PCONR::CMPC.val(config.on_compare as u32)
                + PCONR::PERC.val(config.on_period as u32)
                + PCONR::FORC.val(forc_bits(config.force)),
        );
    }

    /// Overrides the compare and period actions of `ch` with a fixed level.
    pub fn set_force(&mut self, ch: Channel, force: Force) {
        self.tmr.pconr[ch.index()].modify(PCONR::FORC.val(forc_bits(force)));
    }

    pub fn enable_pwm(&mut self, ch: Channel, enable: bool) {
        self.tmr.pconr[ch.index()].modify(PCONR::OUTEN.val(enable as u32));
    }

    /// Borrows `ch` as an `embedded-hal` PWM output and enables it.
    pub fn pwm_channel(&mut self, ch: Channel) -> PwmChannel<'_> {
        self.enable_pwm(ch, true);
        PwmChannel { timer: self, ch }
    }

    pub fn set_capture_conditions(&mut self, ch: Channel, conditions: HwTrigger) {
        self.tmr.cconr[ch.index()].modify(CCONR::HICP.val(conditions.bits()));
    }

    pub fn set_hw_start(&mut self, trigger: HwTrigger) {
        self.tmr.hconr.modify(HCONR::HSTA.val(trigger.bits()));
    }

    pub fn set_hw_stop(&mut self, trigger: HwTrigger) {
        self.tmr.hconr.modify(HCONR::HSTP.val(trigger.bits()));
    }

    pub fn set_hw_clear(&mut self, trigger: HwTrigger) {
        self.tmr.hconr.modify(HCONR::HCLE.val(trigger.bits()));
    }

    /// Counts up on `conditions`, see [`count_condition`].
    pub fn set_hw_up(&mut self, conditions: u16) -> Result<()> {
        if conditions & !count_condition::ALL != 0 {
            return Err(Error::InvalidParameter);
        }
        self.tmr.hcupr.set(conditions as u32);
        Ok(())
    }

    /// Counts down on `conditions`, see [`count_condition`].
    pub fn set_hw_down(&mut self, conditions: u16) -> Result<()> {
        if conditions & !count_condition::ALL != 0 {
            return Err(Error::InvalidParameter);
        }
        self.tmr.hcdor.set(conditions as u32);
        Ok(())
    }

    /// Filters `input`, `None` disables the filter.
    pub fn set_filter(&mut self, input: FilterInput, filter: Option<FilterClock>) {
        let (enable, clock) = match filter {
            Some(clock) => (1, clock as u32),
            None => (0, 0),
        };
        match input {
            FilterInput::Trig => self
                .tmr
                .fconr
                .modify(FCONR::NOFIENTG.val(enable) + FCONR::NOFICKTG.val(clock)),
            FilterInput::Clk => self
                .tmr
                .fconr
                .modify(FCONR::NOFIENCLK.val(enable) + FCONR::NOFICKCLK.val(clock)),
            FilterInput::Capture(ch) => self.tmr.cconr[ch.index()]
                .modify(CCONR::NOFIENCP.val(enable) + CCONR::NOFICKCP.val(clock)),
        }
    }

    /// Buffers the compare value of channel 1 in channel 2 (`pair` 0), or of
    /// channel 3 in channel 4 (`pair` 1).
    pub fn set_buffer(&mut self, pair: u8, transfer: Option<BufferTransfer>) -> Result<()> {
        let reg = self.tmr.bconr.get(pair as usize).ok_or(Error::InvalidParameter)?;
        match transfer {
            Some(t) => reg.write(
                BCONR::BEN::SET + BCONR::BSE0.val(t.peak as u32) + BCONR::BSE1.val(t.valley as u32),
            ),
            None => reg.set(0),
        }
        Ok(())
    }

    pub fn listen(&mut self, event: Event) {
        match event {
            Event::Overflow => self.tmr.bcstr.modify(BCSTR::ITENOVF::SET),
            Event::Underflow => self.tmr.bcstr.modify(BCSTR::ITENUDF::SET),
            Event::Compare(ch) => self.tmr.iconr.set(self.tmr.iconr.get() | ch.mask()),
        }
    }

    pub fn unlisten(&mut self, event: Event) {
        match event {
            Event::Overflow => self.tmr.bcstr.modify(BCSTR::ITENOVF::CLEAR),
            Event::Underflow => self.tmr.bcstr.modify(BCSTR::ITENUDF::CLEAR),
            Event::Compare(ch) => self.tmr.iconr.set(self.tmr.iconr.get() & !ch.mask()),
        }
    }

    /// Routes the compare event of `ch` to the event system.
    pub fn enable_event(&mut self, ch: Channel, enable: bool) {
        let econr = self.tmr.econr.get();
        let econr = if enable {
            econr | ch.mask()
        } else {
            econr & !ch.mask()
        };
        self.tmr.econr.set(econr);
    }

    pub fn flag(&self, event: Event) -> bool {
        match event {
            Event::Overflow => self.tmr.bcstr.is_set(BCSTR::OVFF),
            Event::Underflow => self.tmr.bcstr.is_set(BCSTR::UDFF),
            Event::Compare(ch) => self.tmr.stflr.get() & ch.mask() != 0,
        }
    }

    /// Flags are cleared by writing 0.
    pub fn clear_flag(&mut self, event: Event) {
        match event {
            Event::Overflow => self.tmr.bcstr.modify(BCSTR::OVFF::CLEAR),
            Event::Underflow => self.tmr.bcstr.modify(BCSTR::UDFF::CLEAR),
            Event::Compare(ch) => self.tmr.stflr.set(self.tmr.stflr.get() & !ch.mask()),
        }
    }
}

/// One TIMERA channel driven as a PWM output.
///
/// Duty cycles are in counts of the period register; the default
/// [`PwmConfig`] drives the output high from the period match to the compare
/// match. A duty of 0 forces the output low and a duty of
/// [`max_duty_cycle`](embedded_hal::pwm::SetDutyCycle::max_duty_cycle)
/// forces it high, replacing any [`PwmConfig::force`].
pub struct PwmChannel<'a> {
    timer: &'a mut TimerA,
    ch: Channel,
}

impl PwmChannel<'_> {
    pub fn channel(&self) -> Channel {
        self.ch
    }

    pub fn disable(&mut self) {
        self.timer.enable_pwm(self.ch, false);
    }
}

impl embedded_hal::pwm::ErrorType for PwmChannel<'_> {
    type Error = Infallible;
}

impl embedded_hal::pwm::SetDutyCycle for PwmChannel<'_> {
    fn max_duty_cycle(&self) -> u16 {
        self.timer.period().max(1)
    }

    fn set_duty_cycle(&mut self, duty: u16) -> core::result::Result<(), Self::Error> {
        let max = self.max_duty_cycle();
        let duty = duty.min(max);
        self.timer.set_compare(self.ch, duty);
        let force = match duty {
            0 => Force::Low,
            d if d == max => Force::High,
            _ => Force::None,
        };
        self.timer.set_force(self.ch, force);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;
    use embedded_hal::pwm::SetDutyCycle;
    use embedded_time::rate::Extensions;

    fn timer() -> (TimerA, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (TimerA::new(regs), rb)
    }

    #[test]
    fn init_writes_control_and_period() {
        let (mut tmra, rb) = timer();
        tmra.init(&CounterConfig {
            mode: CountMode::Triangle,
            direction: Direction::Down,
            divider: 4,
            period: 1234,
            counter: 10,
            overflow_stop: true,
            sync_start: false,
        })
        .unwrap();
        assert_eq!(rb.bcstr.get(), 1 << 2 | 2 << 4 | 1 << 8);
        assert_eq!(tmra.period(), 1234);
        assert_eq!(tmra.counter(), 10);
        assert!(!tmra.is_running());
        tmra.start();
        assert!(tmra.is_running());
    }

    #[test]
    fn period_from_frequency() {
        let (mut tmra, rb) = timer();
        tmra.init(&CounterConfig::default()).unwrap();
        let clocks = Clocks::default();
        // 32 MHz / 20 kHz = 1600 ticks
        tmra.set_period_hz(20_000_u32.Hz(), &clocks).unwrap();
        assert_eq!(rb.bcstr.read(BCSTR::CKDIV), 0);
        assert_eq!(tmra.period(), 1599);
        // 32 MHz / 100 Hz needs a divider of 8
        tmra.set_period_hz(100_u32.Hz(), &clocks).unwrap();
        assert_eq!(rb.bcstr.read(BCSTR::CKDIV), 3);
        assert_eq!(tmra.period(), 39_999);
        assert_eq!(tmra.tick_rate(&clocks), Hertz(4_000_000_u32));
        assert_eq!(tmra.set_period_hz(64_000_000_u32.Hz(), &clocks), Err(Error::InvalidParameter));
        assert_eq!(tmra.set_period_hz(0_u32.Hz(), &clocks), Err(Error::InvalidParameter));
    }

    #[test]
    fn pwm_channel_sets_compare() {
        let (mut tmra, rb) = timer();
        tmra.init(&CounterConfig {
            period: 999,
            ..Default::default()
        })
        .unwrap();
        tmra.init_pwm(Channel::Ch3, &PwmConfig::default());
        assert_eq!(rb.pconr[2].get(), 1 | 1 << 6);
        let mut pwm = tmra.pwm_channel(Channel::Ch3);
        assert_eq!(pwm.max_duty_cycle(), 999);
        pwm.set_duty_cycle_percent(25).unwrap();
        assert_eq!(rb.cmpar[2].get(), 249);
        assert_eq!(rb.pconr[2].read(PCONR::FORC), 0);
        pwm.set_duty_cycle(5000).unwrap();
        assert_eq!(rb.cmpar[2].get(), 999);
        assert!(rb.pconr[2].is_set(PCONR::OUTEN));
        pwm.disable();
        assert!(!rb.pconr[2].is_set(PCONR::OUTEN));
    }

    #[test]
    fn duty_cycle_ends_force_the_output() {
        let (mut tmra, rb) = timer();
        tmra.init(&CounterConfig {
            period: 999,
            ..Default::default()
        })
        .unwrap();
        tmra.init_pwm(Channel::Ch1, &PwmConfig::default());
        let mut pwm = tmra.pwm_channel(Channel::Ch1);

        pwm.set_duty_cycle_fully_off().unwrap();
        assert_eq!(rb.pconr[0].read(PCONR::FORC), 2);
        pwm.set_duty_cycle_fully_on().unwrap();
        assert_eq!(rb.pconr[0].read(PCONR::FORC), 3);
        pwm.set_duty_cycle(500).unwrap();
        assert_eq!(rb.pconr[0].read(PCONR::FORC), 0);
        assert_eq!(rb.cmpar[0].get(), 500);
        // the output actions survive the force changes
        assert_eq!(rb.pconr[0].read(PCONR::PERC), 1);
        assert!(rb.pconr[0].is_set(PCONR::OUTEN));
    }

    #[test]
    fn hw_conditions_and_filters() {
        let (mut tmra, rb) = timer();
        tmra.set_hw_start(HwTrigger {
            event: true,
            ..Default::default()
        });
        tmra.set_hw_clear(HwTrigger {
            trig_rising: true,
            ..Default::default()
        });
        assert_eq!(rb.hconr.get(), 0b100 | 0b001 << 8);
        tmra.set_hw_up(
            count_condition::CLKB_LOW_CLKA_RISING | count_condition::CLKB_HIGH_CLKA_FALLING,
        )
        .unwrap();
        assert_eq!(rb.hcupr.get(), 0b1001);
        assert_eq!(tmra.set_hw_down(1 << 12), Err(Error::InvalidParameter));

        tmra.set_filter(FilterInput::Clk, Some(FilterClock::Pclk1Div64));
        assert_eq!(rb.fconr.get(), 1 << 4 | 3 << 5);
        tmra.set_filter(FilterInput::Capture(Channel::Ch2), Some(FilterClock::Pclk1Div4));
        assert_eq!(rb.cconr[1].get(), 1 << 12 | 1 << 13);
        tmra.set_capture_conditions(Channel::Ch2, HwTrigger {
            trig_falling: true,
            ..Default::default()
        });
        assert_eq!(rb.cconr[1].read(CCONR::HICP), 0b010);
    }

    #[test]
    fn buffer_pairs() {
        let (mut tmra, rb) = timer();
        tmra.set_buffer(1, Some(BufferTransfer { peak: true, valley: false }))
            .unwrap();
        assert_eq!(rb.bconr[1].get(), 0b011);
        tmra.set_buffer(1, None).unwrap();
        assert_eq!(rb.bconr[1].get(), 0);
        assert_eq!(tmra.set_buffer(2, None), Err(Error::InvalidParameter));
    }

    #[test]
    fn interrupts_events_and_flags() {
        let (mut tmra, rb) = timer();
        tmra.listen(Event::Overflow);
        tmra.listen(Event::Compare(Channel::Ch4));
        assert!(rb.bcstr.is_set(BCSTR::ITENOVF));
        assert_eq!(rb.iconr.get(), 0b1000);
        tmra.unlisten(Event::Compare(Channel::Ch4));
        assert_eq!(rb.iconr.get(), 0);
        tmra.enable_event(Channel::Ch1, true);
        assert_eq!(rb.econr.get(), 1);

        rb.stflr.set(0b0110);
        rb.bcstr.modify(BCSTR::UDFF::SET);
        assert!(tmra.flag(Event::Compare(Channel::Ch2)));
        assert!(!tmra.flag(Event::Compare(Channel::Ch1)));
        assert!(tmra.flag(Event::Underflow));
        tmra.clear_flag(Event::Compare(Channel::Ch2));
        tmra.clear_flag(Event::Underflow);
        assert_eq!(rb.stflr.get(), 0b0100);
        assert!(!tmra.flag(Event::Underflow));
    }
}
