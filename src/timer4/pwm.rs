//! TIMER4 PWM generator
//!
//! Turns the outputs of each OCO channel pair into a complementary PWM pair,
//! optionally inserting dead time (counts in PDAR/PDBR) between the two edges.
//! In filter mode, pulses shorter than the filter count are suppressed. The
//! filter counter doubles as a reload timer that can raise an interrupt.

use super::Pair;
use crate::clock::divider_exponent;
use crate::error::Result;
use crate::pac::timer4::{RegisterBlock, POCR, RCSR};
use crate::pac::{ReadWriteable, Readable, Shared, Writeable};
use tock_registers::fields::{Field, FieldValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmMode {
    /// Outputs follow the OCO channels
    #[default]
    Through,
    /// Complementary outputs with dead time
    DeadTimer,
    /// Dead time plus pulse filter
    DeadTimerFilter,
}

/// Output inversion of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputLevel {
    #[default]
    Normal = 0,
    Inverted = 1,
    HighInverted = 2,
    LowInverted = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmConfig {
    pub mode: PwmMode,
    /// Dead time and filter clock divider, a power of two up to 128.
    pub divider: u8,
    pub output_level: OutputLevel,
}

impl Default for PwmConfig {
    fn default() -> Self {
        PwmConfig {
            mode: PwmMode::Through,
            divider: 1,
            output_level: OutputLevel::Normal,
        }
    }
}

/// PWM generator of the three pairs.
pub struct Pwm {
    tmr: Shared<RegisterBlock>,
}

struct ReloadFields {
    /// Interrupt disable
    id: Field<u32, RCSR::Register>,
    flag: Field<u32, RCSR::Register>,
    clear: Field<u32, RCSR::Register>,
    start: Field<u32, RCSR::Register>,
    stop: Field<u32, RCSR::Register>,
}

fn reload_fields(pair: Pair) -> ReloadFields {
    match pair {
        Pair::U => ReloadFields {
            id: RCSR::RTIDU,
            flag: RCSR::RTIFU,
            clear: RCSR::RTICU,
            start: RCSR::RTEU,
            stop: RCSR::RTSU,
        },
        Pair::V => ReloadFields {
            id: RCSR::RTIDV,
            flag: RCSR::RTIFV,
            clear: RCSR::RTICV,
            start: RCSR::RTEV,
            stop: RCSR::RTSV,
        },
        Pair::W => ReloadFields {
            id: RCSR::RTIDW,
            flag: RCSR::RTIFW,
            clear: RCSR::RTICW,
            start: RCSR::RTEW,
            stop: RCSR::RTSW,
        },
    }
}

fn pwmmd(mode: PwmMode) -> FieldValue<u32, POCR::Register> {
    match mode {
        PwmMode::Through => POCR::PWMMD::Through,
        PwmMode::DeadTimer => POCR::PWMMD::DeadTimer,
        PwmMode::DeadTimerFilter => POCR::PWMMD::DeadTimerFilter,
    }
}

impl Pwm {
    pub(super) fn new(tmr: Shared<RegisterBlock>) -> Self {
        Self { tmr }
    }

    pub fn init(&mut self, pair: Pair, config: &PwmConfig) -> Result<()> {
        let divck = divider_exponent(config.divider as u32, 7)?;
        self.tmr.pocr[pair.index()].write(
            POCR::DIVCK.val(divck)
                + pwmmd(config.mode)
                + POCR::LVLS.val(config.output_level as u32),
        );
        #[cfg(feature = "defmt")]
        defmt::debug!("tmr4 pwm {}: {}", pair, config);
        Ok(())
    }

    pub fn deinit(&mut self, pair: Pair) {
        self.stop_reload(pair);
        self.listen_reload(pair, false);
        self.clear_reload_flag(pair);
        self.tmr.pocr[pair.index()].set(0);
        self.tmr.pdar[pair.index()].set(0);
        self.tmr.pdbr[pair.index()].set(0);
        self.tmr.pfsr[pair.index()].set(0);
    }

    pub fn mode(&self, pair: Pair) -> PwmMode {
        match self.tmr.pocr[pair.index()].read(POCR::PWMMD) {
            1 => PwmMode::DeadTimer,
            2 => PwmMode::DeadTimerFilter,
            _ => PwmMode::Through,
        }
    }

    /// Dead time before the rising edge (`a`) and the falling edge (`b`),
    /// in divided clock counts.
    pub fn set_dead_time(&mut self, pair: Pair, a: u16, b: u16) {
        self.tmr.pdar[pair.index()].set(a as u32);
        self.tmr.pdbr[pair.index()].set(b as u32);
    }

    pub fn dead_time(&self, pair: Pair) -> (u16, u16) {
        (
            self.tmr.pdar[pair.index()].get() as u16,
            self.tmr.pdbr[pair.index()].get() as u16,
        )
    }

    /// Filter width, also the reload timer period.
    pub fn set_filter_count(&mut self, pair: Pair, count: u16) {
        self.tmr.pfsr[pair.index()].set(count as u32);
    }

    pub fn filter_count(&self, pair: Pair) -> u16 {
        self.tmr.pfsr[pair.index()].get() as u16
    }

    pub fn start_reload(&mut self, pair: Pair) {
        let f = reload_fields(pair);
        self.tmr.rcsr.modify(f.start.val(1));
    }

    pub fn stop_reload(&mut self, pair: Pair) {
        let f = reload_fields(pair);
        self.tmr.rcsr.modify(f.start.val(0) + f.stop.val(1));
    }

    pub fn listen_reload(&mut self, pair: Pair, enable: bool) {
        let f = reload_fields(pair);
        self.tmr.rcsr.modify(f.id.val((!enable) as u32));
    }

    pub fn reload_flag(&self, pair: Pair) -> bool {
        self.tmr.rcsr.is_set(reload_fields(pair).flag)
    }

    pub fn clear_reload_flag(&mut self, pair: Pair) {
        let f = reload_fields(pair);
        self.tmr.rcsr.modify(f.clear.val(1));
    }
}
