//! Emergency brake
//!
//! Forces the TIMER4 PWM outputs into their idle state when a brake source
//! fires: the EMB input pin, a comparator result, an oscillator stop, or U/V/W
//! outputs driving the same level at once. The control register can be
//! written once after reset, so [`Emb::init`] configures every source in one
//! go.

use crate::pac::{self, emb::*, ReadWriteable, Readable, Writeable};
use tock_registers::fields::FieldValue;

/// Noise filter clock for the EMB input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterClock {
    Pclk,
    PclkDiv8,
    PclkDiv32,
    PclkDiv128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

/// EMB input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortInConfig {
    /// Brake on a low level instead of a high level.
    pub invert: bool,
    pub filter: Option<FilterClock>,
}

/// Comparators whose result triggers the brake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CmpSources {
    pub cmp1: bool,
    pub cmp2: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EmbConfig {
    pub port_in: Option<PortInConfig>,
    pub comparators: CmpSources,
    /// Brake when the main oscillator stops.
    pub osc_stop: bool,
    /// Brake when the U, V or W pair both drive the given level.
    pub pwm_same_phase: [Option<Level>; 3],
}

/// Brake sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    PortIn,
    PwmSamePhase,
    Cmp,
    OscStop,
}

/// Live state of a level-sensitive brake source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    PortIn,
    PwmSamePhase,
}

pub struct Emb {
    emb: pac::EMB,
}

impl Emb {
    pub fn new(emb: pac::EMB) -> Self {
        Self { emb }
    }

    pub fn free(self) -> pac::EMB {
        self.emb
    }

    pub fn init(&mut self, config: &EmbConfig) {
        let mut ctl = CTL::CMPEN1.val(config.comparators.cmp1 as u32)
            + CTL::CMPEN2.val(config.comparators.cmp2 as u32)
            + CTL::OSCSTPEN.val(config.osc_stop as u32);

        if let Some(port) = config.port_in {
            ctl += CTL::PORTINEN::SET + CTL::INVSEL.val(port.invert as u32);
            if let Some(clock) = port.filter {
                ctl += CTL::NFEN::SET + nfsel(clock);
            }
        }

        let mut levels = 0;
        for (i, level) in config.pwm_same_phase.iter().enumerate() {
            if let Some(level) = level {
                ctl += pwmsen(i);
                if *level == Level::High {
                    levels |= 1 << i;
                }
            }
        }

        self.emb.pwmlv.set(levels);
        self.emb.ctl.write(ctl);
        #[cfg(feature = "defmt")]
        defmt::debug!("emb: {}", config);
    }

    /// Masks every brake interrupt, clears the flags and releases a software
    /// brake. The control register keeps its value until the next reset.
    pub fn deinit(&mut self) {
        self.emb.inten.set(0);
        self.emb.soe.set(0);
        self.emb.statclr.set(0xF);
    }

    pub fn listen(&mut self, event: Event) {
        self.emb.inten.modify(inten_field(event).val(1));
    }

    pub fn unlisten(&mut self, event: Event) {
        self.emb.inten.modify(inten_field(event).val(0));
    }

    /// Latched brake flag of `event`.
    pub fn flag(&self, event: Event) -> bool {
        let field = match event {
            Event::PortIn => STAT::PORTINF,
            Event::PwmSamePhase => STAT::PWMSF,
            Event::Cmp => STAT::CMPF,
            Event::OscStop => STAT::OSF,
        };
        self.emb.stat.is_set(field)
    }

    pub fn clear_flag(&mut self, event: Event) {
        let field = match event {
            Event::PortIn => STATCLR::PORTINFCLR,
            Event::PwmSamePhase => STATCLR::PWMSFCLR,
            Event::Cmp => STATCLR::CMPFCLR,
            Event::OscStop => STATCLR::OSFCLR,
        };
        self.emb.statclr.write(field.val(1));
    }

    pub fn status(&self, status: Status) -> bool {
        match status {
            Status::PortIn => self.emb.stat.is_set(STAT::PORTINST),
            Status::PwmSamePhase => self.emb.stat.is_set(STAT::PWMST),
        }
    }

    /// Stops the PWM outputs from software while `brake` is true.
    pub fn software_brake(&mut self, brake: bool) {
        self.emb.soe.write(SOE::SOE.val(brake as u32));
    }
}

fn nfsel(clock: FilterClock) -> FieldValue<u32, CTL::Register> {
    match clock {
        FilterClock::Pclk => CTL::NFSEL::Pclk,
        FilterClock::PclkDiv8 => CTL::NFSEL::PclkDiv8,
        FilterClock::PclkDiv32 => CTL::NFSEL::PclkDiv32,
        FilterClock::PclkDiv128 => CTL::NFSEL::PclkDiv128,
    }
}

fn pwmsen(phase: usize) -> FieldValue<u32, CTL::Register> {
    match phase {
        0 => CTL::PWMSEN0::SET,
        1 => CTL::PWMSEN1::SET,
        _ => CTL::PWMSEN2::SET,
    }
}

fn inten_field(event: Event) -> tock_registers::fields::Field<u32, INTEN::Register> {
    match event {
        Event::PortIn => INTEN::PORTININTEN,
        Event::PwmSamePhase => INTEN::PWMSINTEN,
        Event::Cmp => INTEN::CMPINTEN,
        Event::OscStop => INTEN::OSINTEN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    #[test]
    fn init_composes_control_word() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut emb = Emb::new(regs);
        emb.init(&EmbConfig {
            port_in: Some(PortInConfig {
                invert: true,
                filter: Some(FilterClock::PclkDiv32),
            }),
            comparators: CmpSources {
                cmp1: false,
                cmp2: true,
            },
            osc_stop: true,
            pwm_same_phase: [Some(Level::High), None, Some(Level::Low)],
        });
        let ctl = rb.ctl.get();
        assert_eq!(ctl, 1u32 | 1 << 2 | 1 << 5 | 1 << 6 | 1 << 8 | 2 << 28 | 1 << 30 | 1 << 31);
        assert_eq!(rb.pwmlv.get(), 0b001);
    }

    #[test]
    fn default_config_enables_nothing() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        Emb::new(regs).init(&EmbConfig::default());
        assert_eq!(rb.ctl.get(), 0);
    }

    #[test]
    fn flags_and_status() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut emb = Emb::new(regs);
        rb.stat.set(0b10_0100);
        assert!(emb.flag(Event::Cmp));
        assert!(!emb.flag(Event::PortIn));
        assert!(emb.status(Status::PwmSamePhase));
        assert!(!emb.status(Status::PortIn));
        emb.clear_flag(Event::OscStop);
        assert_eq!(rb.statclr.get(), 0b1000);
    }

    #[test]
    fn interrupts_and_software_brake() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut emb = Emb::new(regs);
        emb.listen(Event::PortIn);
        emb.listen(Event::OscStop);
        emb.unlisten(Event::PortIn);
        assert_eq!(rb.inten.get(), 0b1000);
        emb.software_brake(true);
        assert_eq!(rb.soe.get(), 1);
        emb.deinit();
        assert_eq!((rb.inten.get(), rb.soe.get(), rb.statclr.get()), (0, 0, 0xF));
    }
}
