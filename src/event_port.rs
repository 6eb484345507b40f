//! Event ports
//!
//! An event port is a group of 16 pins that the event routing block can set,
//! reset or toggle (outputs) or latch (inputs) when a peripheral event fires.
//! Pins are addressed with `u16` masks, bit n being pin n.
//!
//! ```ignore
//! let mut aos = Aos::new(dp.AOS);
//! let mut ep = aos.event_port(Port::Ep1);
//! ep.init(pin(3) | pin(4), &PortConfig {
//!     direction: Direction::Output,
//!     trigger_ops: TriggerOps::Toggle,
//!     ..Default::default()
//! });
//! ep.set_trigger_source(EventSource::TmraOverflow);
//! ```

use crate::aos::EventSource;
use crate::pac::aos::{EventPortRegisters, RegisterBlock, NFCR, TRGSEL};
use crate::pac::{ReadWriteable, Readable, Writeable};

/// Event port instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    Ep1,
    Ep2,
}

impl Port {
    pub(crate) const fn index(self) -> usize {
        match self {
            Port::Ep1 => 0,
            Port::Ep2 => 1,
        }
    }
}

/// Mask selecting pin `n`. A port has 16 pins; any other `n` selects none.
pub const fn pin(n: u8) -> u16 {
    if n < 16 {
        1 << n
    } else {
        0
    }
}

pub const ALL_PINS: u16 = 0xFFFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    #[default]
    Input,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

/// What an output pin does when the routed event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerOps {
    #[default]
    None,
    Set,
    Reset,
    Toggle,
}

/// Input edge that latches the pin into the input data register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

/// Digital noise filter sampling clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FilterClock {
    Pclk,
    PclkDiv8,
    PclkDiv32,
    PclkDiv64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortConfig {
    pub direction: Direction,
    pub initial_level: Level,
    pub trigger_ops: TriggerOps,
    pub edge: Edge,
    /// Applies to the whole port.
    pub filter: Option<FilterClock>,
}

/// One event port, borrowed from [`crate::aos::Aos::event_port`].
pub struct EventPort<'a> {
    aos: &'a RegisterBlock,
    port: Port,
}

impl<'a> EventPort<'a> {
    pub(crate) fn new(aos: &'a RegisterBlock, port: Port) -> Self {
        Self { aos, port }
    }

    fn regs(&self) -> &EventPortRegisters {
        &self.aos.port[self.port.index()]
    }

    pub fn port(&self) -> Port {
        self.port
    }

    /// Configures `pins` and leaves the other pins of the port untouched.
    pub fn init(&mut self, pins: u16, config: &PortConfig) {
        self.set_direction(pins, config.direction);
        match config.initial_level {
            Level::High => self.set_pins(pins),
            Level::Low => self.reset_pins(pins),
        }
        self.set_trigger_ops(pins, config.trigger_ops);
        self.set_edge(pins, config.edge);
        self.set_filter(config.filter);
    }

    /// Returns the whole port to its reset state.
    pub fn deinit(&mut self) {
        let regs = self.regs();
        regs.dir.set(0);
        regs.odr.set(0);
        regs.orr.set(0);
        regs.osr.set(0);
        regs.ris.set(0);
        regs.fal.set(0);
        regs.nfcr.set(0);
        self.aos.pevnttrgsr[self.port.index()].set(0);
    }

    /// Selects the event that drives this port.
    pub fn set_trigger_source(&mut self, source: EventSource) {
        self.aos.pevnttrgsr[self.port.index()]
            .modify(TRGSEL::TRGSEL.val(source.number() as u32));
    }

    /// Input levels latched by the last event, masked by `pins`.
    pub fn read_input(&self, pins: u16) -> u16 {
        self.regs().idr.get() as u16 & pins
    }

    pub fn read_output(&self, pins: u16) -> u16 {
        self.regs().odr.get() as u16 & pins
    }

    pub fn set_pins(&mut self, pins: u16) {
        update_mask(&self.regs().odr, pins, true);
    }

    pub fn reset_pins(&mut self, pins: u16) {
        update_mask(&self.regs().odr, pins, false);
    }

    pub fn toggle_pins(&mut self, pins: u16) {
        let odr = &self.regs().odr;
        odr.set(odr.get() ^ pins as u32);
    }

    pub fn set_direction(&mut self, pins: u16, direction: Direction) {
        update_mask(&self.regs().dir, pins, direction == Direction::Output);
    }

    pub fn set_trigger_ops(&mut self, pins: u16, ops: TriggerOps) {
        let (set, reset) = match ops {
            TriggerOps::None => (false, false),
            TriggerOps::Set => (true, false),
            TriggerOps::Reset => (false, true),
            TriggerOps::Toggle => (true, true),
        };
        let regs = self.regs();
        update_mask(&regs.osr, pins, set);
        update_mask(&regs.orr, pins, reset);
    }

    pub fn set_edge(&mut self, pins: u16, edge: Edge) {
        let (rising, falling) = match edge {
            Edge::None => (false, false),
            Edge::Rising => (true, false),
            Edge::Falling => (false, true),
            Edge::Both => (true, true),
        };
        let regs = self.regs();
        update_mask(&regs.ris, pins, rising);
        update_mask(&regs.fal, pins, falling);
    }

    pub fn set_filter(&mut self, filter: Option<FilterClock>) {
        let nfcr = &self.regs().nfcr;
        match filter {
            None => nfcr.modify(NFCR::NFEN::CLEAR),
            Some(clock) => {
                let divs = match clock {
                    FilterClock::Pclk => NFCR::DIVS::Pclk,
                    FilterClock::PclkDiv8 => NFCR::DIVS::PclkDiv8,
                    FilterClock::PclkDiv32 => NFCR::DIVS::PclkDiv32,
                    FilterClock::PclkDiv64 => NFCR::DIVS::PclkDiv64,
                };
                nfcr.write(NFCR::NFEN::SET + divs);
            }
        }
    }
}

fn update_mask(reg: &tock_registers::registers::ReadWrite<u32>, pins: u16, set: bool) {
    let value = reg.get();
    reg.set(if set {
        value | pins as u32
    } else {
        value & !(pins as u32)
    });
}
