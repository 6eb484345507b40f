//! Event routing
//!
//! Peripheral events can start DMA transfers, trigger ADC conversions, drive
//! the event ports and start or stop timers without CPU intervention. The
//! routing block holds one source selector per consumer.
//!
//! ```ignore
//! let mut aos = Aos::new(dp.AOS);
//! aos.set_dma_trigger(0, EventSource::TmraOverflow)?;
//! aos.software_trigger();
//! ```

use crate::error::{Error, Result};
use crate::event_port::{EventPort, Port};
use crate::pac::{self, aos::*, ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;

/// Event numbers that can be routed to a trigger input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum EventSource {
    DmaTransferComplete0 = 0x020,
    DmaTransferComplete1 = 0x021,
    DmaTransferComplete2 = 0x022,
    DmaTransferComplete3 = 0x023,
    DmaBlockComplete0 = 0x024,
    DmaBlockComplete1 = 0x025,
    DmaBlockComplete2 = 0x026,
    DmaBlockComplete3 = 0x027,
    EfmOperationEnd = 0x030,
    Tmr2CompareA = 0x040,
    Tmr2CompareB = 0x041,
    Tmr2OverflowA = 0x042,
    Tmr2OverflowB = 0x043,
    Tmr4SpecialEventUh = 0x050,
    Tmr4SpecialEventUl = 0x051,
    Tmr4SpecialEventVh = 0x052,
    Tmr4SpecialEventVl = 0x053,
    Tmr4SpecialEventWh = 0x054,
    Tmr4SpecialEventWl = 0x055,
    Tmr4Peak = 0x056,
    Tmr4Zero = 0x057,
    TmraOverflow = 0x060,
    TmraUnderflow = 0x061,
    TmraCompare1 = 0x062,
    TmraCompare2 = 0x063,
    TmraCompare3 = 0x064,
    TmraCompare4 = 0x065,
    Cmp1 = 0x070,
    Cmp2 = 0x071,
    SpiReceiveFull = 0x080,
    SpiTransmitEmpty = 0x081,
    SpiIdle = 0x082,
    SpiError = 0x083,
    AdcEndOfSequenceA = 0x090,
    AdcEndOfSequenceB = 0x091,
    /// Raised by [`Aos::software_trigger`].
    Software = 0x1FF,
}

impl EventSource {
    pub const fn number(self) -> u16 {
        self as u16
    }
}

/// Which trigger input a selector drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Target {
    Dma(u8),
    EventPort(Port),
    Adc(u8),
    Timer(u8),
}

pub struct Aos {
    aos: pac::AOS,
}

impl Aos {
    pub fn new(aos: pac::AOS) -> Self {
        Self { aos }
    }

    pub fn free(self) -> pac::AOS {
        self.aos
    }

    /// Routes `source` to `target`.
    pub fn set_trigger(&mut self, target: Target, source: EventSource) -> Result<()> {
        self.selector(target)?
            .modify(TRGSEL::TRGSEL.val(source.number() as u32));
        Ok(())
    }

    /// Source currently routed to `target`, as a raw event number.
    pub fn trigger(&self, target: Target) -> Result<u16> {
        Ok(self.selector(target)?.read(TRGSEL::TRGSEL) as u16)
    }

    pub fn set_dma_trigger(&mut self, channel: u8, source: EventSource) -> Result<()> {
        self.set_trigger(Target::Dma(channel), source)
    }

    /// Raises the software event for every consumer routed to
    /// [`EventSource::Software`].
    pub fn software_trigger(&mut self) {
        self.aos.intsfttrg.write(INTSFTTRG::STRG::SET);
    }

    /// Borrows one of the event ports.
    pub fn event_port(&mut self, port: Port) -> EventPort<'_> {
        EventPort::new(&self.aos, port)
    }

    fn selector(&self, target: Target) -> Result<&ReadWrite<u32, TRGSEL::Register>> {
        let regs = &*self.aos;
        let sel = match target {
            Target::Dma(ch) => regs.dma_trgsel.get(ch as usize),
            Target::EventPort(port) => regs.pevnttrgsr.get(port.index()),
            Target::Adc(seq) => regs.adc_trgsel.get(seq as usize),
            Target::Timer(n) => regs.tmr_htssr.get(n as usize),
        };
        sel.ok_or(Error::InvalidParameter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    #[test]
    fn routes_sources_to_targets() {
        let (regs, rb) = testing::block();
        let mut aos = Aos::new(regs);
        aos.set_dma_trigger(2, EventSource::TmraOverflow).unwrap();
        aos.set_trigger(Target::Adc(1), EventSource::Tmr4SpecialEventUh)
            .unwrap();
        assert_eq!(rb.dma_trgsel[2].get(), 0x060);
        assert_eq!(rb.adc_trgsel[1].get(), 0x050);
        assert_eq!(aos.trigger(Target::Dma(2)), Ok(0x060));
    }

    #[test]
    fn rejects_unknown_target() {
        let (regs, _) = testing::block();
        let mut aos = Aos::new(regs);
        assert_eq!(
            aos.set_dma_trigger(4, EventSource::Software),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn software_trigger_sets_strg() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut aos = Aos::new(regs);
        aos.software_trigger();
        assert!(rb.intsfttrg.is_set(INTSFTTRG::STRG));
    }
}
