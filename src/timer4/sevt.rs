//! TIMER4 special events
//!
//! Six channels that raise the special event outputs routed to the ADC
//! trigger inputs. In compare mode a channel fires when the counter equals
//! its compare value under the selected count conditions. In delay mode it
//! fires a number of counts after a compare match of an OCO channel of its
//! pair.

use super::oco::BufferTransfer;
use super::Channel;
use crate::error::{Error, Result};
use crate::pac::timer4::{RegisterBlock, SCMR, SCSR};
use crate::pac::{ReadWriteable, Readable, Shared, Writeable};
use tock_registers::LocalRegisterCopy;

/// Largest mask count.
pub const MAX_MASK_COUNT: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SevtMode {
    #[default]
    Compare,
    Delay,
}

/// OCO channel whose match starts the delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DelaySource {
    #[default]
    HighChannel,
    LowChannel,
}

/// Count conditions on which a compare mode channel fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Triggers {
    pub up: bool,
    pub down: bool,
    pub peak: bool,
    pub zero: bool,
}

/// Skips events, linked to the counter's zero and peak matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mask {
    /// Matches skipped between events, 0..=15.
    pub count: u8,
    pub on_zero: bool,
    pub on_peak: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SevtConfig {
    pub compare: u16,
    pub buffer: BufferTransfer,
    /// Special event output driven by this channel.
    pub output: Channel,
    /// Delay buffer transfers until the counter's interrupt mask counter
    /// expires.
    pub link_mask: bool,
    pub mode: SevtMode,
    pub delay_source: DelaySource,
    pub triggers: Triggers,
    pub mask: Mask,
}

impl Default for SevtConfig {
    fn default() -> Self {
        SevtConfig {
            compare: 0,
            buffer: BufferTransfer::Disabled,
            output: Channel::Uh,
            link_mask: false,
            mode: SevtMode::Compare,
            delay_source: DelaySource::HighChannel,
            triggers: Triggers::default(),
            mask: Mask::default(),
        }
    }
}

impl SevtConfig {
    /// Control word (SCSR).
    pub fn control_bits(&self) -> u32 {
        let mut scsr = LocalRegisterCopy::<u32, SCSR::Register>::new(0);
        scsr.modify(
            SCSR::BUFEN.val(self.buffer as u32)
                + SCSR::EVTOS.val(self.output.index() as u32)
                + SCSR::LMC.val(self.link_mask as u32)
                + SCSR::EVTMS.val((self.mode == SevtMode::Delay) as u32)
                + SCSR::EVTDS.val((self.delay_source == DelaySource::LowChannel) as u32),
        );
        scsr.modify(trigger_bits(&self.triggers));
        scsr.get()
    }

    /// Mask word (SCMR).
    pub fn mask_bits(&self) -> Result<u32> {
        mask_bits(&self.mask)
    }
}

fn trigger_bits(triggers: &Triggers) -> tock_registers::fields::FieldValue<u32, SCSR::Register> {
    SCSR::UEN.val(triggers.up as u32)
        + SCSR::DEN.val(triggers.down as u32)
        + SCSR::PEN.val(triggers.peak as u32)
        + SCSR::ZEN.val(triggers.zero as u32)
}

fn mask_bits(mask: &Mask) -> Result<u32> {
    if mask.count > MAX_MASK_COUNT {
        return Err(Error::InvalidParameter);
    }
    let mut scmr = LocalRegisterCopy::<u32, SCMR::Register>::new(0);
    scmr.modify(
        SCMR::AMC.val(mask.count as u32)
            + SCMR::MZCE.val(mask.on_zero as u32)
            + SCMR::MPCE.val(mask.on_peak as u32),
    );
    Ok(scmr.get())
}

/// One special event channel.
pub struct SevtChannel {
    tmr: Shared<RegisterBlock>,
    ch: Channel,
}

impl SevtChannel {
    pub(super) fn new(tmr: Shared<RegisterBlock>, ch: Channel) -> Self {
        Self { tmr, ch }
    }

    pub fn channel(&self) -> Channel {
        self.ch
    }

    pub fn init(&mut self, config: &SevtConfig) -> Result<()> {
        let scmr = config.mask_bits()?;
        let i = self.ch.index();
        self.tmr.sccr[i].set(config.compare as u32);
        self.tmr.scsr[i].set(config.control_bits());
        self.tmr.scmr[i].set(scmr);
        #[cfg(feature = "defmt")]
        defmt::debug!("tmr4 sevt {}: {}", self.ch, config);
        Ok(())
    }

    pub fn deinit(&mut self) {
        let i = self.ch.index();
        self.tmr.sccr[i].set(0);
        self.tmr.scsr[i].set(0);
        self.tmr.scmr[i].set(0);
    }

    pub fn compare(&self) -> u16 {
        self.tmr.sccr[self.ch.index()].get() as u16
    }

    pub fn set_compare(&mut self, value: u16) {
        self.tmr.sccr[self.ch.index()].set(value as u32);
    }

    pub fn set_output(&mut self, output: Channel) {
        self.tmr.scsr[self.ch.index()].modify(SCSR::EVTOS.val(output.index() as u32));
    }

    pub fn set_triggers(&mut self, triggers: &Triggers) {
        self.tmr.scsr[self.ch.index()].modify(trigger_bits(triggers));
    }

    pub fn set_mask(&mut self, mask: &Mask) -> Result<()> {
        let bits = mask_bits(mask)?;
        self.tmr.scmr[self.ch.index()].set(bits);
        Ok(())
    }

    /// Current mask count.
    pub fn mask_count(&self) -> u8 {
        self.tmr.scmr[self.ch.index()].read(SCMR::AMC) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    #[test]
    fn control_word_layout() {
        let cfg = SevtConfig {
            buffer: BufferTransfer::OnPeak,
            output: Channel::Vl,
            link_mask: true,
            mode: SevtMode::Delay,
            delay_source: DelaySource::LowChannel,
            triggers: Triggers {
                up: true,
                zero: true,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            cfg.control_bits(),
            2 | 3 << 2 | 1 << 5 | 1 << 8 | 1 << 9 | 1 << 14 | 1 << 15
        );
        assert_eq!(SevtConfig::default().control_bits(), 0);
    }

    #[test]
    fn mask_word_layout() {
        let mask = Mask {
            count: 7,
            on_zero: false,
            on_peak: true,
        };
        assert_eq!(mask_bits(&mask), Ok(7 | 1 << 15));
        assert_eq!(
            mask_bits(&Mask {
                count: 16,
                ..mask
            }),
            Err(Error::InvalidParameter)
        );
    }

    #[test]
    fn init_writes_channel_registers() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut wh = SevtChannel::new(regs.share(), Channel::Wh);
        let cfg = SevtConfig {
            compare: 800,
            output: Channel::Wh,
            triggers: Triggers {
                down: true,
                ..Default::default()
            },
            mask: Mask {
                count: 2,
                on_zero: true,
                on_peak: false,
            },
            ..Default::default()
        };
        wh.init(&cfg).unwrap();
        assert_eq!(rb.sccr[4].get(), 800);
        assert_eq!(rb.scsr[4].get(), cfg.control_bits());
        assert_eq!(rb.scmr[4].get(), 2 | 1 << 14);
        assert_eq!(wh.mask_count(), 2);

        wh.set_triggers(&Triggers {
            peak: true,
            ..Default::default()
        });
        assert_eq!(rb.scsr[4].read(SCSR::DEN), 0);
        assert_eq!(rb.scsr[4].read(SCSR::PEN), 1);
        wh.set_output(Channel::Ul);
        assert_eq!(rb.scsr[4].read(SCSR::EVTOS), 1);
    }

    #[test]
    fn bad_mask_leaves_registers_untouched() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut uh = SevtChannel::new(regs.share(), Channel::Uh);
        let cfg = SevtConfig {
            compare: 5,
            mask: Mask {
                count: 20,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(uh.init(&cfg), Err(Error::InvalidParameter));
        assert_eq!(rb.sccr[0].get(), 0);
    }
}
