//! TIMER4 output compare
//!
//! Each channel compares the counter against its compare value and changes
//! its output according to a mode word. The word lists an action per count
//! condition: compare match while counting up or down, zero, peak, and zero or
//! peak without a compare match. High channels (UH, VH, WH) have 16-bit mode
//! words. Low channels (UL, VL, WL) have 32-bit words that add a second set of
//! actions, taken when the high channel of the same pair matches too.

use super::Channel;
use crate::error::{Error, Result};
use crate::pac::timer4::{RegisterBlock, OCER, OCSR};
use crate::pac::{ReadWriteable, Readable, Shared, Writeable};
use tock_registers::fields::Field;

/// Output change on a count condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputAction {
    #[default]
    Hold = 0,
    High = 1,
    Low = 2,
    Invert = 3,
}

impl OutputAction {
    const fn bits(self) -> u32 {
        self as u32
    }
}

/// Actions of one channel, in mode word order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Actions {
    pub down_compare: OutputAction,
    pub peak: OutputAction,
    pub up_compare: OutputAction,
    pub zero: OutputAction,
    /// Peak reached without a compare match
    pub peak_no_compare: OutputAction,
    /// Zero reached without a compare match
    pub zero_no_compare: OutputAction,
}

impl Actions {
    pub const fn bits(&self) -> u32 {
        self.down_compare.bits()
            | self.peak.bits() << 2
            | self.up_compare.bits() << 4
            | self.zero.bits() << 6
            | self.peak_no_compare.bits() << 8
            | self.zero_no_compare.bits() << 10
    }
}

/// Conditions on which the channel compares at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MatchConditions {
    pub down_compare: bool,
    pub peak: bool,
    pub up_compare: bool,
    pub zero: bool,
}

impl MatchConditions {
    pub const ALL: MatchConditions = MatchConditions {
        down_compare: true,
        peak: true,
        up_compare: true,
        zero: true,
    };

    pub const fn bits(&self) -> u32 {
        self.down_compare as u32
            | (self.peak as u32) << 1
            | (self.up_compare as u32) << 2
            | (self.zero as u32) << 3
    }
}

/// Mode word of a high channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HighChannelMode {
    pub actions: Actions,
    pub conditions: MatchConditions,
}

impl HighChannelMode {
    pub const fn bits(&self) -> u16 {
        (self.actions.bits() | self.conditions.bits() << 12) as u16
    }
}

/// Low channel actions taken while the high channel of the pair matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkedActions {
    /// Counting down, high channel matched, low channel did not
    pub down_no_compare: OutputAction,
    /// Counting up, high channel matched, low channel did not
    pub up_no_compare: OutputAction,
    pub down_compare: OutputAction,
    pub peak: OutputAction,
    pub up_compare: OutputAction,
    pub zero: OutputAction,
    pub peak_no_compare: OutputAction,
    pub zero_no_compare: OutputAction,
}

impl LinkedActions {
    pub const fn bits(&self) -> u32 {
        self.down_no_compare.bits()
            | self.up_no_compare.bits() << 2
            | self.down_compare.bits() << 4
            | self.peak.bits() << 6
            | self.up_compare.bits() << 8
            | self.zero.bits() << 10
            | self.peak_no_compare.bits() << 12
            | self.zero_no_compare.bits() << 14
    }
}

/// Mode word of a low channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LowChannelMode {
    pub actions: Actions,
    pub linked: LinkedActions,
    pub conditions: MatchConditions,
}

impl LowChannelMode {
    pub const fn bits(&self) -> u32 {
        self.actions.bits() | self.linked.bits() << 12 | self.conditions.bits() << 28
    }
}

/// When a buffered register takes its new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferTransfer {
    /// Writes take effect at once
    #[default]
    Disabled = 0,
    OnZero = 1,
    OnPeak = 2,
    OnZeroOrPeak = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    #[default]
    Low,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OcoConfig {
    /// Drive the port from the channel.
    pub enable: bool,
    /// Output level while the counter is stopped.
    pub polarity: Level,
    pub compare_buffer: BufferTransfer,
    pub mode_buffer: BufferTransfer,
    /// Delay buffer transfers until the counter's interrupt mask counter
    /// expires.
    pub interrupt_mask_link: bool,
}

/// One output compare channel.
pub struct OcoChannel {
    tmr: Shared<RegisterBlock>,
    ch: Channel,
}

struct PairFields {
    oce: Field<u32, OCSR::Register>,
    ocp: Field<u32, OCSR::Register>,
    ocie: Field<u32, OCSR::Register>,
    ocf: Field<u32, OCSR::Register>,
    cbufen: Field<u32, OCER::Register>,
    mbufen: Field<u32, OCER::Register>,
    lmc: Field<u32, OCER::Register>,
    lmm: Field<u32, OCER::Register>,
}

impl OcoChannel {
    pub(super) fn new(tmr: Shared<RegisterBlock>, ch: Channel) -> Self {
        Self { tmr, ch }
    }

    pub fn channel(&self) -> Channel {
        self.ch
    }

    fn fields(&self) -> PairFields {
        if self.ch.is_high() {
            PairFields {
                oce: OCSR::OCEH,
                ocp: OCSR::OCPH,
                ocie: OCSR::OCIEH,
                ocf: OCSR::OCFH,
                cbufen: OCER::CHBUFEN,
                mbufen: OCER::MHBUFEN,
                lmc: OCER::LMCH,
                lmm: OCER::LMMH,
            }
        } else {
            PairFields {
                oce: OCSR::OCEL,
                ocp: OCSR::OCPL,
                ocie: OCSR::OCIEL,
                ocf: OCSR::OCFL,
                cbufen: OCER::CLBUFEN,
                mbufen: OCER::MLBUFEN,
                lmc: OCER::LMCL,
                lmm: OCER::LMML,
            }
        }
    }

    fn ocsr(&self) -> &tock_registers::registers::ReadWrite<u32, OCSR::Register> {
        &self.tmr.ocsr[self.ch.pair().index()]
    }

    fn ocer(&self) -> &tock_registers::registers::ReadWrite<u32, OCER::Register> {
        &self.tmr.ocer[self.ch.pair().index()]
    }

    pub fn init(&mut self, config: &OcoConfig) {
        let f = self.fields();
        self.ocsr().modify(
            f.oce.val(config.enable as u32)
                + f.ocp.val((config.polarity == Level::High) as u32)
                + f.ocie.val(0),
        );
        self.ocer().modify(
            f.cbufen.val(config.compare_buffer as u32)
                + f.mbufen.val(config.mode_buffer as u32)
                + f.lmc.val(config.interrupt_mask_link as u32)
                + f.lmm.val(config.interrupt_mask_link as u32),
        );
        #[cfg(feature = "defmt")]
        defmt::debug!("tmr4 oco {}: {}", self.ch, config);
    }

    pub fn deinit(&mut self) {
        self.init(&OcoConfig::default());
        self.clear_flag();
        self.tmr.occr[self.ch.index()].set(0);
        self.tmr.ocmr[self.ch.index()].set(0);
    }

    pub fn compare(&self) -> u16 {
        self.tmr.occr[self.ch.index()].get() as u16
    }

    pub fn set_compare(&mut self, value: u16) {
        self.tmr.occr[self.ch.index()].set(value as u32);
    }

    /// Raw mode word.
    pub fn mode_word(&self) -> u32 {
        self.tmr.ocmr[self.ch.index()].get()
    }

    /// Fails with [`Error::InvalidMode`] on a low channel.
    pub fn set_high_mode(&mut self, mode: &HighChannelMode) -> Result<()> {
        if !self.ch.is_high() {
            return Err(Error::InvalidMode);
        }
        self.tmr.ocmr[self.ch.index()].set(mode.bits() as u32);
        Ok(())
    }

    /// Fails with [`Error::InvalidMode`] on a high channel.
    pub fn set_low_mode(&mut self, mode: &LowChannelMode) -> Result<()> {
        if self.ch.is_high() {
            return Err(Error::InvalidMode);
        }
        self.tmr.ocmr[self.ch.index()].set(mode.bits());
        Ok(())
    }

    pub fn enable_output(&mut self, enable: bool) {
        let f = self.fields();
        self.ocsr().modify(f.oce.val(enable as u32));
    }

    pub fn set_polarity(&mut self, level: Level) {
        let f = self.fields();
        self.ocsr().modify(f.ocp.val((level == Level::High) as u32));
    }

    /// Level driven while the counter is stopped.
    pub fn output_level(&self) -> Level {
        if self.ocsr().is_set(self.fields().ocp) {
            Level::High
        } else {
            Level::Low
        }
    }

    pub fn listen(&mut self) {
        let f = self.fields();
        self.ocsr().modify(f.ocie.val(1));
    }

    pub fn unlisten(&mut self) {
        let f = self.fields();
        self.ocsr().modify(f.ocie.val(0));
    }

    /// Compare match flag.
    pub fn flag(&self) -> bool {
        self.ocsr().is_set(self.fields().ocf)
    }

    /// Flags are cleared by writing 0.
    pub fn clear_flag(&mut self) {
        let f = self.fields();
        self.ocsr().modify(f.ocf.val(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    fn channel(ch: Channel) -> (OcoChannel, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (OcoChannel::new(regs.share(), ch), rb)
    }

    #[test]
    fn high_mode_word_layout() {
        let mode = HighChannelMode {
            actions: Actions {
                down_compare: OutputAction::Low,
                up_compare: OutputAction::High,
                zero_no_compare: OutputAction::Invert,
                ..Default::default()
            },
            conditions: MatchConditions {
                up_compare: true,
                down_compare: true,
                ..Default::default()
            },
        };
        assert_eq!(mode.bits(), 0b0101_1100_0001_0010);
        assert_eq!(HighChannelMode::default().bits(), 0);
    }

    #[test]
    fn low_mode_word_layout() {
        let mode = LowChannelMode {
            actions: Actions {
                zero: OutputAction::High,
                ..Default::default()
            },
            linked: LinkedActions {
                down_no_compare: OutputAction::Invert,
                zero_no_compare: OutputAction::Low,
                ..Default::default()
            },
            conditions: MatchConditions::ALL,
        };
        assert_eq!(mode.bits(), 1 << 6 | 3 << 12 | 2 << 26 | 0xF << 28);
    }

    #[test]
    fn mode_words_are_checked_against_channel_kind() {
        let (mut uh, rb) = channel(Channel::Uh);
        let mode = HighChannelMode {
            conditions: MatchConditions::ALL,
            ..Default::default()
        };
        uh.set_high_mode(&mode).unwrap();
        assert_eq!(rb.ocmr[0].get(), 0xF000);
        assert_eq!(uh.set_low_mode(&LowChannelMode::default()), Err(Error::InvalidMode));

        let mut vl = OcoChannel::new(crate::pac::Reg::from_static(rb).share(), Channel::Vl);
        assert_eq!(vl.set_high_mode(&mode), Err(Error::InvalidMode));
        vl.set_low_mode(&LowChannelMode {
            conditions: MatchConditions::ALL,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(rb.ocmr[3].get(), 0xF000_0000);
        assert_eq!(vl.mode_word(), 0xF000_0000);
    }

    #[test]
    fn init_touches_only_its_half_of_the_pair() {
        let (mut wl, rb) = channel(Channel::Wl);
        wl.init(&OcoConfig {
            enable: true,
            polarity: Level::High,
            compare_buffer: BufferTransfer::OnZero,
            mode_buffer: BufferTransfer::OnZeroOrPeak,
            interrupt_mask_link: true,
        });
        assert_eq!(rb.ocsr[2].get(), 0b1010);
        assert_eq!(rb.ocer[2].get(), 1 << 2 | 3 << 6 | 1 << 9 | 1 << 11);
        assert_eq!(rb.ocsr[0].get(), 0);
        assert_eq!(wl.output_level(), Level::High);

        let mut wh = OcoChannel::new(crate::pac::Reg::from_static(rb).share(), Channel::Wh);
        wh.enable_output(true);
        assert_eq!(rb.ocsr[2].get(), 0b1011);
    }

    #[test]
    fn compare_and_flags() {
        let (mut ul, rb) = channel(Channel::Ul);
        ul.set_compare(0x1234);
        assert_eq!(rb.occr[1].get(), 0x1234);
        assert_eq!(ul.compare(), 0x1234);
        ul.listen();
        assert!(rb.ocsr[0].is_set(OCSR::OCIEL));
        rb.ocsr[0].modify(OCSR::OCFL::SET + OCSR::OCFH::SET);
        assert!(ul.flag());
        ul.clear_flag();
        assert!(!ul.flag());
        assert!(rb.ocsr[0].is_set(OCSR::OCFH));
    }
}
