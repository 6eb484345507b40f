/*!
  # Analog to digital converter
  Twelve input channels scanned in two sequences. Sequence A is started by
  software or a trigger; sequence B only by a trigger and interrupts A, which
  then restarts. Each channel has its own sample time and data register.

  ## Example
  ```ignore
    let mut adc = Adc::new(dp.ADC);
    adc.init(&AdcConfig::default())?;
    adc.enable_channels(Sequence::A, 0b0011)?;
    adc.set_sample_time(0, 20)?;
    let mut data = [0u16; 2];
    adc.poll(Sequence::A, &mut data, ADC_TIMEOUT)?;
  ```
*/

use crate::clock::divider_exponent;
use crate::error::{poll, Error, Result};
use crate::pac::{self, adc::*, ReadWriteable, Readable, Writeable};
use tock_registers::fields::FieldValue;

/// Spin budget of a single conversion sequence.
pub const ADC_TIMEOUT: u32 = 0x1_0000;

/// Bitmask of all channels.
pub const ALL_CHANNELS: u16 = (1 << CHANNELS) - 1;

/// Shortest sample time in ADC clock cycles.
pub const MIN_SAMPLE_TIME: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Sequence {
    A,
    B,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    #[default]
    SingleA,
    ContinuousA,
    SingleAB,
    /// Sequence A runs continuously, B once per trigger
    ContinuousASingleB,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Resolution {
    #[default]
    Bits12,
    Bits10,
    Bits8,
}

/// Data register alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    #[default]
    Right,
    Left,
}

/// Trigger input of a sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Trigger {
    /// ADTRG pin falling edge
    Pin = 0,
    /// Event routed to [`Target::Adc(0)`](crate::aos::Target::Adc)
    Event0 = 1,
    /// Event routed to [`Target::Adc(1)`](crate::aos::Target::Adc)
    Event1 = 2,
    /// Both events
    Event0And1 = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AdcConfig {
    pub mode: Mode,
    pub resolution: Resolution,
    pub align: Align,
    /// Clear a data register once it has been read.
    pub auto_clear: bool,
    /// Conversions averaged on the averaging channels, a power of two from
    /// 2 to 256.
    pub average_count: u16,
}

impl Default for AdcConfig {
    fn default() -> Self {
        AdcConfig {
            mode: Mode::SingleA,
            resolution: Resolution::Bits12,
            align: Align::Right,
            auto_clear: false,
            average_count: 2,
        }
    }
}

fn ms(mode: Mode) -> FieldValue<u32, CR0::Register> {
    match mode {
        Mode::SingleA => CR0::MS::SingleA,
        Mode::ContinuousA => CR0::MS::ContinuousA,
        Mode::SingleAB => CR0::MS::SingleAB,
        Mode::ContinuousASingleB => CR0::MS::ContinuousASingleB,
    }
}

fn accsel(resolution: Resolution) -> FieldValue<u32, CR0::Register> {
    match resolution {
        Resolution::Bits12 => CR0::ACCSEL::Bits12,
        Resolution::Bits10 => CR0::ACCSEL::Bits10,
        Resolution::Bits8 => CR0::ACCSEL::Bits8,
    }
}

fn eoc(seq: Sequence) -> FieldValue<u32, ISR::Register> {
    match seq {
        Sequence::A => ISR::EOCA::SET,
        Sequence::B => ISR::EOCB::SET,
    }
}

pub struct Adc {
    adc: pac::ADC,
}

impl Adc {
    pub fn new(adc: pac::ADC) -> Self {
        Self { adc }
    }

    pub fn free(self) -> pac::ADC {
        self.adc
    }

    /// Stops any conversion and applies `config`.
    pub fn init(&mut self, config: &AdcConfig) -> Result<()> {
        let avcnt = divider_exponent(config.average_count as u32, 8)?;
        if avcnt == 0 {
            return Err(Error::InvalidParameter);
        }
        self.stop();
        self.adc.cr0.write(
            ms(config.mode)
                + accsel(config.resolution)
                + CR0::CLREN.val(config.auto_clear as u32)
                + CR0::DFMT.val((config.align == Align::Left) as u32)
                + CR0::AVCNT.val(avcnt - 1),
        );
        #[cfg(feature = "defmt")]
        defmt::debug!("adc: {}", config);
        Ok(())
    }

    pub fn deinit(&mut self) {
        self.stop();
        self.adc.cr0.set(0);
        self.adc.cr1.set(0);
        self.adc.trgsr.set(0);
        self.adc.chselra.set(0);
        self.adc.chselrb.set(0);
        self.adc.avchselr.set(0);
        self.adc.icr.set(0);
        self.adc.isclrr.write(ISR::EOCA::SET + ISR::EOCB::SET);
        for sstr in self.adc.sstr.iter() {
            sstr.set(0x0B);
        }
    }

    fn chselr(&self, seq: Sequence) -> &tock_registers::registers::ReadWrite<u32> {
        match seq {
            Sequence::A => &self.adc.chselra,
            Sequence::B => &self.adc.chselrb,
        }
    }

    /// Adds the channels in `mask` to `seq`. A channel belongs to at most one
    /// sequence.
    pub fn enable_channels(&mut self, seq: Sequence, mask: u16) -> Result<()> {
        if mask & !ALL_CHANNELS != 0 {
            return Err(Error::InvalidParameter);
        }
        let other = match seq {
            Sequence::A => Sequence::B,
            Sequence::B => Sequence::A,
        };
        if self.chselr(other).get() & mask as u32 != 0 {
            return Err(Error::InvalidMode);
        }
        let reg = self.chselr(seq);
        reg.set(reg.get() | mask as u32);
        Ok(())
    }

    pub fn disable_channels(&mut self, seq: Sequence, mask: u16) {
        let reg = self.chselr(seq);
        reg.set(reg.get() & !(mask as u32));
    }

    pub fn channels(&self, seq: Sequence) -> u16 {
        self.chselr(seq).get() as u16
    }

    /// Sample time of `ch` in ADC clock cycles.
    pub fn set_sample_time(&mut self, ch: u8, cycles: u8) -> Result<()> {
        let sstr = self.adc.sstr.get(ch as usize).ok_or(Error::InvalidParameter)?;
        if cycles < MIN_SAMPLE_TIME {
            return Err(Error::InvalidParameter);
        }
        sstr.set(cycles as u32);
        Ok(())
    }

    /// Channels whose results are averaged over
    /// [`AdcConfig::average_count`] conversions.
    pub fn set_average_channels(&mut self, mask: u16) -> Result<()> {
        if mask & !ALL_CHANNELS != 0 {
            return Err(Error::InvalidParameter);
        }
        self.adc.avchselr.set(mask as u32);
        Ok(())
    }

    /// Restart sequence A from the interrupted channel instead of its first
    /// channel after sequence B has run.
    pub fn set_resume_interrupted(&mut self, resume: bool) {
        self.adc.cr1.modify(CR1::RSCHSEL.val((!resume) as u32));
    }

    /// Hardware trigger of `seq`, `None` to disable.
    pub fn set_trigger(&mut self, seq: Sequence, trigger: Option<Trigger>) {
        let (en, sel) = match trigger {
            Some(t) => (1, t as u32),
            None => (0, 0),
        };
        match seq {
            Sequence::A => self
                .adc
                .trgsr
                .modify(TRGSR::TRGENA.val(en) + TRGSR::TRGSELA.val(sel)),
            Sequence::B => self
                .adc
                .trgsr
                .modify(TRGSR::TRGENB.val(en) + TRGSR::TRGSELB.val(sel)),
        }
    }

    /// Starts sequence A by software.
    pub fn start(&mut self) {
        self.adc.str.write(STR::STRT::SET);
    }

    pub fn stop(&mut self) {
        self.adc.str.write(STR::STRT::CLEAR);
    }

    pub fn is_running(&self) -> bool {
        self.adc.str.is_set(STR::STRT)
    }

    pub fn is_complete(&self, seq: Sequence) -> bool {
        self.adc.isr.matches_all(eoc(seq))
    }

    /// Completion flags are cleared by writing 1 to the clear register.
    pub fn clear_complete(&mut self, seq: Sequence) {
        self.adc.isclrr.write(eoc(seq));
    }

    /// Latest result of `ch`.
    pub fn read(&self, ch: u8) -> Result<u16> {
        let dr = self.adc.dr.get(ch as usize).ok_or(Error::InvalidParameter)?;
        Ok(dr.get() as u16)
    }

    /// Runs `seq` to completion and copies the data registers into `data`,
    /// so `data[n]` holds channel `n`. Sequence A is started by software,
    /// sequence B has to be triggered.
    pub fn poll(&mut self, seq: Sequence, data: &mut [u16], timeout: u32) -> Result<()> {
        if data.is_empty() || data.len() > CHANNELS {
            return Err(Error::InvalidParameter);
        }
        if seq == Sequence::A {
            self.start();
        }
        if let Err(e) = poll(timeout, || self.is_complete(seq)) {
            #[cfg(feature = "defmt")]
            defmt::warn!("adc: sequence {} timed out", seq);
            return Err(e);
        }
        self.clear_complete(seq);
        for (out, dr) in data.iter_mut().zip(self.adc.dr.iter()) {
            *out = dr.get() as u16;
        }
        Ok(())
    }

    /// Enables the end of sequence interrupt.
    pub fn listen(&mut self, seq: Sequence) {
        self.adc.icr.modify(eoc(seq));
    }

    pub fn unlisten(&mut self, seq: Sequence) {
        match seq {
            Sequence::A => self.adc.icr.modify(ISR::EOCA::CLEAR),
            Sequence::B => self.adc.icr.modify(ISR::EOCB::CLEAR),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    fn adc() -> (Adc, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (Adc::new(regs), rb)
    }

    #[test]
    fn init_composes_cr0() {
        let (mut adc, rb) = adc();
        adc.init(&AdcConfig {
            mode: Mode::ContinuousASingleB,
            resolution: Resolution::Bits8,
            align: Align::Left,
            auto_clear: true,
            average_count: 16,
        })
        .unwrap();
        assert_eq!(rb.cr0.get(), 3 | 2 << 4 | 1 << 6 | 1 << 7 | 3 << 8);

        adc.init(&AdcConfig::default()).unwrap();
        assert_eq!(rb.cr0.get(), 0);
        for count in [1, 3, 512] {
            let cfg = AdcConfig {
                average_count: count,
                ..Default::default()
            };
            assert_eq!(adc.init(&cfg), Err(Error::InvalidParameter));
        }
    }

    #[test]
    fn sequences_do_not_share_channels() {
        let (mut adc, rb) = adc();
        adc.enable_channels(Sequence::A, 0b0110).unwrap();
        adc.enable_channels(Sequence::B, 0b1000).unwrap();
        assert_eq!(adc.enable_channels(Sequence::B, 0b0010), Err(Error::InvalidMode));
        assert_eq!(adc.enable_channels(Sequence::A, 1 << 12), Err(Error::InvalidParameter));
        adc.disable_channels(Sequence::A, 0b0010);
        assert_eq!(rb.chselra.get(), 0b0100);
        assert_eq!(adc.channels(Sequence::B), 0b1000);
    }

    #[test]
    fn sample_time_and_averaging() {
        let (mut adc, rb) = adc();
        adc.set_sample_time(11, 40).unwrap();
        assert_eq!(rb.sstr[11].get(), 40);
        assert_eq!(adc.set_sample_time(12, 40), Err(Error::InvalidParameter));
        assert_eq!(adc.set_sample_time(0, 4), Err(Error::InvalidParameter));
        adc.set_average_channels(0b101).unwrap();
        assert_eq!(rb.avchselr.get(), 0b101);
    }

    #[test]
    fn triggers() {
        let (mut adc, rb) = adc();
        adc.set_trigger(Sequence::B, Some(Trigger::Event1));
        assert_eq!(rb.trgsr.get(), 2 << 8 | 1 << 15);
        adc.set_trigger(Sequence::A, Some(Trigger::Pin));
        assert!(rb.trgsr.is_set(TRGSR::TRGENA));
        adc.set_trigger(Sequence::B, None);
        assert_eq!(rb.trgsr.get(), 1 << 7);
    }

    #[test]
    fn poll_copies_results() {
        let (mut adc, rb) = adc();
        for (n, dr) in rb.dr.iter().enumerate() {
            dr.set(100 + n as u32);
        }
        rb.isr.write(ISR::EOCA::SET);
        let mut data = [0u16; 3];
        adc.poll(Sequence::A, &mut data, 10).unwrap();
        assert_eq!(data, [100, 101, 102]);
        assert!(adc.is_running());
        assert!(rb.isclrr.is_set(ISR::EOCA));
        assert_eq!(adc.read(7), Ok(107));
        assert_eq!(adc.read(12), Err(Error::InvalidParameter));
    }

    #[test]
    fn poll_times_out_without_completion() {
        let (mut adc, _) = adc();
        let mut data = [0u16; 1];
        assert_eq!(adc.poll(Sequence::B, &mut data, 5), Err(Error::Timeout));
        assert_eq!(adc.poll(Sequence::B, &mut [], 5), Err(Error::InvalidParameter));
    }

    #[test]
    fn interrupts() {
        let (mut adc, rb) = adc();
        adc.listen(Sequence::B);
        adc.listen(Sequence::A);
        assert_eq!(rb.icr.get(), 0b11);
        adc.unlisten(Sequence::A);
        assert_eq!(rb.icr.get(), 0b10);
    }
}
