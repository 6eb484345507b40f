//! Voltage comparators
//!
//! Two comparator units compare one of four analog inputs against a reference
//! (external pin, the internal 8-bit DAC, or the internal reference voltage).
//! Used together the units form a window comparator whose output is high while
//! the input lies between the two references.
//!
//! ```ignore
//! let mut cmp = Cmp::cmp1(dp.CMP1);
//! cmp.init_normal(&NormalConfig {
//!     positive: PositiveInput::Inp1,
//!     reference: ReferenceInput::Dac,
//!     edge: Edge::Rising,
//!     interrupt: true,
//!     ..Default::default()
//! });
//! let above = cmp.result();
//! ```

use crate::error::{Error, Result};
use crate::pac::{self, cmp::*, ReadWriteable, Readable, Writeable};

/// Comparator unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Cmp1,
    Cmp2,
}

/// Voltage on the non-inverting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PositiveInput {
    #[default]
    None,
    Inp1,
    Inp2,
    Inp3,
    Inp4,
}

impl PositiveInput {
    const fn cvsl(self) -> u8 {
        match self {
            PositiveInput::None => 0,
            PositiveInput::Inp1 => 1,
            PositiveInput::Inp2 => 2,
            PositiveInput::Inp3 => 4,
            PositiveInput::Inp4 => 8,
        }
    }
}

/// Voltage on the inverting input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReferenceInput {
    #[default]
    None,
    Inm1,
    Inm2,
    /// Internal 8-bit DAC output
    Dac,
    /// Internal reference voltage
    Vref,
}

impl ReferenceInput {
    const fn rvsl(self) -> u8 {
        match self {
            ReferenceInput::None => 0,
            ReferenceInput::Inm1 => 1,
            ReferenceInput::Inm2 => 2,
            ReferenceInput::Dac => 4,
            ReferenceInput::Vref => 8,
        }
    }
}

/// Output edge that raises the comparator event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    #[default]
    None,
    Rising,
    Falling,
    Both,
}

/// Output noise filter sampling clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Filter {
    #[default]
    None,
    Pclk,
    PclkDiv8,
    PclkDiv32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    #[default]
    Normal,
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NormalConfig {
    pub positive: PositiveInput,
    pub reference: ReferenceInput,
    pub edge: Edge,
    pub filter: Filter,
    pub polarity: Polarity,
    /// Enable the comparator output (to the event system and EMB).
    pub output_enable: bool,
    /// Drive the VCOUT pin.
    pub vcout_pin: bool,
    pub interrupt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WindowConfig {
    pub positive: PositiveInput,
    pub low_reference: ReferenceInput,
    pub high_reference: ReferenceInput,
    pub edge: Edge,
    pub filter: Filter,
    pub polarity: Polarity,
    pub output_enable: bool,
    pub vcout_pin: bool,
    pub interrupt: bool,
}

/// Timer window: the comparator output is only valid while one of the
/// selected timer outputs is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerWindow {
    /// Timer output mask (TWR1).
    pub sources: u8,
    /// Active level per timer output (TWR2).
    pub levels: u8,
    /// Comparator output level outside the window.
    pub idle_high: bool,
}

/// One comparator unit.
pub struct Cmp {
    regs: pac::CMP1,
    unit: Unit,
}

impl Cmp {
    pub fn cmp1(regs: pac::CMP1) -> Self {
        Self {
            regs,
            unit: Unit::Cmp1,
        }
    }

    pub fn cmp2(regs: pac::CMP2) -> Self {
        Self {
            regs,
            unit: Unit::Cmp2,
        }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Configures a stand-alone comparison and starts the comparator.
    pub fn init_normal(&mut self, config: &NormalConfig) {
        self.disable();
        self.regs.mdr.modify(MDR::CWDE::CLEAR);
        self.set_inputs(config.positive, config.reference);
        self.set_filter(config.filter);
        self.set_detect_edge(config.edge);
        self.set_polarity(config.polarity);
        self.enable();
        self.set_vcout(config.vcout_pin);
        self.set_output_enable(config.output_enable);
        if config.interrupt {
            self.listen();
        } else {
            self.unlisten();
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("cmp {}: normal mode {}", self.unit, config);
    }

    /// Restores the reset state and stops the comparator.
    pub fn deinit(&mut self) {
        self.regs.mdr.set(0);
        self.regs.fir.set(0);
        self.regs.ocr.set(0);
        self.regs.vsr.set(0);
        self.regs.twr1.set(0);
        self.regs.twr2.set(0);
    }

    pub fn enable(&mut self) {
        self.regs.mdr.modify(MDR::CENB::SET);
    }

    pub fn disable(&mut self) {
        self.regs.mdr.modify(MDR::CENB::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.regs.mdr.is_set(MDR::CENB)
    }

    /// Latest comparison result after filtering and polarity.
    pub fn result(&self) -> bool {
        self.regs.mdr.is_set(MDR::CMON)
    }

    pub fn set_inputs(&mut self, positive: PositiveInput, reference: ReferenceInput) {
        self.regs
            .vsr
            .write(VSR::CVSL.val(positive.cvsl()) + VSR::RVSL.val(reference.rvsl()));
    }

    pub fn set_output_enable(&mut self, enable: bool) {
        self.regs.ocr.modify(OCR::COEN.val(enable as u8));
    }

    pub fn set_vcout(&mut self, enable: bool) {
        self.regs.ocr.modify(OCR::CPOE.val(enable as u8));
    }

    pub fn set_polarity(&mut self, polarity: Polarity) {
        self.regs
            .ocr
            .modify(OCR::COPS.val((polarity == Polarity::Inverted) as u8));
    }

    pub fn set_detect_edge(&mut self, edge: Edge) {
        let edgs = match edge {
            Edge::None => FIR::EDGS::None,
            Edge::Rising => FIR::EDGS::Rising,
            Edge::Falling => FIR::EDGS::Falling,
            Edge::Both => FIR::EDGS::Both,
        };
        self.regs.fir.modify(edgs);
    }

    pub fn set_filter(&mut self, filter: Filter) {
        let fcks = match filter {
            Filter::None => FIR::FCKS::None,
            Filter::Pclk => FIR::FCKS::Pclk,
            Filter::PclkDiv8 => FIR::FCKS::PclkDiv8,
            Filter::PclkDiv32 => FIR::FCKS::PclkDiv32,
        };
        self.regs.fir.modify(fcks);
    }

    /// Enables the interrupt raised on the configured output edge.
    pub fn listen(&mut self) {
        self.regs.fir.modify(FIR::CIEN::SET);
    }

    pub fn unlisten(&mut self) {
        self.regs.fir.modify(FIR::CIEN::CLEAR);
    }

    /// Gates the output with timer outputs, or removes the gate with `None`.
    pub fn set_timer_window(&mut self, window: Option<TimerWindow>) {
        match window {
            Some(window) => {
                self.regs.twr1.set(window.sources);
                self.regs.twr2.set(window.levels);
                self.regs
                    .ocr
                    .modify(OCR::TWOE::SET + OCR::TWOL.val(window.idle_high as u8));
            }
            None => {
                self.regs.ocr.modify(OCR::TWOE::CLEAR + OCR::TWOL::CLEAR);
                self.regs.twr1.set(0);
                self.regs.twr2.set(0);
            }
        }
    }

    pub fn free(self) -> pac::CMP1 {
        self.regs
    }
}

/// CMP1 and CMP2 working as a window comparator.
pub struct WindowComparator {
    cmp1: Cmp,
    cmp2: Cmp,
}

impl WindowComparator {
    /// Combines both units. CMP1 holds the low reference, CMP2 the high
    /// reference and the shared input; the window result is read from CMP2.
    pub fn new(mut cmp1: Cmp, mut cmp2: Cmp, config: &WindowConfig) -> Result<Self> {
        if cmp1.unit != Unit::Cmp1 || cmp2.unit != Unit::Cmp2 {
            return Err(Error::InvalidMode);
        }
        cmp1.disable();
        cmp2.disable();
        cmp1.set_inputs(PositiveInput::None, config.low_reference);
        cmp2.set_inputs(config.positive, config.high_reference);
        cmp2.regs.mdr.modify(MDR::CWDE::SET);
        cmp2.set_filter(config.filter);
        cmp2.set_detect_edge(config.edge);
        cmp2.set_polarity(config.polarity);
        cmp1.enable();
        cmp2.enable();
        cmp2.set_vcout(config.vcout_pin);
        cmp2.set_output_enable(config.output_enable);
        if config.interrupt {
            cmp2.listen();
        } else {
            cmp2.unlisten();
        }
        Ok(Self { cmp1, cmp2 })
    }

    /// True while the input lies inside the window.
    pub fn result(&self) -> bool {
        self.cmp2.result()
    }

    /// Output side of the window, for edge, filter and interrupt settings.
    pub fn output(&mut self) -> &mut Cmp {
        &mut self.cmp2
    }

    /// Leaves window mode and returns both units.
    pub fn release(mut self) -> (Cmp, Cmp) {
        self.cmp2.regs.mdr.modify(MDR::CWDE::CLEAR);
        (self.cmp1, self.cmp2)
    }
}

/// Internal 8-bit reference DAC.
pub struct CmpDac {
    regs: pac::CMPDAC,
}

impl CmpDac {
    pub fn new(regs: pac::CMPDAC) -> Self {
        Self { regs }
    }

    pub fn set_data(&mut self, data: u8) {
        self.regs.dadr.set(data);
    }

    pub fn data(&self) -> u8 {
        self.regs.dadr.get()
    }

    pub fn enable(&mut self) {
        self.regs.dacr.modify(DACR::DAEN::SET);
    }

    pub fn disable(&mut self) {
        self.regs.dacr.modify(DACR::DAEN::CLEAR);
    }

    /// Connects the DAC output and/or the internal reference to the ADC.
    /// The switch bits are key protected.
    pub fn connect_adc_reference(&mut self, dac: bool, vref: bool) {
        let bits = RVADC::DASW.val(dac as u16) + RVADC::VREFSW.val(vref as u16);
        self.regs.rvadc.write(RVADC::WPRT.val(RVADC_KEY));
        self.regs.rvadc.write(RVADC::WPRT.val(RVADC_KEY) + bits);
        self.regs.rvadc.write(bits);
    }

    pub fn free(self) -> pac::CMPDAC {
        self.regs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    #[test]
    fn normal_mode_programs_all_fields() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut cmp = Cmp::cmp1(regs);
        cmp.init_normal(&NormalConfig {
            positive: PositiveInput::Inp3,
            reference: ReferenceInput::Dac,
            edge: Edge::Both,
            filter: Filter::PclkDiv8,
            polarity: Polarity::Inverted,
            output_enable: true,
            vcout_pin: true,
            interrupt: true,
        });
        assert_eq!(rb.vsr.get(), 0x44);
        assert_eq!(rb.fir.read(FIR::FCKS), 2);
        assert_eq!(rb.fir.read(FIR::EDGS), 3);
        assert!(rb.fir.is_set(FIR::CIEN));
        assert!(rb.ocr.is_set(OCR::COEN));
        assert!(rb.ocr.is_set(OCR::COPS));
        assert!(rb.ocr.is_set(OCR::CPOE));
        assert!(cmp.is_enabled());
        assert!(!rb.mdr.is_set(MDR::CWDE));
    }

    #[test]
    fn result_reads_monitor_bit() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let cmp = Cmp::cmp2(regs);
        assert!(!cmp.result());
        rb.mdr.modify(MDR::CMON::SET);
        assert!(cmp.result());
    }

    #[test]
    fn window_mode_uses_both_units() {
        let (r1, rb1) = testing::block::<RegisterBlock>();
        let (r2, rb2) = testing::block::<RegisterBlock>();
        let window = WindowComparator::new(
            Cmp::cmp1(r1),
            Cmp::cmp2(r2),
            &WindowConfig {
                positive: PositiveInput::Inp2,
                low_reference: ReferenceInput::Inm1,
                high_reference: ReferenceInput::Vref,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(rb1.vsr.read(VSR::RVSL), 1);
        assert_eq!(rb2.vsr.get(), 0x82);
        assert!(rb2.mdr.is_set(MDR::CWDE));
        assert!(rb1.mdr.is_set(MDR::CENB) && rb2.mdr.is_set(MDR::CENB));

        let (_, cmp2) = window.release();
        assert!(!rb2.mdr.is_set(MDR::CWDE));
        assert_eq!(cmp2.unit(), Unit::Cmp2);
    }

    #[test]
    fn window_mode_interrupt_follows_config() {
        let (r1, _) = testing::block::<RegisterBlock>();
        let (r2, rb2) = testing::block::<RegisterBlock>();
        rb2.fir.modify(FIR::CIEN::SET);
        let config = WindowConfig {
            interrupt: false,
            ..Default::default()
        };
        let window = WindowComparator::new(Cmp::cmp1(r1), Cmp::cmp2(r2), &config).unwrap();
        assert!(!rb2.fir.is_set(FIR::CIEN));

        let (cmp1, cmp2) = window.release();
        let config = WindowConfig {
            interrupt: true,
            ..config
        };
        WindowComparator::new(cmp1, cmp2, &config).unwrap();
        assert!(rb2.fir.is_set(FIR::CIEN));
    }

    #[test]
    fn window_mode_rejects_swapped_units() {
        let (r1, _) = testing::block::<RegisterBlock>();
        let (r2, _) = testing::block::<RegisterBlock>();
        let result = WindowComparator::new(Cmp::cmp2(r1), Cmp::cmp1(r2), &WindowConfig::default());
        assert!(matches!(result, Err(Error::InvalidMode)));
    }

    #[test]
    fn timer_window_round_trip() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let mut cmp = Cmp::cmp1(regs);
        cmp.set_timer_window(Some(TimerWindow {
            sources: 0b0101,
            levels: 0b0001,
            idle_high: true,
        }));
        assert_eq!(rb.twr1.get(), 0b0101);
        assert_eq!(rb.twr2.get(), 0b0001);
        assert!(rb.ocr.is_set(OCR::TWOE) && rb.ocr.is_set(OCR::TWOL));
        cmp.set_timer_window(None);
        assert_eq!(rb.ocr.get(), 0);
        assert_eq!(rb.twr1.get(), 0);
    }

    #[test]
    fn dac_reference_switch_is_left_locked() {
        let (regs, rb) = testing::block::<DacRegisterBlock>();
        let mut dac = CmpDac::new(regs);
        dac.set_data(0x80);
        dac.enable();
        dac.connect_adc_reference(true, false);
        assert_eq!(rb.dadr.get(), 0x80);
        assert!(rb.dacr.is_set(DACR::DAEN));
        assert!(rb.rvadc.is_set(RVADC::DASW));
        assert!(!rb.rvadc.is_set(RVADC::VREFSW));
        assert_eq!(rb.rvadc.read(RVADC::WPRT), 0);
    }
}
