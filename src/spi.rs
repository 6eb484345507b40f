//! Serial Peripheral Interface
//!
//! Byte-wide SPI in master or slave role, four-wire (hardware SS) or
//! three-wire (clock synchronous). The bus clock is PCLK1 divided by a power
//! of two from 2 to 256. Blocking helpers spin on the status flags with a
//! loop budget; the `embedded-hal` traits use the budget set with
//! [`Spi::set_timeout`].
//!
//! ```ignore
//! let config = SpiConfig {
//!     frequency: 4_u32.MHz().into(),
//!     ..Default::default()
//! };
//! let mut spi = Spi::new(dp.SPI, config, &clocks)?;
//! spi.enable();
//! let mut rx = [0u8; 4];
//! spi.transfer(&[0x9F, 0, 0, 0], &mut rx, SPI_TIMEOUT)?;
//! ```

use embedded_hal::spi::{ErrorKind, Mode, Phase, Polarity, MODE_0};
use embedded_time::rate::Hertz;

use crate::aos::EventSource;
use crate::clock::Clocks;
use crate::dma::{ReadTarget, WriteTarget};
use crate::error::poll;
use crate::pac::{self, spi::*, ReadWriteable, Readable, Writeable};

/// Default spin budget per byte.
pub const SPI_TIMEOUT: u32 = 0x1_0000;

/// Frame length field value for 8-bit frames.
const DSIZE_8BIT: u32 = 7;

/// SPI error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum Error {
    /// Overrun occurred
    Overrun,
    /// Mode fault occurred
    ModeFault,
    /// Parity error
    Parity,
    /// Slave transmit underrun
    Underrun,
    /// A status flag did not change within the spin budget
    Timeout,
}

impl embedded_hal::spi::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::Overrun => ErrorKind::Overrun,
            Error::ModeFault => ErrorKind::ModeFault,
            _ => ErrorKind::Other,
        }
    }
}

// Driver errors reach the SPI paths only through timed polls.
impl From<crate::error::Error> for Error {
    fn from(_: crate::error::Error) -> Self {
        Error::Timeout
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    #[default]
    Master,
    Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Wire {
    /// SCK, MOSI, MISO and SS
    #[default]
    FourWire,
    /// SCK, MOSI and MISO
    ThreeWire,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    #[default]
    FullDuplex,
    /// Received data is not stored
    TransmitOnly,
}

/// The bit format to send the data in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SpiBitFormat {
    /// Most significant bit first
    #[default]
    MsbFirst,
    /// Least significant bit first
    LsbFirst,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    Even,
    Odd,
}

/// Internal loopback of MOSI into MISO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Loopback {
    Direct,
    Inverted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    Overrun,
    /// Transfer in progress
    Busy,
    ModeFault,
    Parity,
    Underrun,
    TxEmpty,
    RxFull,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    Error,
    TxEmpty,
    RxFull,
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    pub mode: Role,
    pub wire: Wire,
    pub duplex: Duplex,
    pub spi_mode: Mode,
    pub bit_order: SpiBitFormat,
    /// Upper bound of the bus clock in master mode
    pub frequency: Hertz,
    pub parity: Option<Parity>,
}

impl Default for SpiConfig {
    fn default() -> Self {
        SpiConfig {
            mode: Role::Master,
            wire: Wire::FourWire,
            duplex: Duplex::FullDuplex,
            spi_mode: MODE_0,
            bit_order: SpiBitFormat::MsbFirst,
            frequency: Hertz(1_000_000_u32),
            parity: None,
        }
    }
}

/// Baud rate field for the fastest bus clock not above `freq`.
fn baud_divider(pclk1: u32, freq: u32) -> crate::error::Result<u32> {
    if freq == 0 {
        return Err(crate::error::Error::InvalidParameter);
    }
    (0..8)
        .find(|mbr| pclk1 >> (mbr + 1) <= freq)
        .ok_or(crate::error::Error::InvalidParameter)
}

pub struct Spi {
    spi: pac::SPI,
    duplex: Duplex,
    timeout: u32,
}

impl Spi {
    /// Applies `config` with the peripheral disabled.
    pub fn new(spi: pac::SPI, config: SpiConfig, clocks: &Clocks) -> crate::error::Result<Self> {
        let mbr = match baud_divider(clocks.pclk1().0, config.frequency.0) {
            Ok(mbr) => mbr,
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("spi: cannot reach {=u32} Hz", config.frequency.0);
                return Err(e);
            }
        };

        let (pae, paoe) = match config.parity {
            None => (0, 0),
            Some(Parity::Even) => (1, 0),
            Some(Parity::Odd) => (1, 1),
        };
        let master = config.mode == Role::Master;
        let four_wire = config.wire == Wire::FourWire;
        spi.cr1.write(
            CR1::SPIMDS.val((!four_wire) as u32)
                + CR1::TXMDS.val((config.duplex == Duplex::TransmitOnly) as u32)
                + CR1::MSTR.val(master as u32)
                + CR1::MODFE.val((master && four_wire) as u32)
                + CR1::PAE.val(pae)
                + CR1::PAOE.val(paoe),
        );
        spi.cfg2.write(
            CFG2::CPHA.val(match config.spi_mode.phase {
                Phase::CaptureOnFirstTransition => 0,
                Phase::CaptureOnSecondTransition => 1,
            }) + CFG2::CPOL.val(match config.spi_mode.polarity {
                Polarity::IdleLow => 0,
                Polarity::IdleHigh => 1,
            }) + CFG2::MBR.val(mbr)
                + CFG2::DSIZE.val(DSIZE_8BIT)
                + CFG2::LSBF.val((config.bit_order == SpiBitFormat::LsbFirst) as u32),
        );
        spi.sr.set(0);
        #[cfg(feature = "defmt")]
        defmt::debug!("spi: divider {=u32}", 2u32 << mbr);

        Ok(Spi {
            spi,
            duplex: config.duplex,
            timeout: SPI_TIMEOUT,
        })
    }

    pub fn free(self) -> pac::SPI {
        self.spi.cr1.modify(CR1::SPE::CLEAR);
        self.spi
    }

    /// Spin budget used by the `embedded-hal` implementations.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    pub fn enable(&mut self) {
        self.spi.cr1.modify(CR1::SPE::SET);
    }

    pub fn disable(&mut self) {
        self.spi.cr1.modify(CR1::SPE::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.spi.cr1.is_set(CR1::SPE)
    }

    /// Bus clock produced in master mode.
    pub fn frequency(&self, clocks: &Clocks) -> Hertz {
        Hertz(clocks.pclk1().0 >> (self.spi.cfg2.read(CFG2::MBR) + 1))
    }

    pub fn set_loopback(&mut self, loopback: Option<Loopback>) {
        let (direct, inverted) = match loopback {
            None => (0, 0),
            Some(Loopback::Direct) => (1, 0),
            Some(Loopback::Inverted) => (0, 1),
        };
        self.spi
            .cr1
            .modify(CR1::SPLPBK2.val(direct) + CR1::SPLPBK.val(inverted));
    }

    pub fn flag(&self, flag: Flag) -> bool {
        let sr = &self.spi.sr;
        match flag {
            Flag::Overrun => sr.is_set(SR::OVRERF),
            Flag::Busy => sr.is_set(SR::IDLNF),
            Flag::ModeFault => sr.is_set(SR::MODFERF),
            Flag::Parity => sr.is_set(SR::PERF),
            Flag::Underrun => sr.is_set(SR::UDRERF),
            Flag::TxEmpty => sr.is_set(SR::TDEF),
            Flag::RxFull => sr.is_set(SR::RDFF),
        }
    }

    /// Error flags are cleared by writing 0. The others follow the data
    /// register and are left alone.
    pub fn clear_flag(&mut self, flag: Flag) {
        let sr = &self.spi.sr;
        match flag {
            Flag::Overrun => sr.modify(SR::OVRERF::CLEAR),
            Flag::ModeFault => sr.modify(SR::MODFERF::CLEAR),
            Flag::Parity => sr.modify(SR::PERF::CLEAR),
            Flag::Underrun => sr.modify(SR::UDRERF::CLEAR),
            Flag::Busy | Flag::TxEmpty | Flag::RxFull => {}
        }
    }

    pub fn listen(&mut self, event: Event) {
        self.spi.cr1.modify(event_field(event).val(1));
    }

    pub fn unlisten(&mut self, event: Event) {
        self.spi.cr1.modify(event_field(event).val(0));
    }

    /// First pending error, if any.
    fn check_errors(&self) -> Result<(), Error> {
        let sr = self.spi.sr.extract();
        if sr.is_set(SR::OVRERF) {
            Err(Error::Overrun)
        } else if sr.is_set(SR::MODFERF) {
            Err(Error::ModeFault)
        } else if sr.is_set(SR::PERF) {
            Err(Error::Parity)
        } else if sr.is_set(SR::UDRERF) {
            Err(Error::Underrun)
        } else {
            Ok(())
        }
    }

    fn write_byte(&mut self, byte: u8, timeout: u32) -> Result<(), Error> {
        poll(timeout, || self.spi.sr.is_set(SR::TDEF))?;
        self.spi.dr.set(byte as u32);
        Ok(())
    }

    fn read_byte(&mut self, timeout: u32) -> Result<u8, Error> {
        poll(timeout, || self.spi.sr.is_set(SR::RDFF))?;
        Ok(self.spi.dr.get() as u8)
    }

    fn exchange(&mut self, byte: u8, timeout: u32) -> Result<u8, Error> {
        self.write_byte(byte, timeout)?;
        let byte = self.read_byte(timeout)?;
        self.check_errors()?;
        Ok(byte)
    }

    /// Sends `data`, discarding whatever is received.
    pub fn transmit(&mut self, data: &[u8], timeout: u32) -> Result<(), Error> {
        for &byte in data {
            match self.duplex {
                Duplex::FullDuplex => {
                    self.exchange(byte, timeout)?;
                }
                Duplex::TransmitOnly => {
                    self.write_byte(byte, timeout)?;
                    self.check_errors()?;
                }
            }
        }
        if self.duplex == Duplex::TransmitOnly {
            poll(timeout, || !self.spi.sr.is_set(SR::IDLNF))?;
        }
        Ok(())
    }

    /// Clocks in `buf.len()` bytes, sending 0xFF. Not available in
    /// transmit-only mode.
    pub fn receive(&mut self, buf: &mut [u8], timeout: u32) -> Result<(), Error> {
        if self.duplex == Duplex::TransmitOnly {
            return Err(Error::ModeFault);
        }
        for byte in buf.iter_mut() {
            *byte = self.exchange(0xFF, timeout)?;
        }
        Ok(())
    }

    /// Full duplex exchange. The shorter side is padded: extra writes send
    /// 0xFF, extra reads are dropped. Not available in transmit-only mode.
    pub fn transfer(&mut self, tx: &[u8], rx: &mut [u8], timeout: u32) -> Result<(), Error> {
        if self.duplex == Duplex::TransmitOnly {
            return Err(Error::ModeFault);
        }
        for i in 0..rx.len().max(tx.len()) {
            let byte = self.exchange(tx.get(i).copied().unwrap_or(0xFF), timeout)?;
            if let Some(out) = rx.get_mut(i) {
                *out = byte;
            }
        }
        Ok(())
    }

    /// Replaces each byte of `words` with the byte received while sending it.
    pub fn transfer_in_place(&mut self, words: &mut [u8], timeout: u32) -> Result<(), Error> {
        if self.duplex == Duplex::TransmitOnly {
            return Err(Error::ModeFault);
        }
        for word in words.iter_mut() {
            *word = self.exchange(*word, timeout)?;
        }
        Ok(())
    }
}

fn event_field(event: Event) -> tock_registers::fields::Field<u32, CR1::Register> {
    match event {
        Event::Error => CR1::EIE,
        Event::TxEmpty => CR1::TXIE,
        Event::RxFull => CR1::RXIE,
        Event::Idle => CR1::IDIE,
    }
}

impl embedded_hal::spi::ErrorType for Spi {
    type Error = Error;
}

impl embedded_hal_nb::spi::FullDuplex<u8> for Spi {
    fn read(&mut self) -> nb::Result<u8, Error> {
        self.check_errors()?;
        if self.spi.sr.is_set(SR::RDFF) {
            Ok(self.spi.dr.get() as u8)
        } else {
            Err(nb::Error::WouldBlock)
        }
    }

    fn write(&mut self, word: u8) -> nb::Result<(), Error> {
        self.check_errors()?;
        if self.spi.sr.is_set(SR::TDEF) {
            self.spi.dr.set(word as u32);
            Ok(())
        } else {
            Err(nb::Error::WouldBlock)
        }
    }
}

impl embedded_hal::spi::SpiBus<u8> for Spi {
    fn read(&mut self, words: &mut [u8]) -> Result<(), Error> {
        self.receive(words, self.timeout)
    }

    fn write(&mut self, words: &[u8]) -> Result<(), Error> {
        self.transmit(words, self.timeout)
    }

    fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Error> {
        Spi::transfer(self, write, read, self.timeout)
    }

    fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Error> {
        Spi::transfer_in_place(self, words, self.timeout)
    }

    fn flush(&mut self) -> Result<(), Error> {
        poll(self.timeout, || !self.spi.sr.is_set(SR::IDLNF))?;
        Ok(())
    }
}

impl ReadTarget for Spi {
    type ReceivedWord = u8;

    fn rx_treq() -> Option<EventSource> {
        Some(EventSource::SpiReceiveFull)
    }

    fn rx_address_count(&self) -> (u32, u32) {
        (&self.spi.dr as *const _ as u32, u32::MAX)
    }

    fn rx_increment(&self) -> bool {
        false
    }
}

impl WriteTarget for Spi {
    type TransmittedWord = u8;

    fn tx_treq() -> Option<EventSource> {
        Some(EventSource::SpiTransmitEmpty)
    }

    fn tx_address_count(&mut self) -> (u32, u32) {
        (&self.spi.dr as *const _ as u32, u32::MAX)
    }

    fn tx_increment(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;
    use embedded_hal::spi::{SpiBus, MODE_3};
    use embedded_hal_nb::spi::FullDuplex;

    fn setup(config: SpiConfig) -> (Spi, &'static RegisterBlock) {
        let (regs, rb) = testing::block::<RegisterBlock>();
        (Spi::new(regs, config, &Clocks::default()).unwrap(), rb)
    }

    /// Data register writes read back, standing in for a loopback wire.
    fn ready(rb: &RegisterBlock) {
        rb.sr.write(SR::TDEF::SET + SR::RDFF::SET);
    }

    #[test]
    fn divider_search() {
        // 32 MHz PCLK1
        assert_eq!(baud_divider(32_000_000, 16_000_000), Ok(0));
        assert_eq!(baud_divider(32_000_000, 40_000_000), Ok(0));
        assert_eq!(baud_divider(32_000_000, 5_000_000), Ok(2));
        assert_eq!(baud_divider(32_000_000, 125_000), Ok(7));
        assert_eq!(
            baud_divider(32_000_000, 100_000),
            Err(crate::error::Error::InvalidParameter)
        );
        assert_eq!(
            baud_divider(32_000_000, 0),
            Err(crate::error::Error::InvalidParameter)
        );
    }

    #[test]
    fn new_programs_control_registers() {
        let (spi, rb) = setup(SpiConfig {
            wire: Wire::ThreeWire,
            spi_mode: MODE_3,
            bit_order: SpiBitFormat::LsbFirst,
            frequency: Hertz(4_000_000_u32),
            parity: Some(Parity::Odd),
            ..Default::default()
        });
        assert_eq!(rb.cr1.get(), 1 | 1 << 3 | 1 << 14 | 1 << 15);
        assert_eq!(rb.cfg2.get(), 0b11 | 2 << 2 | 7 << 8 | 1 << 12);
        assert_eq!(spi.frequency(&Clocks::default()), Hertz(4_000_000_u32));
        assert!(!spi.is_enabled());

        let (_, rb) = setup(SpiConfig::default());
        assert!(rb.cr1.is_set(CR1::MODFE));
    }

    #[test]
    fn unreachable_frequency_is_rejected() {
        let (regs, _) = testing::block::<RegisterBlock>();
        let config = SpiConfig {
            frequency: Hertz(1_000_u32),
            ..Default::default()
        };
        assert!(Spi::new(regs, config, &Clocks::default()).is_err());
    }

    #[test]
    fn flags_interrupts_and_loopback() {
        let (mut spi, rb) = setup(SpiConfig::default());
        spi.enable();
        spi.listen(Event::RxFull);
        spi.listen(Event::Error);
        assert!(rb.cr1.is_set(CR1::RXIE) && rb.cr1.is_set(CR1::EIE));
        spi.unlisten(Event::Error);
        assert!(!rb.cr1.is_set(CR1::EIE));
        spi.set_loopback(Some(Loopback::Inverted));
        assert!(rb.cr1.is_set(CR1::SPLPBK) && !rb.cr1.is_set(CR1::SPLPBK2));
        spi.set_loopback(None);
        assert!(!rb.cr1.is_set(CR1::SPLPBK));

        rb.sr.write(SR::OVRERF::SET + SR::TDEF::SET);
        assert!(spi.flag(Flag::Overrun));
        spi.clear_flag(Flag::Overrun);
        spi.clear_flag(Flag::TxEmpty);
        assert!(!spi.flag(Flag::Overrun));
        assert!(spi.flag(Flag::TxEmpty));
    }

    #[test]
    fn blocking_transfer() {
        let (mut spi, rb) = setup(SpiConfig::default());
        ready(rb);
        let mut rx = [0u8; 3];
        spi.transfer(&[1, 2, 3], &mut rx, 10).unwrap();
        assert_eq!(rx, [1, 2, 3]);
        spi.receive(&mut rx, 10).unwrap();
        assert_eq!(rx, [0xFF; 3]);
        spi.transfer(&[7], &mut rx, 10).unwrap();
        assert_eq!(rx, [7, 0xFF, 0xFF]);
        let mut short = [0u8; 1];
        spi.transfer(&[5, 6], &mut short, 10).unwrap();
        assert_eq!(short, [5]);
        assert_eq!(rb.dr.get(), 6);
    }

    #[test]
    fn errors_and_timeouts() {
        let (mut spi, rb) = setup(SpiConfig::default());
        assert_eq!(spi.transmit(&[0xAA], 5), Err(Error::Timeout));
        rb.sr.write(SR::TDEF::SET + SR::RDFF::SET + SR::PERF::SET);
        assert_eq!(spi.transmit(&[0xAA], 5), Err(Error::Parity));
        assert_eq!(FullDuplex::read(&mut spi), Err(nb::Error::Other(Error::Parity)));
    }

    #[test]
    fn transmit_only_skips_reads() {
        let (mut spi, rb) = setup(SpiConfig {
            duplex: Duplex::TransmitOnly,
            ..Default::default()
        });
        assert!(rb.cr1.is_set(CR1::TXMDS));
        rb.sr.write(SR::TDEF::SET);
        spi.transmit(&[0x55, 0x66], 10).unwrap();
        assert_eq!(rb.dr.get(), 0x66);
        assert_eq!(spi.receive(&mut [0u8; 1], 10), Err(Error::ModeFault));
    }

    #[test]
    fn bus_exchanges_rejected_in_transmit_only() {
        let (mut spi, rb) = setup(SpiConfig {
            duplex: Duplex::TransmitOnly,
            ..Default::default()
        });
        ready(rb);
        let mut read = [0u8; 2];
        assert_eq!(
            SpiBus::transfer(&mut spi, &mut read, &[1, 2]),
            Err(Error::ModeFault)
        );
        let mut words = [3, 4];
        assert_eq!(
            SpiBus::transfer_in_place(&mut spi, &mut words),
            Err(Error::ModeFault)
        );
        assert_eq!(words, [3, 4]);
        assert_eq!(rb.dr.get(), 0);
    }

    #[test]
    fn non_blocking_and_bus_traits() {
        let (mut spi, rb) = setup(SpiConfig::default());
        assert_eq!(FullDuplex::read(&mut spi), Err(nb::Error::WouldBlock));
        assert_eq!(FullDuplex::write(&mut spi, 7), Err(nb::Error::WouldBlock));
        ready(rb);
        FullDuplex::write(&mut spi, 7).unwrap();
        assert_eq!(FullDuplex::read(&mut spi), Ok(7));

        let mut read = [0u8; 4];
        SpiBus::transfer(&mut spi, &mut read, &[9, 8]).unwrap();
        assert_eq!(read, [9, 8, 0xFF, 0xFF]);
        let mut words = [4, 5];
        SpiBus::transfer_in_place(&mut spi, &mut words).unwrap();
        assert_eq!(words, [4, 5]);
        SpiBus::flush(&mut spi).unwrap();
    }

    #[test]
    fn dma_targets_use_data_register() {
        let (spi, rb) = setup(SpiConfig::default());
        let (addr, count) = spi.rx_address_count();
        assert_eq!(addr, &rb.dr as *const _ as u32);
        assert_eq!(count, u32::MAX);
        assert_eq!(<Spi as ReadTarget>::rx_treq(), Some(EventSource::SpiReceiveFull));
        assert!(!spi.tx_increment());
    }
}
