//! Embedded flash
//!
//! The flash controller programs and erases the on-chip 32 KiB array. Its
//! registers are write protected: [`Efm::unlock`] writes the two key values,
//! and every program or erase operation fails with [`Error::Protected`]
//! until that has happened.
//!
//! Offsets passed to this driver are relative to the start of the array.
//! Programming works on aligned 32-bit words, erasing on 512 byte sectors.
//!
//! ```ignore
//! let mut efm = Efm::new(dp.EFM);
//! efm.unlock();
//! efm.erase_sector(0x7E00, EFM_TIMEOUT)?;
//! efm.program(0x7E00, &[0xDEAD_BEEF, 0x1234_5678], EFM_TIMEOUT)?;
//! efm.lock();
//! ```

use crate::error::{poll, Error, Result};
use crate::pac::{self, efm::*, ReadWriteable, Readable, Writeable};
use embedded_storage::nor_flash::{
    ErrorType, NorFlash, NorFlashError, NorFlashErrorKind, ReadNorFlash,
};

/// Start of the flash array in the memory map.
pub const FLASH_BASE: usize = 0x0000_0000;
/// Size of the flash array.
pub const FLASH_SIZE: u32 = 32 * 1024;
/// Erase granularity.
pub const SECTOR_SIZE: u32 = 512;
/// Default loop budget for one program or erase operation.
pub const EFM_TIMEOUT: u32 = 0x2_0000;

/// Status flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Flag {
    /// Program or erase attempted outside a program/erase mode
    ProgramEraseError,
    /// Program or erase hit a protected address
    ProtectionError,
    ProgramSizeError,
    /// Readback after programming differed
    ProgramMismatch,
    OperationEnd,
    /// Bus read while the array was busy
    ReadCollision,
    Ready,
}

/// Interrupt sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    ProgramEraseError,
    OperationEnd,
    ReadCollision,
}

pub struct Efm {
    efm: pac::EFM,
    base: usize,
    size: u32,
    timeout: u32,
}

impl Efm {
    /// Driver for the on-chip array.
    pub fn new(efm: pac::EFM) -> Self {
        Self {
            efm,
            base: FLASH_BASE,
            size: FLASH_SIZE,
            timeout: EFM_TIMEOUT,
        }
    }

    /// Driver for a flash array mapped at `base`.
    ///
    /// # Safety
    ///
    /// `base..base + size` must be valid for reads and word writes for as long
    /// as the driver exists.
    pub unsafe fn with_region(efm: pac::EFM, base: usize, size: u32) -> Self {
        Self {
            efm,
            base,
            size,
            timeout: EFM_TIMEOUT,
        }
    }

    pub fn free(self) -> pac::EFM {
        self.efm
    }

    /// Loop budget used by the `embedded-storage` implementation.
    pub fn set_timeout(&mut self, timeout: u32) {
        self.timeout = timeout;
    }

    pub fn unlock(&mut self) {
        self.efm.faprt.set(UNLOCK_KEY1);
        self.efm.faprt.set(UNLOCK_KEY2);
    }

    pub fn lock(&mut self) {
        self.efm.faprt.set(0);
    }

    pub fn is_unlocked(&self) -> bool {
        self.efm.faprt.read(FAPRT::FAPRT) == 1
    }

    /// Wakes the array from stop mode.
    pub fn enable(&mut self) {
        self.efm.fstp.write(FSTP::FSTP::CLEAR);
    }

    /// Puts the array into stop mode. Code must not execute from flash
    /// while it is stopped.
    pub fn disable(&mut self) {
        self.efm.fstp.write(FSTP::FSTP::SET);
    }

    /// Read wait states, 0..=15.
    pub fn set_wait_cycles(&mut self, cycles: u8) -> Result<()> {
        if cycles > 15 {
            return Err(Error::InvalidParameter);
        }
        self.efm.frmc.modify(FRMC::FLWT.val(cycles as u32));
        Ok(())
    }

    /// Stalls the bus instead of raising a read collision while the array is
    /// busy.
    pub fn set_bus_hold(&mut self, hold: bool) {
        self.efm.fwmc.modify(FWMC::BUSHLDCTL.val(hold as u32));
    }

    pub fn set_cache(&mut self, enable: bool) {
        if enable {
            self.efm.frmc.modify(FRMC::CACHE::SET + FRMC::CRST::CLEAR);
        } else {
            self.efm.frmc.modify(FRMC::CACHE::CLEAR + FRMC::CRST::SET);
        }
    }

    /// Programs one word.
    pub fn program_word(&mut self, offset: u32, data: u32, timeout: u32) -> Result<()> {
        self.check_word(offset, 1)?;
        self.operation(FWMC::PEMOD::SingleProgram, timeout, |efm| {
            efm.write_word(offset, data);
            efm.wait_done(timeout)
        })
    }

    /// Programs one word and reads it back.
    pub fn program_word_readback(&mut self, offset: u32, data: u32, timeout: u32) -> Result<()> {
        self.check_word(offset, 1)?;
        self.operation(FWMC::PEMOD::ProgramReadBack, timeout, |efm| {
            efm.write_word(offset, data);
            efm.wait_done(timeout)?;
            if efm.efm.fsr.is_set(FSR::PGMISMTCH) || efm.read_word(offset) != data {
                #[cfg(feature = "defmt")]
                defmt::warn!("efm: readback mismatch at {=u32:#x}", offset);
                return Err(Error::Mismatch);
            }
            Ok(())
        })
    }

    /// Programs consecutive words starting at `offset`.
    pub fn program(&mut self, offset: u32, data: &[u32], timeout: u32) -> Result<()> {
        self.check_word(offset, data.len() as u32)?;
        self.operation(FWMC::PEMOD::SequenceProgram, timeout, |efm| {
            for (i, word) in data.iter().enumerate() {
                efm.write_word(offset + 4 * i as u32, *word);
                efm.wait_done(timeout)?;
            }
            Ok(())
        })
    }

    /// Erases the sector containing `offset`.
    pub fn erase_sector(&mut self, offset: u32, timeout: u32) -> Result<()> {
        self.check_word(offset, 1)?;
        let sector = offset & !(SECTOR_SIZE - 1);
        self.operation(FWMC::PEMOD::SectorErase, timeout, |efm| {
            efm.write_word(sector, 0);
            efm.wait_done(timeout)
        })
    }

    /// Erases the whole array.
    pub fn erase_chip(&mut self, timeout: u32) -> Result<()> {
        self.operation(FWMC::PEMOD::ChipErase, timeout, |efm| {
            efm.write_word(0, 0);
            efm.wait_done(timeout)
        })
    }

    /// Allows program and erase only inside `start..=end`.
    pub fn set_window_protect(&mut self, start: u32, end: u32) -> Result<()> {
        if start > end || end >= self.size {
            return Err(Error::InvalidParameter);
        }
        self.efm.fpmtsw.set(start);
        self.efm.fpmtew.set(end);
        Ok(())
    }

    pub fn flag(&self, flag: Flag) -> bool {
        self.efm.fsr.is_set(fsr_field(flag))
    }

    /// The ready flag reflects the array state and cannot be cleared.
    pub fn clear_flag(&mut self, flag: Flag) {
        if flag != Flag::Ready {
            self.efm.fsclr.write(fsr_field(flag).val(1));
        }
    }

    pub fn listen(&mut self, event: Event) {
        self.efm.fite.modify(fite_field(event).val(1));
    }

    pub fn unlisten(&mut self, event: Event) {
        self.efm.fite.modify(fite_field(event).val(0));
    }

    pub fn unique_id(&self) -> [u32; 3] {
        [
            self.efm.uqid[0].get(),
            self.efm.uqid[1].get(),
            self.efm.uqid[2].get(),
        ]
    }

    fn check_word(&self, offset: u32, words: u32) -> Result<()> {
        if offset & 0x3 != 0 {
            return Err(Error::AddressAlignment);
        }
        match words.checked_mul(4).and_then(|len| offset.checked_add(len)) {
            Some(end) if end <= self.size => Ok(()),
            _ => Err(Error::InvalidParameter),
        }
    }

    /// Runs `op` in program/erase mode `mode`, then drops back to read only.
    fn operation(
        &mut self,
        mode: tock_registers::fields::FieldValue<u32, FWMC::Register>,
        timeout: u32,
        op: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<()> {
        if !self.is_unlocked() {
            return Err(Error::Protected);
        }
        poll(timeout, || self.efm.fsr.is_set(FSR::RDY))?;
        self.efm.fsclr.set(0x3F);
        self.efm.fwmc.modify(mode);

        let result = op(self).and_then(|()| {
            if self.efm.fsr.is_set(FSR::PEPRTERR) {
                Err(Error::Protected)
            } else if self.efm.fsr.is_set(FSR::PEWERR) || self.efm.fsr.is_set(FSR::PGSZERR) {
                Err(Error::InvalidMode)
            } else {
                Ok(())
            }
        });

        self.efm.fwmc.modify(FWMC::PEMOD::ReadOnly);
        self.efm.fsclr.set(0x3F);
        #[cfg(feature = "defmt")]
        if let Err(e) = result {
            defmt::warn!("efm: operation failed: {}", e);
        }
        result
    }

    fn wait_done(&self, timeout: u32) -> Result<()> {
        poll(timeout, || self.efm.fsr.is_set(FSR::OPTEND))?;
        self.efm.fsclr.write(FSR::OPTEND::SET);
        Ok(())
    }

    fn write_word(&mut self, offset: u32, data: u32) {
        // in range and aligned, checked by the caller
        unsafe { core::ptr::write_volatile((self.base + offset as usize) as *mut u32, data) }
    }

    fn read_word(&self, offset: u32) -> u32 {
        unsafe { core::ptr::read_volatile((self.base + offset as usize) as *const u32) }
    }
}

fn fsr_field(flag: Flag) -> tock_registers::fields::Field<u32, FSR::Register> {
    match flag {
        Flag::ProgramEraseError => FSR::PEWERR,
        Flag::ProtectionError => FSR::PEPRTERR,
        Flag::ProgramSizeError => FSR::PGSZERR,
        Flag::ProgramMismatch => FSR::PGMISMTCH,
        Flag::OperationEnd => FSR::OPTEND,
        Flag::ReadCollision => FSR::COLERR,
        Flag::Ready => FSR::RDY,
    }
}

fn fite_field(event: Event) -> tock_registers::fields::Field<u32, FITE::Register> {
    match event {
        Event::ProgramEraseError => FITE::PEERRITE,
        Event::OperationEnd => FITE::OPTENDITE,
        Event::ReadCollision => FITE::COLERRITE,
    }
}

impl NorFlashError for Error {
    fn kind(&self) -> NorFlashErrorKind {
        match self {
            Error::AddressAlignment => NorFlashErrorKind::NotAligned,
            Error::InvalidParameter => NorFlashErrorKind::OutOfBounds,
            _ => NorFlashErrorKind::Other,
        }
    }
}

impl ErrorType for Efm {
    type Error = Error;
}

impl ReadNorFlash for Efm {
    const READ_SIZE: usize = 1;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<()> {
        match offset.checked_add(bytes.len() as u32) {
            Some(end) if end <= self.size => {}
            _ => return Err(Error::InvalidParameter),
        }
        for (i, byte) in bytes.iter_mut().enumerate() {
            let addr = self.base + offset as usize + i;
            *byte = unsafe { core::ptr::read_volatile(addr as *const u8) };
        }
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.size as usize
    }
}

impl NorFlash for Efm {
    const WRITE_SIZE: usize = 4;
    const ERASE_SIZE: usize = SECTOR_SIZE as usize;

    fn erase(&mut self, from: u32, to: u32) -> Result<()> {
        if from % SECTOR_SIZE != 0 || to % SECTOR_SIZE != 0 {
            return Err(Error::AddressAlignment);
        }
        if from > to || to > self.size {
            return Err(Error::InvalidParameter);
        }
        for sector in (from..to).step_by(SECTOR_SIZE as usize) {
            self.erase_sector(sector, self.timeout)?;
        }
        Ok(())
    }

    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<()> {
        if bytes.len() % 4 != 0 {
            return Err(Error::AddressAlignment);
        }
        self.check_word(offset, (bytes.len() / 4) as u32)?;
        for (i, chunk) in bytes.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            self.program_word(offset + 4 * i as u32, word, self.timeout)?;
        }
        Ok(())
    }
}
