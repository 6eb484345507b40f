//! Peripheral access
//!
//! Register blocks for the peripherals driven by this crate, described with
//! [`tock-registers`]. Each block lives at a fixed address in the HC32M120
//! memory map and is handed out once through [`Peripherals::take`].
//!
//! [`tock-registers`]: https://crates.io/crates/tock-registers

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::sync::atomic::{AtomicBool, Ordering};

pub mod adc;
pub mod aos;
pub mod cmp;
pub mod dma;
pub mod efm;
pub mod emb;
pub mod spi;
pub mod timer2;
pub mod timer4;
pub mod timera;

pub use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

/// Base addresses of the register blocks.
pub mod base {
    pub const EFM: usize = 0x4001_0400;
    pub const AOS: usize = 0x4001_0800;
    pub const TMRA: usize = 0x4001_5000;
    pub const TMR4: usize = 0x4001_7000;
    pub const EMB: usize = 0x4001_7C00;
    pub const SPI: usize = 0x4001_C000;
    pub const CMP1: usize = 0x4001_E000;
    pub const CMP2: usize = 0x4001_E010;
    pub const CMPDAC: usize = 0x4001_E100;
    pub const TMR2: usize = 0x4002_4800;
    pub const ADC: usize = 0x4004_0000;
    pub const DMA: usize = 0x4005_3000;
}

/// Owned handle to one register block.
pub struct Reg<RB: 'static> {
    rb: &'static RB,
    _marker: PhantomData<*const RB>,
}

// Register blocks are plain MMIO and the handle is move-only.
unsafe impl<RB: 'static> Send for Reg<RB> {}

impl<RB: 'static> Reg<RB> {
    /// Creates a handle to the register block at `addr`.
    ///
    /// # Safety
    ///
    /// `addr` must point at a register block of type `RB` and no other handle to
    /// the same block may be in use.
    pub unsafe fn new(addr: usize) -> Self {
        Self {
            rb: &*(addr as *const RB),
            _marker: PhantomData,
        }
    }

    /// Wraps a register block that already lives in `'static` memory.
    pub fn from_static(rb: &'static RB) -> Self {
        Self {
            rb,
            _marker: PhantomData,
        }
    }

    /// Address of the register block.
    pub fn ptr(&self) -> *const RB {
        self.rb as *const RB
    }

    /// Shares the block with sub-drivers split off this handle.
    pub(crate) fn share(&self) -> Shared<RB> {
        Shared(self.rb)
    }
}

impl<RB: 'static> Deref for Reg<RB> {
    type Target = RB;

    #[inline(always)]
    fn deref(&self) -> &RB {
        self.rb
    }
}

impl<RB: 'static> fmt::Debug for Reg<RB> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Reg({:p})", self.rb)
    }
}

/// Copyable view of a register block, held by the sub-drivers that each own
/// a disjoint set of its registers or fields.
pub struct Shared<RB: 'static>(&'static RB);

// Same reasoning as for `Reg`: the view is only created by `Reg::share`.
unsafe impl<RB: 'static> Send for Shared<RB> {}

impl<RB: 'static> Clone for Shared<RB> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<RB: 'static> Copy for Shared<RB> {}

impl<RB: 'static> Deref for Shared<RB> {
    type Target = RB;

    #[inline(always)]
    fn deref(&self) -> &RB {
        self.0
    }
}

pub type CMP1 = Reg<cmp::RegisterBlock>;
pub type CMP2 = Reg<cmp::RegisterBlock>;
pub type CMPDAC = Reg<cmp::DacRegisterBlock>;
pub type DMA = Reg<dma::RegisterBlock>;
pub type EFM = Reg<efm::RegisterBlock>;
pub type EMB = Reg<emb::RegisterBlock>;
pub type AOS = Reg<aos::RegisterBlock>;
pub type TMR2 = Reg<timer2::RegisterBlock>;
pub type TMR4 = Reg<timer4::RegisterBlock>;
pub type TMRA = Reg<timera::RegisterBlock>;
pub type ADC = Reg<adc::RegisterBlock>;
pub type SPI = Reg<spi::RegisterBlock>;

static TAKEN: AtomicBool = AtomicBool::new(false);

/// All peripherals driven by this crate.
#[allow(non_snake_case)]
pub struct Peripherals {
    pub CMP1: CMP1,
    pub CMP2: CMP2,
    pub CMPDAC: CMPDAC,
    pub DMA: DMA,
    pub EFM: EFM,
    pub EMB: EMB,
    pub AOS: AOS,
    pub TMR2: TMR2,
    pub TMR4: TMR4,
    pub TMRA: TMRA,
    pub ADC: ADC,
    pub SPI: SPI,
}

impl Peripherals {
    /// Returns all the peripherals *once*.
    pub fn take() -> Option<Self> {
        critical_section::with(|_| {
            if TAKEN.load(Ordering::Relaxed) {
                None
            } else {
                TAKEN.store(true, Ordering::Relaxed);
                Some(unsafe { Self::steal() })
            }
        })
    }

    /// Unchecked version of [`Peripherals::take`].
    ///
    /// # Safety
    ///
    /// Each returned handle aliases any other handle to the same block.
    pub unsafe fn steal() -> Self {
        Self {
            CMP1: Reg::new(base::CMP1),
            CMP2: Reg::new(base::CMP2),
            CMPDAC: Reg::new(base::CMPDAC),
            DMA: Reg::new(base::DMA),
            EFM: Reg::new(base::EFM),
            EMB: Reg::new(base::EMB),
            AOS: Reg::new(base::AOS),
            TMR2: Reg::new(base::TMR2),
            TMR4: Reg::new(base::TMR4),
            TMRA: Reg::new(base::TMRA),
            ADC: Reg::new(base::ADC),
            SPI: Reg::new(base::SPI),
        }
    }
}
