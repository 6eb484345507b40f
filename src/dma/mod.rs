//! Direct Memory Access
//!
//! Abstraction layer for configuring and using the DMA controller to move data
//! without intervention from the CPU core.
//! The HC32M120 has 4 independent channels. Each channel moves one block per
//! trigger event and stops after a programmed number of blocks, or reloads its
//! whole configuration from a linked list of descriptors in memory (see
//! [`llp`]).
//!
//! ```ignore
//! let dma = Dma::new(dp.DMA);
//! let mut channels = dma.split();
//! channels.ch0.init(&ChannelConfig {
//!     src_addr: src.as_ptr() as u32,
//!     dst_addr: dst.as_mut_ptr() as u32,
//!     block_size: 16,
//!     transfer_count: 1,
//!     width: TransferWidth::Bits32,
//!     ..Default::default()
//! })?;
//! channels.ch0.set_trigger(&mut aos, EventSource::Software)?;
//! channels.ch0.enable();
//! aos.software_trigger();
//! ```
use crate::aos::EventSource;
use crate::error::{Error, Result};
use crate::pac::{self, dma::*, Readable, Shared, Writeable};
use crate::typelevel::Sealed;
use core::marker::PhantomData;
use embedded_dma::{ReadBuffer, WriteBuffer};
use tock_registers::LocalRegisterCopy;

pub mod llp;
pub mod single_buffer;
pub mod single_channel;

pub use llp::{link_chain, LlpDescriptor};
pub use single_channel::SingleChannel;

/// Largest block the controller moves per request.
pub const MAX_BLOCK_SIZE: u16 = 1024;

/// Largest repeat area.
pub const MAX_REPEAT_SIZE: u16 = 1024;

/// DMA unit.
pub trait DMAExt: Sealed {
    /// Splits the DMA unit into its individual channels.
    fn split(self) -> Channels;
}

pub struct Dma {
    dma: pac::DMA,
}

impl Dma {
    /// Enable the DMA engine and construct a new instance
    pub fn new(dma: pac::DMA) -> Self {
        dma.en.write(EN::EN::SET);
        Self { dma }
    }

    /// Disable the DMA engine and free the underlying object
    pub fn free(self) -> pac::DMA {
        self.dma.chen.set(0);
        self.dma.en.write(EN::EN::CLEAR);
        self.dma
    }

    /// True while any channel is moving data.
    pub fn is_busy(&self) -> bool {
        self.dma.chstat.is_set(CHSTAT::DMAACT)
    }
}

impl Sealed for Dma {}

/// DMA channel.
pub struct Channel<CH: ChannelIndex> {
    dma: Shared<RegisterBlock>,
    _phantom: PhantomData<CH>,
}

/// DMA channel identifier.
pub trait ChannelIndex: Sealed {
    /// Numerical index of the DMA channel (0..3).
    fn id() -> u8;
}

macro_rules! channels {
    (
        $($CHX:ident: ($chX:ident, $x:expr),)+
    ) => {
        impl DMAExt for Dma {
            fn split(self) -> Channels {
                let dma = self.dma.share();
                Channels {
                    $(
                        $chX: Channel {
                            dma,
                            _phantom: PhantomData,
                        },
                    )+
                }
            }
        }

        /// Set of DMA channels.
        pub struct Channels {
            $(
                /// DMA channel.
                pub $chX: Channel<$CHX>,
            )+
        }
        $(
            /// DMA channel identifier.
            pub struct $CHX;
            impl ChannelIndex for $CHX {
                fn id() -> u8 {
                    $x
                }
            }

            impl Sealed for $CHX {}
        )+
    }
}

channels! {
    CH0: (ch0, 0),
    CH1: (ch1, 1),
    CH2: (ch2, 2),
    CH3: (ch3, 3),
}

/// The number of bits moved per data unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferWidth {
    #[default]
    Bits8,
    Bits16,
    Bits32,
}

impl TransferWidth {
    /// Width matching a word type of 1, 2 or 4 bytes.
    pub fn of<WORD>() -> Result<Self> {
        match core::mem::size_of::<WORD>() {
            1 => Ok(TransferWidth::Bits8),
            2 => Ok(TransferWidth::Bits16),
            4 => Ok(TransferWidth::Bits32),
            _ => Err(Error::InvalidParameter),
        }
    }

    pub const fn bytes(self) -> u32 {
        match self {
            TransferWidth::Bits8 => 1,
            TransferWidth::Bits16 => 2,
            TransferWidth::Bits32 => 4,
        }
    }
}

/// How an address moves after each data unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressMode {
    #[default]
    Fixed,
    Increment,
    Decrement,
}

/// When the next descriptor of a linked list runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LlpMode {
    /// Load the descriptor and wait for the next trigger.
    #[default]
    WaitRequest,
    /// Load the descriptor and start it immediately.
    RunImmediately,
}

/// Linked list continuation of a channel configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Llp {
    /// Address of the next descriptor, word aligned.
    pub addr: u32,
    pub mode: LlpMode,
}

/// Channel events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// All blocks transferred
    TransferComplete,
    /// One block transferred
    BlockComplete,
    /// Bus error during a transfer
    TransferError,
    /// Trigger arrived while the channel was still busy
    RequestError,
}

/// Configuration of one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub src_addr: u32,
    pub dst_addr: u32,
    /// Data units per block, 1..=1024.
    pub block_size: u16,
    /// Blocks per transfer, 0 runs until the channel is disabled.
    pub transfer_count: u16,
    pub width: TransferWidth,
    pub src_mode: AddressMode,
    pub dst_mode: AddressMode,
    /// Reload the source address every n data units.
    pub src_repeat: Option<u16>,
    /// Reload the destination address every n data units.
    pub dst_repeat: Option<u16>,
    pub llp: Option<Llp>,
    /// Route this channel's events to the interrupt controller.
    pub interrupt: bool,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        ChannelConfig {
            src_addr: 0,
            dst_addr: 0,
            block_size: 1,
            transfer_count: 1,
            width: TransferWidth::Bits8,
            src_mode: AddressMode::Fixed,
            dst_mode: AddressMode::Fixed,
            src_repeat: None,
            dst_repeat: None,
            llp: None,
            interrupt: false,
        }
    }
}

pub(crate) fn block_size_bits(block_size: u16) -> Result<u32> {
    match block_size {
        // 1024 is encoded as 0
        1..=MAX_BLOCK_SIZE => Ok(block_size as u32 & 0x3FF),
        _ => Err(Error::InvalidParameter),
    }
}

pub(crate) fn repeat_bits(repeat: Option<u16>) -> Result<(bool, u32)> {
    match repeat {
        None => Ok((false, 0)),
        Some(n @ 1..=MAX_REPEAT_SIZE) => Ok((true, n as u32 & 0x3FF)),
        Some(_) => Err(Error::InvalidParameter),
    }
}

pub(crate) fn llp_bits(addr: u32) -> Result<u32> {
    if addr & 0x3 != 0 {
        return Err(Error::AddressAlignment);
    }
    Ok(addr)
}

impl ChannelConfig {
    /// Packs the configuration into the SAR, DAR, DTCTL, RPT, LLP and CHCTL
    /// words, in register order.
    pub fn words(&self) -> Result<[u32; 6]> {
        let mut dtctl = LocalRegisterCopy::<u32, DTCTL::Register>::new(0);
        dtctl.modify(
            DTCTL::BLKSIZE.val(block_size_bits(self.block_size)?)
                + DTCTL::CNT.val(self.transfer_count as u32),
        );

        let (srpten, srpt) = repeat_bits(self.src_repeat)?;
        let (drpten, drpt) = repeat_bits(self.dst_repeat)?;
        let mut rpt = LocalRegisterCopy::<u32, RPT::Register>::new(0);
        rpt.modify(RPT::SRPT.val(srpt) + RPT::DRPT.val(drpt));

        let mut chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(0);
        chctl.modify(
            sinc(self.src_mode)
                + dinc(self.dst_mode)
                + hsize(self.width)
                + CHCTL::SRPTEN.val(srpten as u32)
                + CHCTL::DRPTEN.val(drpten as u32)
                + CHCTL::IE.val(self.interrupt as u32),
        );

        let llp = match self.llp {
            Some(llp) => {
                chctl.modify(
                    CHCTL::LLPEN::SET
                        + CHCTL::LLPRUN.val((llp.mode == LlpMode::RunImmediately) as u32),
                );
                llp_bits(llp.addr)?
            }
            None => 0,
        };

        Ok([
            self.src_addr,
            self.dst_addr,
            dtctl.get(),
            rpt.get(),
            llp,
            chctl.get(),
        ])
    }
}

fn sinc(mode: AddressMode) -> tock_registers::fields::FieldValue<u32, CHCTL::Register> {
    match mode {
        AddressMode::Fixed => CHCTL::SINC::Fixed,
        AddressMode::Increment => CHCTL::SINC::Increment,
        AddressMode::Decrement => CHCTL::SINC::Decrement,
    }
}

fn dinc(mode: AddressMode) -> tock_registers::fields::FieldValue<u32, CHCTL::Register> {
    match mode {
        AddressMode::Fixed => CHCTL::DINC::Fixed,
        AddressMode::Increment => CHCTL::DINC::Increment,
        AddressMode::Decrement => CHCTL::DINC::Decrement,
    }
}

fn hsize(width: TransferWidth) -> tock_registers::fields::FieldValue<u32, CHCTL::Register> {
    match width {
        TransferWidth::Bits8 => CHCTL::HSIZE::Bits8,
        TransferWidth::Bits16 => CHCTL::HSIZE::Bits16,
        TransferWidth::Bits32 => CHCTL::HSIZE::Bits32,
    }
}

/// Trait which is implemented by anything that can be read via DMA.
pub trait ReadTarget {
    /// Type which is transferred in a single DMA transfer.
    type ReceivedWord;

    /// Returns the event that paces reads from this source (`None` for memory buffers).
    fn rx_treq() -> Option<EventSource>;

    /// Returns the address and the maximum number of words that can be transferred from this data
    /// source in a single DMA operation.
    ///
    /// For peripherals, the count should likely be u32::MAX.
    fn rx_address_count(&self) -> (u32, u32);

    /// Returns whether the address shall be incremented after each transfer.
    fn rx_increment(&self) -> bool;
}

impl<B: ReadBuffer> ReadTarget for B {
    type ReceivedWord = <B as ReadBuffer>::Word;

    fn rx_treq() -> Option<EventSource> {
        None
    }

    fn rx_address_count(&self) -> (u32, u32) {
        let (ptr, len) = unsafe { self.read_buffer() };
        (ptr as u32, len as u32)
    }

    fn rx_increment(&self) -> bool {
        true
    }
}

/// Trait which is implemented by anything that can be written via DMA.
pub trait WriteTarget {
    /// Type which is transferred in a single DMA transfer.
    type TransmittedWord;

    /// Returns the event that paces writes to this sink (`None` for memory buffers).
    fn tx_treq() -> Option<EventSource>;

    /// Returns the address and the maximum number of words that can be transferred from this data
    /// source in a single DMA operation.
    ///
    /// See `ReadTarget::rx_address_count` for a complete description of the semantics of this
    /// function.
    fn tx_address_count(&mut self) -> (u32, u32);

    /// Returns whether the address shall be incremented after each transfer.
    fn tx_increment(&self) -> bool;
}

impl<B: WriteBuffer> WriteTarget for B {
    type TransmittedWord = <B as WriteBuffer>::Word;

    fn tx_treq() -> Option<EventSource> {
        None
    }

    fn tx_address_count(&mut self) -> (u32, u32) {
        let (ptr, len) = unsafe { self.write_buffer() };
        (ptr as u32, len as u32)
    }

    fn tx_increment(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pac::testing;

    #[test]
    fn new_enables_and_free_disables() {
        let (regs, rb) = testing::block::<RegisterBlock>();
        let dma = Dma::new(regs);
        assert!(rb.en.is_set(EN::EN));
        rb.chen.set(0b0101);
        dma.free();
        assert!(!rb.en.is_set(EN::EN));
        assert_eq!(rb.chen.get(), 0);
    }

    #[test]
    fn config_words_pack_fields() {
        let cfg = ChannelConfig {
            src_addr: 0x2000_0000,
            dst_addr: 0x4001_C000,
            block_size: 1024,
            transfer_count: 3,
            width: TransferWidth::Bits16,
            src_mode: AddressMode::Increment,
            dst_mode: AddressMode::Fixed,
            src_repeat: Some(8),
            dst_repeat: None,
            llp: Some(Llp {
                addr: 0x2000_0100,
                mode: LlpMode::RunImmediately,
            }),
            interrupt: true,
        };
        let [sar, dar, dtctl, rpt, llp, chctl] = cfg.words().unwrap();
        assert_eq!(sar, 0x2000_0000);
        assert_eq!(dar, 0x4001_C000);
        // block size 1024 wraps to 0
        assert_eq!(dtctl, 3 << 16);
        assert_eq!(rpt, 8);
        assert_eq!(llp, 0x2000_0100);

        let chctl = LocalRegisterCopy::<u32, CHCTL::Register>::new(chctl);
        assert_eq!(chctl.read(CHCTL::SINC), 1);
        assert_eq!(chctl.read(CHCTL::DINC), 0);
        assert_eq!(chctl.read(CHCTL::HSIZE), 1);
        assert!(chctl.is_set(CHCTL::SRPTEN));
        assert!(!chctl.is_set(CHCTL::DRPTEN));
        assert!(chctl.is_set(CHCTL::LLPEN));
        assert!(chctl.is_set(CHCTL::LLPRUN));
        assert!(chctl.is_set(CHCTL::IE));
    }

    #[test]
    fn config_words_reject_out_of_range_fields() {
        let bad_block = ChannelConfig {
            block_size: 0,
            ..Default::default()
        };
        assert_eq!(bad_block.words(), Err(Error::InvalidParameter));

        let bad_repeat = ChannelConfig {
            dst_repeat: Some(1025),
            ..Default::default()
        };
        assert_eq!(bad_repeat.words(), Err(Error::InvalidParameter));

        let bad_llp = ChannelConfig {
            llp: Some(Llp {
                addr: 0x2000_0102,
                mode: LlpMode::WaitRequest,
            }),
            ..Default::default()
        };
        assert_eq!(bad_llp.words(), Err(Error::AddressAlignment));
    }

    #[test]
    fn width_of_word_types() {
        assert_eq!(TransferWidth::of::<u8>(), Ok(TransferWidth::Bits8));
        assert_eq!(TransferWidth::of::<u16>(), Ok(TransferWidth::Bits16));
        assert_eq!(TransferWidth::of::<u32>(), Ok(TransferWidth::Bits32));
        assert_eq!(TransferWidth::of::<u64>(), Err(Error::InvalidParameter));
    }
}
