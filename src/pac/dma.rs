//! DMA controller registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Number of DMA channels.
pub const CHANNELS: usize = 4;

register_structs! {
    pub RegisterBlock {
        (0x00 => pub en: ReadWrite<u32, EN::Register>),
        /// Transfer and request error status
        (0x04 => pub intstat0: ReadWrite<u32, INT0::Register>),
        /// Transfer and block complete status
        (0x08 => pub intstat1: ReadWrite<u32, INT1::Register>),
        (0x0C => pub intmask0: ReadWrite<u32, INT0::Register>),
        (0x10 => pub intmask1: ReadWrite<u32, INT1::Register>),
        (0x14 => pub intclr0: ReadWrite<u32, INT0::Register>),
        (0x18 => pub intclr1: ReadWrite<u32, INT1::Register>),
        (0x1C => pub chen: ReadWrite<u32>),
        (0x20 => pub chstat: ReadWrite<u32, CHSTAT::Register>),
        (0x24 => _reserved0),
        (0x40 => pub ch: [ChannelRegisters; CHANNELS]),
        (0x140 => @END),
    }
}

register_structs! {
    /// Per-channel registers. The first six words share their layout with
    /// [`crate::dma::LlpDescriptor`].
    pub ChannelRegisters {
        (0x00 => pub sar: ReadWrite<u32>),
        (0x04 => pub dar: ReadWrite<u32>),
        (0x08 => pub dtctl: ReadWrite<u32, DTCTL::Register>),
        (0x0C => pub rpt: ReadWrite<u32, RPT::Register>),
        (0x10 => pub llp: ReadWrite<u32, LLP::Register>),
        (0x14 => pub chctl: ReadWrite<u32, CHCTL::Register>),
        (0x18 => _reserved0),
        (0x40 => @END),
    }
}

register_bitfields![u32,
    pub EN [
        EN OFFSET(0) NUMBITS(1) []
    ],
    pub INT0 [
        TRNERR OFFSET(0) NUMBITS(4) [],
        REQERR OFFSET(16) NUMBITS(4) []
    ],
    pub INT1 [
        TC OFFSET(0) NUMBITS(4) [],
        BTC OFFSET(16) NUMBITS(4) []
    ],
    pub CHSTAT [
        DMAACT OFFSET(0) NUMBITS(1) [],
        CHACT OFFSET(16) NUMBITS(4) []
    ],
    pub DTCTL [
        /// Block size, 0 means 1024.
        BLKSIZE OFFSET(0) NUMBITS(10) [],
        /// Transfer count, 0 means unlimited.
        CNT OFFSET(16) NUMBITS(16) []
    ],
    pub RPT [
        SRPT OFFSET(0) NUMBITS(10) [],
        DRPT OFFSET(16) NUMBITS(10) []
    ],
    pub LLP [
        LLP OFFSET(2) NUMBITS(30) []
    ],
    pub CHCTL [
        SINC OFFSET(0) NUMBITS(2) [
            Fixed = 0,
            Increment = 1,
            Decrement = 2
        ],
        DINC OFFSET(2) NUMBITS(2) [
            Fixed = 0,
            Increment = 1,
            Decrement = 2
        ],
        SRPTEN OFFSET(4) NUMBITS(1) [],
        DRPTEN OFFSET(5) NUMBITS(1) [],
        HSIZE OFFSET(8) NUMBITS(2) [
            Bits8 = 0,
            Bits16 = 1,
            Bits32 = 2
        ],
        LLPEN OFFSET(10) NUMBITS(1) [],
        /// 1: load the next descriptor and run at once, 0: wait for the next request.
        LLPRUN OFFSET(11) NUMBITS(1) [],
        IE OFFSET(12) NUMBITS(1) []
    ]
];
