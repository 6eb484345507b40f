//! ADC registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Number of analog input channels.
pub const CHANNELS: usize = 12;

register_structs! {
    pub RegisterBlock {
        (0x00 => pub str: ReadWrite<u32, STR::Register>),
        (0x04 => pub cr0: ReadWrite<u32, CR0::Register>),
        (0x08 => pub cr1: ReadWrite<u32, CR1::Register>),
        (0x0C => pub trgsr: ReadWrite<u32, TRGSR::Register>),
        (0x10 => pub chselra: ReadWrite<u32>),
        (0x14 => pub chselrb: ReadWrite<u32>),
        (0x18 => pub avchselr: ReadWrite<u32>),
        (0x1C => pub isr: ReadWrite<u32, ISR::Register>),
        (0x20 => pub icr: ReadWrite<u32, ISR::Register>),
        (0x24 => pub isclrr: ReadWrite<u32, ISR::Register>),
        (0x28 => _reserved0),
        (0x40 => pub sstr: [ReadWrite<u32>; CHANNELS]),
        (0x70 => _reserved1),
        (0x80 => pub dr: [ReadWrite<u32>; CHANNELS]),
        (0xB0 => @END),
    }
}

register_bitfields![u32,
    pub STR [
        STRT OFFSET(0) NUMBITS(1) []
    ],
    pub CR0 [
        MS OFFSET(0) NUMBITS(2) [
            SingleA = 0,
            ContinuousA = 1,
            SingleAB = 2,
            ContinuousASingleB = 3
        ],
        ACCSEL OFFSET(4) NUMBITS(2) [
            Bits12 = 0,
            Bits10 = 1,
            Bits8 = 2
        ],
        CLREN OFFSET(6) NUMBITS(1) [],
        DFMT OFFSET(7) NUMBITS(1) [],
        AVCNT OFFSET(8) NUMBITS(3) []
    ],
    pub CR1 [
        /// Sequence A restart position after being interrupted by B
        RSCHSEL OFFSET(2) NUMBITS(1) []
    ],
    pub TRGSR [
        TRGSELA OFFSET(0) NUMBITS(3) [],
        TRGENA OFFSET(7) NUMBITS(1) [],
        TRGSELB OFFSET(8) NUMBITS(3) [],
        TRGENB OFFSET(15) NUMBITS(1) []
    ],
    /// Shared by status, interrupt control and status clear.
    pub ISR [
        EOCA OFFSET(0) NUMBITS(1) [],
        EOCB OFFSET(1) NUMBITS(1) []
    ]
];
