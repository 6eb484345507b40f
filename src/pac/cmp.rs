//! Voltage comparator registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    /// One comparator unit.
    pub RegisterBlock {
        /// Mode
        (0x00 => pub mdr: ReadWrite<u8, MDR::Register>),
        /// Filter and interrupt
        (0x01 => pub fir: ReadWrite<u8, FIR::Register>),
        /// Output control
        (0x02 => pub ocr: ReadWrite<u8, OCR::Register>),
        /// Input voltage select
        (0x03 => pub vsr: ReadWrite<u8, VSR::Register>),
        /// Timer window source enable
        (0x04 => pub twr1: ReadWrite<u8>),
        /// Timer window output level
        (0x05 => pub twr2: ReadWrite<u8>),
        (0x06 => _reserved0),
        (0x10 => @END),
    }
}

register_structs! {
    /// 8-bit reference DAC shared by both units.
    pub DacRegisterBlock {
        (0x00 => pub dadr: ReadWrite<u8>),
        (0x01 => _reserved0),
        (0x04 => pub dacr: ReadWrite<u8, DACR::Register>),
        (0x05 => _reserved1),
        (0x08 => pub rvadc: ReadWrite<u16, RVADC::Register>),
        (0x0A => _reserved2),
        (0x0C => @END),
    }
}

register_bitfields![u8,
    pub MDR [
        CENB OFFSET(0) NUMBITS(1) [],
        CWDE OFFSET(1) NUMBITS(1) [],
        /// Comparison result, read only.
        CMON OFFSET(7) NUMBITS(1) []
    ],
    pub FIR [
        FCKS OFFSET(0) NUMBITS(2) [
            None = 0,
            Pclk = 1,
            PclkDiv8 = 2,
            PclkDiv32 = 3
        ],
        EDGS OFFSET(4) NUMBITS(2) [
            None = 0,
            Rising = 1,
            Falling = 2,
            Both = 3
        ],
        CIEN OFFSET(6) NUMBITS(1) []
    ],
    pub OCR [
        COEN OFFSET(0) NUMBITS(1) [],
        COPS OFFSET(1) NUMBITS(1) [],
        CPOE OFFSET(2) NUMBITS(1) [],
        TWOE OFFSET(3) NUMBITS(1) [],
        TWOL OFFSET(4) NUMBITS(1) []
    ],
    pub VSR [
        CVSL OFFSET(0) NUMBITS(4) [],
        RVSL OFFSET(4) NUMBITS(4) []
    ],
    pub DACR [
        DAEN OFFSET(0) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    pub RVADC [
        DASW OFFSET(0) NUMBITS(1) [],
        VREFSW OFFSET(4) NUMBITS(1) [],
        WPRT OFFSET(8) NUMBITS(8) []
    ]
];

/// Key written to `RVADC.WPRT` to unlock the reference switch bits.
pub const RVADC_KEY: u16 = 0x55;
