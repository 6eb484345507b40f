//! SPI registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x00 => pub dr: ReadWrite<u32>),
        (0x04 => pub cr1: ReadWrite<u32, CR1::Register>),
        (0x08 => _reserved0),
        (0x0C => pub cfg1: ReadWrite<u32, CFG1::Register>),
        (0x10 => _reserved1),
        (0x14 => pub sr: ReadWrite<u32, SR::Register>),
        (0x18 => pub cfg2: ReadWrite<u32, CFG2::Register>),
        (0x1C => @END),
    }
}

register_bitfields![u32,
    pub CR1 [
        /// Three-wire (clock synchronous) mode
        SPIMDS OFFSET(0) NUMBITS(1) [],
        /// Transmit only
        TXMDS OFFSET(1) NUMBITS(1) [],
        MSTR OFFSET(3) NUMBITS(1) [],
        SPLPBK OFFSET(4) NUMBITS(1) [],
        SPLPBK2 OFFSET(5) NUMBITS(1) [],
        SPE OFFSET(6) NUMBITS(1) [],
        EIE OFFSET(8) NUMBITS(1) [],
        TXIE OFFSET(9) NUMBITS(1) [],
        RXIE OFFSET(10) NUMBITS(1) [],
        IDIE OFFSET(11) NUMBITS(1) [],
        MODFE OFFSET(12) NUMBITS(1) [],
        PATE OFFSET(13) NUMBITS(1) [],
        PAOE OFFSET(14) NUMBITS(1) [],
        PAE OFFSET(15) NUMBITS(1) []
    ],
    pub CFG1 [
        SS0PV OFFSET(8) NUMBITS(1) []
    ],
    pub SR [
        OVRERF OFFSET(0) NUMBITS(1) [],
        IDLNF OFFSET(1) NUMBITS(1) [],
        MODFERF OFFSET(2) NUMBITS(1) [],
        PERF OFFSET(3) NUMBITS(1) [],
        UDRERF OFFSET(4) NUMBITS(1) [],
        TDEF OFFSET(5) NUMBITS(1) [],
        RDFF OFFSET(7) NUMBITS(1) []
    ],
    pub CFG2 [
        CPHA OFFSET(0) NUMBITS(1) [],
        CPOL OFFSET(1) NUMBITS(1) [],
        MBR OFFSET(2) NUMBITS(3) [],
        DSIZE OFFSET(8) NUMBITS(4) [],
        LSBF OFFSET(12) NUMBITS(1) []
    ]
];
