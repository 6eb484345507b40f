//! TIMER2 registers
//!
//! Channel A lives in the low half-word of each shared register, channel B in
//! the high half-word.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        (0x00 => pub cntar: ReadWrite<u32>),
        (0x04 => pub cntbr: ReadWrite<u32>),
        (0x08 => pub cmpar: ReadWrite<u32>),
        (0x0C => pub cmpbr: ReadWrite<u32>),
        /// Base control
        (0x10 => pub bconr: ReadWrite<u32, BCONR::Register>),
        /// Interrupt control
        (0x14 => pub iconr: ReadWrite<u32, ICONR::Register>),
        /// Port control
        (0x18 => pub pconr: ReadWrite<u32, PCONR::Register>),
        /// Hardware trigger control
        (0x1C => pub hconr: ReadWrite<u32, HCONR::Register>),
        (0x20 => pub stflr: ReadWrite<u32, ICONR::Register>),
        (0x24 => @END),
    }
}

register_bitfields![u32,
    pub BCONR [
        CSTA OFFSET(0) NUMBITS(1) [],
        CAPMDA OFFSET(1) NUMBITS(1) [],
        SYNSA OFFSET(3) NUMBITS(1) [],
        CKDIVA OFFSET(4) NUMBITS(4) [],
        SYNCLKA OFFSET(8) NUMBITS(2) [],
        ASYNCLKA OFFSET(10) NUMBITS(2) [],
        CKSELA OFFSET(12) NUMBITS(1) [],
        CSTB OFFSET(16) NUMBITS(1) [],
        CAPMDB OFFSET(17) NUMBITS(1) [],
        SYNSB OFFSET(19) NUMBITS(1) [],
        CKDIVB OFFSET(20) NUMBITS(4) [],
        SYNCLKB OFFSET(24) NUMBITS(2) [],
        ASYNCLKB OFFSET(26) NUMBITS(2) [],
        CKSELB OFFSET(28) NUMBITS(1) []
    ],
    /// Shared by the interrupt enable and the status flag register.
    pub ICONR [
        CMA OFFSET(0) NUMBITS(1) [],
        OVA OFFSET(1) NUMBITS(1) [],
        CMB OFFSET(16) NUMBITS(1) [],
        OVB OFFSET(17) NUMBITS(1) []
    ],
    pub PCONR [
        STACA OFFSET(0) NUMBITS(2) [],
        STPCA OFFSET(2) NUMBITS(2) [],
        CMPCA OFFSET(4) NUMBITS(2) [],
        OUTENA OFFSET(8) NUMBITS(1) [],
        NOFICKA OFFSET(12) NUMBITS(2) [],
        NOFIENA OFFSET(14) NUMBITS(1) [],
        STACB OFFSET(16) NUMBITS(2) [],
        STPCB OFFSET(18) NUMBITS(2) [],
        CMPCB OFFSET(20) NUMBITS(2) [],
        OUTENB OFFSET(24) NUMBITS(1) [],
        NOFICKB OFFSET(28) NUMBITS(2) [],
        NOFIENB OFFSET(30) NUMBITS(1) []
    ],
    pub HCONR [
        HSTAA OFFSET(0) NUMBITS(3) [],
        HSTPA OFFSET(4) NUMBITS(3) [],
        HCLEA OFFSET(8) NUMBITS(3) [],
        HICPA OFFSET(12) NUMBITS(3) [],
        HSTAB OFFSET(16) NUMBITS(3) [],
        HSTPB OFFSET(20) NUMBITS(3) [],
        HCLEB OFFSET(24) NUMBITS(3) [],
        HICPB OFFSET(28) NUMBITS(3) []
    ]
];
