//! Emergency brake registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        /// Control, writable once after reset
        (0x00 => pub ctl: ReadWrite<u32, CTL::Register>),
        /// Same-phase detect level
        (0x04 => pub pwmlv: ReadWrite<u32, PWMLV::Register>),
        /// Software output stop
        (0x08 => pub soe: ReadWrite<u32, SOE::Register>),
        (0x0C => pub stat: ReadWrite<u32, STAT::Register>),
        (0x10 => pub statclr: ReadWrite<u32, STATCLR::Register>),
        (0x14 => pub inten: ReadWrite<u32, INTEN::Register>),
        (0x18 => @END),
    }
}

register_bitfields![u32,
    pub CTL [
        PORTINEN OFFSET(0) NUMBITS(1) [],
        CMPEN1 OFFSET(1) NUMBITS(1) [],
        CMPEN2 OFFSET(2) NUMBITS(1) [],
        OSCSTPEN OFFSET(5) NUMBITS(1) [],
        PWMSEN0 OFFSET(6) NUMBITS(1) [],
        PWMSEN1 OFFSET(7) NUMBITS(1) [],
        PWMSEN2 OFFSET(8) NUMBITS(1) [],
        NFSEL OFFSET(28) NUMBITS(2) [
            Pclk = 0,
            PclkDiv8 = 1,
            PclkDiv32 = 2,
            PclkDiv128 = 3
        ],
        NFEN OFFSET(30) NUMBITS(1) [],
        INVSEL OFFSET(31) NUMBITS(1) []
    ],
    pub PWMLV [
        PWMLV0 OFFSET(0) NUMBITS(1) [],
        PWMLV1 OFFSET(1) NUMBITS(1) [],
        PWMLV2 OFFSET(2) NUMBITS(1) []
    ],
    pub SOE [
        SOE OFFSET(0) NUMBITS(1) []
    ],
    pub STAT [
        PORTINF OFFSET(0) NUMBITS(1) [],
        PWMSF OFFSET(1) NUMBITS(1) [],
        CMPF OFFSET(2) NUMBITS(1) [],
        OSF OFFSET(3) NUMBITS(1) [],
        PORTINST OFFSET(4) NUMBITS(1) [],
        PWMST OFFSET(5) NUMBITS(1) []
    ],
    pub STATCLR [
        PORTINFCLR OFFSET(0) NUMBITS(1) [],
        PWMSFCLR OFFSET(1) NUMBITS(1) [],
        CMPFCLR OFFSET(2) NUMBITS(1) [],
        OSFCLR OFFSET(3) NUMBITS(1) []
    ],
    pub INTEN [
        PORTININTEN OFFSET(0) NUMBITS(1) [],
        PWMSINTEN OFFSET(1) NUMBITS(1) [],
        CMPINTEN OFFSET(2) NUMBITS(1) [],
        OSINTEN OFFSET(3) NUMBITS(1) []
    ]
];
