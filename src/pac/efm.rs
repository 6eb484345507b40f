//! Embedded flash controller registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        /// Register access protection
        (0x00 => pub faprt: ReadWrite<u32, FAPRT::Register>),
        (0x04 => pub fstp: ReadWrite<u32, FSTP::Register>),
        /// Read mode
        (0x08 => pub frmc: ReadWrite<u32, FRMC::Register>),
        /// Program/erase mode
        (0x0C => pub fwmc: ReadWrite<u32, FWMC::Register>),
        (0x10 => pub fsr: ReadWrite<u32, FSR::Register>),
        (0x14 => pub fsclr: ReadWrite<u32, FSR::Register>),
        (0x18 => pub fite: ReadWrite<u32, FITE::Register>),
        (0x1C => _reserved0),
        /// Window protection start address
        (0x20 => pub fpmtsw: ReadWrite<u32>),
        /// Window protection end address
        (0x24 => pub fpmtew: ReadWrite<u32>),
        (0x28 => _reserved1),
        (0x50 => pub uqid: [ReadWrite<u32>; 3]),
        (0x5C => @END),
    }
}

register_bitfields![u32,
    pub FAPRT [
        /// Write 0x0123 then 0x3210 to unlock. Reads back 1 while unlocked.
        FAPRT OFFSET(0) NUMBITS(16) []
    ],
    pub FSTP [
        FSTP OFFSET(0) NUMBITS(1) []
    ],
    pub FRMC [
        FLWT OFFSET(0) NUMBITS(4) [],
        CACHE OFFSET(16) NUMBITS(1) [],
        CRST OFFSET(24) NUMBITS(1) []
    ],
    pub FWMC [
        PEMOD OFFSET(0) NUMBITS(3) [
            ReadOnly = 0,
            SingleProgram = 1,
            ProgramReadBack = 2,
            SequenceProgram = 3,
            SectorErase = 4,
            ChipErase = 5
        ],
        BUSHLDCTL OFFSET(8) NUMBITS(1) []
    ],
    pub FSR [
        PEWERR OFFSET(0) NUMBITS(1) [],
        PEPRTERR OFFSET(1) NUMBITS(1) [],
        PGSZERR OFFSET(2) NUMBITS(1) [],
        PGMISMTCH OFFSET(3) NUMBITS(1) [],
        OPTEND OFFSET(4) NUMBITS(1) [],
        COLERR OFFSET(5) NUMBITS(1) [],
        RDY OFFSET(8) NUMBITS(1) []
    ],
    pub FITE [
        PEERRITE OFFSET(0) NUMBITS(1) [],
        OPTENDITE OFFSET(1) NUMBITS(1) [],
        COLERRITE OFFSET(2) NUMBITS(1) []
    ]
];

pub const UNLOCK_KEY1: u32 = 0x0123;
pub const UNLOCK_KEY2: u32 = 0x3210;
