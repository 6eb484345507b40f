//! TIMERA registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Number of compare/capture channels.
pub const CHANNELS: usize = 4;

register_structs! {
    pub RegisterBlock {
        (0x00 => pub cnter: ReadWrite<u32>),
        (0x04 => pub perar: ReadWrite<u32>),
        (0x08 => pub cmpar: [ReadWrite<u32>; CHANNELS]),
        (0x18 => _reserved0),
        (0x20 => pub bcstr: ReadWrite<u32, BCSTR::Register>),
        /// Hardware start/stop/clear conditions
        (0x24 => pub hconr: ReadWrite<u32, HCONR::Register>),
        /// Hardware count-up conditions
        (0x28 => pub hcupr: ReadWrite<u32>),
        /// Hardware count-down conditions
        (0x2C => pub hcdor: ReadWrite<u32>),
        (0x30 => pub iconr: ReadWrite<u32>),
        (0x34 => pub econr: ReadWrite<u32>),
        (0x38 => pub fconr: ReadWrite<u32, FCONR::Register>),
        (0x3C => pub stflr: ReadWrite<u32>),
        /// Compare buffer control for channel pairs 1/2 and 3/4
        (0x40 => pub bconr: [ReadWrite<u32, BCONR::Register>; 2]),
        (0x48 => _reserved1),
        (0x50 => pub cconr: [ReadWrite<u32, CCONR::Register>; CHANNELS]),
        (0x60 => pub pconr: [ReadWrite<u32, PCONR::Register>; CHANNELS]),
        (0x70 => @END),
    }
}

register_bitfields![u32,
    pub BCSTR [
        START OFFSET(0) NUMBITS(1) [],
        /// 1 = count up
        DIR OFFSET(1) NUMBITS(1) [],
        MODE OFFSET(2) NUMBITS(1) [
            Sawtooth = 0,
            Triangle = 1
        ],
        SYNST OFFSET(3) NUMBITS(1) [],
        CKDIV OFFSET(4) NUMBITS(4) [],
        OVSTP OFFSET(8) NUMBITS(1) [],
        ITENOVF OFFSET(12) NUMBITS(1) [],
        ITENUDF OFFSET(13) NUMBITS(1) [],
        OVFF OFFSET(14) NUMBITS(1) [],
        UDFF OFFSET(15) NUMBITS(1) []
    ],
    pub HCONR [
        HSTA OFFSET(0) NUMBITS(4) [],
        HSTP OFFSET(4) NUMBITS(4) [],
        HCLE OFFSET(8) NUMBITS(4) []
    ],
    pub FCONR [
        NOFIENTG OFFSET(0) NUMBITS(1) [],
        NOFICKTG OFFSET(1) NUMBITS(2) [],
        NOFIENCLK OFFSET(4) NUMBITS(1) [],
        NOFICKCLK OFFSET(5) NUMBITS(2) []
    ],
    pub BCONR [
        BEN OFFSET(0) NUMBITS(1) [],
        BSE0 OFFSET(1) NUMBITS(1) [],
        BSE1 OFFSET(2) NUMBITS(1) []
    ],
    pub CCONR [
        CAPMD OFFSET(0) NUMBITS(1) [],
        HICP OFFSET(4) NUMBITS(3) [],
        NOFIENCP OFFSET(12) NUMBITS(1) [],
        NOFICKCP OFFSET(13) NUMBITS(2) []
    ],
    pub PCONR [
        STAC OFFSET(0) NUMBITS(2) [],
        STPC OFFSET(2) NUMBITS(2) [],
        CMPC OFFSET(4) NUMBITS(2) [],
        PERC OFFSET(6) NUMBITS(2) [],
        FORC OFFSET(8) NUMBITS(2) [],
        OUTEN OFFSET(12) NUMBITS(1) []
    ]
];
