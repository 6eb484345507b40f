//! TIMER4 registers
//!
//! Output compare (OCO), counter (CNT), PWM generator and special event
//! (SEVT) sub-blocks of one timer unit. Channel arrays are indexed
//! UH, UL, VH, VL, WH, WL; pair arrays U, V, W.

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    pub RegisterBlock {
        /// Compare values
        (0x00 => pub occr: [ReadWrite<u32>; 6]),
        /// Output control per channel pair
        (0x18 => pub ocsr: [ReadWrite<u32, OCSR::Register>; 3]),
        /// Buffer and link control per channel pair
        (0x24 => pub ocer: [ReadWrite<u32, OCER::Register>; 3]),
        /// Compare mode words, 16-bit for high channels and 32-bit for low channels
        (0x30 => pub ocmr: [ReadWrite<u32>; 6]),
        /// Period
        (0x48 => pub cpsr: ReadWrite<u32>),
        (0x4C => pub cntr: ReadWrite<u32>),
        (0x50 => pub ccsr: ReadWrite<u32, CCSR::Register>),
        /// Interrupt mask counters
        (0x54 => pub cvpr: ReadWrite<u32, CVPR::Register>),
        (0x58 => pub pocr: [ReadWrite<u32, POCR::Register>; 3]),
        /// Reload timer control
        (0x64 => pub rcsr: ReadWrite<u32, RCSR::Register>),
        /// Reload timer count
        (0x68 => pub pfsr: [ReadWrite<u32>; 3]),
        /// Dead time A (rising edge delay)
        (0x74 => pub pdar: [ReadWrite<u32>; 3]),
        /// Dead time B (falling edge delay)
        (0x80 => pub pdbr: [ReadWrite<u32>; 3]),
        (0x8C => pub sccr: [ReadWrite<u32>; 6]),
        (0xA4 => pub scsr: [ReadWrite<u32, SCSR::Register>; 6]),
        (0xBC => pub scmr: [ReadWrite<u32, SCMR::Register>; 6]),
        (0xD4 => @END),
    }
}

register_bitfields![u32,
    pub OCSR [
        OCEH OFFSET(0) NUMBITS(1) [],
        OCEL OFFSET(1) NUMBITS(1) [],
        OCPH OFFSET(2) NUMBITS(1) [],
        OCPL OFFSET(3) NUMBITS(1) [],
        OCIEH OFFSET(4) NUMBITS(1) [],
        OCIEL OFFSET(5) NUMBITS(1) [],
        OCFH OFFSET(6) NUMBITS(1) [],
        OCFL OFFSET(7) NUMBITS(1) []
    ],
    pub OCER [
        CHBUFEN OFFSET(0) NUMBITS(2) [],
        CLBUFEN OFFSET(2) NUMBITS(2) [],
        MHBUFEN OFFSET(4) NUMBITS(2) [],
        MLBUFEN OFFSET(6) NUMBITS(2) [],
        LMCH OFFSET(8) NUMBITS(1) [],
        LMCL OFFSET(9) NUMBITS(1) [],
        LMMH OFFSET(10) NUMBITS(1) [],
        LMML OFFSET(11) NUMBITS(1) [],
        MCECH OFFSET(12) NUMBITS(1) [],
        MCECL OFFSET(13) NUMBITS(1) []
    ],
    pub CCSR [
        CKDIV OFFSET(0) NUMBITS(4) [],
        CLEAR OFFSET(4) NUMBITS(1) [],
        MODE OFFSET(5) NUMBITS(1) [
            Sawtooth = 0,
            Triangle = 1
        ],
        STOP OFFSET(6) NUMBITS(1) [],
        BUFEN OFFSET(7) NUMBITS(1) [],
        IRQPEN OFFSET(8) NUMBITS(1) [],
        IRQPF OFFSET(9) NUMBITS(1) [],
        IRQZEN OFFSET(13) NUMBITS(1) [],
        IRQZF OFFSET(14) NUMBITS(1) [],
        ECKEN OFFSET(15) NUMBITS(1) []
    ],
    pub CVPR [
        ZIM OFFSET(0) NUMBITS(4) [],
        PIM OFFSET(4) NUMBITS(4) [],
        ZIC OFFSET(8) NUMBITS(4) [],
        PIC OFFSET(12) NUMBITS(4) []
    ],
    pub POCR [
        DIVCK OFFSET(0) NUMBITS(3) [],
        PWMMD OFFSET(4) NUMBITS(2) [
            Through = 0,
            DeadTimer = 1,
            DeadTimerFilter = 2
        ],
        LVLS OFFSET(6) NUMBITS(2) []
    ],
    pub RCSR [
        RTIDU OFFSET(0) NUMBITS(1) [],
        RTIDV OFFSET(1) NUMBITS(1) [],
        RTIDW OFFSET(2) NUMBITS(1) [],
        RTIFU OFFSET(4) NUMBITS(1) [],
        RTICU OFFSET(5) NUMBITS(1) [],
        RTEU OFFSET(6) NUMBITS(1) [],
        RTSU OFFSET(7) NUMBITS(1) [],
        RTIFV OFFSET(8) NUMBITS(1) [],
        RTICV OFFSET(9) NUMBITS(1) [],
        RTEV OFFSET(10) NUMBITS(1) [],
        RTSV OFFSET(11) NUMBITS(1) [],
        RTIFW OFFSET(12) NUMBITS(1) [],
        RTICW OFFSET(13) NUMBITS(1) [],
        RTEW OFFSET(14) NUMBITS(1) [],
        RTSW OFFSET(15) NUMBITS(1) []
    ],
    pub SCSR [
        BUFEN OFFSET(0) NUMBITS(2) [],
        EVTOS OFFSET(2) NUMBITS(3) [],
        LMC OFFSET(5) NUMBITS(1) [],
        EVTMS OFFSET(8) NUMBITS(1) [],
        EVTDS OFFSET(9) NUMBITS(1) [],
        DEN OFFSET(12) NUMBITS(1) [],
        PEN OFFSET(13) NUMBITS(1) [],
        UEN OFFSET(14) NUMBITS(1) [],
        ZEN OFFSET(15) NUMBITS(1) []
    ],
    pub SCMR [
        AMC OFFSET(0) NUMBITS(4) [],
        MZCE OFFSET(14) NUMBITS(1) [],
        MPCE OFFSET(15) NUMBITS(1) []
    ]
];
