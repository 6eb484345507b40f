//! Event routing (AOS) and event port registers

use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

/// Number of event ports.
pub const EVENT_PORTS: usize = 2;

register_structs! {
    pub RegisterBlock {
        /// Software event trigger
        (0x00 => pub intsfttrg: ReadWrite<u32, INTSFTTRG::Register>),
        (0x04 => pub dma_trgsel: [ReadWrite<u32, TRGSEL::Register>; 4]),
        (0x14 => pub pevnttrgsr: [ReadWrite<u32, TRGSEL::Register>; EVENT_PORTS]),
        (0x1C => pub adc_trgsel: [ReadWrite<u32, TRGSEL::Register>; 2]),
        /// Hardware trigger sources shared by TIMER2, TIMER4 and TIMERA
        (0x24 => pub tmr_htssr: [ReadWrite<u32, TRGSEL::Register>; 2]),
        (0x2C => _reserved0),
        (0x100 => pub port: [EventPortRegisters; EVENT_PORTS]),
        (0x140 => @END),
    }
}

register_structs! {
    pub EventPortRegisters {
        /// Direction, 1 = output
        (0x00 => pub dir: ReadWrite<u32>),
        /// Input data latched on event
        (0x04 => pub idr: ReadWrite<u32>),
        /// Output data
        (0x08 => pub odr: ReadWrite<u32>),
        /// Pins reset on event
        (0x0C => pub orr: ReadWrite<u32>),
        /// Pins set on event
        (0x10 => pub osr: ReadWrite<u32>),
        /// Rising edge detect enable
        (0x14 => pub ris: ReadWrite<u32>),
        /// Falling edge detect enable
        (0x18 => pub fal: ReadWrite<u32>),
        (0x1C => pub nfcr: ReadWrite<u32, NFCR::Register>),
        (0x20 => @END),
    }
}

register_bitfields![u32,
    pub INTSFTTRG [
        STRG OFFSET(0) NUMBITS(1) []
    ],
    pub TRGSEL [
        TRGSEL OFFSET(0) NUMBITS(9) []
    ],
    pub NFCR [
        NFEN OFFSET(0) NUMBITS(1) [],
        DIVS OFFSET(1) NUMBITS(2) [
            Pclk = 0,
            PclkDiv8 = 1,
            PclkDiv32 = 2,
            PclkDiv64 = 3
        ]
    ]
];
