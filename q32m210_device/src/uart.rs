//! UART register block, shared by both interfaces.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite};

register_structs! {
    pub UartRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub speed_ctrl: ReadWrite<u32>),
        (0x008 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x00c => pub tx_data: ReadWrite<u32>),
        (0x010 => pub rx_data: ReadOnly<u32>),
        (0x014 => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        TX_INT_ENABLE OFFSET(1) NUMBITS(1) [],
        RX_INT_ENABLE OFFSET(2) NUMBITS(1) [],
        /// Extends the baud divider range by a fixed factor of 12.
        PRESCALE_ENABLE OFFSET(3) NUMBITS(1) [],
        TX_DMA_ENABLE OFFSET(4) NUMBITS(1) [],
        RX_DMA_ENABLE OFFSET(5) NUMBITS(1) [],
    ],
    pub STATUS [
        RX_READY OFFSET(0) NUMBITS(1) [],
        TX_BUSY OFFSET(1) NUMBITS(1) [],
        OVERRUN OFFSET(2) NUMBITS(1) [],
    ],
];
