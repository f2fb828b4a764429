//! I2C register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

register_structs! {
    pub I2cRegisters {
        (0x000 => pub ctrl0: ReadWrite<u32, CTRL0::Register>),
        (0x004 => pub cmd: WriteOnly<u32, CMD::Register>),
        (0x008 => pub addr_start: WriteOnly<u32, ADDR_START::Register>),
        (0x00c => pub data: ReadWrite<u32>),
        (0x010 => pub status: ReadOnly<u32, STATUS::Register>),
        (0x014 => @END),
    }
}

register_bitfields![u32,
    pub CTRL0 [
        ENABLE OFFSET(0) NUMBITS(1) [],
        SLAVE_ENABLE OFFSET(1) NUMBITS(1) [],
        INT_ENABLE OFFSET(2) NUMBITS(1) [],
        SLAVE_ADDRESS OFFSET(8) NUMBITS(7) [],
        /// Bus clock is the interface clock divided by 2^(PRESCALE + 1).
        PRESCALE OFFSET(16) NUMBITS(6) [],
    ],
    /// Command strobes. Writing a set bit issues the bus action.
    pub CMD [
        ACK OFFSET(0) NUMBITS(1) [],
        NACK OFFSET(1) NUMBITS(1) [],
        STOP OFFSET(2) NUMBITS(1) [],
        LAST_DATA OFFSET(3) NUMBITS(1) [],
        RESET OFFSET(4) NUMBITS(1) [],
    ],
    /// Writing this register issues a start condition carrying the address
    /// byte.
    pub ADDR_START [
        DIRECTION OFFSET(0) NUMBITS(1) [
            Write = 0,
            Read = 1,
        ],
        ADDRESS OFFSET(1) NUMBITS(7) [],
    ],
    pub STATUS [
        ACK_RECEIVED OFFSET(0) NUMBITS(1) [],
        /// The interface wants the next data byte written (transmit) or has
        /// one to be read (receive).
        DATA_REQUEST OFFSET(1) NUMBITS(1) [],
        DIRECTION OFFSET(2) NUMBITS(1) [
            Write = 0,
            Read = 1,
        ],
        BUS_ERROR OFFSET(3) NUMBITS(1) [],
        ERROR OFFSET(4) NUMBITS(1) [],
        STOP_DETECT OFFSET(5) NUMBITS(1) [],
        BUSY OFFSET(6) NUMBITS(1) [],
        /// Slave mode: the interface was addressed; DIRECTION gives the
        /// transfer direction the master requested.
        ADDRESSED OFFSET(7) NUMBITS(1) [],
    ],
];
