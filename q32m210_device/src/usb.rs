//! USB interface controller register block.
//!
//! Endpoint data moves through per-endpoint FIFO windows a byte at a time;
//! writing an OUT endpoint's byte-count register arms it for the next
//! transfer, and reading it returns the size of the last one.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};

register_structs! {
    pub UsbRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub sys_int_clear: WriteOnly<u32, SYS_INT::Register>),
        (0x008 => pub bulk_in_clear: WriteOnly<u32, BULK_IN::Register>),
        (0x00c => pub bulk_out_clear: WriteOnly<u32, BULK_OUT::Register>),
        (0x010 => pub setup_data0: ReadOnly<u32>),
        (0x014 => pub setup_data1: ReadOnly<u32>),
        (0x018 => pub ep0_in_byte_count: ReadWrite<u32>),
        (0x01c => pub ep0_out_byte_count: ReadWrite<u32>),
        (0x020 => pub ep2_in_byte_count: ReadWrite<u32>),
        (0x024 => pub ep3_in_byte_count: ReadWrite<u32>),
        (0x028 => pub ep4_out_byte_count: ReadWrite<u32>),
        (0x02c => pub ep5_out_byte_count: ReadWrite<u32>),
        (0x030 => pub ep_stall: ReadWrite<u32, EP_STALL::Register>),
        (0x034 => pub handshake_ctrl: WriteOnly<u32, HANDSHAKE_CTRL::Register>),
        (0x038 => pub ep0_fifo: ReadWrite<u32>),
        (0x03c => pub ep2_fifo: ReadWrite<u32>),
        (0x040 => pub ep3_fifo: ReadWrite<u32>),
        (0x044 => pub ep4_fifo: ReadOnly<u32>),
        (0x048 => pub ep5_fifo: ReadOnly<u32>),
        (0x04c => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        /// Which bus master services endpoint data.
        CONTROLLER OFFSET(1) NUMBITS(1) [
            Dma = 0,
            Cm3 = 1,
        ],
        REMOTE_WAKEUP OFFSET(2) NUMBITS(1) [],
    ],
    /// System-level event clears; write a set bit to acknowledge.
    pub SYS_INT [
        RESET OFFSET(0) NUMBITS(1) [],
        SUSPEND OFFSET(1) NUMBITS(1) [],
        SOF OFFSET(2) NUMBITS(1) [],
        SETUP_TOKEN OFFSET(3) NUMBITS(1) [],
        SETUP_DATA_VALID OFFSET(4) NUMBITS(1) [],
    ],
    pub BULK_IN [
        EP0 OFFSET(0) NUMBITS(1) [],
        EP2 OFFSET(2) NUMBITS(1) [],
        EP3 OFFSET(3) NUMBITS(1) [],
    ],
    pub BULK_OUT [
        EP0 OFFSET(0) NUMBITS(1) [],
        EP4 OFFSET(4) NUMBITS(1) [],
        EP5 OFFSET(5) NUMBITS(1) [],
    ],
    pub EP_STALL [
        EP0_IN OFFSET(0) NUMBITS(1) [],
        EP0_OUT OFFSET(1) NUMBITS(1) [],
        EP2_IN OFFSET(2) NUMBITS(1) [],
        EP3_IN OFFSET(3) NUMBITS(1) [],
        EP4_OUT OFFSET(4) NUMBITS(1) [],
        EP5_OUT OFFSET(5) NUMBITS(1) [],
    ],
    pub HANDSHAKE_CTRL [
        NAK_CLEAR OFFSET(0) NUMBITS(1) [],
    ],
];

/// Size in bytes of every endpoint buffer.
pub const EP_BUFFER_SIZE: usize = 64;
