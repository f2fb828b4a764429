//! Four-channel DMA controller register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

register_structs! {
    pub DmaChannelRegisters {
        (0x000 => pub ctrl0: ReadWrite<u32, CH_CTRL0::Register>),
        (0x004 => pub ctrl1: ReadWrite<u32, CH_CTRL1::Register>),
        (0x008 => pub src_base_addr: ReadWrite<u32>),
        (0x00c => pub dest_base_addr: ReadWrite<u32>),
        (0x010 => pub status: ReadWrite<u32, CH_STATUS::Register>),
        (0x014 => _reserved0),
        (0x020 => @END),
    }
}

register_structs! {
    pub DmaRegisters {
        (0x000 => pub ch: [DmaChannelRegisters; 4]),
        (0x080 => @END),
    }
}

register_bitfields![u32,
    pub CH_CTRL0 [
        ENABLE OFFSET(0) NUMBITS(1) [],
        ADDR_MODE OFFSET(1) NUMBITS(1) [
            Linear = 0,
            Circular = 1,
        ],
        SRC_ADDR_INC OFFSET(2) NUMBITS(1) [],
        DEST_ADDR_INC OFFSET(3) NUMBITS(1) [],
        TRANSFER_TYPE OFFSET(4) NUMBITS(2) [
            MemToMem = 0,
            MemToPeripheral = 1,
            PeripheralToMem = 2,
            PeripheralToPeripheral = 3,
        ],
        CHANNEL_PRIORITY OFFSET(6) NUMBITS(2) [],
        SRC_SELECT OFFSET(8) NUMBITS(4) [],
        DEST_SELECT OFFSET(12) NUMBITS(4) [],
        SRC_WORD_SIZE OFFSET(16) NUMBITS(2) [
            Bits8 = 0,
            Bits16 = 1,
            Bits32 = 2,
        ],
        DEST_WORD_SIZE OFFSET(18) NUMBITS(2) [
            Bits8 = 0,
            Bits16 = 1,
            Bits32 = 2,
        ],
        START_INT_ENABLE OFFSET(20) NUMBITS(1) [],
        COUNTER_INT_ENABLE OFFSET(21) NUMBITS(1) [],
        COMPLETE_INT_ENABLE OFFSET(22) NUMBITS(1) [],
        ERROR_INT_ENABLE OFFSET(23) NUMBITS(1) [],
        DISABLE_INT_ENABLE OFFSET(24) NUMBITS(1) [],
        BYTE_ORDER OFFSET(25) NUMBITS(1) [
            LittleEndian = 0,
            BigEndian = 1,
        ],
    ],
    pub CH_CTRL1 [
        TRANSFER_LENGTH OFFSET(0) NUMBITS(16) [],
        COUNTER_INT_VALUE OFFSET(16) NUMBITS(16) [],
    ],
    /// Event flags; write a set bit to clear it.
    pub CH_STATUS [
        START_INT OFFSET(0) NUMBITS(1) [],
        COUNTER_INT OFFSET(1) NUMBITS(1) [],
        COMPLETE_INT OFFSET(2) NUMBITS(1) [],
        ERROR_INT OFFSET(3) NUMBITS(1) [],
        DISABLE_INT OFFSET(4) NUMBITS(1) [],
        ACTIVE OFFSET(5) NUMBITS(1) [],
    ],
];
