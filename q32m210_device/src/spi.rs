//! SPI register block, shared by both interfaces.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

register_structs! {
    pub SpiRegisters {
        (0x000 => pub ctrl0: ReadWrite<u32, CTRL0::Register>),
        (0x004 => pub ctrl1: ReadWrite<u32, CTRL1::Register>),
        (0x008 => pub data: ReadWrite<u32>),
        (0x00c => @END),
    }
}

register_bitfields![u32,
    /// Static interface configuration.
    pub CTRL0 [
        ENABLE OFFSET(0) NUMBITS(1) [],
        MODE_SELECT OFFSET(1) NUMBITS(1) [
            Manual = 0,
            Auto = 1,
        ],
        CLK_POLARITY OFFSET(2) NUMBITS(1) [
            Normal = 0,
            Inverse = 1,
        ],
        CONTROLLER OFFSET(3) NUMBITS(1) [
            Slave = 0,
            Master = 1,
        ],
        SERI_PULLUP_ENABLE OFFSET(4) NUMBITS(1) [],
        UNDERRUN_INT_ENABLE OFFSET(5) NUMBITS(1) [],
        OVERRUN_INT_ENABLE OFFSET(6) NUMBITS(1) [],
        SQI_ENABLE OFFSET(7) NUMBITS(1) [],
        /// Serial clock is the interface clock divided by 2^(PRESCALE + 1).
        PRESCALE OFFSET(8) NUMBITS(3) [],
    ],
    /// Per-transfer configuration. Setting START_BUSY launches the
    /// transfer; the bit reads back high while it runs.
    pub CTRL1 [
        START_BUSY OFFSET(0) NUMBITS(1) [],
        RW_CMD OFFSET(1) NUMBITS(1) [
            Write = 0,
            Read = 1,
        ],
        /// Chip select line level (active low).
        CS OFFSET(2) NUMBITS(1) [
            Low = 0,
            High = 1,
        ],
        WORD_SIZE OFFSET(3) NUMBITS(2) [
            Bits8 = 0,
            Bits16 = 1,
            Bits24 = 2,
            Bits32 = 3,
        ],
    ],
];

/// Bit position of `CTRL1::START_BUSY`, for bit-band polling.
pub const CTRL1_START_BUSY_POS: u32 = 0;
