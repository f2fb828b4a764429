//! General-purpose timer register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

register_structs! {
    pub TimerRegisters {
        (0x000 => pub timer0_ctrl: ReadWrite<u32, TIMER_CTRL::Register>),
        (0x004 => pub timer1_ctrl: ReadWrite<u32, TIMER_CTRL::Register>),
        (0x008 => pub timer2_ctrl: ReadWrite<u32, TIMER_CTRL::Register>),
        (0x00c => pub timer3_ctrl: ReadWrite<u32, TIMER_CTRL::Register>),
        (0x010 => pub ctrl_status: ReadWrite<u32, CTRL_STATUS::Register>),
        (0x014 => @END),
    }
}

register_bitfields![u32,
    pub TIMER_CTRL [
        TIMEOUT_VALUE OFFSET(0) NUMBITS(16) [],
        PRESCALE OFFSET(16) NUMBITS(3) [],
        MODE OFFSET(24) NUMBITS(1) [
            /// Re-arms itself after each timeout.
            FreeRun = 0,
            /// Stops after a single timeout.
            Shot = 1,
        ],
    ],
    /// One run/stop bit per timer. The bits are written individually
    /// through the bit-band alias so concurrent starts never read-modify-
    /// write each other's state.
    pub CTRL_STATUS [
        TIMER0_STATUS OFFSET(0) NUMBITS(1) [],
        TIMER1_STATUS OFFSET(1) NUMBITS(1) [],
        TIMER2_STATUS OFFSET(2) NUMBITS(1) [],
        TIMER3_STATUS OFFSET(3) NUMBITS(1) [],
    ],
];

/// Byte offset of `ctrl_status` inside the block, for bit-band writes.
pub const CTRL_STATUS_OFFSET: usize = 0x010;
