//! Pad interface register block (IF4 output bank, IF5 inputs, interrupt
//! routing).

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite};

register_structs! {
    pub GpioRegisters {
        (0x000 => pub if4_out: ReadWrite<u32>),
        (0x004 => pub if4_in: ReadOnly<u32>),
        (0x008 => pub if5_in: ReadOnly<u32>),
        (0x00c => pub if5_func_sel: ReadWrite<u32, IF5_FUNC_SEL::Register>),
        (0x010 => pub int_ctrl0: ReadWrite<u32, INT_CTRL::Register>),
        (0x014 => pub int_ctrl1: ReadWrite<u32, INT_CTRL::Register>),
        (0x018 => @END),
    }
}

register_bitfields![u32,
    pub IF5_FUNC_SEL [
        WAKEUP_ENABLE_PIN0 OFFSET(0) NUMBITS(1) [],
        WAKEUP_ENABLE_PIN1 OFFSET(1) NUMBITS(1) [],
        WAKEUP_ENABLE_PIN2 OFFSET(2) NUMBITS(1) [],
        WAKEUP_ENABLE_PIN3 OFFSET(3) NUMBITS(1) [],
    ],
    pub INT_CTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        /// Pad interface the interrupt source watches.
        INTERFACE OFFSET(4) NUMBITS(3) [],
        /// Pin within the selected interface.
        PIN OFFSET(8) NUMBITS(4) [],
        EDGE OFFSET(12) NUMBITS(2) [
            Falling = 0,
            Rising = 1,
            Both = 2,
        ],
        DEBOUNCE_ENABLE OFFSET(16) NUMBITS(1) [],
    ],
];
