//! LCD driver register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

register_structs! {
    pub LcdRegisters {
        (0x000 => pub ctrl: ReadWrite<u32, CTRL::Register>),
        (0x004 => pub segment_data: [ReadWrite<u32>; 4]),
        (0x014 => @END),
    }
}

register_bitfields![u32,
    pub CTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
        BLANK OFFSET(1) NUMBITS(1) [],
        BLINK OFFSET(2) NUMBITS(1) [],
    ],
];
