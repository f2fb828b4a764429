//! Clocking control register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::ReadWrite;

register_structs! {
    pub ClkRegisters {
        (0x000 => pub ctrl0: ReadWrite<u32, CTRL0::Register>),
        (0x004 => pub ctrl1: ReadWrite<u32, CTRL1::Register>),
        (0x008 => pub ctrl2: ReadWrite<u32, CTRL2::Register>),
        (0x00c => pub ctrl3: ReadWrite<u32, CTRL3::Register>),
        (0x010 => pub ctrl4: ReadWrite<u32, CTRL4::Register>),
        (0x014 => pub ctrl5: ReadWrite<u32, CTRL5::Register>),
        (0x018 => pub ctrl6: ReadWrite<u32, CTRL6::Register>),
        (0x01c => @END),
    }
}

register_bitfields![u32,
    pub CTRL0 [
        /// Root clock source for the system clock tree.
        RCLK_SELECT OFFSET(0) NUMBITS(2) [
            RcOsc = 0,
            Xtal = 1,
            ExtClock = 2,
        ],
        /// Tick rate of the real-time clock.
        RTC_CLK_SELECT OFFSET(4) NUMBITS(2) [
            Hz1 = 0,
            Hz16 = 1,
            Hz64 = 2,
            Hz1024 = 3,
        ],
    ],
    pub CTRL1 [
        SYSCLK_DIV OFFSET(0) NUMBITS(3) [],
    ],
    pub CTRL2 [
        UART0_CLK_ENABLE OFFSET(0) NUMBITS(1) [],
        UART1_CLK_ENABLE OFFSET(1) NUMBITS(1) [],
        SPI0_CLK_ENABLE OFFSET(2) NUMBITS(1) [],
        SPI1_CLK_ENABLE OFFSET(3) NUMBITS(1) [],
        I2C_CLK_ENABLE OFFSET(4) NUMBITS(1) [],
    ],
    pub CTRL3 [
        MCLK_ENABLE OFFSET(7) NUMBITS(1) [],
        MCLK_DIV OFFSET(0) NUMBITS(6) [],
    ],
    pub CTRL4 [
        EXT_CLK_ENABLE OFFSET(7) NUMBITS(1) [],
        EXT_CLK_DIV OFFSET(0) NUMBITS(6) [],
    ],
    pub CTRL5 [
        LCD_CLK_ENABLE OFFSET(0) NUMBITS(1) [],
        USR_CLK0_ENABLE OFFSET(1) NUMBITS(1) [],
        USR_CLK1_ENABLE OFFSET(2) NUMBITS(1) [],
        USR_CLK2_ENABLE OFFSET(3) NUMBITS(1) [],
    ],
    pub CTRL6 [
        PWM0_CLK_ENABLE OFFSET(0) NUMBITS(1) [],
        PWM1_CLK_ENABLE OFFSET(1) NUMBITS(1) [],
        PWM2_CLK_ENABLE OFFSET(2) NUMBITS(1) [],
        PWM3_CLK_ENABLE OFFSET(3) NUMBITS(1) [],
    ],
];
