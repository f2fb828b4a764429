//! Analog front end register block.

use tock_registers::register_bitfields;
use tock_registers::register_structs;
use tock_registers::registers::{ReadOnly, ReadWrite};

register_structs! {
    pub AfeRegisters {
        (0x000 => pub opmode_ctrl: ReadWrite<u32, OPMODE_CTRL::Register>),
        (0x004 => pub psu_ctrl: ReadWrite<u32, PSU_CTRL::Register>),
        (0x008 => pub rtc_ctrl: ReadWrite<u32, RTC_CTRL::Register>),
        (0x00c => pub rtc_count: ReadWrite<u32>),
        (0x010 => pub rtc_alarm: ReadWrite<u32, RTC_ALARM::Register>),
        (0x014 => pub xtal_ctrl: ReadWrite<u32>),
        (0x018 => pub interrupt_status: ReadWrite<u32, INTERRUPT_STATUS::Register>),
        (0x01c => pub adc_ctrl: ReadWrite<u32, ADC_CTRL::Register>),
        (0x020 => pub adc01_data: ReadOnly<u32, ADC01_DATA::Register>),
        (0x024 => pub datarate_cfg: ReadWrite<u32, DATARATE_CFG::Register>),
        (0x028 => pub pga0_ctrl: ReadWrite<u32, PGA_CTRL::Register>),
        (0x02c => pub pga1_ctrl: ReadWrite<u32, PGA_CTRL::Register>),
        (0x030 => pub pga_gain_ctrl: ReadWrite<u32, PGA_GAIN_CTRL::Register>),
        (0x034 => pub dac_ctrl: ReadWrite<u32, DAC_CTRL::Register>),
        (0x038 => pub dac0_data: ReadWrite<u32>),
        (0x03c => pub dac1_data: ReadWrite<u32>),
        (0x040 => pub dac2_data: ReadWrite<u32>),
        (0x044 => pub rc_ccr_ctrl: ReadWrite<u32, RC_CCR_CTRL::Register>),
        (0x048 => pub retention: ReadWrite<u32>),
        (0x04c => @END),
    }
}

register_bitfields![u32,
    pub OPMODE_CTRL [
        SLEEP_MODE OFFSET(0) NUMBITS(1) [],
        STANDBY_MODE OFFSET(1) NUMBITS(1) [],
        VADC_ENABLE OFFSET(2) NUMBITS(1) [],
        RC_OSC_ENABLE OFFSET(3) NUMBITS(1) [],
    ],
    pub PSU_CTRL [
        VDBL_ENABLE OFFSET(0) NUMBITS(1) [],
        VCP_ENABLE OFFSET(1) NUMBITS(1) [],
        LCD_DRIVER_ENABLE OFFSET(2) NUMBITS(1) [],
        LCD_BACKLIGHT_ENABLE OFFSET(3) NUMBITS(1) [],
    ],
    pub RTC_CTRL [
        LOAD OFFSET(0) NUMBITS(1) [],
        BIAS_ENABLE OFFSET(1) NUMBITS(1) [],
        ALARM_ENABLE OFFSET(2) NUMBITS(1) [],
        MODE OFFSET(3) NUMBITS(1) [
            Run = 0,
            Set = 1,
        ],
    ],
    pub RTC_ALARM [
        COUNT OFFSET(0) NUMBITS(31) [],
        MODE OFFSET(31) NUMBITS(1) [
            Absolute = 0,
            Relative = 1,
        ],
    ],
    pub INTERRUPT_STATUS [
        RTC_CLOCK_CLEAR OFFSET(0) NUMBITS(1) [],
        RTC_ALARM_CLEAR OFFSET(1) NUMBITS(1) [],
    ],
    pub ADC_CTRL [
        ADC0_ENABLE OFFSET(0) NUMBITS(1) [],
        ADC0_FORMAT OFFSET(1) NUMBITS(1) [
            UnsignedInt = 0,
            TwosComplement = 1,
        ],
        ADC1_ENABLE OFFSET(2) NUMBITS(1) [],
        ADC1_FORMAT OFFSET(3) NUMBITS(1) [
            UnsignedInt = 0,
            TwosComplement = 1,
        ],
    ],
    pub ADC01_DATA [
        ADC0 OFFSET(0) NUMBITS(16) [],
        ADC1 OFFSET(16) NUMBITS(16) [],
    ],
    pub DATARATE_CFG [
        DUMMY_CYCLES OFFSET(0) NUMBITS(12) [],
        DECIMATION_FACTOR OFFSET(12) NUMBITS(4) [],
    ],
    pub PGA_CTRL [
        ENABLE OFFSET(0) NUMBITS(1) [],
    ],
    pub PGA_GAIN_CTRL [
        PGA0_GAIN OFFSET(0) NUMBITS(3) [],
        PGA1_GAIN OFFSET(4) NUMBITS(3) [],
        CUT_OFF OFFSET(8) NUMBITS(1) [
            Low = 0,
            High = 1,
        ],
    ],
    pub DAC_CTRL [
        DAC0_ENABLE OFFSET(0) NUMBITS(1) [],
        DAC1_ENABLE OFFSET(1) NUMBITS(1) [],
        DAC2_ENABLE OFFSET(2) NUMBITS(1) [],
    ],
    pub RC_CCR_CTRL [
        FINE_CTRL OFFSET(0) NUMBITS(8) [],
        RANGE_SEL OFFSET(8) NUMBITS(2) [],
        COARSE_CTRL OFFSET(16) NUMBITS(6) [],
    ],
];
