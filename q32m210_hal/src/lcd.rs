use q32m210_device::lcd::CTRL;
use q32m210_device::LCD;
use tock_registers::interfaces::{ReadWriteable, Writeable};

use crate::afe::Afe;
use q32m210_device::afe::PSU_CTRL;

/// The segment LCD driver.
pub struct Lcd {
    regs: LCD,
}

impl Lcd {
    pub(crate) fn new(regs: LCD) -> Self {
        Lcd { regs }
    }

    /// Powers the LCD supplies and enables the driver.
    pub fn enable(&mut self) {
        Afe::with(|afe| {
            afe.regs()
                .psu_ctrl
                .modify(PSU_CTRL::LCD_DRIVER_ENABLE::SET);
        });

        self.regs.ctrl.modify(CTRL::ENABLE::SET);
    }

    pub fn disable(&mut self) {
        self.regs.ctrl.modify(CTRL::ENABLE::CLEAR);

        Afe::with(|afe| {
            afe.regs()
                .psu_ctrl
                .modify(PSU_CTRL::LCD_DRIVER_ENABLE::CLEAR);
        });
    }

    pub fn set_backlight(&mut self, on: bool) {
        Afe::with(|afe| {
            afe.regs()
                .psu_ctrl
                .modify(PSU_CTRL::LCD_BACKLIGHT_ENABLE.val(on as u32));
        });
    }

    /// Blanks the display without dropping the segment data.
    pub fn set_blank(&mut self, blank: bool) {
        self.regs.ctrl.modify(CTRL::BLANK.val(blank as u32));
    }

    /// Writes one bank of segment data.
    pub fn set_segments(&mut self, bank: usize, value: u32) {
        self.regs.segment_data[bank].set(value);
    }
}
