use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use q32m210_device::clk::CTRL0;
use q32m210_device::{CAL_RC_CCR_CTRL_BASE, CAL_RC_CCR_CTRL_INFO_POS, CLK};
use tock_registers::interfaces::{ReadWriteable, Readable};

use crate::afe::Afe;
use crate::{HalError, EXT_CLK_FREQUENCY, RC_OSC_DEFAULT_FREQUENCY, XTAL_FREQUENCY};

/// Number of trim entries in the information-page calibration table.
const CAL_TABLE_LEN: usize = 32;
/// Trim bits of a calibration word (fine, range and coarse fields).
const RC_TRIM_MASK: u32 = 0x003F_03FF;

/// Stores the clock control used by all peripherals
static CLOCK: Mutex<RefCell<Option<Clock>>> = Mutex::new(RefCell::new(None));

/// Root clock source for the system clock tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootClock {
    RcOsc,
    Xtal,
    ExtClock,
}

/// Tick rate of the real-time clock.
#[derive(Debug, Clone, Copy)]
pub enum RtcRate {
    Hz1,
    Hz16,
    Hz64,
    Hz1024,
}

impl RtcRate {
    /// Ticks per second.
    pub fn hz(self) -> u32 {
        match self {
            RtcRate::Hz1 => 1,
            RtcRate::Hz16 => 16,
            RtcRate::Hz64 => 64,
            RtcRate::Hz1024 => 1024,
        }
    }
}

/// Clocking control.
///
/// Selects the root clock, tracks the RC oscillator trim, and gates the
/// divided clocks feeding the peripherals.
pub struct Clock {
    regs: CLK,
    /// Frequency the RC oscillator is currently trimmed to.
    rc_osc_frequency: u32,
}

impl Clock {
    /// Initialize the global clock control.
    ///
    /// # Panics
    ///
    /// panics if the clock control is already initialized
    pub fn init(clk: CLK) {
        interrupt::free(|token| {
            let mut clock = CLOCK.borrow(token).borrow_mut();
            assert!(clock.is_none(), "clock already initialized");

            *clock = Some(Clock {
                regs: clk,
                rc_osc_frequency: RC_OSC_DEFAULT_FREQUENCY,
            });
        })
    }

    /// Executes the given closure with exclusive access to the clock control.
    ///
    /// # Panics
    ///
    /// panics if the clock control is not initialized
    pub fn with<T>(f: impl FnOnce(&mut Clock) -> T) -> T {
        interrupt::free(|token| {
            let mut clock = CLOCK.borrow(token).borrow_mut();
            f(clock.as_mut().expect("clock not initialized"))
        })
    }

    pub fn select_root_clock(&mut self, root: RootClock) {
        let value = match root {
            RootClock::RcOsc => CTRL0::RCLK_SELECT::RcOsc,
            RootClock::Xtal => CTRL0::RCLK_SELECT::Xtal,
            RootClock::ExtClock => CTRL0::RCLK_SELECT::ExtClock,
        };

        self.regs.ctrl0.modify(value);
    }

    /// Selects the RTC tick rate, keeping the root clock selection the same.
    pub fn set_rtc_rate(&mut self, rate: RtcRate) {
        let value = match rate {
            RtcRate::Hz1 => CTRL0::RTC_CLK_SELECT::Hz1,
            RtcRate::Hz16 => CTRL0::RTC_CLK_SELECT::Hz16,
            RtcRate::Hz64 => CTRL0::RTC_CLK_SELECT::Hz64,
            RtcRate::Hz1024 => CTRL0::RTC_CLK_SELECT::Hz1024,
        };

        self.regs.ctrl0.modify(value);
    }

    /// Gets the frequency of the system clock in ticks per second.
    pub fn sysclock_frequency(&self) -> u32 {
        let root = self.regs.ctrl0.read_as_enum(CTRL0::RCLK_SELECT);

        match root {
            Some(CTRL0::RCLK_SELECT::Value::RcOsc) | None => self.rc_osc_frequency,
            Some(CTRL0::RCLK_SELECT::Value::Xtal) => XTAL_FREQUENCY,
            Some(CTRL0::RCLK_SELECT::Value::ExtClock) => EXT_CLK_FREQUENCY,
        }
    }

    /// Gets the frequency of the clock feeding the serial interfaces.
    pub fn interface_clock_frequency(&self) -> u32 {
        self.sysclock_frequency()
    }

    pub fn set_uart0_clock_enabled(&mut self, enabled: bool) {
        self.regs
            .ctrl2
            .modify(q32m210_device::clk::CTRL2::UART0_CLK_ENABLE.val(enabled as u32));
    }

    pub fn set_uart1_clock_enabled(&mut self, enabled: bool) {
        self.regs
            .ctrl2
            .modify(q32m210_device::clk::CTRL2::UART1_CLK_ENABLE.val(enabled as u32));
    }

    pub fn set_i2c_clock_enabled(&mut self, enabled: bool) {
        self.regs
            .ctrl2
            .modify(q32m210_device::clk::CTRL2::I2C_CLK_ENABLE.val(enabled as u32));
    }

    pub fn set_spi_clock_enabled(&mut self, interface: crate::SpiInterface, enabled: bool) {
        use q32m210_device::clk::CTRL2;

        match interface {
            crate::SpiInterface::Spi0 => self
                .regs
                .ctrl2
                .modify(CTRL2::SPI0_CLK_ENABLE.val(enabled as u32)),
            crate::SpiInterface::Spi1 => self
                .regs
                .ctrl2
                .modify(CTRL2::SPI1_CLK_ENABLE.val(enabled as u32)),
        }
    }

    /// Configures the MCLK divided clock feeding the analog front end.
    pub fn config_mclk(&mut self, enabled: bool, divisor: u32) {
        use q32m210_device::clk::CTRL3;

        self.regs
            .ctrl3
            .modify(CTRL3::MCLK_ENABLE.val(enabled as u32) + CTRL3::MCLK_DIV.val(divisor));
    }

    /// Shuts off every divided clock in the system, as required on the way
    /// into sleep mode.
    pub fn disable_divided_clocks(&mut self) {
        use q32m210_device::clk::{CTRL3, CTRL4, CTRL5, CTRL6};

        self.regs.ctrl3.modify(CTRL3::MCLK_ENABLE::CLEAR);
        self.regs.ctrl4.modify(CTRL4::EXT_CLK_ENABLE::CLEAR);
        self.regs.ctrl5.modify(
            CTRL5::LCD_CLK_ENABLE::CLEAR
                + CTRL5::USR_CLK0_ENABLE::CLEAR
                + CTRL5::USR_CLK1_ENABLE::CLEAR
                + CTRL5::USR_CLK2_ENABLE::CLEAR,
        );
        self.regs.ctrl6.modify(
            CTRL6::PWM0_CLK_ENABLE::CLEAR
                + CTRL6::PWM1_CLK_ENABLE::CLEAR
                + CTRL6::PWM2_CLK_ENABLE::CLEAR
                + CTRL6::PWM3_CLK_ENABLE::CLEAR,
        );
    }

    /// Trims the RC oscillator to the requested frequency using the
    /// calibration table in the device information page.
    ///
    /// The resolution is 100 kHz. Returns the frequency actually set.
    pub fn set_rc_frequency(&mut self, freq_hz: u32) -> Result<u32, HalError> {
        // safety: the information page is a fixed read-only flash region
        let table = unsafe {
            core::slice::from_raw_parts(CAL_RC_CCR_CTRL_BASE as *const u32, CAL_TABLE_LEN)
        };

        let word = find_calibration(table, freq_hz).ok_or(HalError::ClockCalibration)?;

        Afe::with(|afe| afe.set_rc_trim(word & RC_TRIM_MASK));

        let actual = (freq_hz / 100_000) * 100_000;
        self.rc_osc_frequency = actual;

        Ok(actual)
    }

    /// Records an RC oscillator frequency set without a table lookup.
    pub fn note_rc_frequency(&mut self, freq_hz: u32) {
        self.rc_osc_frequency = freq_hz;
    }
}

/// Finds the calibration word tagged with the requested frequency.
///
/// Unprogrammed entries read as all ones and are skipped. The tag is the
/// frequency in 100 kHz steps, stored above the trim bits.
pub fn find_calibration(table: &[u32], freq_hz: u32) -> Option<u32> {
    let tag = freq_hz / 100_000;

    table
        .iter()
        .copied()
        .filter(|&word| word != 0xFFFF_FFFF)
        .find(|&word| (word >> CAL_RC_CCR_CTRL_INFO_POS) & 0xFF == tag)
}

#[cfg(test)]
mod test {
    use super::find_calibration;

    const fn entry(freq_100khz: u32, trim: u32) -> u32 {
        (freq_100khz << super::CAL_RC_CCR_CTRL_INFO_POS) | trim
    }

    #[test]
    fn finds_the_tagged_entry() {
        let table = [entry(10, 0x123), entry(30, 0x456), entry(80, 0x789)];

        assert_eq!(find_calibration(&table, 3_000_000), Some(entry(30, 0x456)));
    }

    #[test]
    fn skips_unprogrammed_entries() {
        let table = [0xFFFF_FFFF, entry(10, 0x42)];

        assert_eq!(find_calibration(&table, 1_000_000), Some(entry(10, 0x42)));
    }

    #[test]
    fn missing_frequency_finds_nothing() {
        let table = [entry(10, 0x42), 0xFFFF_FFFF];

        assert_eq!(find_calibration(&table, 2_000_000), None);
    }
}
