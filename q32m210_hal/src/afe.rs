use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use q32m210_device::afe::{
    ADC01_DATA, ADC_CTRL, DAC_CTRL, DATARATE_CFG, OPMODE_CTRL, PGA_CTRL, PGA_GAIN_CTRL, PSU_CTRL,
};
use q32m210_device::AFE;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::Clock;

/// Stores the analog front end used by all peripherals
static AFE: Mutex<RefCell<Option<Afe>>> = Mutex::new(RefCell::new(None));

/// ADC sample format.
#[derive(Debug, Clone, Copy)]
pub enum AdcFormat {
    UnsignedInt,
    TwosComplement,
}

/// One of the three DAC channels.
#[derive(Debug, Clone, Copy)]
pub enum Dac {
    Dac0,
    Dac1,
    Dac2,
}

/// Pre-amplifier gain selection, 0 dB up in 6 dB steps.
pub type PgaGain = u32;

/// Analog front end.
///
/// Owns the operating-mode, power-supply, ADC/DAC/PGA and retention
/// registers. The RTC portion of the block is driven through
/// [`crate::rtc`].
pub struct Afe {
    regs: AFE,
}

impl Afe {
    /// Initialize the global analog front end.
    ///
    /// # Panics
    ///
    /// panics if the analog front end is already initialized
    pub fn init(afe: AFE) {
        interrupt::free(|token| {
            let mut global = AFE.borrow(token).borrow_mut();
            assert!(global.is_none(), "afe already initialized");

            *global = Some(Afe { regs: afe });
        })
    }

    /// Executes the given closure with exclusive access to the analog front
    /// end.
    ///
    /// # Panics
    ///
    /// panics if the analog front end is not initialized
    pub fn with<T>(f: impl FnOnce(&mut Afe) -> T) -> T {
        interrupt::free(|token| {
            let mut afe = AFE.borrow(token).borrow_mut();
            f(afe.as_mut().expect("afe not initialized"))
        })
    }

    pub(crate) fn regs(&self) -> &q32m210_device::afe::AfeRegisters {
        &self.regs
    }

    /// Enables or disables the supplies feeding the ADCs and the RC
    /// oscillator.
    pub fn set_opmode(&mut self, vadc_enabled: bool, rc_osc_enabled: bool) {
        self.regs.opmode_ctrl.modify(
            OPMODE_CTRL::SLEEP_MODE::CLEAR
                + OPMODE_CTRL::STANDBY_MODE::CLEAR
                + OPMODE_CTRL::VADC_ENABLE.val(vadc_enabled as u32)
                + OPMODE_CTRL::RC_OSC_ENABLE.val(rc_osc_enabled as u32),
        );
    }

    pub(crate) fn set_rc_trim(&mut self, trim: u32) {
        self.regs.rc_ccr_ctrl.set(trim);
    }

    pub fn set_pga0_enabled(&mut self, enabled: bool) {
        self.regs
            .pga0_ctrl
            .modify(PGA_CTRL::ENABLE.val(enabled as u32));
    }

    pub fn set_pga1_enabled(&mut self, enabled: bool) {
        self.regs
            .pga1_ctrl
            .modify(PGA_CTRL::ENABLE.val(enabled as u32));
    }

    /// Configures the pre-amplifier gains and filter cut-off.
    pub fn set_pga_gain(&mut self, pga0_gain: PgaGain, pga1_gain: PgaGain, cut_off_high: bool) {
        self.regs.pga_gain_ctrl.write(
            PGA_GAIN_CTRL::PGA0_GAIN.val(pga0_gain)
                + PGA_GAIN_CTRL::PGA1_GAIN.val(pga1_gain)
                + PGA_GAIN_CTRL::CUT_OFF.val(cut_off_high as u32),
        );
    }

    pub fn set_adc_control(
        &mut self,
        adc0_enabled: bool,
        adc0_format: AdcFormat,
        adc1_enabled: bool,
        adc1_format: AdcFormat,
    ) {
        let format_bit = |format: AdcFormat| match format {
            AdcFormat::UnsignedInt => 0,
            AdcFormat::TwosComplement => 1,
        };

        self.regs.adc_ctrl.write(
            ADC_CTRL::ADC0_ENABLE.val(adc0_enabled as u32)
                + ADC_CTRL::ADC0_FORMAT.val(format_bit(adc0_format))
                + ADC_CTRL::ADC1_ENABLE.val(adc1_enabled as u32)
                + ADC_CTRL::ADC1_FORMAT.val(format_bit(adc1_format)),
        );
    }

    /// Configures the ADC sample rate from the dummy-cycle count and
    /// decimation factor.
    pub fn set_datarate(&mut self, dummy_cycles: u32, decimation_factor: u32) {
        self.regs.datarate_cfg.write(
            DATARATE_CFG::DUMMY_CYCLES.val(dummy_cycles)
                + DATARATE_CFG::DECIMATION_FACTOR.val(decimation_factor),
        );
    }

    /// Reads the latest sample pair; ADC0 in the low half, ADC1 in the
    /// high half.
    pub fn adc_samples(&self) -> (u16, u16) {
        let data = self.regs.adc01_data.extract();

        (
            data.read(ADC01_DATA::ADC0) as u16,
            data.read(ADC01_DATA::ADC1) as u16,
        )
    }

    pub fn set_dac_enabled(&mut self, dac: Dac, enabled: bool) {
        let field = match dac {
            Dac::Dac0 => DAC_CTRL::DAC0_ENABLE,
            Dac::Dac1 => DAC_CTRL::DAC1_ENABLE,
            Dac::Dac2 => DAC_CTRL::DAC2_ENABLE,
        };

        self.regs.dac_ctrl.modify(field.val(enabled as u32));
    }

    pub fn set_dac_data(&mut self, dac: Dac, value: u16) {
        let reg = match dac {
            Dac::Dac0 => &self.regs.dac0_data,
            Dac::Dac1 => &self.regs.dac1_data,
            Dac::Dac2 => &self.regs.dac2_data,
        };

        reg.set(value as u32);
    }

    /// Reads the retention register, which survives sleep mode.
    pub fn retention(&self) -> u32 {
        self.regs.retention.get()
    }

    /// Writes the retention register.
    pub fn set_retention(&mut self, value: u32) {
        self.regs.retention.set(value);
    }
}

/// Switches the system to sleep mode.
///
/// This minimum power consumption mode waits for a wakeup event to re-boot
/// the system through the boot ROM, so this function does not return.
pub fn sleep() -> ! {
    Clock::with(|clock| clock.disable_divided_clocks());

    Afe::with(|afe| {
        // power down the charge pump and LCD driver
        afe.regs.psu_ctrl.modify(
            PSU_CTRL::VDBL_ENABLE::CLEAR
                + PSU_CTRL::VCP_ENABLE::CLEAR
                + PSU_CTRL::LCD_DRIVER_ENABLE::CLEAR
                + PSU_CTRL::LCD_BACKLIGHT_ENABLE::CLEAR,
        );

        // minimum crystal bias for the specified sleep mode current
        afe.regs.xtal_ctrl.set(0);

        // power down everything not needed to wake the system back up
        afe.regs.opmode_ctrl.write(
            OPMODE_CTRL::SLEEP_MODE::SET
                + OPMODE_CTRL::STANDBY_MODE::CLEAR
                + OPMODE_CTRL::VADC_ENABLE::CLEAR
                + OPMODE_CTRL::RC_OSC_ENABLE::SET,
        );
    });

    // The writes above switch the system into sleep mode and execution
    // restarts from ROM after wakeup. Spin so extraneous cycles cannot run
    // past this point; the watchdog catches the case where the switch never
    // happens.
    loop {}
}

/// Switches the system to standby mode and waits for a wakeup event before
/// returning.
pub fn standby() {
    let saved = Afe::with(|afe| {
        let saved = afe.regs.opmode_ctrl.get();

        afe.regs.opmode_ctrl.modify(
            OPMODE_CTRL::SLEEP_MODE::CLEAR
                + OPMODE_CTRL::STANDBY_MODE::SET
                + OPMODE_CTRL::VADC_ENABLE::CLEAR,
        );

        saved
    });

    cortex_m::asm::wfe();

    Afe::with(|afe| afe.regs.opmode_ctrl.set(saved));
}
