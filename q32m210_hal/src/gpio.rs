use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use q32m210_device::gpio::{IF5_FUNC_SEL, INT_CTRL};
use q32m210_device::GPIO;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

static GPIO: Mutex<RefCell<Option<Gpio>>> = Mutex::new(RefCell::new(None));

/// The two general-purpose pad interrupt sources.
#[derive(Debug, Clone, Copy)]
pub enum GpioIntSource {
    Gp0,
    Gp1,
}

/// Edge sensitivity of a pad interrupt.
#[derive(Debug, Clone, Copy)]
pub enum GpioIntEdge {
    Falling,
    Rising,
    Both,
}

/// Configuration of one pad interrupt source.
#[derive(Debug, Clone, Copy)]
pub struct GpioIntConfig {
    /// Pad interface the source watches.
    pub interface: u32,
    /// Pin within the interface.
    pub pin: u32,
    pub edge: GpioIntEdge,
    pub debounce: bool,
}

/// Pad interfaces.
///
/// IF4 is the board's output bank (LEDs on the evaluation board); IF5
/// carries the push buttons and the wakeup pins.
pub struct Gpio {
    regs: GPIO,
}

impl Gpio {
    /// Initializes the global `Gpio` instance.
    ///
    /// # Panics
    ///
    /// panics if the gpio is already initialized
    pub fn init(gpio: GPIO) {
        interrupt::free(|token| {
            let mut global = GPIO.borrow(token).borrow_mut();
            assert!(global.is_none(), "gpio already initialized");

            *global = Some(Gpio { regs: gpio });
        })
    }

    /// Get mutable access to the Gpio instance and call the given closure
    /// with it.
    ///
    /// # Panics
    ///
    /// panics if the gpio is not initialized
    pub fn with<T>(f: impl FnOnce(&mut Gpio) -> T) -> T {
        interrupt::free(|token| {
            let mut gpio = GPIO.borrow(token).borrow_mut();
            f(gpio.as_mut().expect("gpio not initialized"))
        })
    }

    /// Drives the IF4 output bank to the given pattern.
    pub fn set_if4_output(&mut self, pattern: u32) {
        self.regs.if4_out.set(pattern);
    }

    /// Last pattern written to the IF4 output bank.
    pub fn if4_output(&self) -> u32 {
        self.regs.if4_out.get()
    }

    pub fn toggle_if4_output(&mut self, mask: u32) {
        self.regs.if4_out.set(self.regs.if4_out.get() ^ mask);
    }

    /// Current level of the IF5 input pins.
    pub fn if5_inputs(&self) -> u32 {
        self.regs.if5_in.get()
    }

    /// Routes the given IF5 pin to the wakeup logic so it can bring the
    /// system out of sleep mode.
    pub fn enable_wakeup_pin(&mut self, pin: u32) {
        let field = match pin {
            0 => IF5_FUNC_SEL::WAKEUP_ENABLE_PIN0,
            1 => IF5_FUNC_SEL::WAKEUP_ENABLE_PIN1,
            2 => IF5_FUNC_SEL::WAKEUP_ENABLE_PIN2,
            _ => IF5_FUNC_SEL::WAKEUP_ENABLE_PIN3,
        };

        self.regs.if5_func_sel.modify(field.val(1));
    }

    /// Configures one of the pad interrupt sources.
    pub fn configure_interrupt(&mut self, source: GpioIntSource, config: GpioIntConfig) {
        let edge = match config.edge {
            GpioIntEdge::Falling => INT_CTRL::EDGE::Falling,
            GpioIntEdge::Rising => INT_CTRL::EDGE::Rising,
            GpioIntEdge::Both => INT_CTRL::EDGE::Both,
        };

        let value = INT_CTRL::ENABLE::SET
            + INT_CTRL::INTERFACE.val(config.interface)
            + INT_CTRL::PIN.val(config.pin)
            + edge
            + INT_CTRL::DEBOUNCE_ENABLE.val(config.debounce as u32);

        match source {
            GpioIntSource::Gp0 => self.regs.int_ctrl0.write(value),
            GpioIntSource::Gp1 => self.regs.int_ctrl1.write(value),
        }
    }
}
