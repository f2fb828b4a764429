//! Register-level access to the Q32M210 peripherals.
//!
//! The register blocks are written with the `tock-registers` interface and
//! only carry the fields the higher layers use. Peripheral instances are
//! zero-sized proxies handed out once through [`Peripherals::take`].

#![no_std]

use core::marker::PhantomData;
use core::ops::Deref;

pub mod afe;
pub mod bitband;
pub mod clk;
pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod lcd;
pub mod spi;
pub mod timer;
pub mod uart;
pub mod usb;
pub mod watchdog;

mod vectors;

#[cfg(feature = "rt")]
pub use cortex_m_rt::interrupt;
pub use vectors::Interrupt;
#[cfg(feature = "rt")]
pub use vectors::Interrupt as interrupt;

/// Start of the memory-mapped peripheral region.
pub const PERIPHERAL_BASE: usize = 0x4000_0000;
/// Start of SRAM.
pub const RAM_BASE: usize = 0x2000_0000;
/// Start of the Cortex-M3 private peripheral region.
pub const PRIVATE_PERIPHERAL_BASE: usize = 0xE000_0000;

/// Base of the RC oscillator trim table in the device information page.
///
/// Each of the 32 words holds a `RC_CCR_CTRL` setting for one 100 kHz
/// frequency step; unprogrammed entries read as `0xFFFF_FFFF`.
pub const CAL_RC_CCR_CTRL_BASE: usize = 0x0004_0400;
/// Bit position of the frequency tag inside a calibration word.
pub const CAL_RC_CCR_CTRL_INFO_POS: u32 = 24;

macro_rules! peripheral_proxy {
    ($(#[$doc:meta])* $NAME:ident, $block:ty, $addr:literal) => {
        $(#[$doc])*
        pub struct $NAME {
            _marker: PhantomData<*const ()>,
        }

        unsafe impl Send for $NAME {}

        impl $NAME {
            pub const PTR: *const $block = $addr as *const _;

            const fn new() -> Self {
                $NAME {
                    _marker: PhantomData,
                }
            }
        }

        impl Deref for $NAME {
            type Target = $block;

            #[inline(always)]
            fn deref(&self) -> &Self::Target {
                // safety: the block sits at a fixed device address for the
                // whole program lifetime
                unsafe { &*Self::PTR }
            }
        }
    };
}

peripheral_proxy!(
    /// Analog front end: operating mode, power supply, RTC, ADC/DAC, PGAs.
    AFE, afe::AfeRegisters, 0x4000_0000
);
peripheral_proxy!(
    /// Clocking control.
    CLK, clk::ClkRegisters, 0x4000_0400
);
peripheral_proxy!(
    /// Pad interfaces IF4/IF5 and GPIO interrupt routing.
    GPIO, gpio::GpioRegisters, 0x4000_0800
);
peripheral_proxy!(
    /// General-purpose timers 0-3.
    TIMER, timer::TimerRegisters, 0x4000_0C00
);
peripheral_proxy!(
    /// Watchdog timer.
    WATCHDOG, watchdog::WatchdogRegisters, 0x4000_1000
);
peripheral_proxy!(
    /// UART interface 0.
    UART0, uart::UartRegisters, 0x4000_1400
);
peripheral_proxy!(
    /// UART interface 1.
    UART1, uart::UartRegisters, 0x4000_1500
);
peripheral_proxy!(
    /// SPI interface 0.
    SPI0, spi::SpiRegisters, 0x4000_1800
);
peripheral_proxy!(
    /// SPI interface 1. The block sits 0x100 above SPI0 with an identical
    /// layout.
    SPI1, spi::SpiRegisters, 0x4000_1900
);
peripheral_proxy!(
    /// I2C interface.
    I2C, i2c::I2cRegisters, 0x4000_1C00
);
peripheral_proxy!(
    /// Four-channel DMA controller.
    DMA, dma::DmaRegisters, 0x4000_2000
);
peripheral_proxy!(
    /// USB interface controller.
    USB, usb::UsbRegisters, 0x4000_2400
);
peripheral_proxy!(
    /// LCD driver.
    LCD, lcd::LcdRegisters, 0x4000_2800
);

/// All device peripherals.
#[allow(non_snake_case)]
pub struct Peripherals {
    pub AFE: AFE,
    pub CLK: CLK,
    pub GPIO: GPIO,
    pub TIMER: TIMER,
    pub WATCHDOG: WATCHDOG,
    pub UART0: UART0,
    pub UART1: UART1,
    pub SPI0: SPI0,
    pub SPI1: SPI1,
    pub I2C: I2C,
    pub DMA: DMA,
    pub USB: USB,
    pub LCD: LCD,
}

static mut PERIPHERALS_TAKEN: bool = false;

impl Peripherals {
    /// Returns all the device peripherals the first time it is called.
    pub fn take() -> Option<Self> {
        cortex_m::interrupt::free(|_| {
            // safety: inside a critical section, so no concurrent access
            unsafe {
                if PERIPHERALS_TAKEN {
                    None
                } else {
                    PERIPHERALS_TAKEN = true;
                    Some(Peripherals::steal())
                }
            }
        })
    }

    /// Unchecked version of [`Peripherals::take`].
    ///
    /// # Safety
    ///
    /// Must not be used to create aliased access to a peripheral another
    /// owner is driving.
    pub unsafe fn steal() -> Self {
        Peripherals {
            AFE: AFE::new(),
            CLK: CLK::new(),
            GPIO: GPIO::new(),
            TIMER: TIMER::new(),
            WATCHDOG: WATCHDOG::new(),
            UART0: UART0::new(),
            UART1: UART1::new(),
            SPI0: SPI0::new(),
            SPI1: SPI1::new(),
            I2C: I2C::new(),
            DMA: DMA::new(),
            USB: USB::new(),
            LCD: LCD::new(),
        }
    }
}
