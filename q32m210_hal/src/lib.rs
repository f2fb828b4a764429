#![no_std]

pub mod afe;
pub mod clock;
pub mod dma;
pub mod gpio;
pub mod i2c;
pub mod lcd;
pub mod led;
pub mod mailbox;
pub mod nvic;
pub mod rtc;
pub mod spi;
pub mod timer;
pub mod uart;
pub mod usb;
pub mod watchdog;

use thiserror_no_std::Error;

pub use afe::Afe;
pub use clock::Clock;
pub use dma::Dma;
pub use gpio::Gpio;
pub use i2c::{MasterI2c, SlaveI2c, UninitializedI2c};
pub use spi::{Spi, SpiInterface};
pub use uart::{Uart, UartPort};
pub use usb::Usb;

/// Frequency of the RC oscillator after reset, before any trim is applied.
pub const RC_OSC_DEFAULT_FREQUENCY: u32 = 3_000_000;
/// Frequency of the external crystal oscillator.
pub const XTAL_FREQUENCY: u32 = 16_000_000;
/// Frequency of the external clock input, when the board provides one.
pub const EXT_CLK_FREQUENCY: u32 = 1_000_000;

#[derive(Debug, Error)]
pub enum HalError {
    #[error("Error: timeout occured")]
    Timeout,
    #[error("Error on the i2c bus")]
    I2cBus,
    #[error("No calibration entry for the requested RC frequency")]
    ClockCalibration,
    #[error("Mailbox error: {0}")]
    Mailbox(#[from] mailbox::MailboxError),
}

/// Contains the peripherals of the Q32M210 that are handed to the
/// application rather than held in HAL globals.
pub struct Peripherals {
    pub spi0: Spi,
    pub spi1: Spi,
    pub i2c: UninitializedI2c,
    pub dma: Dma,
    pub usb: Usb,
    pub timers: timer::Timers,
    pub lcd: lcd::Lcd,
}

impl Peripherals {
    /// Initializes all peripherals and returns them.
    pub fn take() -> Option<Peripherals> {
        let cortex_m::peripheral::Peripherals { SYST, NVIC, .. } =
            cortex_m::peripheral::Peripherals::take()?;

        let q32m210_device::Peripherals {
            AFE,
            CLK,
            GPIO,
            TIMER,
            UART0,
            UART1,
            SPI0,
            SPI1,
            I2C,
            DMA,
            USB,
            LCD,
            ..
        } = q32m210_device::Peripherals::take()?;

        Clock::init(CLK);
        Afe::init(AFE);
        Gpio::init(GPIO);
        Uart::init(UART0, UART1);
        nvic::init(NVIC);
        timer::init_systick(SYST);
        led::init();

        Some(Peripherals {
            spi0: Spi::new_spi0(SPI0),
            spi1: Spi::new_spi1(SPI1),
            i2c: UninitializedI2c::new(I2C),
            dma: Dma::new(DMA),
            usb: Usb::new(USB),
            timers: timer::Timers::new(TIMER),
            lcd: lcd::Lcd::new(LCD),
        })
    }
}
