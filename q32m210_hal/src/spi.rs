use q32m210_device::spi::{SpiRegisters, CTRL0, CTRL1};
use q32m210_device::{SPI0, SPI1};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::Clock;

/// Index of a SPI interface. The two interfaces carry identical register
/// blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpiInterface {
    Spi0,
    Spi1,
}

/// Transfer word width.
#[derive(Debug, Clone, Copy)]
pub enum WordSize {
    Bits8,
    Bits16,
    Bits24,
    Bits32,
}

/// Static configuration of a SPI interface.
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    pub master: bool,
    /// Manual mode leaves transfer pacing to software strobes.
    pub auto: bool,
    pub inverse_polarity: bool,
    pub serial_pullup: bool,
    /// Serial clock is the interface clock divided by 2^(prescale + 1).
    pub prescale: u32,
    pub overrun_int: bool,
    pub underrun_int: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        SpiConfig {
            master: true,
            auto: false,
            inverse_polarity: false,
            serial_pullup: false,
            prescale: 0,
            overrun_int: false,
            underrun_int: false,
        }
    }
}

/// One SPI interface.
pub struct Spi {
    regs: &'static SpiRegisters,
    interface: SpiInterface,
}

impl Spi {
    pub fn new_spi0(_spi0: SPI0) -> Spi {
        Spi {
            // safety: the proxy is consumed, so this is the only handle
            regs: unsafe { &*SPI0::PTR },
            interface: SpiInterface::Spi0,
        }
    }

    pub fn new_spi1(_spi1: SPI1) -> Spi {
        Spi {
            // safety: the proxy is consumed, so this is the only handle
            regs: unsafe { &*SPI1::PTR },
            interface: SpiInterface::Spi1,
        }
    }

    pub fn interface(&self) -> SpiInterface {
        self.interface
    }

    /// Applies the static configuration and enables the interface.
    pub fn configure(&mut self, config: SpiConfig) {
        Clock::with(|clock| clock.set_spi_clock_enabled(self.interface, true));

        self.regs.ctrl0.write(
            CTRL0::ENABLE::SET
                + CTRL0::MODE_SELECT.val(config.auto as u32)
                + CTRL0::CLK_POLARITY.val(config.inverse_polarity as u32)
                + CTRL0::CONTROLLER.val(config.master as u32)
                + CTRL0::SERI_PULLUP_ENABLE.val(config.serial_pullup as u32)
                + CTRL0::OVERRUN_INT_ENABLE.val(config.overrun_int as u32)
                + CTRL0::UNDERRUN_INT_ENABLE.val(config.underrun_int as u32)
                + CTRL0::PRESCALE.val(config.prescale),
        );

        self.set_idle();
    }

    /// Disables the interface.
    pub fn disable(&mut self) {
        self.regs.ctrl0.modify(CTRL0::ENABLE::CLEAR);
        self.set_idle();
    }

    fn is_busy(&self) -> bool {
        self.regs.ctrl1.is_set(CTRL1::START_BUSY)
    }

    fn word_size(size: WordSize) -> tock_registers::fields::FieldValue<u32, CTRL1::Register> {
        match size {
            WordSize::Bits8 => CTRL1::WORD_SIZE::Bits8,
            WordSize::Bits16 => CTRL1::WORD_SIZE::Bits16,
            WordSize::Bits24 => CTRL1::WORD_SIZE::Bits24,
            WordSize::Bits32 => CTRL1::WORD_SIZE::Bits32,
        }
    }

    /// Shifts a word out, holding chip select low afterwards so a
    /// multi-word transaction can continue.
    pub fn write(&mut self, value: u32, size: WordSize) {
        self.regs.data.set(value);
        self.regs.ctrl1.write(
            CTRL1::START_BUSY::SET + CTRL1::RW_CMD::Write + CTRL1::CS::Low + Self::word_size(size),
        );

        while self.is_busy() {}
    }

    /// Shifts a word in, holding chip select low afterwards.
    pub fn read(&mut self, size: WordSize) -> u32 {
        self.regs.ctrl1.write(
            CTRL1::START_BUSY::SET + CTRL1::RW_CMD::Read + CTRL1::CS::Low + Self::word_size(size),
        );

        while self.is_busy() {}

        self.regs.data.get()
    }

    /// Ends the transaction: chip select returns high and the interface
    /// goes idle.
    pub fn set_idle(&mut self) {
        self.regs
            .ctrl1
            .write(CTRL1::RW_CMD::Write + CTRL1::CS::High + CTRL1::WORD_SIZE::Bits8);
    }
}
