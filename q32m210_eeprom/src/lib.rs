//! Driver for serial EEPROMs on the Q32M210's SPI interfaces.
//!
//! Transactions follow the common 25-series protocol: an opcode byte, a
//! 16-bit address, then data with chip select held low. Writes never cross
//! an EEPROM page internally; spans are split at page boundaries and each
//! page is committed and polled before the next begins.

#![no_std]

pub mod pages;

use core::time::Duration;

use q32m210_hal::spi::{Spi, SpiConfig, WordSize};
use q32m210_hal::timer;
use thiserror_no_std::Error;

use pages::page_spans;

/// EEPROM page size in bytes.
pub const PAGE_LENGTH: u16 = 64;

/// The 25-series opcode set.
pub mod opcode {
    pub const WRITE_STATUS: u8 = 0x01;
    pub const WRITE: u8 = 0x02;
    pub const READ: u8 = 0x03;
    pub const WRITE_DISABLE: u8 = 0x04;
    pub const READ_STATUS: u8 = 0x05;
    pub const WRITE_ENABLE: u8 = 0x06;
    pub const NOP: u8 = 0x00;
}

/// Write-in-progress bit of the status register.
const STATUS_BUSY_MASK: u8 = 0x01;
const STATUS_READY: u8 = 0x00;

const DEFAULT_COMMIT_DELAY_MS: u32 = 1;
const DEFAULT_COMMIT_TIMEOUT: u32 = 300;

#[derive(Debug, Error)]
pub enum EepromError {
    #[error("The EEPROM did not report ready within the commit timeout")]
    CommitTimeout,
}

/// Write-commit behavior of the attached part.
#[derive(Debug, Clone, Copy)]
pub struct EepromConfig {
    /// Delay between status polls while a write commits.
    pub commit_delay_ms: u32,
    /// Number of status polls before a commit is abandoned.
    pub commit_timeout: u32,
    /// Opcode that write-enables the part. Defaults to NOP; parts that
    /// protect writes need it set before the first write.
    pub write_enable_opcode: u8,
}

impl Default for EepromConfig {
    fn default() -> Self {
        EepromConfig {
            commit_delay_ms: DEFAULT_COMMIT_DELAY_MS,
            commit_timeout: DEFAULT_COMMIT_TIMEOUT,
            write_enable_opcode: opcode::NOP,
        }
    }
}

/// A serial EEPROM behind one SPI interface.
pub struct Eeprom {
    spi: Spi,
    config: EepromConfig,
}

impl Eeprom {
    /// Configures the SPI interface for EEPROM use and takes ownership of
    /// it.
    pub fn new(mut spi: Spi, prescale: u32) -> Eeprom {
        spi.configure(SpiConfig {
            master: true,
            auto: false,
            serial_pullup: true,
            prescale,
            ..Default::default()
        });

        Eeprom {
            spi,
            config: EepromConfig::default(),
        }
    }

    /// Disables the SPI interface and releases it.
    pub fn close(mut self) -> Spi {
        self.spi.disable();
        self.spi
    }

    pub fn set_commit_config(&mut self, delay_ms: u32, timeout: u32) {
        self.config.commit_delay_ms = delay_ms;
        self.config.commit_timeout = timeout;
    }

    pub fn write_enable_opcode(&self) -> u8 {
        self.config.write_enable_opcode
    }

    pub fn set_write_enable_opcode(&mut self, opcode: u8) {
        self.config.write_enable_opcode = opcode;
    }

    /// Returns the status bits read from the EEPROM.
    pub fn read_status(&mut self) -> u8 {
        self.spi.write(opcode::READ_STATUS as u32, WordSize::Bits8);
        let status = self.spi.read(WordSize::Bits8) as u8;
        self.spi.set_idle();

        status
    }

    /// Writes the status bits to the EEPROM.
    pub fn write_status(&mut self, status: u8) -> Result<(), EepromError> {
        self.write_enable();

        self.spi.write(opcode::WRITE_STATUS as u32, WordSize::Bits8);
        self.spi.write(status as u32, WordSize::Bits8);

        self.write_done()
    }

    /// Write-enables the EEPROM using the configured opcode.
    pub fn write_enable(&mut self) {
        self.spi
            .write(self.config.write_enable_opcode as u32, WordSize::Bits8);
        self.spi.set_idle();
    }

    /// Write-disables the EEPROM.
    pub fn write_disable(&mut self) {
        self.spi.write(opcode::WRITE_DISABLE as u32, WordSize::Bits8);
        self.spi.set_idle();
    }

    /// Readies the EEPROM for reading at `address`. Chip select is left
    /// low.
    pub fn read_init(&mut self, address: u16) {
        self.spi.write(opcode::READ as u32, WordSize::Bits8);
        self.spi.write(address as u32, WordSize::Bits16);
    }

    /// Readies the EEPROM for writing at `address`. Chip select is left
    /// low; the part must be write-enabled.
    pub fn write_init(&mut self, address: u16) {
        self.spi.write(opcode::WRITE as u32, WordSize::Bits8);
        self.spi.write(address as u32, WordSize::Bits16);
    }

    /// Reads the next byte of an open read transaction.
    pub fn read_byte(&mut self) -> u8 {
        self.spi.read(WordSize::Bits8) as u8
    }

    /// Writes the next byte of an open write transaction.
    pub fn write_byte(&mut self, data: u8) {
        self.spi.write(data as u32, WordSize::Bits8);
    }

    /// Reads the next little-endian word of an open read transaction.
    pub fn read_word(&mut self) -> u32 {
        let mut bytes = [0; 4];
        for byte in bytes.iter_mut() {
            *byte = self.read_byte();
        }

        u32::from_le_bytes(bytes)
    }

    /// Writes a word into an open write transaction, little-endian.
    pub fn write_word(&mut self, data: u32) {
        for byte in data.to_le_bytes() {
            self.write_byte(byte);
        }
    }

    /// Closes a read transaction by pulling chip select high.
    pub fn read_done(&mut self) {
        self.spi.set_idle();
    }

    /// Pulls chip select high and polls until the EEPROM has committed the
    /// written buffer to memory.
    pub fn write_done(&mut self) -> Result<(), EepromError> {
        self.spi.set_idle();

        for _ in 0..self.config.commit_timeout {
            timer::sleep(Duration::from_millis(self.config.commit_delay_ms as u64));

            if self.read_status() & STATUS_BUSY_MASK == STATUS_READY {
                return Ok(());
            }
        }

        Err(EepromError::CommitTimeout)
    }

    /// Reads `buffer.len()` bytes starting at `address`.
    pub fn read(&mut self, address: u16, buffer: &mut [u8]) {
        self.read_init(address);

        for byte in buffer.iter_mut() {
            *byte = self.read_byte();
        }

        self.read_done();
    }

    /// Writes `data` starting at `address`, splitting the span at page
    /// boundaries and committing each page before the next begins.
    ///
    /// The write-enable opcode must be configured and the span must lie
    /// outside any write-protected blocks.
    pub fn write(&mut self, address: u16, data: &[u8]) -> Result<(), EepromError> {
        for span in page_spans(address, data.len(), PAGE_LENGTH) {
            self.write_enable();
            self.write_init(span.address);

            for byte in &data[span.range()] {
                self.write_byte(*byte);
            }

            self.write_done()?;
        }

        Ok(())
    }
}
