use core::cell::RefCell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m::interrupt::{free as interrupt_free, Mutex};
use cortex_m::peripheral::NVIC;
use q32m210_device::i2c::{ADDR_START, CMD, CTRL0, STATUS};
use q32m210_device::{interrupt, Interrupt, I2C};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::Clock;
use crate::mailbox::{Mailbox, MailboxError};
use crate::HalError;

/// Longest command frame a slave transaction carries: one command byte
/// plus the data bytes that belong to it.
pub const MAX_I2C_FRAME_LEN: usize = 16;

pub type I2cAddr = u8;

/// Shape of one command in the slave's protocol: how many data bytes the
/// master writes after the command byte.
#[derive(Debug, Clone, Copy)]
pub struct SlaveCommand {
    pub opcode: u8,
    pub write_len: usize,
}

struct I2cInner {
    regs: I2C,
}

impl I2cInner {
    fn has_error(&self) -> bool {
        let status = self.regs.status.extract();
        status.is_set(STATUS::BUS_ERROR) || status.is_set(STATUS::ERROR)
    }

    fn is_data_requested(&self) -> bool {
        self.regs.status.is_set(STATUS::DATA_REQUEST)
    }

    fn reset(&self) {
        self.regs.cmd.write(CMD::RESET::SET);
    }

    fn set_frequency(&self, hz: u32) {
        let interface_clock = Clock::with(|clock| clock.interface_clock_frequency());

        // bus clock is interface clock / 2^(prescale + 1); pick the first
        // divider at or below the requested rate
        let mut prescale = 0;
        while (interface_clock >> (prescale + 1)) > hz && prescale < 63 {
            prescale += 1;
        }

        self.regs.ctrl0.modify(CTRL0::PRESCALE.val(prescale));
    }

    /// Spins until the interface requests the next data byte.
    fn await_data_request(&self) -> Result<(), HalError> {
        while !self.is_data_requested() {
            if self.has_error() {
                self.reset();
                return Err(HalError::I2cBus);
            }
        }

        Ok(())
    }
}

pub struct UninitializedI2c(I2cInner);

impl UninitializedI2c {
    pub(crate) fn new(regs: I2C) -> Self {
        UninitializedI2c(I2cInner { regs })
    }

    fn init_common(&self) {
        Clock::with(|clock| clock.set_i2c_clock_enabled(true));

        self.0.reset();
        self.0.regs.ctrl0.modify(CTRL0::ENABLE::SET);
    }

    pub fn init_master(self, frequency_hz: u32) -> MasterI2c {
        self.init_common();
        self.0.set_frequency(frequency_hz);

        MasterI2c(self.0)
    }

    /// Configures the interface as a bus slave answering `address`, serving
    /// the command set described by `commands`.
    pub fn init_slave(
        self,
        frequency_hz: u32,
        address: I2cAddr,
        commands: &'static [SlaveCommand],
    ) -> SlaveI2c {
        self.init_common();
        self.0.set_frequency(frequency_hz);

        self.0.regs.ctrl0.modify(
            CTRL0::SLAVE_ADDRESS.val(address as u32)
                + CTRL0::SLAVE_ENABLE::SET
                + CTRL0::INT_ENABLE::SET,
        );

        interrupt_free(|token| {
            let mut handler_state = HANDLER_STATE.borrow(token).borrow_mut();
            assert!(
                handler_state.is_none(),
                "i2c handler state already initialized"
            );

            *handler_state = Some(I2cSlaveState {
                i2c: self.0,
                transaction: SlaveTransaction::Idle,
                commands,
                frame: [0; MAX_I2C_FRAME_LEN],
                frame_len: 0,
                index: 0,
            });
        });

        // safety: the i2c interrupt has not run yet, so it cannot be inside
        // a critical section that this unmasking would break
        unsafe {
            NVIC::unmask(Interrupt::I2C);
        }

        SlaveI2c(PhantomData)
    }
}

pub struct MasterI2c(I2cInner);

impl MasterI2c {
    fn start_write(&self, address: I2cAddr) {
        self.0
            .regs
            .addr_start
            .write(ADDR_START::DIRECTION::Write + ADDR_START::ADDRESS.val(address as u32));
    }

    fn start_read(&self, address: I2cAddr) {
        self.0
            .regs
            .addr_start
            .write(ADDR_START::DIRECTION::Read + ADDR_START::ADDRESS.val(address as u32));
    }

    fn stop(&self) {
        self.0.regs.cmd.write(CMD::STOP::SET);

        while self.0.regs.status.is_set(STATUS::BUSY) {}
    }

    /// Runs one command transaction against the slave at `address`: the
    /// command byte, then `tx` written out, then exactly `rx.len()` bytes
    /// read back over a repeated start.
    ///
    /// A bus or protocol error resets the interface and aborts the
    /// transaction.
    pub fn transact(
        &mut self,
        address: I2cAddr,
        command: u8,
        tx: &[u8],
        rx: &mut [u8],
    ) -> Result<(), HalError> {
        assert!(1 + tx.len() <= MAX_I2C_FRAME_LEN);
        assert!(rx.len() < MAX_I2C_FRAME_LEN);

        self.start_write(address);

        self.0.await_data_request()?;
        self.0.regs.data.set(command as u32);

        for byte in tx {
            self.0.await_data_request()?;
            self.0.regs.data.set(*byte as u32);
        }

        if !rx.is_empty() {
            // repeated start to turn the bus around
            self.0.await_data_request()?;
            self.start_read(address);

            let last = rx.len() - 1;
            for (i, byte) in rx.iter_mut().enumerate() {
                self.0.await_data_request()?;
                *byte = self.0.regs.data.get() as u8;

                if i == last {
                    self.0.regs.cmd.write(CMD::NACK::SET + CMD::LAST_DATA::SET);
                } else {
                    self.0.regs.cmd.write(CMD::ACK::SET);
                }
            }
        }

        self.stop();

        if self.0.has_error() {
            self.0.reset();
            Err(HalError::I2cBus)
        } else {
            Ok(())
        }
    }

    /// Writes raw bytes to the slave at `address` without the command
    /// framing.
    pub fn send(&mut self, address: I2cAddr, data: &[u8]) -> Result<(), HalError> {
        self.start_write(address);

        for byte in data {
            self.0.await_data_request()?;
            self.0.regs.data.set(*byte as u32);
        }

        self.stop();

        if self.0.has_error() {
            self.0.reset();
            Err(HalError::I2cBus)
        } else {
            Ok(())
        }
    }
}

static SLAVE_RECEIVE: Mailbox<MAX_I2C_FRAME_LEN> = Mailbox::new();
static SLAVE_SEND: Mailbox<MAX_I2C_FRAME_LEN> = Mailbox::new();
static SLAVE_ERROR: AtomicBool = AtomicBool::new(false);

pub struct SlaveI2c(PhantomData<()>);

impl SlaveI2c {
    /// Waits for the next command frame from the master. The first byte is
    /// the command, the rest its data.
    pub fn recv<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], HalError> {
        loop {
            match SLAVE_RECEIVE.try_take(buf) {
                Ok(data) => {
                    let len = data.len();
                    return Ok(&buf[..len]);
                }
                Err(MailboxError::Busy) => crate::watchdog::refresh(),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Stages the response the engine hands to the master's next read.
    pub fn send(&self, data: &[u8]) -> Result<(), HalError> {
        loop {
            match SLAVE_SEND.try_commit(data) {
                Ok(()) => return Ok(()),
                Err(MailboxError::Busy) => crate::watchdog::refresh(),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reports and clears the engine's error flag.
    pub fn take_error(&self) -> bool {
        SLAVE_ERROR.swap(false, Ordering::Relaxed)
    }
}

/// Slave transaction progress, advanced from the interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlaveTransaction {
    /// Waiting to be addressed.
    Idle,
    /// Addressed for write; the next byte is the command.
    Command,
    /// Receiving the command's data bytes.
    Receiving,
    /// Sending the staged response.
    Sending,
}

struct I2cSlaveState {
    i2c: I2cInner,
    transaction: SlaveTransaction,
    commands: &'static [SlaveCommand],
    frame: [u8; MAX_I2C_FRAME_LEN],
    frame_len: usize,
    index: usize,
}

impl I2cSlaveState {
    /// Resets the engine after an error, leaving the bus interface clean.
    fn error_reset(&mut self) {
        self.transaction = SlaveTransaction::Idle;
        self.index = 0;
        self.frame_len = 0;
        self.i2c.reset();
        SLAVE_ERROR.store(true, Ordering::Relaxed);
    }

    fn commit_frame(&mut self) {
        // nothing to do about a full mailbox here; the frame is dropped
        let _ = SLAVE_RECEIVE.try_commit(&self.frame[..self.frame_len]);

        self.index = 0;
        self.frame_len = 0;
        self.transaction = SlaveTransaction::Idle;
    }

    fn handle_command_byte(&mut self) {
        let command = self.i2c.regs.data.get() as u8;

        let Some(shape) = self
            .commands
            .iter()
            .find(|shape| shape.opcode == command)
        else {
            // unknown command: drop the transaction
            self.error_reset();
            return;
        };

        self.frame[0] = command;
        self.frame_len = 1 + shape.write_len;
        self.index = 1;

        if shape.write_len == 0 {
            self.commit_frame();
        } else {
            self.transaction = SlaveTransaction::Receiving;
        }
    }

    fn handle_interrupt(&mut self) {
        let status = self.i2c.regs.status.extract();

        if status.is_set(STATUS::BUS_ERROR) || status.is_set(STATUS::ERROR) {
            self.error_reset();
            return;
        }

        if status.is_set(STATUS::ADDRESSED) {
            match status.read_as_enum(STATUS::DIRECTION) {
                Some(STATUS::DIRECTION::Value::Write) | None => {
                    self.transaction = SlaveTransaction::Command;
                }
                Some(STATUS::DIRECTION::Value::Read) => {
                    // stage the response; an empty mailbox answers zeros
                    let mut staged = [0; MAX_I2C_FRAME_LEN];
                    let len = SLAVE_SEND
                        .try_take(&mut staged)
                        .map(|frame| frame.len())
                        .unwrap_or(MAX_I2C_FRAME_LEN);

                    self.frame = staged;
                    self.frame_len = len;
                    self.index = 0;
                    self.transaction = SlaveTransaction::Sending;
                }
            }
        }

        if !status.is_set(STATUS::DATA_REQUEST) {
            return;
        }

        match self.transaction {
            SlaveTransaction::Command => self.handle_command_byte(),
            SlaveTransaction::Receiving => {
                self.frame[self.index] = self.i2c.regs.data.get() as u8;
                self.index += 1;

                if self.index == self.frame_len {
                    self.commit_frame();
                }
            }
            SlaveTransaction::Sending => {
                let byte = if self.index < self.frame_len {
                    self.frame[self.index]
                } else {
                    0
                };
                self.index += 1;
                self.i2c.regs.data.set(byte as u32);

                if self.index >= self.frame_len {
                    self.index = 0;
                    self.frame_len = 0;
                    self.transaction = SlaveTransaction::Idle;
                }
            }
            SlaveTransaction::Idle => {
                // unexpected byte outside a transaction; drain it
                let _ = self.i2c.regs.data.get();
            }
        }

        if status.is_set(STATUS::STOP_DETECT) {
            self.transaction = SlaveTransaction::Idle;
        }
    }
}

static HANDLER_STATE: Mutex<RefCell<Option<I2cSlaveState>>> = Mutex::new(RefCell::new(None));

#[allow(non_snake_case)]
#[interrupt]
fn I2C() {
    interrupt_free(|token| {
        if let Some(state) = HANDLER_STATE.borrow(token).borrow_mut().as_mut() {
            state.handle_interrupt();
        }
    });
}
