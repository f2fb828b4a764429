use core::fmt::{self, Write};

use once_cell::sync::OnceCell;
use q32m210_device::uart::{CTRL, STATUS};
use q32m210_device::{UART0, UART1};
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};

use crate::clock::Clock;

static UART: OnceCell<Uart> = OnceCell::new();

/// Gets a reference to the uart pair.
pub fn uart() -> &'static Uart {
    UART.get().expect("uart not yet initialized")
}

/// One of the two UART interfaces.
#[derive(Debug, Clone, Copy)]
pub enum UartPort {
    Uart0,
    Uart1,
}

/// Both UART interfaces.
///
/// UART0 doubles as the debug console through the `uprint!` macros.
pub struct Uart {
    uart0: UART0,
    uart1: UART1,
}

impl Uart {
    pub(crate) fn init(uart0: UART0, uart1: UART1) {
        let uart = Uart { uart0, uart1 };
        UART.set(uart).ok().expect("could not set uart global");
    }

    fn regs(&self, port: UartPort) -> &q32m210_device::uart::UartRegisters {
        match port {
            UartPort::Uart0 => &self.uart0,
            UartPort::Uart1 => &self.uart1,
        }
    }

    /// Enables the port and sets its baud rate from the current interface
    /// clock.
    pub fn configure(&self, port: UartPort, baud_rate: u32) {
        let freq = Clock::with(|clock| {
            match port {
                UartPort::Uart0 => clock.set_uart0_clock_enabled(true),
                UartPort::Uart1 => clock.set_uart1_clock_enabled(true),
            }
            clock.interface_clock_frequency()
        });

        self.set_speed(port, baud_rate, freq);

        self.regs(port).ctrl.modify(CTRL::ENABLE::SET);
    }

    /// Sets the baud rate of the port for the given interface clock
    /// frequency.
    pub fn set_speed(&self, port: UartPort, baud_rate: u32, freq_in_hz: u32) {
        let (prescale, speed) = speed_setting(baud_rate, freq_in_hz);

        let regs = self.regs(port);
        regs.ctrl.modify(CTRL::PRESCALE_ENABLE.val(prescale as u32));
        regs.speed_ctrl.set(speed);
    }

    /// Returns the baud rate of the port for the given interface clock
    /// frequency.
    pub fn speed(&self, port: UartPort, freq_in_hz: u32) -> u32 {
        let regs = self.regs(port);
        let prescale = regs.ctrl.is_set(CTRL::PRESCALE_ENABLE);

        baud_from_setting(regs.speed_ctrl.get(), prescale, freq_in_hz)
    }

    pub fn set_interrupts(&self, port: UartPort, tx: bool, rx: bool) {
        self.regs(port)
            .ctrl
            .modify(CTRL::TX_INT_ENABLE.val(tx as u32) + CTRL::RX_INT_ENABLE.val(rx as u32));
    }

    /// Routes the port's data requests to the DMA controller instead of
    /// interrupts.
    pub fn set_dma(&self, port: UartPort, tx: bool, rx: bool) {
        self.regs(port)
            .ctrl
            .modify(CTRL::TX_DMA_ENABLE.val(tx as u32) + CTRL::RX_DMA_ENABLE.val(rx as u32));
    }

    fn is_transmit_busy(&self, port: UartPort) -> bool {
        self.regs(port).status.is_set(STATUS::TX_BUSY)
    }

    fn is_receive_ready(&self, port: UartPort) -> bool {
        self.regs(port).status.is_set(STATUS::RX_READY)
    }

    pub fn write_byte(&self, port: UartPort, byte: u8) {
        while self.is_transmit_busy(port) {}

        self.regs(port).tx_data.set(byte as u32);
    }

    pub fn read_byte(&self, port: UartPort) -> u8 {
        while !self.is_receive_ready(port) {}

        self.regs(port).rx_data.get() as u8
    }

    /// Reads a byte only if one is waiting. Used by receive interrupt
    /// handlers.
    pub fn try_read_byte(&self, port: UartPort) -> Option<u8> {
        if self.is_receive_ready(port) {
            Some(self.regs(port).rx_data.get() as u8)
        } else {
            None
        }
    }

    pub fn write_bytes(&self, port: UartPort, buffer: &[u8]) {
        for byte in buffer {
            self.write_byte(port, *byte);
        }
    }
}

// The uart registers are only touched with single volatile accesses, so
// sharing the handle cannot corrupt state. Interleaved writers may
// interleave characters.
unsafe impl Send for Uart {}
unsafe impl Sync for Uart {}

/// Calculates the prescale selection and `SPEED_CTRL` value for a baud
/// rate.
///
/// The setting uses a multiplier of 2^18, reduced appropriately to extend
/// the valid range of `baud_rate`; the prescaler stretches the divider by
/// a further factor of 12 for slow rates on fast clocks.
pub fn speed_setting(baud_rate: u32, freq_in_hz: u32) -> (bool, u32) {
    let prescale = freq_in_hz / baud_rate > 1024;
    let multiplier = 1 + 11 * prescale as u64;

    let speed = if baud_rate < 16384 {
        ((baud_rate as u64) << 14) * multiplier / ((freq_in_hz >> (18 - 14)) as u64)
    } else {
        ((baud_rate as u64) << 8) * multiplier / ((freq_in_hz >> (18 - 8)) as u64)
    };

    (prescale, speed as u32)
}

/// Inverse of [`speed_setting`]: the baud rate a `SPEED_CTRL` value
/// produces.
pub fn baud_from_setting(speed: u32, prescale: bool, freq_in_hz: u32) -> u32 {
    let scale = (1u64 << 18) * (1 + 11 * prescale as u64);

    ((speed as u64 * freq_in_hz as u64) / scale) as u32
}

struct UartWriter;

impl Write for UartWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        uart().write_bytes(UartPort::Uart0, s.as_bytes());

        Ok(())
    }
}

#[doc(hidden)]
pub fn _uprint(args: fmt::Arguments) {
    let _ = UartWriter.write_fmt(args);
}

/// Prints to the debug uart
#[macro_export]
macro_rules! uprint {
    ($($arg:tt)*) => ($crate::uart::_uprint(format_args!($($arg)*)));
}

/// Prints to the debug uart
#[macro_export]
macro_rules! uprintln {
    () => ($crate::uprint!("\n"));
    ($($arg:tt)*) => ($crate::uprint!("{}\n", format_args!($($arg)*)));
}

#[cfg(test)]
mod test {
    use super::{baud_from_setting, speed_setting};

    #[test]
    fn fast_rates_skip_the_prescaler() {
        let (prescale, _) = speed_setting(115200, 16_000_000);
        assert!(!prescale);
    }

    #[test]
    fn slow_rates_on_fast_clocks_use_the_prescaler() {
        let (prescale, _) = speed_setting(300, 1_000_000);
        assert!(prescale);
    }

    #[test]
    fn setting_round_trips_within_one_percent() {
        for &(baud, freq) in &[
            (9600u32, 1_000_000u32),
            (115200, 16_000_000),
            (19200, 3_000_000),
            (230400, 16_000_000),
        ] {
            let (prescale, speed) = speed_setting(baud, freq);
            let recovered = baud_from_setting(speed, prescale, freq);

            let error = recovered.abs_diff(baud);
            assert!(
                error <= baud / 100,
                "baud {baud} freq {freq} recovered {recovered}"
            );
        }
    }
}
