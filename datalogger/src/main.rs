//! Capture firmware for the Q32M210 evaluation board.
//!
//! The device answers vendor HID command reports (identification, raw
//! memory access, ADC captures, RC clock trimming) in a watchdog-refresh
//! main loop. A debounced button press shuts the front end down, arms the
//! RTC alarm and puts the system to sleep; the alarm reboots it through
//! the ROM.

#![no_std]
#![no_main]

use core::panic::PanicInfo;

use cortex_m_rt::entry;
use q32m210_device::{Interrupt, PERIPHERAL_BASE, PRIVATE_PERIPHERAL_BASE, RAM_BASE};
use q32m210_hal::afe::Afe;
use q32m210_hal::clock::{Clock, RootClock, RtcRate};
use q32m210_hal::rtc::{self, RtcAlarm, RtcConfig};
use q32m210_hal::uart::UartPort;
use q32m210_hal::usb::{HidDevice, HID_REPORT_SIZE};
use q32m210_hal::{led, nvic, uprintln, watchdog, HalError, Peripherals};
use thiserror_no_std::Error;

use datalogger::command::{status, Command, MemRegion, VersionInfo, REPORT_SIZE};
use datalogger::{capture, command, power};

// command reports ride in HID reports one-to-one
const _: () = assert!(REPORT_SIZE == HID_REPORT_SIZE);

const DEBUG_BAUD: u32 = 115_200;

// identification answered to a version request
const SYSTEM_ID_FAMILY: u8 = 2;
const SYSTEM_ID_VERSION: u8 = 1;
const SYSTEM_ID_REVISION_MAJOR: u8 = 1;
const SYSTEM_ID_REVISION_MINOR: u8 = 0;
const APP_VENDOR_ID: u16 = 0x0EE2;
const APP_PRODUCT_ID: u16 = 0x2005;
const APP_VERSION_MAJOR: u8 = 1;
const APP_VERSION_MINOR: u8 = 0;
const APP_VERSION_REVISION: u8 = 0;

/// The boot ROM version word.
const ROM_VERSION_ADDR: usize = 0x0000_001C;

/// RTC alarm delay before a sleeping system reboots, in 16 Hz ticks.
const WAKE_ALARM_TICKS: u32 = 16 * 30;

/// RTC ticks the configuration load takes before sleep may be entered.
const RTC_CONFIG_TICKS: u32 = 4;

/// LED pattern shown when the firmware panics.
const PANIC_PATTERN: u32 = 0x81;

#[derive(Debug, Error)]
enum CommandError {
    #[error("invalid argument")]
    InvalidArg,
    #[error("hal error: {0}")]
    Hal(#[from] HalError),
}

impl CommandError {
    fn status_byte(&self) -> u8 {
        match self {
            CommandError::InvalidArg => status::ERR_INVALID_ARG,
            CommandError::Hal(_) => status::ERR_BUSY,
        }
    }
}

fn version_info() -> VersionInfo {
    // safety: the ROM version word is a fixed read-only location
    let rom_version = unsafe { core::ptr::read_volatile(ROM_VERSION_ADDR as *const u32) };

    VersionInfo {
        family: SYSTEM_ID_FAMILY,
        version: SYSTEM_ID_VERSION,
        revision_major: SYSTEM_ID_REVISION_MAJOR,
        revision_minor: SYSTEM_ID_REVISION_MINOR,
        rom_version,
        vendor_id: APP_VENDOR_ID,
        product_id: APP_PRODUCT_ID,
        app_major: APP_VERSION_MAJOR,
        app_minor: APP_VERSION_MINOR,
        app_revision: APP_VERSION_REVISION,
    }
}

fn region_base(region: MemRegion) -> usize {
    match region {
        MemRegion::Peripheral => PERIPHERAL_BASE,
        MemRegion::Ram => RAM_BASE,
        MemRegion::PrivatePeripheral => PRIVATE_PERIPHERAL_BASE,
    }
}

/// Runs one decoded command. `Ok(None)` means the command sends no
/// response; a started read-out is recorded in `stream`.
fn execute_command(
    cmd: Command,
    stream: &mut Option<usize>,
) -> Result<Option<[u8; REPORT_SIZE]>, CommandError> {
    match cmd {
        Command::GetVersionInfo => Ok(Some(command::encode_version(&version_info()))),
        Command::WriteMem {
            region,
            count,
            entries,
        } => {
            let base = region_base(region);

            for (offset, value) in entries[..count].iter() {
                // safety: the host-directed window writes mirror the
                // debug protocol; the host is trusted with the part
                unsafe {
                    core::ptr::write_volatile((base + *offset as usize) as *mut u32, *value);
                }
            }

            Ok(None)
        }
        Command::ReadMem {
            region,
            count,
            offsets,
        } => {
            let base = region_base(region);

            let mut words = [0u32; command::MAX_READ_WORDS];
            for (word, offset) in words[..count].iter_mut().zip(offsets.iter()) {
                // safety: see the write-memory path
                *word = unsafe {
                    core::ptr::read_volatile((base + *offset as usize) as *const u32)
                };
            }

            Ok(Some(command::encode_word_readout(&words[..count])))
        }
        Command::StartAdcCapture { channel, nsamples } => {
            capture::arm(channel, nsamples as usize);
            capture::start();

            while capture::state() != capture::CaptureState::Done {
                watchdog::refresh();
            }

            let (nsamples, channel0, channel1) = capture::with(|buffer| {
                let count = buffer.sample_count() as u16;
                let (channel0, channel1) = buffer.eval_stats();
                (count, channel0, channel1)
            });

            Ok(Some(command::encode_capture_stats(
                nsamples,
                &channel0,
                channel1.as_ref(),
            )))
        }
        Command::ReadCaptureData => {
            let mut report = [0; REPORT_SIZE];
            let sent = capture::with(|buffer| buffer.fill_report(0, &mut report));

            if sent > 0 {
                *stream = Some(sent);
            }

            Ok(Some(report))
        }
        Command::SetRcClockFreq { index } => {
            let freq = Clock::with(|clock| clock.set_rc_frequency(index as u32 * 100_000))
                .map_err(|_| CommandError::InvalidArg)?;

            // the debounce timer runs from the system clock; retune it
            power::set_debounce_period(freq);

            Ok(Some(command::encode_frequency(freq)))
        }
    }
}

/// Continues a capture read-out after the previous chunk reached the
/// host.
fn continue_stream(hid: &HidDevice, stream: &mut Option<usize>) {
    let Some(offset) = *stream else {
        return;
    };

    let mut report = [0; REPORT_SIZE];
    let sent = capture::with(|buffer| buffer.fill_report(offset, &mut report));

    if sent > 0 {
        *stream = Some(offset + sent);
        hid.send_report(&report);
    } else {
        *stream = None;
    }
}

fn handle_report(hid: &HidDevice, report: [u8; HID_REPORT_SIZE], stream: &mut Option<usize>) {
    // a new command ends any read-out in progress
    *stream = None;

    let response = match command::parse(&report) {
        Ok(cmd) => match execute_command(cmd, stream) {
            Ok(response) => response,
            Err(error) => {
                uprintln!("command failed: {}", error);
                Some(command::encode_status(error.status_byte()))
            }
        },
        Err(status_byte) => Some(command::encode_status(status_byte)),
    };

    if let Some(response) = response {
        hid.send_report(&response);
    }
}

fn initialize() -> Peripherals {
    let peripherals = Peripherals::take().expect("peripherals already taken");

    Clock::with(|clock| clock.select_root_clock(RootClock::RcOsc));

    q32m210_hal::uart::uart().configure(UartPort::Uart0, DEBUG_BAUD);

    nvic::clear_all_pending();
    for int in [Interrupt::WATCHDOG, Interrupt::GPIO_GP1, Interrupt::TIMER0] {
        nvic::enable(int);
    }

    peripherals
}

#[entry]
fn main() -> ! {
    let peripherals = initialize();

    // the retention register survives sleep: zero means a cold boot, so
    // a set value means the RTC alarm just woke us and the button press
    // that armed it already happened
    let woke_from_sleep = Afe::with(|afe| {
        if afe.retention() == 0 {
            afe.set_retention(1);
            false
        } else {
            true
        }
    });

    if woke_from_sleep {
        power::mark_pressed();
    }

    // safety: initialization is complete and no critical section is open
    unsafe {
        nvic::master_enable();
    }

    let sysclock = Clock::with(|clock| clock.sysclock_frequency());

    let hid = if woke_from_sleep {
        // back only to finish the shutdown sequence; leave the front end
        // and USB down
        None
    } else {
        capture::configure_frontend();

        // command handling must not starve the sample interrupt, so the
        // receive path runs at a lower priority than the ADC
        nvic::set_priority(Interrupt::USB_EP4OUT, 0x40);

        let mut usb = peripherals.usb;
        usb.initialize();
        usb.configure(true);
        Some(usb.init_hid())
    };

    power::init(peripherals.timers, sysclock);

    // configure the RTC while the main loop runs; the load completes
    // after a few ticks, counted through the tick interrupt
    rtc::reset_ticks();
    rtc::set_config(
        RtcRate::Hz16,
        RtcConfig {
            enabled: true,
            alarm_enabled: true,
            set_mode: true,
        },
        0,
        RtcAlarm {
            count: WAKE_ALARM_TICKS,
            relative: true,
        },
        false,
    )
    .expect("rtc configuration");
    nvic::enable(Interrupt::RTC_CLOCK);

    uprintln!("datalogger up, sysclock {} Hz", sysclock);

    let mut stream: Option<usize> = None;

    while !power::button_pressed() {
        watchdog::refresh();

        if let Some(hid) = hid.as_ref() {
            if let Some(report) = hid.try_recv_report() {
                handle_report(hid, report, &mut stream);
            }

            if hid.take_report_sent() {
                continue_stream(hid, &mut stream);
            }
        }
    }

    // shutdown: make sure the RTC configuration from startup completed
    while rtc::ticks() < RTC_CONFIG_TICKS {
        watchdog::refresh();
    }
    nvic::disable(Interrupt::RTC_CLOCK);

    led::all_off();

    // run mode with the alarm armed; waits for the load to take effect
    if let Err(error) = rtc::set_control(
        RtcConfig {
            enabled: true,
            alarm_enabled: true,
            set_mode: false,
        },
        true,
    ) {
        uprintln!("rtc load failed: {}", error);
    }

    power::enter_sleep()
}

#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    led::set_pattern(PANIC_PATTERN);
    loop {}
}
