//! Button handling and the sleep path.
//!
//! The wake/sleep button sits on IF5 pin 0, active low. A press raises
//! the GP1 pad interrupt, which starts timer 0; the press is confirmed
//! only after the timer has expired a fixed number of times with the pin
//! still low, debouncing the contact. A confirmed press sends the main
//! loop into the shutdown sequence.

use core::cell::RefCell;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use cortex_m::interrupt::{free as interrupt_free, Mutex};
use q32m210_device::interrupt;
use q32m210_hal::gpio::{Gpio, GpioIntConfig, GpioIntEdge, GpioIntSource};
use q32m210_hal::timer::{Timer, TimerConfig, Timers};
use q32m210_hal::afe;

/// Consecutive timer-0 expiries with the button held before a press
/// counts.
const DEBOUNCE_TIMEOUTS: u32 = 10;

/// IF5 pin the button drives, active low.
const BUTTON_PIN: u32 = 0;
const BUTTON_PIN_MASK: u32 = 1 << BUTTON_PIN;

/// Timer 0 prescale: 2^7 = 128.
const TIMER0_PRESCALE: u32 = 7;

static TIMERS: Mutex<RefCell<Option<Timers>>> = Mutex::new(RefCell::new(None));

static TIMER0_RUNNING: AtomicBool = AtomicBool::new(false);
static TIMER0_TIMEOUTS: AtomicU32 = AtomicU32::new(0);
static BUTTON_PRESSED: AtomicBool = AtomicBool::new(false);

/// Timer-0 timeout count for the debounce interval at the given system
/// clock frequency (about 5 ms per expiry).
pub fn debounce_timeout_value(sysclock_hz: u32) -> u16 {
    (sysclock_hz / 128 / 80) as u16
}

/// Takes the timers, arms timer 0 for debouncing, and routes the button
/// to the GP1 pad interrupt.
pub fn init(mut timers: Timers, sysclock_hz: u32) {
    timers.configure(
        Timer::Timer0,
        TimerConfig {
            timeout_value: debounce_timeout_value(sysclock_hz),
            prescale: TIMER0_PRESCALE,
            one_shot: true,
        },
    );

    interrupt_free(|token| {
        let mut global = TIMERS.borrow(token).borrow_mut();
        assert!(global.is_none(), "power timers already initialized");
        *global = Some(timers);
    });

    Gpio::with(|gpio| {
        gpio.configure_interrupt(
            GpioIntSource::Gp1,
            GpioIntConfig {
                interface: 5,
                pin: BUTTON_PIN,
                edge: GpioIntEdge::Falling,
                debounce: true,
            },
        );
    });
}

/// Reconfigures the debounce interval after a system clock change.
pub fn set_debounce_period(sysclock_hz: u32) {
    with_timers(|timers| {
        timers.configure(
            Timer::Timer0,
            TimerConfig {
                timeout_value: debounce_timeout_value(sysclock_hz),
                prescale: TIMER0_PRESCALE,
                one_shot: true,
            },
        );
    });
}

fn with_timers(f: impl FnOnce(&mut Timers)) {
    interrupt_free(|token| {
        if let Some(timers) = TIMERS.borrow(token).borrow_mut().as_mut() {
            f(timers);
        }
    });
}

/// Whether a debounced button press has been confirmed.
pub fn button_pressed() -> bool {
    BUTTON_PRESSED.load(Ordering::Relaxed)
}

/// Records a press without the button, used when the system wakes from
/// sleep and the press already happened.
pub fn mark_pressed() {
    BUTTON_PRESSED.store(true, Ordering::Relaxed);
}

/// Routes the button pin to the wakeup logic and enters sleep mode. The
/// RTC alarm must already be armed; waking reboots through the ROM.
pub fn enter_sleep() -> ! {
    Gpio::with(|gpio| gpio.enable_wakeup_pin(BUTTON_PIN));

    afe::sleep()
}

#[allow(non_snake_case)]
#[interrupt]
fn GPIO_GP1() {
    // start the debounce timer on the first edge only
    if !TIMER0_RUNNING.swap(true, Ordering::Relaxed) {
        with_timers(|timers| timers.start(Timer::Timer0));
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn TIMER0() {
    let timeouts = TIMER0_TIMEOUTS.fetch_add(1, Ordering::Relaxed) + 1;

    let still_held = Gpio::with(|gpio| gpio.if5_inputs() & BUTTON_PIN_MASK == 0);

    if still_held {
        if timeouts == DEBOUNCE_TIMEOUTS {
            BUTTON_PRESSED.store(true, Ordering::Relaxed);
            TIMER0_RUNNING.store(false, Ordering::Relaxed);
            TIMER0_TIMEOUTS.store(0, Ordering::Relaxed);
        } else {
            // keep sampling the pin
            with_timers(|timers| timers.start(Timer::Timer0));
        }
    } else {
        // released early: a bounce, not a press
        TIMER0_RUNNING.store(false, Ordering::Relaxed);
        TIMER0_TIMEOUTS.store(0, Ordering::Relaxed);
    }
}
