use core::cell::RefCell;
use core::ops::Add;
use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::{syst::SystClkSource, SYST};
use cortex_m_rt::exception;
use q32m210_device::timer::{CTRL_STATUS_OFFSET, TIMER_CTRL};
use q32m210_device::{bitband, TIMER};
use tock_registers::interfaces::Writeable;

use crate::clock::Clock;
use crate::{watchdog, HalError};

const SYSTICK_RELOAD_VAL: u32 = 0xffffff;

/// Represents an instant in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant {
    time_since_boot: Duration,
}

impl Instant {
    /// Get an instant for the current time.
    pub fn now() -> Instant {
        let (current_tick, wrap_count) = interrupt::free(|token| {
            let mut systick_ref = SYSTICK.borrow(token).borrow_mut();

            let systick = systick_ref.as_mut().expect("timer not initialized");

            let current_tick = SYST::get_current();

            if systick.has_wrapped() {
                // a wrap occured, use the new wrap count with this tick
                let wrap_count = WRAP_COUNT.fetch_add(1, Ordering::Relaxed) + 1;

                (current_tick, wrap_count)
            } else {
                (current_tick, WRAP_COUNT.load(Ordering::Relaxed))
            }
        });

        // current tick subtracted from reload val because it counts down
        let total_ticks = (wrap_count as u64 * SYSTICK_RELOAD_VAL as u64)
            + (SYSTICK_RELOAD_VAL - current_tick) as u64;

        let sysclock_freq = Clock::with(|clock| clock.sysclock_frequency()) as u64;

        // calculate seconds and microseconds seperately to avoid
        // potential overflow when ticks are multiplied by 1_000_000
        let seconds = total_ticks / sysclock_freq;
        let remaining_ticks = total_ticks % sysclock_freq;

        let remaining_microseconds = (remaining_ticks * 1_000_000) / sysclock_freq;
        let total_microseconds = (seconds * 1_000_000) + remaining_microseconds;

        Instant {
            time_since_boot: Duration::from_micros(total_microseconds),
        }
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        Instant {
            time_since_boot: self.time_since_boot + rhs,
        }
    }
}

/// Spins until the given duration has fully ellapsed, keeping the watchdog
/// alive.
pub fn sleep(duration: Duration) {
    let start = Instant::now();
    let end = start + duration;

    while Instant::now() < end {
        watchdog::refresh();
    }
}

/// Runs the function, returns the result or an error if it took too long
pub fn timeout<T>(f: impl FnOnce() -> T, timeout_len: Duration) -> Result<T, HalError> {
    let start = Instant::now();
    let result = f();
    let end = Instant::now();

    if start + timeout_len < end {
        Err(HalError::Timeout)
    } else {
        Ok(result)
    }
}

/// Initializes the systick time base
pub(crate) fn init_systick(mut systick: SYST) {
    interrupt::free(|token| {
        systick.set_reload(SYSTICK_RELOAD_VAL);
        systick.clear_current();
        systick.enable_counter();
        systick.set_clock_source(SystClkSource::Core);
        systick.enable_interrupt();

        let mut systick_ref = SYSTICK.borrow(token).borrow_mut();
        *systick_ref = Some(systick);
    })
}

static SYSTICK: Mutex<RefCell<Option<SYST>>> = Mutex::new(RefCell::new(None));
static WRAP_COUNT: AtomicU32 = AtomicU32::new(0);

#[exception]
fn SysTick() {
    interrupt::free(|token| {
        let mut systick_ref = SYSTICK.borrow(token).borrow_mut();

        let systick = systick_ref.as_mut().expect("timer not initialized");

        if systick.has_wrapped() {
            WRAP_COUNT.fetch_add(1, Ordering::Relaxed);
        }
    })
}

/// One of the general-purpose timers.
#[derive(Debug, Clone, Copy)]
pub enum Timer {
    Timer0 = 0,
    Timer1 = 1,
    Timer2 = 2,
    Timer3 = 3,
}

/// Configuration of a general-purpose timer.
#[derive(Debug, Clone, Copy)]
pub struct TimerConfig {
    /// Timeout count in prescaled clock ticks.
    pub timeout_value: u16,
    /// Timer clock is the system clock divided by 2^prescale.
    pub prescale: u32,
    /// Stop after one timeout instead of free-running.
    pub one_shot: bool,
}

/// The general-purpose timers 0-3.
pub struct Timers {
    regs: TIMER,
}

impl Timers {
    pub(crate) fn new(regs: TIMER) -> Self {
        Timers { regs }
    }

    pub fn configure(&mut self, timer: Timer, config: TimerConfig) {
        let value = TIMER_CTRL::TIMEOUT_VALUE.val(config.timeout_value as u32)
            + TIMER_CTRL::PRESCALE.val(config.prescale)
            + TIMER_CTRL::MODE.val(config.one_shot as u32);

        match timer {
            Timer::Timer0 => self.regs.timer0_ctrl.write(value),
            Timer::Timer1 => self.regs.timer1_ctrl.write(value),
            Timer::Timer2 => self.regs.timer2_ctrl.write(value),
            Timer::Timer3 => self.regs.timer3_ctrl.write(value),
        }
    }

    /// Starts a timer.
    ///
    /// The run bit is written through its bit-band alias, leaving the other
    /// timers' bits untouched so concurrent starts and stops cannot race on
    /// a read-modify-write of the shared status register.
    pub fn start(&mut self, timer: Timer) {
        // safety: writing the run bit of the status register is the
        // documented start strobe
        unsafe {
            bitband::write(Self::ctrl_status_addr(), timer as u32, true);
        }
    }

    /// Stops a timer. See [`Timers::start`] for the access pattern.
    pub fn stop(&mut self, timer: Timer) {
        // safety: writing the run bit of the status register is the
        // documented stop strobe
        unsafe {
            bitband::write(Self::ctrl_status_addr(), timer as u32, false);
        }
    }

    fn ctrl_status_addr() -> usize {
        TIMER::PTR as usize + CTRL_STATUS_OFFSET
    }
}
