use core::sync::atomic::{AtomicU32, Ordering};
use core::time::Duration;

use q32m210_device::afe::{INTERRUPT_STATUS, RTC_ALARM, RTC_CTRL};
use q32m210_device::{interrupt, Interrupt};
use tock_registers::interfaces::{Readable, Writeable};

use crate::afe::Afe;
use crate::clock::{Clock, RtcRate};
use crate::timer::Instant;
use crate::{nvic, watchdog, HalError};

/// RTC ticks a configuration load needs before it takes effect.
const CONFIG_LOAD_TICKS: u32 = 4;
/// Upper bound on a configuration load at the slowest tick rate.
const CONFIG_LOAD_TIMEOUT: Duration = Duration::from_secs(10);

static RTC_TICKS: AtomicU32 = AtomicU32::new(0);

/// Counter and alarm mode configuration of the real-time clock.
#[derive(Debug, Clone, Copy)]
pub struct RtcConfig {
    pub enabled: bool,
    pub alarm_enabled: bool,
    /// Set mode loads the counter; run mode lets it tick.
    pub set_mode: bool,
}

/// Alarm setting of the real-time clock.
#[derive(Debug, Clone, Copy)]
pub struct RtcAlarm {
    pub count: u32,
    /// A relative alarm fires `count` ticks from now; an absolute one when
    /// the counter reaches `count`.
    pub relative: bool,
}

/// RTC ticks observed since the counter was last reset.
pub fn ticks() -> u32 {
    RTC_TICKS.load(Ordering::Relaxed)
}

pub fn reset_ticks() {
    RTC_TICKS.store(0, Ordering::Relaxed);
}

fn ctrl_value(config: RtcConfig, load: bool) -> u32 {
    let value = RTC_CTRL::LOAD.val(load as u32)
        + RTC_CTRL::BIAS_ENABLE.val(config.enabled as u32)
        + RTC_CTRL::ALARM_ENABLE.val(config.alarm_enabled as u32)
        + RTC_CTRL::MODE.val(config.set_mode as u32);

    value.value
}

/// Waits until the RTC has ticked [`CONFIG_LOAD_TICKS`] times, refreshing
/// the watchdog while it spins.
fn await_config_load() -> Result<(), HalError> {
    nvic::clear_pending(Interrupt::RTC_CLOCK);
    nvic::enable(Interrupt::RTC_CLOCK);

    reset_ticks();

    let deadline = Instant::now() + CONFIG_LOAD_TIMEOUT;
    let result = loop {
        if ticks() >= CONFIG_LOAD_TICKS {
            break Ok(());
        }
        if Instant::now() > deadline {
            break Err(HalError::Timeout);
        }

        watchdog::refresh();
    };

    nvic::disable(Interrupt::RTC_CLOCK);

    result
}

/// Selects the real-time clock counter and alarm mode configuration.
///
/// Configuration changes have to be loaded into the RTC's clock domain,
/// which takes a few RTC ticks; with `wait` set the function blocks until
/// the load completes, counting tick interrupts rather than spinning a
/// calibrated delay.
pub fn set_control(config: RtcConfig, wait: bool) -> Result<(), HalError> {
    let needs_load = Afe::with(|afe| {
        let enable_bit = ctrl_value(
            RtcConfig {
                enabled: true,
                alarm_enabled: false,
                set_mode: false,
            },
            false,
        );

        let current = afe.regs().rtc_ctrl.get();
        let wanted = ctrl_value(config, false);

        if (wanted | enable_bit) != (current | enable_bit) {
            // load the settings that need synchronization
            afe.regs().rtc_ctrl.set(ctrl_value(
                RtcConfig {
                    enabled: true,
                    ..config
                },
                true,
            ));
            true
        } else {
            false
        }
    });

    if needs_load && wait {
        await_config_load()?;
    }

    // the final configuration, with the load strobe released
    Afe::with(|afe| afe.regs().rtc_ctrl.set(ctrl_value(config, false)));

    Ok(())
}

/// Configures all components of the RTC: tick rate, counter, alarm and
/// control mode.
pub fn set_config(
    rate: RtcRate,
    config: RtcConfig,
    count: u32,
    alarm: RtcAlarm,
    wait: bool,
) -> Result<(), HalError> {
    Clock::with(|clock| clock.set_rtc_rate(rate));

    Afe::with(|afe| {
        afe.regs().rtc_count.set(count);
        afe.regs().rtc_alarm.write(
            RTC_ALARM::COUNT.val(alarm.count) + RTC_ALARM::MODE.val(alarm.relative as u32),
        );
    });

    set_control(config, wait)
}

/// Current value of the real-time clock counter.
pub fn count() -> u32 {
    Afe::with(|afe| afe.regs().rtc_count.get())
}

#[allow(non_snake_case)]
#[interrupt]
fn RTC_CLOCK() {
    RTC_TICKS.fetch_add(1, Ordering::Relaxed);

    Afe::with(|afe| {
        afe.regs()
            .interrupt_status
            .write(INTERRUPT_STATUS::RTC_CLOCK_CLEAR::SET)
    });
}
