use crate::gpio::Gpio;

/// The evaluation board LEDs sit on the upper byte of the IF4 output bank.
const LED_SHIFT: u32 = 4;
const LED_MASK: u32 = 0xFF0;

/// Drives the eight board LEDs with the low byte of `pattern`.
pub fn set_pattern(pattern: u32) {
    Gpio::with(|gpio| {
        let other = gpio.if4_output() & !LED_MASK;
        gpio.set_if4_output(other | ((pattern << LED_SHIFT) & LED_MASK));
    });
}

pub fn all_off() {
    set_pattern(0);
}

pub fn all_on() {
    set_pattern(0xFF);
}

/// Initializes the LED bank to all off.
pub(crate) fn init() {
    all_off();
}
