use q32m210_device::watchdog::REFRESH_KEY;
use q32m210_device::WATCHDOG;
use tock_registers::interfaces::Writeable;

/// Restarts the watchdog counter.
///
/// Called from every wait loop in the system; the write is a fire-and-
/// forget strobe so no locking is needed.
#[inline]
pub fn refresh() {
    // safety: the refresh register is write-only and a single strobe, so
    // concurrent refreshes cannot corrupt state
    let regs = unsafe { &*WATCHDOG::PTR };
    regs.refresh_ctrl.set(REFRESH_KEY);
}
