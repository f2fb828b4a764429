//! Watchdog register block.

use tock_registers::register_structs;
use tock_registers::registers::WriteOnly;

register_structs! {
    pub WatchdogRegisters {
        (0x000 => pub refresh_ctrl: WriteOnly<u32>),
        (0x004 => @END),
    }
}

/// Value that restarts the watchdog counter when written to
/// `refresh_ctrl`.
pub const REFRESH_KEY: u32 = 0x5A;
