//! Interrupt controller support.
//!
//! Critical sections in this crate mask interrupts globally through
//! PRIMASK, never by masking individual NVIC lines, so unmasking a line
//! here cannot break a critical section elsewhere.

use core::cell::RefCell;

use cortex_m::interrupt::{self, Mutex};
use cortex_m::peripheral::{NVIC, SCB};
use q32m210_device::Interrupt;

static NVIC_PERIPHERAL: Mutex<RefCell<Option<NVIC>>> = Mutex::new(RefCell::new(None));

const NUM_EXTERNAL_INTERRUPT_REGS: usize = 2;

// SHCSR bit positions for the configurable fault exceptions
const MEMFAULT_ENA: u32 = 1 << 16;
const BUSFAULT_ENA: u32 = 1 << 17;
const USGFAULT_ENA: u32 = 1 << 18;
const MEMFAULT_PENDED: u32 = 1 << 13;
const BUSFAULT_PENDED: u32 = 1 << 14;
const USGFAULT_PENDED: u32 = 1 << 12;
const MEMFAULT_ACT: u32 = 1 << 0;
const BUSFAULT_ACT: u32 = 1 << 1;
const USGFAULT_ACT: u32 = 1 << 3;

const AIRCR_VECTOR_KEY: u32 = 0x5FA;
const AIRCR_VECTKEY_POS: u32 = 16;
const AIRCR_VECTRESET: u32 = 1;

/// The configurable Cortex-M3 fault exceptions.
#[derive(Debug, Clone, Copy)]
pub enum Fault {
    MemoryManagement,
    BusFault,
    UsageFault,
}

impl Fault {
    fn enable_mask(self) -> u32 {
        match self {
            Fault::MemoryManagement => MEMFAULT_ENA,
            Fault::BusFault => BUSFAULT_ENA,
            Fault::UsageFault => USGFAULT_ENA,
        }
    }

    fn pending_mask(self) -> u32 {
        match self {
            Fault::MemoryManagement => MEMFAULT_PENDED,
            Fault::BusFault => BUSFAULT_PENDED,
            Fault::UsageFault => USGFAULT_PENDED,
        }
    }

    fn active_mask(self) -> u32 {
        match self {
            Fault::MemoryManagement => MEMFAULT_ACT,
            Fault::BusFault => BUSFAULT_ACT,
            Fault::UsageFault => USGFAULT_ACT,
        }
    }
}

pub(crate) fn init(nvic: NVIC) {
    interrupt::free(|token| {
        let mut global = NVIC_PERIPHERAL.borrow(token).borrow_mut();
        *global = Some(nvic);
    })
}

/// Unmasks interrupts globally.
///
/// # Safety
///
/// Must not be called from inside a critical section.
pub unsafe fn master_enable() {
    unsafe { interrupt::enable() }
}

/// Masks interrupts globally.
pub fn master_disable() {
    interrupt::disable();
}

pub fn enable(int: Interrupt) {
    // safety: see the module note on critical sections
    unsafe {
        NVIC::unmask(int);
    }
}

pub fn disable(int: Interrupt) {
    NVIC::mask(int);
}

pub fn pend(int: Interrupt) {
    NVIC::pend(int);
}

pub fn clear_pending(int: Interrupt) {
    NVIC::unpend(int);
}

pub fn is_pending(int: Interrupt) -> bool {
    NVIC::is_pending(int)
}

/// Sets the priority of an interrupt source. Smaller values preempt
/// larger ones.
pub fn set_priority(int: Interrupt, priority: u8) {
    interrupt::free(|token| {
        let mut nvic = NVIC_PERIPHERAL.borrow(token).borrow_mut();
        let nvic = nvic.as_mut().expect("nvic not initialized");

        // safety: changing priorities only reorders preemption; see the
        // module note on critical sections
        unsafe {
            nvic.set_priority(int, priority);
        }
    })
}

/// Disables all of the external interrupts.
pub fn disable_all() {
    for i in 0..NUM_EXTERNAL_INTERRUPT_REGS {
        // safety: ICER is write-one-to-clear, a full mask disables every line
        unsafe {
            (*NVIC::PTR).icer[i].write(0xFFFF_FFFF);
        }
    }
}

/// Clears all of the pending external interrupts.
pub fn clear_all_pending() {
    for i in 0..NUM_EXTERNAL_INTERRUPT_REGS {
        // safety: ICPR is write-one-to-clear, a full mask clears every line
        unsafe {
            (*NVIC::PTR).icpr[i].write(0xFFFF_FFFF);
        }
    }
}

fn modify_shcsr(f: impl FnOnce(u32) -> u32) {
    interrupt::free(|_| {
        // safety: SHCSR is read and written inside a critical section
        unsafe {
            let value = (*SCB::PTR).shcsr.read();
            (*SCB::PTR).shcsr.write(f(value));
        }
    })
}

fn read_shcsr() -> u32 {
    // safety: plain volatile read
    unsafe { (*SCB::PTR).shcsr.read() }
}

/// Enables the specified fault exception.
pub fn fault_enable(fault: Fault) {
    modify_shcsr(|value| value | fault.enable_mask());
}

/// Disables the specified fault exception.
pub fn fault_disable(fault: Fault) {
    modify_shcsr(|value| value & !fault.enable_mask());
}

/// Returns whether the specified fault exception is active.
pub fn fault_is_active(fault: Fault) -> bool {
    read_shcsr() & fault.active_mask() != 0
}

/// Returns whether the specified fault exception is pending.
pub fn fault_is_pending(fault: Fault) -> bool {
    read_shcsr() & fault.pending_mask() != 0
}

/// Clears the pending status of the specified fault exception.
pub fn fault_clear_pending(fault: Fault) {
    modify_shcsr(|value| value & !fault.pending_mask());
}

/// Performs a core reset of only the Cortex-M3 processor.
pub fn core_reset() -> ! {
    // disable interrupts while waiting for the reset to occur
    master_disable();

    // safety: AIRCR writes require the vector key; VECTRESET resets the core
    unsafe {
        (*SCB::PTR)
            .aircr
            .write((AIRCR_VECTOR_KEY << AIRCR_VECTKEY_POS) | AIRCR_VECTRESET);
    }

    // spin until the reset takes effect (the watchdog catches a failure)
    loop {}
}

/// Performs a full system reset.
pub fn system_reset() -> ! {
    master_disable();
    SCB::sys_reset();
}
