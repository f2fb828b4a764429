use core::cell::RefCell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m::interrupt::{free as interrupt_free, Mutex};
use q32m210_device::usb::{BULK_IN, BULK_OUT, CTRL, EP_STALL, HANDSHAKE_CTRL, SYS_INT};
use q32m210_device::{interrupt, Interrupt, USB};
use tock_registers::interfaces::{Readable, Writeable};

use crate::mailbox::{Mailbox, MailboxError};
use crate::{nvic, HalError};

pub use q32m210_device::usb::EP_BUFFER_SIZE;

/// Size in bytes of a vendor HID report.
pub const HID_REPORT_SIZE: usize = 32;

/// IN endpoints the controller exposes to the CM3.
#[derive(Debug, Clone, Copy)]
pub enum InEndpoint {
    Ep0,
    Ep2,
    Ep3,
}

/// OUT endpoints the controller exposes to the CM3.
#[derive(Debug, Clone, Copy)]
pub enum OutEndpoint {
    Ep0,
    Ep4,
    Ep5,
}

struct UsbInner {
    regs: USB,
}

impl UsbInner {
    fn in_fifo(&self, ep: InEndpoint) -> &tock_registers::registers::ReadWrite<u32> {
        match ep {
            InEndpoint::Ep0 => &self.regs.ep0_fifo,
            InEndpoint::Ep2 => &self.regs.ep2_fifo,
            InEndpoint::Ep3 => &self.regs.ep3_fifo,
        }
    }

    /// Loads an IN endpoint's buffer and tells the controller how many
    /// bytes to hand to the host.
    fn send_endpoint(&self, ep: InEndpoint, data: &[u8]) {
        debug_assert!(data.len() <= EP_BUFFER_SIZE);

        let fifo = self.in_fifo(ep);
        for byte in data {
            fifo.set(*byte as u32);
        }

        let count = data.len() as u32;
        match ep {
            InEndpoint::Ep0 => self.regs.ep0_in_byte_count.set(count),
            InEndpoint::Ep2 => self.regs.ep2_in_byte_count.set(count),
            InEndpoint::Ep3 => self.regs.ep3_in_byte_count.set(count),
        }
    }

    /// Drains an OUT endpoint's buffer; returns the number of bytes the
    /// host sent.
    fn receive_endpoint(&self, ep: OutEndpoint, buf: &mut [u8]) -> usize {
        match ep {
            OutEndpoint::Ep0 => {
                let size = (self.regs.ep0_out_byte_count.get() as usize).min(buf.len());
                for byte in buf[..size].iter_mut() {
                    *byte = self.regs.ep0_fifo.get() as u8;
                }
                size
            }
            OutEndpoint::Ep4 => {
                let size = (self.regs.ep4_out_byte_count.get() as usize).min(buf.len());
                for byte in buf[..size].iter_mut() {
                    *byte = self.regs.ep4_fifo.get() as u8;
                }
                size
            }
            OutEndpoint::Ep5 => {
                let size = (self.regs.ep5_out_byte_count.get() as usize).min(buf.len());
                for byte in buf[..size].iter_mut() {
                    *byte = self.regs.ep5_fifo.get() as u8;
                }
                size
            }
        }
    }

    /// Arms an OUT endpoint to accept the next transfer of up to `len`
    /// bytes.
    fn arm_out_endpoint(&self, ep: OutEndpoint, len: usize) {
        let count = len as u32;
        match ep {
            OutEndpoint::Ep0 => self.regs.ep0_out_byte_count.set(count),
            OutEndpoint::Ep4 => self.regs.ep4_out_byte_count.set(count),
            OutEndpoint::Ep5 => self.regs.ep5_out_byte_count.set(count),
        }
    }

    fn clear_sys_interrupt(
        &self,
        value: tock_registers::fields::FieldValue<u32, SYS_INT::Register>,
    ) {
        self.regs.sys_int_clear.write(value);
    }
}

/// The USB interface controller.
pub struct Usb(UsbInner);

impl Usb {
    pub(crate) fn new(regs: USB) -> Self {
        Usb(UsbInner { regs })
    }

    /// Brings the controller into typical operation: stale events cleared,
    /// no endpoints armed.
    pub fn initialize(&mut self) {
        self.0.clear_sys_interrupt(
            SYS_INT::RESET::SET
                + SYS_INT::SUSPEND::SET
                + SYS_INT::SOF::SET
                + SYS_INT::SETUP_TOKEN::SET
                + SYS_INT::SETUP_DATA_VALID::SET,
        );

        self.0.regs.bulk_in_clear.write(
            BULK_IN::EP0::SET + BULK_IN::EP2::SET + BULK_IN::EP3::SET,
        );
        self.0.regs.bulk_out_clear.write(
            BULK_OUT::EP0::SET + BULK_OUT::EP4::SET + BULK_OUT::EP5::SET,
        );
    }

    /// Enables the controller with the CM3 servicing endpoint data.
    pub fn configure(&mut self, enabled: bool) {
        self.0
            .regs
            .ctrl
            .write(CTRL::ENABLE.val(enabled as u32) + CTRL::CONTROLLER::Cm3);
    }

    /// Reads the eight bytes of the last SETUP packet.
    pub fn setup_buffer(&self) -> [u8; 8] {
        let mut buf = [0; 8];
        buf[..4].copy_from_slice(&self.0.regs.setup_data0.get().to_le_bytes());
        buf[4..].copy_from_slice(&self.0.regs.setup_data1.get().to_le_bytes());
        buf
    }

    /// Stalls endpoint zero, answering a request the device does not
    /// serve.
    pub fn stall_ep0(&mut self) {
        self.0
            .regs
            .ep_stall
            .write(EP_STALL::EP0_IN::SET + EP_STALL::EP0_OUT::SET);
    }

    /// Releases the control-transfer handshake NAK.
    pub fn clear_handshake_nak(&mut self) {
        self.0
            .regs
            .handshake_ctrl
            .write(HANDSHAKE_CTRL::NAK_CLEAR::SET);
    }

    /// Hands the controller to the interrupt-driven HID report engine and
    /// unmasks its interrupts.
    pub fn init_hid(self) -> HidDevice {
        interrupt_free(|token| {
            let mut state = HANDLER_STATE.borrow(token).borrow_mut();
            assert!(state.is_none(), "usb handler state already initialized");

            *state = Some(UsbHandlerState {
                usb: self.0,
                report_status: ReportStatus::NoReportInFlight,
                buffered_report: [0; HID_REPORT_SIZE],
            });
        });

        for int in [
            Interrupt::USB_WAKEUP,
            Interrupt::USB_SDAV,
            Interrupt::USB_SOF,
            Interrupt::USB_SUTOK,
            Interrupt::USB_SUSPEND,
            Interrupt::USB_RESET,
            Interrupt::USB_EP0IN,
            Interrupt::USB_EP0OUT,
            Interrupt::USB_EP2IN,
            Interrupt::USB_EP4OUT,
        ] {
            nvic::clear_pending(int);
            nvic::enable(int);
        }

        HidDevice(PhantomData)
    }
}

/// Delivery state of the outgoing report path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportStatus {
    NoReportInFlight,
    ReportInFlight,
    /// A report is in flight and another is staged behind it.
    ReportBuffered,
}

struct UsbHandlerState {
    usb: UsbInner,
    report_status: ReportStatus,
    buffered_report: [u8; HID_REPORT_SIZE],
}

static HANDLER_STATE: Mutex<RefCell<Option<UsbHandlerState>>> = Mutex::new(RefCell::new(None));
static REPORT_RECEIVED: Mailbox<HID_REPORT_SIZE> = Mailbox::new();
static REPORT_SENT: AtomicBool = AtomicBool::new(false);

fn with_state(f: impl FnOnce(&mut UsbHandlerState)) {
    interrupt_free(|token| {
        if let Some(state) = HANDLER_STATE.borrow(token).borrow_mut().as_mut() {
            f(state);
        }
    })
}

/// The vendor HID report channel.
///
/// OUT reports arriving on endpoint 4 are queued for [`HidDevice::recv_report`];
/// IN reports go out on endpoint 2 with one report buffered behind the one
/// in flight, the newest queued report winning the buffered slot.
pub struct HidDevice(PhantomData<()>);

impl HidDevice {
    /// Queues a report for the host.
    ///
    /// If a report is already in flight the new one is staged behind it,
    /// replacing anything staged earlier.
    pub fn send_report(&self, data: &[u8; HID_REPORT_SIZE]) {
        with_state(|state| match state.report_status {
            ReportStatus::ReportInFlight | ReportStatus::ReportBuffered => {
                state.report_status = ReportStatus::ReportBuffered;
                state.buffered_report = *data;
            }
            ReportStatus::NoReportInFlight => {
                state.report_status = ReportStatus::ReportInFlight;
                state.usb.send_endpoint(InEndpoint::Ep2, data);
            }
        });
    }

    /// Takes the next report received from the host, if one is waiting.
    pub fn try_recv_report(&self) -> Option<[u8; HID_REPORT_SIZE]> {
        let mut report = [0; HID_REPORT_SIZE];

        match REPORT_RECEIVED.try_take(&mut report) {
            Ok(_) => Some(report),
            Err(_) => None,
        }
    }

    /// Blocks until a report arrives, keeping the watchdog alive.
    pub fn recv_report(&self) -> Result<[u8; HID_REPORT_SIZE], HalError> {
        let mut report = [0; HID_REPORT_SIZE];

        loop {
            match REPORT_RECEIVED.try_take(&mut report) {
                Ok(_) => return Ok(report),
                Err(MailboxError::Busy) => crate::watchdog::refresh(),
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Reports and clears whether a queued report finished its trip to the
    /// host since the last call. Drives chunked streams.
    pub fn take_report_sent(&self) -> bool {
        REPORT_SENT.swap(false, Ordering::Relaxed)
    }
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_WAKEUP() {
    // reset the status so enumeration parsing can restart
    with_state(|state| {
        state
            .usb
            .clear_sys_interrupt(SYS_INT::RESET::SET + SYS_INT::SUSPEND::SET)
    });
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_SDAV() {
    // control transfers are handled outside the report engine; acknowledge
    // the setup data so the controller does not wedge
    with_state(|state| state.usb.clear_sys_interrupt(SYS_INT::SETUP_DATA_VALID::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_SOF() {
    with_state(|state| state.usb.clear_sys_interrupt(SYS_INT::SOF::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_SUTOK() {
    with_state(|state| state.usb.clear_sys_interrupt(SYS_INT::SETUP_TOKEN::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_SUSPEND() {
    with_state(|state| state.usb.clear_sys_interrupt(SYS_INT::SUSPEND::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_RESET() {
    with_state(|state| {
        state.usb.clear_sys_interrupt(SYS_INT::RESET::SET);
        state.report_status = ReportStatus::NoReportInFlight;

        // arm EP4 to receive data; twice, so both halves of the double
        // buffer are ready
        state.usb.arm_out_endpoint(OutEndpoint::Ep4, EP_BUFFER_SIZE);
        state.usb.arm_out_endpoint(OutEndpoint::Ep4, EP_BUFFER_SIZE);
    });
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_EP0IN() {
    with_state(|state| state.usb.regs.bulk_in_clear.write(BULK_IN::EP0::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_EP0OUT() {
    with_state(|state| state.usb.regs.bulk_out_clear.write(BULK_OUT::EP0::SET));
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_EP2IN() {
    with_state(|state| {
        state.usb.regs.bulk_in_clear.write(BULK_IN::EP2::SET);

        match state.report_status {
            ReportStatus::ReportInFlight => {
                state.report_status = ReportStatus::NoReportInFlight;
                REPORT_SENT.store(true, Ordering::Relaxed);
            }
            ReportStatus::ReportBuffered => {
                state.report_status = ReportStatus::ReportInFlight;
                let report = state.buffered_report;
                state.usb.send_endpoint(InEndpoint::Ep2, &report);
            }
            ReportStatus::NoReportInFlight => {}
        }
    });
}

#[allow(non_snake_case)]
#[interrupt]
fn USB_EP4OUT() {
    with_state(|state| {
        state.usb.regs.bulk_out_clear.write(BULK_OUT::EP4::SET);

        let mut data = [0; EP_BUFFER_SIZE];
        let size = state.usb.receive_endpoint(OutEndpoint::Ep4, &mut data);

        if size > 0 {
            // hand the report to the application; a full mailbox drops it
            let len = size.min(HID_REPORT_SIZE);
            let _ = REPORT_RECEIVED.try_commit(&data[..len]);
        }

        // re-arm EP4 to receive the next transfer
        state.usb.arm_out_endpoint(OutEndpoint::Ep4, EP_BUFFER_SIZE);
    });
}
