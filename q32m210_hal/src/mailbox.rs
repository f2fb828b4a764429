use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicU8, Ordering};

use thiserror_no_std::Error;

// mailbox statuses
const EMPTY: u8 = 0;
const BUSY: u8 = 1;
const FULL: u8 = 2;

#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("The mailbox is currently being accessed somewhere else")]
    Busy,
    #[error("The input to the mailbox was too big")]
    InputTooBig,
    #[error("The output buffer was not large enough to hold the data in the mailbox")]
    OutputBufferTooSmall,
}

/// A single-slot frame buffer for passing byte frames between an interrupt
/// handler and the foreground.
///
/// The slot is either empty, full, or briefly busy while one side copies.
/// Both sides only ever spin on `Busy`, never block, so the mailbox is safe
/// against interrupts preempting the foreground mid-copy.
pub struct Mailbox<const N: usize> {
    status: AtomicU8,
    inner: UnsafeCell<MailboxData<N>>,
}

struct MailboxData<const N: usize> {
    data_len: usize,
    data: [u8; N],
}

impl<const N: usize> Mailbox<N> {
    pub const fn new() -> Self {
        Mailbox {
            status: AtomicU8::new(EMPTY),
            inner: UnsafeCell::new(MailboxData {
                data_len: 0,
                data: [0; N],
            }),
        }
    }

    unsafe fn inner(&self) -> &mut MailboxData<N> {
        unsafe { self.inner.get().as_mut().unwrap() }
    }

    /// Places a frame into the mailbox if it is empty.
    pub fn try_commit(&self, data: &[u8]) -> Result<(), MailboxError> {
        if data.len() > N {
            return Err(MailboxError::InputTooBig);
        }

        self.status
            .compare_exchange(EMPTY, BUSY, Ordering::Acquire, Ordering::Relaxed)
            .or(Err(MailboxError::Busy))?;

        // safety: the mailbox is in the busy state, no one else can access
        // the inner data
        let inner = unsafe { self.inner() };

        inner.data_len = data.len();
        inner.data[..data.len()].copy_from_slice(data);

        // release synchronizes with the compare exchange acquire
        self.status.store(FULL, Ordering::Release);

        Ok(())
    }

    /// Takes the frame out of the mailbox if it holds one.
    pub fn try_take<'a>(&self, buf: &'a mut [u8]) -> Result<&'a [u8], MailboxError> {
        self.status
            .compare_exchange(FULL, BUSY, Ordering::Acquire, Ordering::Relaxed)
            .or(Err(MailboxError::Busy))?;

        // safety: the mailbox is in the busy state, no one else can access
        // the inner data
        let inner = unsafe { self.inner() };

        if buf.len() < inner.data_len {
            self.status.store(FULL, Ordering::Release);
            return Err(MailboxError::OutputBufferTooSmall);
        }

        let out = &mut buf[..inner.data_len];
        out.copy_from_slice(&inner.data[..inner.data_len]);
        inner.data_len = 0;

        // release synchronizes with the compare exchange acquire
        self.status.store(EMPTY, Ordering::Release);

        Ok(out)
    }

    /// Drops any pending frame.
    pub fn clear(&self) {
        let mut buf = [0; N];
        let _ = self.try_take(&mut buf);
    }
}

// safety: atomics synchronize access to the unsafe cell
unsafe impl<const N: usize> Send for Mailbox<N> {}
unsafe impl<const N: usize> Sync for Mailbox<N> {}

#[cfg(test)]
mod test {
    use super::{Mailbox, MailboxError};

    #[test]
    fn commit_then_take_round_trips() {
        let mailbox: Mailbox<8> = Mailbox::new();
        let mut buf = [0; 8];

        mailbox.try_commit(&[1, 2, 3]).unwrap();
        assert_eq!(mailbox.try_take(&mut buf).unwrap(), &[1, 2, 3]);

        // now empty again
        assert!(matches!(
            mailbox.try_take(&mut buf),
            Err(MailboxError::Busy)
        ));
    }

    #[test]
    fn second_commit_is_rejected_until_taken() {
        let mailbox: Mailbox<8> = Mailbox::new();
        let mut buf = [0; 8];

        mailbox.try_commit(&[9]).unwrap();
        assert!(matches!(
            mailbox.try_commit(&[7]),
            Err(MailboxError::Busy)
        ));

        assert_eq!(mailbox.try_take(&mut buf).unwrap(), &[9]);
        mailbox.try_commit(&[7]).unwrap();
    }

    #[test]
    fn oversized_input_is_rejected() {
        let mailbox: Mailbox<2> = Mailbox::new();
        assert!(matches!(
            mailbox.try_commit(&[0; 3]),
            Err(MailboxError::InputTooBig)
        ));
    }

    #[test]
    fn undersized_output_keeps_the_frame() {
        let mailbox: Mailbox<8> = Mailbox::new();
        let mut small = [0; 2];
        let mut big = [0; 8];

        mailbox.try_commit(&[1, 2, 3, 4]).unwrap();
        assert!(matches!(
            mailbox.try_take(&mut small),
            Err(MailboxError::OutputBufferTooSmall)
        ));

        // frame still there
        assert_eq!(mailbox.try_take(&mut big).unwrap(), &[1, 2, 3, 4]);
    }

    #[test]
    fn clear_discards_a_pending_frame() {
        let mailbox: Mailbox<4> = Mailbox::new();
        let mut buf = [0; 4];

        mailbox.try_commit(&[5]).unwrap();
        mailbox.clear();
        assert!(mailbox.try_take(&mut buf).is_err());
    }
}
