//! ADC capture engine.
//!
//! The ADC interrupt fills a sample buffer until the requested count is
//! reached; the foreground then runs a statistics pass and streams the
//! raw samples out in report-sized chunks.

use core::cell::RefCell;

use cortex_m::interrupt::{free as interrupt_free, Mutex};
use q32m210_device::{interrupt, Interrupt};
use q32m210_hal::afe::{Afe, AdcFormat};
use q32m210_hal::clock::Clock;
use q32m210_hal::nvic;
use q32m210_math::isqrt64;

use crate::command::{CaptureChannel, ChannelStats};

/// Capacity of the capture buffer in samples, sized for one second of
/// two-channel data at the configured sample rate.
pub const CAPTURE_BUF_SIZE: usize = 10000;

/// ADC conversion dummy cycles, chosen with the decimation factor for a
/// 1 kHz sample rate at MCLK = 3 MHz.
const ADC_DUMMY_CYCLES: u32 = 0x1DB;
const ADC_DECIMATION: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Fill,
    Done,
}

/// The capture buffer and its fill state machine.
///
/// Pure of hardware access so the fill and read-out logic can be tested
/// directly; the interrupt plumbing lives in the module functions below.
pub struct CaptureBuffer {
    buffer: [u16; CAPTURE_BUF_SIZE],
    index: usize,
    nsamples: usize,
    channel: CaptureChannel,
    state: CaptureState,
}

impl CaptureBuffer {
    pub const fn new() -> Self {
        CaptureBuffer {
            buffer: [0; CAPTURE_BUF_SIZE],
            index: 0,
            nsamples: 0,
            channel: CaptureChannel::Adc0,
            state: CaptureState::Idle,
        }
    }

    /// Resets the buffer for a capture of `nsamples` samples from the
    /// given channel selection. Counts beyond the buffer are clamped.
    pub fn arm(&mut self, channel: CaptureChannel, nsamples: usize) {
        self.index = 0;
        self.channel = channel;
        self.nsamples = nsamples.min(CAPTURE_BUF_SIZE);
        self.state = CaptureState::Idle;
    }

    /// Starts filling on the next sample.
    pub fn start(&mut self) {
        self.state = CaptureState::Fill;
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn channel(&self) -> CaptureChannel {
        self.channel
    }

    /// Samples captured so far.
    pub fn sample_count(&self) -> usize {
        self.index
    }

    /// Records one conversion result pair. Called from the ADC interrupt.
    pub fn push(&mut self, adc0: u16, adc1: u16) {
        if self.state != CaptureState::Fill {
            return;
        }

        match self.channel {
            CaptureChannel::Adc0 => self.store(adc0),
            CaptureChannel::Adc1 => self.store(adc1),
            CaptureChannel::Both => {
                self.store(adc0);
                if self.state == CaptureState::Fill {
                    self.store(adc1);
                }
            }
        }
    }

    fn store(&mut self, sample: u16) {
        self.buffer[self.index] = sample;
        self.index += 1;

        if self.index >= self.nsamples {
            self.state = CaptureState::Done;
        }
    }

    /// Copies samples starting at `offset` into `out` as big-endian
    /// pairs; returns the number of samples copied. Zero means the
    /// read-out is complete.
    pub fn fill_report(&self, offset: usize, out: &mut [u8]) -> usize {
        let mut nsamples = out.len() / 2;

        if offset + nsamples >= self.index {
            nsamples = self.index.saturating_sub(offset);
        }

        for i in 0..nsamples {
            let bytes = self.buffer[offset + i].to_be_bytes();
            out[i * 2..i * 2 + 2].copy_from_slice(&bytes);
        }

        nsamples
    }

    fn channel_stats(&self, channel: usize, nchannels: usize, per_channel: usize) -> ChannelStats {
        if per_channel == 0 {
            return ChannelStats::default();
        }

        let mut min = u16::MAX;
        let mut max = u16::MIN;
        let mut sum: u64 = 0;

        for i in 0..per_channel {
            let sample = self.buffer[nchannels * i + channel];

            min = min.min(sample);
            max = max.max(sample);
            sum += sample as u64;
        }

        let mean_milli = (sum * 1000 / per_channel as u64) as i64;

        let stddev_milli = if per_channel > 1 {
            let mut squares: u128 = 0;
            for i in 0..per_channel {
                let sample = self.buffer[nchannels * i + channel];
                let deviation = sample as i64 * 1000 - mean_milli;
                squares += (deviation * deviation) as u128;
            }

            let variance = squares / (per_channel as u128 - 1);
            isqrt64(variance.min(u64::MAX as u128) as u64)
        } else {
            0
        };

        ChannelStats {
            min,
            max,
            mean_milli: mean_milli as i32,
            stddev_milli: stddev_milli as i32,
        }
    }

    /// Runs the statistics pass over the captured samples and returns to
    /// idle. The second channel is present only for interleaved captures.
    pub fn eval_stats(&mut self) -> (ChannelStats, Option<ChannelStats>) {
        let nchannels = match self.channel {
            CaptureChannel::Both => 2,
            _ => 1,
        };
        let per_channel = self.index / nchannels;

        let channel0 = self.channel_stats(0, nchannels, per_channel);
        let channel1 = (nchannels == 2).then(|| self.channel_stats(1, nchannels, per_channel));

        self.state = CaptureState::Idle;

        (channel0, channel1)
    }
}

static CAPTURE: Mutex<RefCell<CaptureBuffer>> = Mutex::new(RefCell::new(CaptureBuffer::new()));

/// Runs the closure with the capture buffer, interrupts masked.
pub fn with<T>(f: impl FnOnce(&mut CaptureBuffer) -> T) -> T {
    interrupt_free(|token| f(&mut CAPTURE.borrow(token).borrow_mut()))
}

/// Configures the analog front end for capturing: supplies up,
/// pre-amplifiers bypassed, converters in unsigned mode at the 1 kHz
/// data rate.
pub fn configure_frontend() {
    Clock::with(|clock| clock.config_mclk(true, 2));

    Afe::with(|afe| {
        afe.set_opmode(true, true);

        afe.set_pga0_enabled(false);
        afe.set_pga1_enabled(false);
        afe.set_pga_gain(0, 0, false);

        afe.set_adc_control(
            false,
            AdcFormat::UnsignedInt,
            false,
            AdcFormat::UnsignedInt,
        );

        afe.set_datarate(ADC_DUMMY_CYCLES, ADC_DECIMATION);
    });
}

/// Prepares a capture: the converters the selection needs are enabled and
/// the buffer reset. The ADC interrupt stays masked until [`start`].
pub fn arm(channel: CaptureChannel, nsamples: usize) {
    nvic::disable(Interrupt::ADC);

    Afe::with(|afe| {
        let (adc0, adc1) = match channel {
            CaptureChannel::Adc0 => (true, false),
            CaptureChannel::Adc1 => (false, true),
            CaptureChannel::Both => (true, true),
        };

        afe.set_adc_control(
            adc0,
            AdcFormat::UnsignedInt,
            adc1,
            AdcFormat::UnsignedInt,
        );
    });

    with(|capture| capture.arm(channel, nsamples));
}

/// Starts the armed capture.
pub fn start() {
    with(|capture| capture.start());

    nvic::clear_pending(Interrupt::ADC);
    nvic::enable(Interrupt::ADC);
}

pub fn state() -> CaptureState {
    with(|capture| capture.state())
}

#[allow(non_snake_case)]
#[interrupt]
fn ADC() {
    let (adc0, adc1) = Afe::with(|afe| afe.adc_samples());

    with(|capture| capture.push(adc0, adc1));
}

#[cfg(test)]
mod test {
    use super::{CaptureBuffer, CaptureState, CAPTURE_BUF_SIZE};
    use crate::command::CaptureChannel;

    #[test]
    fn capture_fills_to_the_requested_count_and_stops() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Adc0, 3);
        capture.start();

        for sample in [10, 20, 30, 40] {
            capture.push(sample, 0);
        }

        assert_eq!(capture.state(), CaptureState::Done);
        assert_eq!(capture.sample_count(), 3);
    }

    #[test]
    fn pushes_are_ignored_until_started() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Adc0, 4);

        capture.push(1, 0);
        assert_eq!(capture.sample_count(), 0);
    }

    #[test]
    fn oversized_requests_clamp_to_the_buffer() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Adc0, CAPTURE_BUF_SIZE + 5000);
        capture.start();

        assert_eq!(capture.state(), CaptureState::Fill);
        for _ in 0..CAPTURE_BUF_SIZE {
            capture.push(7, 0);
        }

        assert_eq!(capture.state(), CaptureState::Done);
        assert_eq!(capture.sample_count(), CAPTURE_BUF_SIZE);
    }

    #[test]
    fn interleaved_capture_stores_both_channels() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Both, 6);
        capture.start();

        capture.push(1, 100);
        capture.push(2, 200);
        capture.push(3, 300);

        assert_eq!(capture.state(), CaptureState::Done);

        let mut out = [0; 12];
        assert_eq!(capture.fill_report(0, &mut out), 6);
        assert_eq!(
            out,
            [0, 1, 0, 100, 0, 2, 0, 200, 0, 3, 0, 300]
        );
    }

    #[test]
    fn fill_report_chunks_until_the_data_runs_out() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Adc0, 5);
        capture.start();

        for sample in [1, 2, 3, 4, 5] {
            capture.push(sample, 0);
        }

        let mut out = [0; 4];

        assert_eq!(capture.fill_report(0, &mut out), 2);
        assert_eq!(out, [0, 1, 0, 2]);

        assert_eq!(capture.fill_report(2, &mut out), 2);
        assert_eq!(out, [0, 3, 0, 4]);

        // the tail is shorter than the chunk
        assert_eq!(capture.fill_report(4, &mut out[..2]), 1);

        assert_eq!(capture.fill_report(5, &mut out), 0);
    }

    #[test]
    fn stats_match_a_hand_computed_series() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Adc0, 4);
        capture.start();

        for sample in [1, 2, 3, 4] {
            capture.push(sample, 0);
        }

        let (stats, second) = capture.eval_stats();
        assert!(second.is_none());

        assert_eq!(stats.min, 1);
        assert_eq!(stats.max, 4);
        assert_eq!(stats.mean_milli, 2500);
        // sqrt(5/3) of a count, in thousandths
        assert_eq!(stats.stddev_milli, 1290);

        // the statistics pass returns the engine to idle
        assert_eq!(capture.state(), CaptureState::Idle);
    }

    #[test]
    fn interleaved_stats_split_the_channels() {
        let mut capture = CaptureBuffer::new();
        capture.arm(CaptureChannel::Both, 8);
        capture.start();

        for (adc0, adc1) in [(10, 1000), (20, 1000), (30, 1000), (40, 1000)] {
            capture.push(adc0, adc1);
        }

        let (channel0, channel1) = capture.eval_stats();
        let channel1 = channel1.unwrap();

        assert_eq!(channel0.min, 10);
        assert_eq!(channel0.max, 40);
        assert_eq!(channel0.mean_milli, 25000);

        assert_eq!(channel1.min, 1000);
        assert_eq!(channel1.max, 1000);
        assert_eq!(channel1.mean_milli, 1_000_000);
        assert_eq!(channel1.stddev_milli, 0);
    }
}
