//! Wire format of the vendor command channel.
//!
//! Commands arrive as 32-byte HID reports; the first byte is the opcode.
//! Multi-byte values on the wire are big-endian. Parsing and response
//! encoding are pure so the protocol can be exercised off target.

/// Size in bytes of a command or response report.
pub const REPORT_SIZE: usize = 32;

/// Most words one write-memory command can carry.
pub const MAX_WRITE_WORDS: usize = 5;
/// Most words one read-memory command can read back.
pub const MAX_READ_WORDS: usize = 8;

const CMD_GET_VERSION_INFO: u8 = 1;
const CMD_WRITE_MEM: u8 = 3;
const CMD_READ_MEM: u8 = 4;
const CMD_START_ADC_CAPTURE: u8 = 5;
const CMD_READ_CAPTURE_DATA: u8 = 9;
const CMD_SET_RC_CLOCK_FREQ: u8 = 11;

/// Status bytes answered when a command cannot run.
pub mod status {
    pub const ERR_BUSY: u8 = 0xFF;
    pub const ERR_INVALID_ARG: u8 = 0xFE;
    pub const ERR_INVALID_CMD: u8 = 0xFD;
    pub const ERR_UNSUPPORTED_CMD: u8 = 0xFC;
}

/// Address window a memory command operates on, selected by the top bits
/// of its argument byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemRegion {
    Peripheral,
    Ram,
    PrivatePeripheral,
}

impl MemRegion {
    fn from_selector(selector: u8) -> Option<MemRegion> {
        match selector {
            0 => Some(MemRegion::Peripheral),
            1 => Some(MemRegion::Ram),
            2 => Some(MemRegion::PrivatePeripheral),
            _ => None,
        }
    }
}

/// ADC channel selection for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureChannel {
    Adc0,
    Adc1,
    /// Both channels, interleaved in the capture buffer.
    Both,
}

/// A decoded command report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    GetVersionInfo,
    WriteMem {
        region: MemRegion,
        count: usize,
        /// `(offset, value)` pairs; the first `count` entries are valid.
        entries: [(u16, u32); MAX_WRITE_WORDS],
    },
    ReadMem {
        region: MemRegion,
        count: usize,
        /// The first `count` entries are valid.
        offsets: [u16; MAX_READ_WORDS],
    },
    StartAdcCapture {
        channel: CaptureChannel,
        nsamples: u16,
    },
    ReadCaptureData,
    SetRcClockFreq {
        /// Frequency in 100 kHz steps.
        index: u8,
    },
}

fn be16(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Decodes a command report. On failure the error is the status byte to
/// answer with.
pub fn parse(report: &[u8; REPORT_SIZE]) -> Result<Command, u8> {
    match report[0] {
        CMD_GET_VERSION_INFO => Ok(Command::GetVersionInfo),
        CMD_WRITE_MEM => {
            let region =
                MemRegion::from_selector(report[1] >> 6).ok_or(status::ERR_INVALID_ARG)?;
            let count = (report[1] & 0xF) as usize;

            if count > MAX_WRITE_WORDS {
                return Err(status::ERR_INVALID_ARG);
            }

            let mut entries = [(0, 0); MAX_WRITE_WORDS];
            for (i, entry) in entries[..count].iter_mut().enumerate() {
                let base = 2 + i * 6;
                let offset = be16(report[base], report[base + 1]);
                let value = u32::from_be_bytes([
                    report[base + 2],
                    report[base + 3],
                    report[base + 4],
                    report[base + 5],
                ]);
                *entry = (offset, value);
            }

            Ok(Command::WriteMem {
                region,
                count,
                entries,
            })
        }
        CMD_READ_MEM => {
            let region =
                MemRegion::from_selector(report[1] >> 6).ok_or(status::ERR_INVALID_ARG)?;
            let count = (report[1] & 0xF) as usize;

            if count > MAX_READ_WORDS {
                return Err(status::ERR_INVALID_ARG);
            }

            let mut offsets = [0; MAX_READ_WORDS];
            for (i, offset) in offsets[..count].iter_mut().enumerate() {
                *offset = be16(report[2 + i * 2], report[3 + i * 2]);
            }

            Ok(Command::ReadMem {
                region,
                count,
                offsets,
            })
        }
        CMD_START_ADC_CAPTURE => {
            let channel = match report[1] & 0x3 {
                0 => CaptureChannel::Adc0,
                1 => CaptureChannel::Adc1,
                2 => CaptureChannel::Both,
                _ => return Err(status::ERR_INVALID_ARG),
            };
            let nsamples = be16(report[2], report[3]);

            Ok(Command::StartAdcCapture { channel, nsamples })
        }
        CMD_READ_CAPTURE_DATA => Ok(Command::ReadCaptureData),
        CMD_SET_RC_CLOCK_FREQ => Ok(Command::SetRcClockFreq {
            index: report[1] & 0x1F,
        }),
        _ => Err(status::ERR_INVALID_CMD),
    }
}

/// Identification data answered to a version request.
#[derive(Debug, Clone, Copy)]
pub struct VersionInfo {
    pub family: u8,
    pub version: u8,
    pub revision_major: u8,
    pub revision_minor: u8,
    /// Boot ROM version word.
    pub rom_version: u32,
    pub vendor_id: u16,
    pub product_id: u16,
    pub app_major: u8,
    pub app_minor: u8,
    pub app_revision: u8,
}

pub fn encode_version(info: &VersionInfo) -> [u8; REPORT_SIZE] {
    let mut report = [0; REPORT_SIZE];

    report[0] = info.family;
    report[1] = info.version;
    report[2] = info.revision_major;
    report[3] = info.revision_minor;
    report[4] = ((info.rom_version >> 12) & 0xF) as u8;
    report[5] = ((info.rom_version >> 8) & 0xF) as u8;
    report[6] = (info.rom_version & 0xFF) as u8;
    report[7] = (info.vendor_id >> 8) as u8;
    report[8] = info.vendor_id as u8;
    report[9] = (info.product_id >> 8) as u8;
    report[10] = info.product_id as u8;
    report[11] = info.app_major;
    report[12] = info.app_minor;
    report[13] = info.app_revision;

    report
}

/// Statistics of one captured channel, in raw ADC counts. Mean and
/// standard deviation carry three fractional digits (scaled by 1000).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelStats {
    pub min: u16,
    pub max: u16,
    pub mean_milli: i32,
    pub stddev_milli: i32,
}

fn encode_channel_stats(report: &mut [u8; REPORT_SIZE], base: usize, stats: &ChannelStats) {
    report[base..base + 2].copy_from_slice(&stats.min.to_be_bytes());
    report[base + 2..base + 4].copy_from_slice(&stats.max.to_be_bytes());
    report[base + 4..base + 8].copy_from_slice(&stats.mean_milli.to_be_bytes());
    report[base + 8..base + 12].copy_from_slice(&stats.stddev_milli.to_be_bytes());
}

/// Encodes the response to a start-capture command: sample count, then
/// channel 0 statistics, then channel 1's (zeros when only one channel
/// was captured).
pub fn encode_capture_stats(
    nsamples: u16,
    channel0: &ChannelStats,
    channel1: Option<&ChannelStats>,
) -> [u8; REPORT_SIZE] {
    let mut report = [0; REPORT_SIZE];

    report[..2].copy_from_slice(&nsamples.to_be_bytes());
    encode_channel_stats(&mut report, 2, channel0);

    if let Some(stats) = channel1 {
        encode_channel_stats(&mut report, 14, stats);
    }

    report
}

/// Encodes the response to a read-memory command: each word big-endian,
/// in request order.
pub fn encode_word_readout(words: &[u32]) -> [u8; REPORT_SIZE] {
    debug_assert!(words.len() <= MAX_READ_WORDS);

    let mut report = [0; REPORT_SIZE];
    for (i, word) in words.iter().enumerate() {
        report[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
    }

    report
}

/// Encodes the response to a set-clock-frequency command: the frequency
/// actually set, big-endian.
pub fn encode_frequency(freq_hz: u32) -> [u8; REPORT_SIZE] {
    let mut report = [0; REPORT_SIZE];
    report[..4].copy_from_slice(&freq_hz.to_be_bytes());
    report
}

/// Encodes a status-only response.
pub fn encode_status(status: u8) -> [u8; REPORT_SIZE] {
    let mut report = [0; REPORT_SIZE];
    report[0] = status;
    report
}

#[cfg(test)]
mod test {
    use super::*;

    fn report(bytes: &[u8]) -> [u8; REPORT_SIZE] {
        let mut report = [0; REPORT_SIZE];
        report[..bytes.len()].copy_from_slice(bytes);
        report
    }

    #[test]
    fn version_request_parses() {
        assert_eq!(parse(&report(&[1])), Ok(Command::GetVersionInfo));
    }

    #[test]
    fn unknown_opcode_answers_invalid_command() {
        assert_eq!(parse(&report(&[0x22])), Err(status::ERR_INVALID_CMD));
    }

    #[test]
    fn write_mem_unpacks_offsets_and_values() {
        // RAM window (selector 1), two words
        let parsed = parse(&report(&[
            3,
            (1 << 6) | 2,
            0x12, 0x34, 0xDE, 0xAD, 0xBE, 0xEF,
            0x00, 0x10, 0x01, 0x02, 0x03, 0x04,
        ]))
        .unwrap();

        match parsed {
            Command::WriteMem {
                region,
                count,
                entries,
            } => {
                assert_eq!(region, MemRegion::Ram);
                assert_eq!(count, 2);
                assert_eq!(entries[0], (0x1234, 0xDEAD_BEEF));
                assert_eq!(entries[1], (0x0010, 0x0102_0304));
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn write_mem_rejects_too_many_words() {
        assert_eq!(
            parse(&report(&[3, 6])),
            Err(status::ERR_INVALID_ARG)
        );
    }

    #[test]
    fn mem_commands_reject_the_reserved_window() {
        assert_eq!(
            parse(&report(&[4, 3 << 6])),
            Err(status::ERR_INVALID_ARG)
        );
    }

    #[test]
    fn read_mem_unpacks_offsets() {
        let parsed = parse(&report(&[4, (2 << 6) | 3, 0x00, 0x04, 0x00, 0x08, 0x01, 0x00])).unwrap();

        match parsed {
            Command::ReadMem {
                region,
                count,
                offsets,
            } => {
                assert_eq!(region, MemRegion::PrivatePeripheral);
                assert_eq!(count, 3);
                assert_eq!(&offsets[..3], &[0x0004, 0x0008, 0x0100]);
            }
            other => panic!("parsed {other:?}"),
        }
    }

    #[test]
    fn start_capture_decodes_channel_and_length() {
        let parsed = parse(&report(&[5, 2, 0x27, 0x10])).unwrap();

        assert_eq!(
            parsed,
            Command::StartAdcCapture {
                channel: CaptureChannel::Both,
                nsamples: 10000,
            }
        );
    }

    #[test]
    fn start_capture_rejects_the_invalid_channel() {
        assert_eq!(parse(&report(&[5, 3])), Err(status::ERR_INVALID_ARG));
    }

    #[test]
    fn set_clock_freq_masks_the_index() {
        let parsed = parse(&report(&[11, 0xFF])).unwrap();
        assert_eq!(parsed, Command::SetRcClockFreq { index: 0x1F });
    }

    #[test]
    fn version_encoding_packs_the_rom_word() {
        let info = VersionInfo {
            family: 2,
            version: 1,
            revision_major: 1,
            revision_minor: 0,
            rom_version: 0x3456,
            vendor_id: 0x0EE2,
            product_id: 0x2005,
            app_major: 1,
            app_minor: 0,
            app_revision: 0,
        };

        let encoded = encode_version(&info);

        assert_eq!(&encoded[..4], &[2, 1, 1, 0]);
        assert_eq!(encoded[4], 0x3);
        assert_eq!(encoded[5], 0x4);
        assert_eq!(encoded[6], 0x56);
        assert_eq!(&encoded[7..11], &[0x0E, 0xE2, 0x20, 0x05]);
        assert_eq!(&encoded[11..14], &[1, 0, 0]);
    }

    #[test]
    fn capture_stats_zero_the_second_channel_when_absent() {
        let stats = ChannelStats {
            min: 100,
            max: 200,
            mean_milli: 150_000,
            stddev_milli: 5_000,
        };

        let encoded = encode_capture_stats(1000, &stats, None);

        assert_eq!(&encoded[..2], &[0x03, 0xE8]);
        assert_eq!(&encoded[2..4], &[0, 100]);
        assert_eq!(&encoded[4..6], &[0, 200]);
        assert_eq!(&encoded[6..10], &150_000i32.to_be_bytes());
        assert_eq!(&encoded[10..14], &5_000i32.to_be_bytes());
        assert!(encoded[14..26].iter().all(|&byte| byte == 0));
    }

    #[test]
    fn word_readout_is_big_endian_in_request_order() {
        let encoded = encode_word_readout(&[0x0102_0304, 0xAABB_CCDD]);

        assert_eq!(&encoded[..8], &[1, 2, 3, 4, 0xAA, 0xBB, 0xCC, 0xDD]);
    }
}
