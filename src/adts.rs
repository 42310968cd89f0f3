use crate::logging::diag;
use crate::{Error, ErrorKind, Logger, Verbosity};

/// PCM samples per AAC frame.
pub(crate) const SAMPLES_PER_FRAME: u32 = 1024;

const SAMPLE_RATES: [u32; 16] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350, 0, 0,
    0,
];

/// Decoder configuration read from the first ADTS frame header, or from a source file's `esds`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u8,
    pub sampling_index: u8,
    /// The audio object type, e.g. 2 for AAC LC.
    pub object_type: u8,
}

/// Raw AAC frames split out of an ADTS stream, headers stripped.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct AdtsAudio<'a> {
    pub frames: Vec<&'a [u8]>,
    pub config: AudioConfig,
}

/// Returns whether the buffer starts with an ADTS syncword.
pub(crate) fn is_adts(data: &[u8]) -> bool {
    data.len() > 1 && data[0] == 0xFF && data[1] & 0xF0 == 0xF0
}

/// Scans the buffer for ADTS frames, strips the 7 or 9 byte headers (depending on the CRC
/// flag) and reads the decoder configuration from the first frame. Bytes that don't start a
/// plausible frame are skipped one at a time, resynchronizing on the next syncword.
pub(crate) fn extract_frames<'a>(
    data: &'a [u8],
    logger: &dyn Logger,
) -> crate::Result<AdtsAudio<'a>> {
    let mut out = AdtsAudio::default();

    let mut i = 0;
    while i + 7 < data.len() {
        if !is_adts(&data[i..]) {
            i += 1;
            continue;
        }

        let len = ((data[i + 3] as usize & 0x03) << 11)
            | ((data[i + 4] as usize) << 3)
            | ((data[i + 5] as usize & 0xE0) >> 5);
        if len < 7 || i + len > data.len() {
            i += 1;
            continue;
        }

        if out.frames.is_empty() {
            let profile = (data[i + 2] >> 6) & 0x03;
            let sampling_index = (data[i + 2] >> 2) & 0x0F;
            out.config = AudioConfig {
                sample_rate: SAMPLE_RATES[sampling_index as usize],
                channels: ((data[i + 2] & 0x01) << 2) | ((data[i + 3] >> 6) & 0x03),
                sampling_index,
                object_type: profile + 1,
            };
        }

        let protection_absent = data[i + 1] & 0x01 != 0;
        let header_len = if protection_absent { 7 } else { 9 };
        if len <= header_len {
            i += 1;
            continue;
        }

        out.frames.push(&data[i + header_len..i + len]);
        i += len;
    }

    if out.frames.is_empty() {
        return Err(Error::new(ErrorKind::InvalidInput, "No ADTS frames found in audio input"));
    }
    if out.config.sample_rate == 0 {
        return Err(Error::new(
            ErrorKind::InvalidInput,
            format!("Reserved ADTS sampling frequency index {}", out.config.sampling_index),
        ));
    }

    diag!(
        logger,
        Verbosity::Debug,
        "extracted {} ADTS frames, sample rate {}, {} channels, object type {}",
        out.frames.len(),
        out.config.sample_rate,
        out.config.channels,
        out.config.object_type,
    );

    Ok(out)
}
