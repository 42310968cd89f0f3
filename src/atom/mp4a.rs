use super::*;
use crate::adts::AudioConfig;

/// An AAC audio sample entry (`mp4a`) with an elementary stream descriptor, built when the
/// source is a raw ADTS stream and no sample description can be reused.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Mp4aEntry {
    pub config: AudioConfig,
}

impl Mp4aEntry {
    pub const fn new(config: AudioConfig) -> Self {
        Self { config }
    }

    pub fn len(&self) -> u64 {
        // sample entry header + version/revision/vendor + channel count/sample size
        // + pre defined/reserved + sample rate, then the esds child
        8 + 8 + 4 + 4 + 4 + esds_len()
    }

    pub fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(self.len() as u32)?;
        writer.write_all(&*MP4_AUDIO)?;

        // sample entry header: 6 reserved bytes + data reference index
        writer.write_u32::<BigEndian>(0)?;
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u16::<BigEndian>(1)?;

        writer.write_u16::<BigEndian>(0)?; // version
        writer.write_u16::<BigEndian>(0)?; // revision
        writer.write_u32::<BigEndian>(0)?; // vendor

        writer.write_u16::<BigEndian>(self.config.channels as u16)?;
        writer.write_u16::<BigEndian>(16)?; // sample size in bits

        writer.write_u16::<BigEndian>(0)?; // pre defined
        writer.write_u16::<BigEndian>(0)?; // reserved

        // sample rate as 16.16 fixed point, the integer part holds at most 16 bits
        writer.write_u32::<BigEndian>((self.config.sample_rate & 0xFFFF) << 16)?;

        self.write_esds(writer)?;

        Ok(())
    }

    /// Writes the elementary stream descriptor chain: ES descriptor, decoder configuration with
    /// the AudioSpecificConfig, and the SL configuration. Descriptor lengths use the 4 byte
    /// continuation form iTunes emits.
    fn write_esds(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(esds_len() as u32)?;
        writer.write_all(&*ELEMENTARY_STREAM_DESCRIPTION)?;
        write_full_head(writer, 0, [0; 3])?;

        // ES descriptor
        write_descriptor_head(writer, 0x03, 0x22)?;
        writer.write_u16::<BigEndian>(0)?; // ES id
        writer.write_all(&[0])?; // stream dependence/url/ocr flags

        // decoder configuration descriptor
        write_descriptor_head(writer, 0x04, 0x14)?;
        writer.write_all(&[0x40])?; // object type indication, MPEG-4 audio
        writer.write_all(&[0x15])?; // stream type audio, upstream 0, reserved 1
        writer.write_all(&[0x01, 0x83, 0x00])?; // buffer size
        writer.write_u32::<BigEndian>(0x0147_F000)?; // max bitrate
        writer.write_u32::<BigEndian>(0x0138_8105)?; // average bitrate

        // decoder specific info, the AudioSpecificConfig
        write_descriptor_head(writer, 0x05, 2)?;
        writer.write_all(&self.audio_specific_config())?;

        // SL configuration descriptor
        write_descriptor_head(writer, 0x06, 1)?;
        writer.write_all(&[0x02])?;

        Ok(())
    }

    /// Packs the AudioSpecificConfig: 5 bits object type, 4 bits sampling frequency index,
    /// 4 bits channel configuration.
    fn audio_specific_config(&self) -> [u8; 2] {
        let object_type = self.config.object_type & 0x1F;
        let sampling_index = self.config.sampling_index & 0x0F;
        let channels = self.config.channels & 0x0F;

        [
            (object_type << 3) | (sampling_index >> 1),
            ((sampling_index & 0x01) << 7) | (channels << 3),
        ]
    }
}

const fn esds_len() -> u64 {
    // head + version/flags + ES (5 + 3) + decoder config (5 + 13) + specific info (5 + 2)
    // + SL config (5 + 1)
    8 + 4 + 8 + 18 + 7 + 6
}

/// Writes a descriptor tag and its length in the 4 byte continuation form.
fn write_descriptor_head(writer: &mut impl Write, tag: u8, len: u8) -> crate::Result<()> {
    writer.write_all(&[tag, 0x80, 0x80, 0x80, len])?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn audio_specific_config_packing() {
        // AAC LC, 44.1kHz (index 4), stereo
        let entry = Mp4aEntry::new(AudioConfig {
            sample_rate: 44100,
            channels: 2,
            sampling_index: 4,
            object_type: 2,
        });
        assert_eq!(entry.audio_specific_config(), [0x12, 0x10]);
    }

    #[test]
    fn written_length_matches_size() {
        let entry = Mp4aEntry::new(AudioConfig {
            sample_rate: 48000,
            channels: 2,
            sampling_index: 3,
            object_type: 2,
        });
        let mut buf = Vec::new();
        entry.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, entry.len());
        assert_eq!(&buf[4..8], b"mp4a");
    }
}
