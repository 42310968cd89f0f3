use super::*;

/// Track enabled, in movie and in preview.
const FLAGS_PRESENTED: [u8; 3] = [0, 0, 7];
/// Track enabled only.
const FLAGS_ENABLED: [u8; 3] = [0, 0, 1];

/// A struct representing a track header atom (`tkhd`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tkhd {
    pub track_id: u32,
    /// The duration in movie timescale units.
    pub duration: u64,
    flags: [u8; 3],
    volume: u16,
    /// Width and height as 16.16 fixed point numbers, zero for non-visual tracks.
    width: u32,
    height: u32,
}

impl Tkhd {
    /// Creates the track header of an audio track, enabled with full volume and no dimensions.
    pub fn audio(track_id: u32, duration: u64) -> Self {
        Self { track_id, duration, flags: FLAGS_PRESENTED, volume: 0x0100, width: 0, height: 0 }
    }

    /// Creates the track header of a chapter text track, enabled but silent and dimensionless.
    pub fn text(track_id: u32, duration: u64) -> Self {
        Self { track_id, duration, flags: FLAGS_ENABLED, volume: 0, width: 0, height: 0 }
    }

    /// Creates the track header of a chapter image track, presented with the image dimensions so
    /// players consider it for display.
    pub fn image(track_id: u32, duration: u64, width: u16, height: u16) -> Self {
        Self {
            track_id,
            duration,
            flags: FLAGS_PRESENTED,
            volume: 0,
            width: (width as u32) << 16,
            height: (height as u32) << 16,
        }
    }
}

impl Atom for Tkhd {
    const FOURCC: Fourcc = TRACK_HEADER;
}

impl WriteAtom for Tkhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, self.flags)?;

        writer.write_u32::<BigEndian>(0)?; // creation time
        writer.write_u32::<BigEndian>(0)?; // modification time
        writer.write_u32::<BigEndian>(self.track_id)?;
        writer.write_u32::<BigEndian>(0)?; // reserved
        writer.write_u32::<BigEndian>(self.duration as u32)?;
        writer.write_u64::<BigEndian>(0)?; // reserved

        writer.write_u16::<BigEndian>(0)?; // layer
        writer.write_u16::<BigEndian>(0)?; // alternate group
        writer.write_u16::<BigEndian>(self.volume)?;
        writer.write_u16::<BigEndian>(0)?; // reserved

        write_matrix(writer)?;

        writer.write_u32::<BigEndian>(self.width)?;
        writer.write_u32::<BigEndian>(self.height)?;

        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(84)
    }
}
