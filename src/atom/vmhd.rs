use super::*;

/// A struct representing a video media header atom (`vmhd`). The flags field must be 1, Apple
/// players reject the track otherwise.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Vmhd;

impl Atom for Vmhd {
    const FOURCC: Fourcc = VIDEO_MEDIA_HEADER;
}

impl WriteAtom for Vmhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0, 0, 1])?;
        writer.write_u16::<BigEndian>(0)?; // graphics mode
        writer.write_u16::<BigEndian>(0)?; // opcolor red
        writer.write_u16::<BigEndian>(0)?; // opcolor green
        writer.write_u16::<BigEndian>(0)?; // opcolor blue
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(12)
    }
}
