use super::*;

/// A struct representing a sound media header atom (`smhd`).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Smhd;

impl Atom for Smhd {
    const FOURCC: Fourcc = SOUND_MEDIA_HEADER;
}

impl WriteAtom for Smhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;
        writer.write_u16::<BigEndian>(0)?; // balance
        writer.write_u16::<BigEndian>(0)?; // reserved
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(8)
    }
}
