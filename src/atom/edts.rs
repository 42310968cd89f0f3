use super::*;

/// A struct representing an edit atom (`edts`) containing a single edit list entry that maps the
/// whole movie timeline to media time 0.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Edts {
    /// The segment duration in movie timescale units.
    pub segment_duration: u32,
}

impl Atom for Edts {
    const FOURCC: Fourcc = EDIT;
}

impl WriteAtom for Edts {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(28)?;
        writer.write_all(&*EDIT_LIST)?;
        write_full_head(writer, 0, [0; 3])?;
        writer.write_u32::<BigEndian>(1)?; // entry count
        writer.write_u32::<BigEndian>(self.segment_duration)?;
        writer.write_u32::<BigEndian>(0)?; // media time
        writer.write_u32::<BigEndian>(0x0001_0000)?; // media rate 1.0
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(28)
    }
}
