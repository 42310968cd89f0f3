use super::*;

/// A struct representing a sync sample atom (`stss`) marking every sample as a key frame, used
/// by the chapter image track so players can seek to any chapter image.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stss {
    pub sample_count: u32,
}

impl Atom for Stss {
    const FOURCC: Fourcc = SAMPLE_TABLE_SYNC_SAMPLE;
}

impl WriteAtom for Stss {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.sample_count)?;
        for i in 0..self.sample_count {
            writer.write_u32::<BigEndian>(i + 1)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 8 + 4 * self.sample_count as u64;
        Size::from(content_len)
    }
}
