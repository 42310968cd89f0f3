use super::*;

/// A struct representing a track reference atom (`tref`) with a single `chap` child listing the
/// chapter track ids. This reference is how Apple players discover the chapter tracks.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Tref {
    pub chapter_ids: Vec<u32>,
}

impl Atom for Tref {
    const FOURCC: Fourcc = TRACK_REFERENCE;
}

impl WriteAtom for Tref {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        let chap_len = 8 + 4 * self.chapter_ids.len() as u64;
        writer.write_u32::<BigEndian>(chap_len as u32)?;
        writer.write_all(&*CHAPTER_REFERENCE)?;
        for id in self.chapter_ids.iter() {
            writer.write_u32::<BigEndian>(*id)?;
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 8 + 4 * self.chapter_ids.len() as u64;
        Size::from(content_len)
    }
}
