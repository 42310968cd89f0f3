use super::*;

/// A struct representing a data information atom (`dinf`) containing a data reference with a
/// single self-contained `url ` entry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Dinf;

impl Atom for Dinf {
    const FOURCC: Fourcc = DATA_INFORMATION;
}

impl WriteAtom for Dinf {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        // dref
        writer.write_u32::<BigEndian>(28)?;
        writer.write_all(&*DATA_REFERENCE)?;
        write_full_head(writer, 0, [0; 3])?;
        writer.write_u32::<BigEndian>(1)?; // entry count

        // url, flags = 1 meaning the media data is in the same file
        writer.write_u32::<BigEndian>(12)?;
        writer.write_all(&*URL_MEDIA)?;
        write_full_head(writer, 0, [0, 0, 1])?;

        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(28)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn written_length_matches_size() {
        let mut buf = Vec::new();
        Dinf.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, Dinf.len());
    }
}
