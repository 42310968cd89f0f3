use super::*;

/// A struct representing a metadata atom (`meta`) wrapping the item list together with the
/// `mdir` handler Apple players expect.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Meta {
    pub ilst: Ilst,
}

impl Atom for Meta {
    const FOURCC: Fourcc = METADATA;
}

impl WriteAtom for Meta {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;
        Hdlr::metadata_dir().write(writer)?;
        self.ilst.write(writer)?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 4 + Hdlr::metadata_dir().len() + self.ilst.len();
        Size::from(content_len)
    }
}
