use super::*;

/// A struct representing a media atom (`mdia`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Mdia {
    pub mdhd: Mdhd,
    pub hdlr: Hdlr,
    pub minf: Minf,
}

impl Atom for Mdia {
    const FOURCC: Fourcc = MEDIA;
}

impl WriteAtom for Mdia {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.mdhd.write(writer)?;
        self.hdlr.write(writer)?;
        self.minf.write(writer)?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.mdhd.len() + self.hdlr.len() + self.minf.len();
        Size::from(content_len)
    }
}
