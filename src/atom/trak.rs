use super::*;

/// A struct representing a track atom (`trak`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trak {
    pub tkhd: Tkhd,
    pub tref: Option<Tref>,
    pub edts: Option<Edts>,
    pub mdia: Mdia,
}

impl Atom for Trak {
    const FOURCC: Fourcc = TRACK;
}

impl WriteAtom for Trak {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.tkhd.write(writer)?;
        if let Some(a) = &self.tref {
            a.write(writer)?;
        }
        if let Some(a) = &self.edts {
            a.write(writer)?;
        }
        self.mdia.write(writer)?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.tkhd.len()
            + self.tref.as_ref().map_or(0, |a| a.len())
            + self.edts.as_ref().map_or(0, |a| a.len())
            + self.mdia.len();
        Size::from(content_len)
    }
}
