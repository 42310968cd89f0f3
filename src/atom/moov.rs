use super::*;

/// A struct representing a movie atom (`moov`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Moov {
    pub mvhd: Mvhd,
    pub traks: Vec<Trak>,
    pub udta: Udta,
}

impl Atom for Moov {
    const FOURCC: Fourcc = MOVIE;
}

impl WriteAtom for Moov {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.mvhd.write(writer)?;
        for t in self.traks.iter() {
            t.write(writer)?;
        }
        self.udta.write(writer)?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.mvhd.len()
            + self.traks.iter().map(|t| t.len()).sum::<u64>()
            + self.udta.len();
        Size::from(content_len)
    }
}
