use super::*;

/// A struct representing a user data atom (`udta`) carrying the chapter list and the metadata
/// hierarchy.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Udta {
    pub chpl: Option<Chpl>,
    pub meta: Meta,
}

impl Atom for Udta {
    const FOURCC: Fourcc = USER_DATA;
}

impl WriteAtom for Udta {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.meta.write(writer)?;
        if let Some(a) = &self.chpl {
            a.write(writer)?;
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.meta.len() + self.chpl.as_ref().map_or(0, |a| a.len());
        Size::from(content_len)
    }
}
