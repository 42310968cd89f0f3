use std::borrow::Cow;

use super::*;

/// A struct representing a media data atom (`mdat`). Pieces are written back to back in the
/// order they were added: audio chunks first, then text samples, then image samples. Audio
/// pieces borrow from the source buffer, synthesized chapter samples are owned.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mdat<'a> {
    pub pieces: Vec<Cow<'a, [u8]>>,
}

impl Atom for Mdat<'_> {
    const FOURCC: Fourcc = MEDIA_DATA;
}

impl Mdat<'_> {
    pub fn content_len(&self) -> u64 {
        self.pieces.iter().map(|p| p.len() as u64).sum()
    }
}

impl WriteAtom for Mdat<'_> {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        for p in self.pieces.iter() {
            writer.write_all(p)?;
        }
        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(self.content_len())
    }
}
