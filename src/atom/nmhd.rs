use super::*;

/// A struct representing a null media header atom (`nmhd`), used by the chapter text track.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Nmhd;

impl Atom for Nmhd {
    const FOURCC: Fourcc = NULL_MEDIA_HEADER;
}

impl WriteAtom for Nmhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])
    }

    fn size(&self) -> Size {
        Size::from(4)
    }
}
