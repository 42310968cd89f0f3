use super::*;

/// File type header matching Apple authored chapter files: `M4V ` major brand with `mp42`,
/// `isom`, `M4A `, `M4V ` and `dby1` listed as compatible brands.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Ftyp;

const MAJOR_BRAND: [u8; 4] = *b"M4V ";
const MINOR_VERSION: u32 = 1;
const COMPATIBLE_BRANDS: [[u8; 4]; 5] = [*b"mp42", *b"isom", *b"M4A ", *b"M4V ", *b"dby1"];

impl Atom for Ftyp {
    const FOURCC: Fourcc = FILETYPE;
}

impl WriteAtom for Ftyp {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_all(&MAJOR_BRAND)?;
        writer.write_u32::<BigEndian>(MINOR_VERSION)?;
        for b in COMPATIBLE_BRANDS.iter() {
            writer.write_all(b)?;
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 4 + 4 + 4 * COMPATIBLE_BRANDS.len() as u64;
        Size::from(content_len)
    }
}
