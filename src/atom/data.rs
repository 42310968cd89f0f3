use super::*;

/// UTF-8 without any count or NULL terminator.
const UTF8: u32 = 1;
/// JPEG in a JFIF wrapper.
const JPEG: u32 = 13;
/// PNG in a PNG wrapper.
const PNG: u32 = 14;

/// Typed data carried inside a metadata item's `data` atom. The type codes follow Apple's
/// well-known data types table.
#[derive(Clone, Eq, PartialEq)]
pub enum Data {
    Utf8(String),
    Jpeg(Vec<u8>),
    Png(Vec<u8>),
}

impl std::fmt::Debug for Data {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Utf8(s) => write!(f, "Data::Utf8({s:?})"),
            Self::Jpeg(_) => write!(f, "Data::Jpeg"),
            Self::Png(_) => write!(f, "Data::Png"),
        }
    }
}

impl Atom for Data {
    const FOURCC: Fourcc = DATA;
}

impl Data {
    fn type_code(&self) -> u32 {
        match self {
            Self::Utf8(_) => UTF8,
            Self::Jpeg(_) => JPEG,
            Self::Png(_) => PNG,
        }
    }

    fn payload(&self) -> &[u8] {
        match self {
            Self::Utf8(s) => s.as_bytes(),
            Self::Jpeg(d) => d,
            Self::Png(d) => d,
        }
    }
}

impl WriteAtom for Data {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(self.type_code())?;
        writer.write_u32::<BigEndian>(0)?; // locale
        writer.write_all(self.payload())?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 8 + self.payload().len() as u64;
        Size::from(content_len)
    }
}
