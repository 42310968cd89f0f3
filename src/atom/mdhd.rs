use super::*;

/// ISO 639-2 "und" packed into 15 bits.
pub(crate) const LANG_UNDETERMINED: u16 = 0x55C4;
/// ISO 639-2 "eng" packed into 15 bits.
pub(crate) const LANG_ENGLISH: u16 = 0x15C7;

/// A struct representing a media header atom (`mdhd`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mdhd {
    pub timescale: u32,
    /// The duration in units of the media's own timescale.
    pub duration: u64,
    pub language: u16,
}

impl Atom for Mdhd {
    const FOURCC: Fourcc = MEDIA_HEADER;
}

impl Mdhd {
    pub const fn new(timescale: u32, duration: u64, language: u16) -> Self {
        Self { timescale, duration, language }
    }

    /// Parses the timescale and duration from a media header content span, handling both the
    /// 32 bit version 0 and the 64 bit version 1 layout.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Media header (mdhd)")?;

        match version {
            0 => {
                if data.len() < 24 {
                    return Err(Error::new(
                        ErrorKind::SizeMismatch,
                        "Media header (mdhd) version 0 is shorter than 24 bytes",
                    ));
                }
                let timescale = be_u32_at(data, 12);
                let duration = be_u32_at(data, 16) as u64;
                let language = u16::from_be_bytes([data[20], data[21]]);
                Ok(Self { timescale, duration, language })
            }
            1 => {
                if data.len() < 36 {
                    return Err(Error::new(
                        ErrorKind::SizeMismatch,
                        "Media header (mdhd) version 1 is shorter than 36 bytes",
                    ));
                }
                let timescale = be_u32_at(data, 20);
                let duration = be_u64_at(data, 24);
                let language = u16::from_be_bytes([data[32], data[33]]);
                Ok(Self { timescale, duration, language })
            }
            _ => Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown media header (mdhd) version",
            )),
        }
    }
}

impl WriteAtom for Mdhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(0)?; // creation time
        writer.write_u32::<BigEndian>(0)?; // modification time
        writer.write_u32::<BigEndian>(self.timescale)?;
        writer.write_u32::<BigEndian>(self.duration as u32)?;
        writer.write_u16::<BigEndian>(self.language)?;
        writer.write_u16::<BigEndian>(0)?; // pre defined

        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(24)
    }
}
