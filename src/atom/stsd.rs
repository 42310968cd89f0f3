use super::*;
use crate::types::ImgFmt;

/// A struct representing a sample description atom (`stsd`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stsd {
    pub entry: SampleEntry,
}

/// The sample description of one track.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SampleEntry {
    /// The verbatim content of a source file's sample description, including version, flags and
    /// entry count. Audio descriptions are passed through untouched so opaque decoder
    /// configuration (`esds`) survives remuxing byte-exact.
    Raw(Vec<u8>),
    /// An AAC audio sample entry built from decoder configuration.
    Mp4a(Mp4aEntry),
    /// A 3GPP timed text sample entry used for chapter titles.
    Tx3g,
    /// A QuickTime still image sample entry used for chapter images.
    Image(ImageEntry),
}

impl Atom for Stsd {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_DESCRIPTION;
}

impl Stsd {
    pub const fn raw(payload: Vec<u8>) -> Self {
        Self { entry: SampleEntry::Raw(payload) }
    }

    pub const fn tx3g() -> Self {
        Self { entry: SampleEntry::Tx3g }
    }

    pub const fn image(fmt: ImgFmt, width: u16, height: u16) -> Self {
        Self { entry: SampleEntry::Image(ImageEntry { fmt, width, height }) }
    }

    pub const fn mp4a(entry: Mp4aEntry) -> Self {
        Self { entry: SampleEntry::Mp4a(entry) }
    }
}

impl WriteAtom for Stsd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        match &self.entry {
            SampleEntry::Raw(payload) => writer.write_all(payload)?,
            entry => {
                write_full_head(writer, 0, [0; 3])?;
                writer.write_u32::<BigEndian>(1)?; // entry count
                match entry {
                    SampleEntry::Raw(_) => unreachable!(),
                    SampleEntry::Mp4a(e) => e.write(writer)?,
                    SampleEntry::Tx3g => write_tx3g_entry(writer)?,
                    SampleEntry::Image(e) => e.write(writer)?,
                }
            }
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = match &self.entry {
            SampleEntry::Raw(payload) => payload.len() as u64,
            SampleEntry::Mp4a(e) => 8 + e.len(),
            SampleEntry::Tx3g => 8 + tx3g_entry_len(),
            SampleEntry::Image(e) => 8 + e.len(),
        };
        Size::from(content_len)
    }
}

const FONT_ID: u16 = 1;
const FONT_NAME: &str = "Helvetica";
const FONT_SIZE: u8 = 12;

fn tx3g_entry_len() -> u64 {
    let ftab_len = 8 + 2 + 2 + 1 + FONT_NAME.len() as u64 + 1;
    // sample entry header + display flags + justification + background color + default text box
    // + style record, then the font table child
    8 + (8 + 4 + 2 + 4 + 8 + 12) + ftab_len
}

/// Writes a `tx3g` text sample entry: no background, default text box, a single plain style
/// record covering the whole sample, and a font table naming Helvetica.
fn write_tx3g_entry(writer: &mut impl Write) -> crate::Result<()> {
    writer.write_u32::<BigEndian>(tx3g_entry_len() as u32)?;
    writer.write_all(&*TIMED_TEXT)?;

    // sample entry header: 6 reserved bytes + data reference index
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u16::<BigEndian>(0)?;
    writer.write_u16::<BigEndian>(1)?;

    writer.write_u32::<BigEndian>(0)?; // display flags
    writer.write_all(&[0, 0])?; // horizontal and vertical justification
    writer.write_all(&[0, 0, 0, 0])?; // background color, transparent

    // default text box: top, left, bottom, right
    writer.write_u16::<BigEndian>(0)?;
    writer.write_u16::<BigEndian>(0)?;
    writer.write_u16::<BigEndian>(0)?;
    writer.write_u16::<BigEndian>(0)?;

    // default style record
    writer.write_u16::<BigEndian>(0)?; // start char
    writer.write_u16::<BigEndian>(0xFFFF)?; // end char, the entire sample
    writer.write_u16::<BigEndian>(FONT_ID)?;
    writer.write_all(&[0])?; // font face, plain
    writer.write_all(&[FONT_SIZE])?;
    writer.write_all(&[0, 0, 0, 0xFF])?; // text color, opaque black

    // font table
    let ftab_len = 8 + 2 + 2 + 1 + FONT_NAME.len() as u64 + 1;
    writer.write_u32::<BigEndian>(ftab_len as u32)?;
    writer.write_all(&*FONT_TABLE)?;
    writer.write_u16::<BigEndian>(1)?; // entry count
    writer.write_u16::<BigEndian>(FONT_ID)?;
    writer.write_all(&[FONT_NAME.len() as u8])?;
    writer.write_all(FONT_NAME.as_bytes())?;
    writer.write_all(&[0])?;

    Ok(())
}

/// A QuickTime compatible still image sample entry (`jpeg` or `png `).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageEntry {
    pub fmt: ImgFmt,
    pub width: u16,
    pub height: u16,
}

impl ImageEntry {
    fn fourcc(&self) -> Fourcc {
        match self.fmt {
            ImgFmt::Jpeg => JPEG_IMAGE,
            ImgFmt::Png => PNG_IMAGE,
        }
    }

    fn compressor_name(&self) -> &'static str {
        match self.fmt {
            ImgFmt::Jpeg => "JPEG",
            ImgFmt::Png => "PNG",
        }
    }

    fn len(&self) -> u64 {
        // sample entry header + version/revision/vendor + quality + dimensions + resolution
        // + data size/frame count + compressor name + depth/color table
        8 + 8 + 8 + 4 + 8 + 6 + 32 + 4 + 8
    }

    fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(self.len() as u32)?;
        writer.write_all(&*self.fourcc())?;

        // sample entry header: 6 reserved bytes + data reference index
        writer.write_u32::<BigEndian>(0)?;
        writer.write_u16::<BigEndian>(0)?;
        writer.write_u16::<BigEndian>(1)?;

        writer.write_u16::<BigEndian>(0)?; // version
        writer.write_u16::<BigEndian>(0)?; // revision
        writer.write_u32::<BigEndian>(0)?; // vendor

        writer.write_u32::<BigEndian>(0)?; // temporal quality
        writer.write_u32::<BigEndian>(0)?; // spatial quality

        writer.write_u16::<BigEndian>(self.width)?;
        writer.write_u16::<BigEndian>(self.height)?;

        writer.write_u32::<BigEndian>(0x0048_0000)?; // horizontal resolution, 72dpi
        writer.write_u32::<BigEndian>(0x0048_0000)?; // vertical resolution, 72dpi

        writer.write_u32::<BigEndian>(0)?; // data size
        writer.write_u16::<BigEndian>(1)?; // frame count

        // compressor name, pascal string padded to 31 bytes
        let name = self.compressor_name();
        writer.write_all(&[name.len() as u8])?;
        writer.write_all(name.as_bytes())?;
        writer.write_all(&vec![0; 31 - name.len()])?;

        writer.write_u16::<BigEndian>(24)?; // depth
        writer.write_u16::<BigEndian>(0xFFFF)?; // no color table

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tx3g_entry_length() {
        let stsd = Stsd::tx3g();
        let mut buf = Vec::new();
        stsd.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stsd.len());
        assert_eq!(&buf[4..8], b"stsd");
        assert_eq!(&buf[20..24], b"tx3g");
    }

    #[test]
    fn image_entry_length() {
        let stsd = Stsd::image(ImgFmt::Jpeg, 1280, 720);
        let mut buf = Vec::new();
        stsd.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stsd.len());
        assert_eq!(&buf[20..24], b"jpeg");

        let stsd = Stsd::image(ImgFmt::Png, 640, 480);
        let mut buf = Vec::new();
        stsd.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stsd.len());
        assert_eq!(&buf[20..24], b"png ");
    }

    #[test]
    fn raw_passthrough() {
        let payload = vec![0, 0, 0, 0, 0, 0, 0, 1, 0xAA, 0xBB];
        let stsd = Stsd::raw(payload.clone());
        let mut buf = Vec::new();
        stsd.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stsd.len());
        assert_eq!(&buf[8..], &payload[..]);
    }
}
