use crate::{Error, ErrorKind};

/// A chapter title with an optional hyperlink, shown by players at the start time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TextChapter {
    /// The absolute start time in milliseconds.
    pub start_ms: u64,
    /// The UTF-8 chapter title.
    pub title: String,
    /// An optional hyperlink attached to the chapter. The title text itself stays plain, the URL
    /// is carried in a separate modifier box following the Apple chapter link convention.
    pub href: Option<String>,
}

impl TextChapter {
    /// Creates a new chapter title starting at the time in milliseconds.
    pub fn new(start_ms: u64, title: impl Into<String>) -> Self {
        Self { start_ms, title: title.into(), href: None }
    }

    /// Creates a new chapter title carrying a hyperlink.
    pub fn with_href(start_ms: u64, title: impl Into<String>, href: impl Into<String>) -> Self {
        Self { start_ms, title: title.into(), href: Some(href.into()) }
    }
}

/// A chapter cover image (JPEG or PNG bytes), shown by players from the start time on.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ImageChapter {
    /// The absolute start time in milliseconds.
    pub start_ms: u64,
    /// The raw image bytes. The format is detected from the bytes, never declared by the caller.
    pub data: Vec<u8>,
}

impl ImageChapter {
    /// Creates a new chapter image starting at the time in milliseconds.
    pub fn new(start_ms: u64, data: Vec<u8>) -> Self {
        Self { start_ms, data }
    }
}

/// A flat set of metadata tags written into the iTunes style item list.
///
/// Absent fields emit nothing, they never produce empty placeholder items.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MetadataSet {
    /// The title (`©nam`).
    pub title: Option<String>,
    /// The artist (`©ART`).
    pub artist: Option<String>,
    /// The album (`©alb`).
    pub album: Option<String>,
    /// The genre (`©gen`).
    pub genre: Option<String>,
    /// The release year (`©day`), free-form.
    pub year: Option<String>,
    /// The comment (`©cmt`).
    pub comment: Option<String>,
    /// The cover artwork (`covr`), JPEG or PNG bytes.
    pub cover: Option<Vec<u8>>,
}

impl MetadataSet {
    /// Returns whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.genre.is_none()
            && self.year.is_none()
            && self.comment.is_none()
            && self.cover.is_none()
    }
}

/// An image format detected by sniffing magic bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImgFmt {
    /// JPEG in a JFIF wrapper.
    Jpeg,
    /// PNG.
    Png,
}

impl ImgFmt {
    /// Detects the image format from the first bytes of the data. The caller is never trusted to
    /// declare the format since a wrong flag would desynchronize from the actual bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(&[0xFF, 0xD8]) {
            Some(Self::Jpeg)
        } else if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else {
            None
        }
    }
}

/// Image properties decoded from the header of a chapter image or cover.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ImgInfo {
    pub fmt: ImgFmt,
    pub width: u16,
    pub height: u16,
    /// Whether a JPEG is 4:2:0 subsampled. Always true for PNG.
    pub yuv420: bool,
}

impl ImgInfo {
    /// Reads format and dimensions from the image header.
    pub fn read(data: &[u8]) -> crate::Result<Self> {
        let fmt = ImgFmt::sniff(data).ok_or_else(|| {
            Error::new(ErrorKind::InvalidInput, "Image bytes are neither JPEG nor PNG")
        })?;
        match fmt {
            ImgFmt::Jpeg => jpeg_info(data),
            ImgFmt::Png => png_info(data),
        }
    }
}

/// Walks JPEG segments until a start of frame marker and reads the dimensions and chroma
/// subsampling factors from it.
fn jpeg_info(data: &[u8]) -> crate::Result<ImgInfo> {
    let mut i = 2;
    while i + 3 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        let marker = data[i + 1];
        if marker == 0xFF {
            i += 1;
            continue;
        }
        // EOI or SOS ends the searchable header section.
        if marker == 0xD9 || marker == 0xDA {
            break;
        }

        let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
        if seg_len < 2 || i + 2 + seg_len > data.len() {
            break;
        }

        let is_sof = matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF);
        if is_sof && seg_len >= 7 {
            let height = u16::from_be_bytes([data[i + 5], data[i + 6]]);
            let width = u16::from_be_bytes([data[i + 7], data[i + 8]]);

            // Subsampling factors live in the component tables that follow, 3 components
            // expected for YCbCr.
            let mut yuv420 = false;
            if seg_len >= 2 + 6 + 3 * 3 && data[i + 9] == 3 {
                let y = data[i + 11];
                let cb = data[i + 14];
                let cr = data[i + 17];
                yuv420 = y == 0x22 && cb == 0x11 && cr == 0x11;
            }

            return Ok(ImgInfo { fmt: ImgFmt::Jpeg, width, height, yuv420 });
        }

        i += 2 + seg_len;
    }

    Err(Error::new(ErrorKind::InvalidInput, "No start of frame marker found in JPEG data"))
}

/// Reads the dimensions from the IHDR chunk, which is required to be the first chunk of a PNG.
fn png_info(data: &[u8]) -> crate::Result<ImgInfo> {
    if data.len() < 24 || &data[12..16] != b"IHDR" {
        return Err(Error::new(ErrorKind::InvalidInput, "PNG data is missing the IHDR chunk"));
    }

    let width = u32::from_be_bytes([data[16], data[17], data[18], data[19]]);
    let height = u32::from_be_bytes([data[20], data[21], data[22], data[23]]);

    Ok(ImgInfo {
        fmt: ImgFmt::Png,
        width: width.min(u16::MAX as u32) as u16,
        height: height.min(u16::MAX as u32) as u16,
        yuv420: true,
    })
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    /// A minimal JPEG header: SOI, then a SOF0 segment describing a 4:2:0 subsampled image.
    pub fn jpeg_header(width: u16, height: u16, yuv420: bool) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.push(3);
        let y = if yuv420 { 0x22 } else { 0x11 };
        data.extend_from_slice(&[1, y, 0, 2, 0x11, 0, 3, 0x11, 0]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    pub fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut data = b"\x89PNG\r\n\x1a\n".to_vec();
        data.extend_from_slice(&13u32.to_be_bytes());
        data.extend_from_slice(b"IHDR");
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[8, 2, 0, 0, 0]);
        data
    }

    #[test]
    fn sniffing() {
        assert_eq!(ImgFmt::sniff(&jpeg_header(2, 2, true)), Some(ImgFmt::Jpeg));
        assert_eq!(ImgFmt::sniff(&png_header(2, 2)), Some(ImgFmt::Png));
        assert_eq!(ImgFmt::sniff(b"GIF89a"), None);
        assert_eq!(ImgFmt::sniff(&[]), None);
    }

    #[test]
    fn jpeg_dimensions() {
        let info = ImgInfo::read(&jpeg_header(1280, 720, true)).unwrap();
        assert_eq!(info.width, 1280);
        assert_eq!(info.height, 720);
        assert!(info.yuv420);

        let info = ImgInfo::read(&jpeg_header(64, 48, false)).unwrap();
        assert!(!info.yuv420);
    }

    #[test]
    fn png_dimensions() {
        let info = ImgInfo::read(&png_header(800, 600)).unwrap();
        assert_eq!(info.width, 800);
        assert_eq!(info.height, 600);
        assert_eq!(info.fmt, ImgFmt::Png);
    }
}
