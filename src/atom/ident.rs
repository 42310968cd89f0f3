use std::fmt::{self, Write};
use std::ops::{Deref, DerefMut};

/// (`ftyp`) Identifier of the atom carrying information about the filetype.
pub(crate) const FILETYPE: Fourcc = Fourcc(*b"ftyp");
/// (`mdat`)
pub(crate) const MEDIA_DATA: Fourcc = Fourcc(*b"mdat");
/// (`moov`) Identifier of the atom containing a structure of children storing metadata.
pub(crate) const MOVIE: Fourcc = Fourcc(*b"moov");
/// (`mvhd`) Identifier of the atom containing information about the whole movie (or audio file).
pub(crate) const MOVIE_HEADER: Fourcc = Fourcc(*b"mvhd");
/// (`trak`) Identifier of an atom containing information about a single track.
pub(crate) const TRACK: Fourcc = Fourcc(*b"trak");
/// (`tkhd`)
pub(crate) const TRACK_HEADER: Fourcc = Fourcc(*b"tkhd");
/// (`tref`)
pub(crate) const TRACK_REFERENCE: Fourcc = Fourcc(*b"tref");
/// (`chap`)
pub(crate) const CHAPTER_REFERENCE: Fourcc = Fourcc(*b"chap");
/// (`edts`)
pub(crate) const EDIT: Fourcc = Fourcc(*b"edts");
/// (`elst`)
pub(crate) const EDIT_LIST: Fourcc = Fourcc(*b"elst");
/// (`mdia`) Identifier of an atom containing information about a tracks media type and data.
pub(crate) const MEDIA: Fourcc = Fourcc(*b"mdia");
/// (`mdhd`)
pub(crate) const MEDIA_HEADER: Fourcc = Fourcc(*b"mdhd");
/// (`hdlr`) Identifier of an atom specifying the handler component that interprets the media.
pub(crate) const HANDLER_REFERENCE: Fourcc = Fourcc(*b"hdlr");
/// (`minf`)
pub(crate) const MEDIA_INFORMATION: Fourcc = Fourcc(*b"minf");
/// (`smhd`)
pub(crate) const SOUND_MEDIA_HEADER: Fourcc = Fourcc(*b"smhd");
/// (`nmhd`)
pub(crate) const NULL_MEDIA_HEADER: Fourcc = Fourcc(*b"nmhd");
/// (`vmhd`)
pub(crate) const VIDEO_MEDIA_HEADER: Fourcc = Fourcc(*b"vmhd");
/// (`dinf`)
pub(crate) const DATA_INFORMATION: Fourcc = Fourcc(*b"dinf");
/// (`dref`)
pub(crate) const DATA_REFERENCE: Fourcc = Fourcc(*b"dref");
/// (`url `)
pub(crate) const URL_MEDIA: Fourcc = Fourcc(*b"url ");
/// (`stbl`)
pub(crate) const SAMPLE_TABLE: Fourcc = Fourcc(*b"stbl");
/// (`stsd`)
pub(crate) const SAMPLE_TABLE_SAMPLE_DESCRIPTION: Fourcc = Fourcc(*b"stsd");
/// (`stts`)
pub(crate) const SAMPLE_TABLE_TIME_TO_SAMPLE: Fourcc = Fourcc(*b"stts");
/// (`stsc`)
pub(crate) const SAMPLE_TABLE_SAMPLE_TO_CHUNK: Fourcc = Fourcc(*b"stsc");
/// (`stsz`)
pub(crate) const SAMPLE_TABLE_SAMPLE_SIZE: Fourcc = Fourcc(*b"stsz");
/// (`stco`)
pub(crate) const SAMPLE_TABLE_CHUNK_OFFSET: Fourcc = Fourcc(*b"stco");
/// (`co64`)
pub(crate) const SAMPLE_TABLE_CHUNK_OFFSET_64: Fourcc = Fourcc(*b"co64");
/// (`stss`)
pub(crate) const SAMPLE_TABLE_SYNC_SAMPLE: Fourcc = Fourcc(*b"stss");
/// (`mp4a`)
pub(crate) const MP4_AUDIO: Fourcc = Fourcc(*b"mp4a");
/// (`esds`)
pub(crate) const ELEMENTARY_STREAM_DESCRIPTION: Fourcc = Fourcc(*b"esds");
/// (`tx3g`)
pub(crate) const TIMED_TEXT: Fourcc = Fourcc(*b"tx3g");
/// (`ftab`)
pub(crate) const FONT_TABLE: Fourcc = Fourcc(*b"ftab");
/// (`href`) Modifier box associating a hyperlink with a text sample.
pub(crate) const HYPERLINK: Fourcc = Fourcc(*b"href");
/// (`jpeg`)
pub(crate) const JPEG_IMAGE: Fourcc = Fourcc(*b"jpeg");
/// (`png `)
pub(crate) const PNG_IMAGE: Fourcc = Fourcc(*b"png ");
/// (`udta`) Identifier of the atom containing user metadata.
pub(crate) const USER_DATA: Fourcc = Fourcc(*b"udta");
/// (`chpl`)
pub(crate) const CHAPTER_LIST: Fourcc = Fourcc(*b"chpl");
/// (`meta`) Identifier of the atom containing a metadata item list.
pub(crate) const METADATA: Fourcc = Fourcc(*b"meta");
/// (`ilst`) Identifier of the atom containing a list of metadata items.
pub(crate) const ITEM_LIST: Fourcc = Fourcc(*b"ilst");
/// (`data`) Identifier of an atom containing typed data.
pub(crate) const DATA: Fourcc = Fourcc(*b"data");
/// (`free`)
pub(crate) const FREE: Fourcc = Fourcc(*b"free");

/// (`soun`) Handler type of audio tracks.
pub(crate) const AUDIO_HANDLER: Fourcc = Fourcc(*b"soun");
/// (`text`) Handler type of text tracks.
pub(crate) const TEXT_HANDLER: Fourcc = Fourcc(*b"text");
/// (`vide`) Handler type of video (chapter image) tracks.
pub(crate) const VIDEO_HANDLER: Fourcc = Fourcc(*b"vide");
/// (`mdir`) Handler type of the metadata item list.
pub(crate) const METADATA_HANDLER: Fourcc = Fourcc(*b"mdir");

/// (`©nam`)
pub(crate) const TITLE: Fourcc = Fourcc(*b"\xa9nam");
/// (`©ART`)
pub(crate) const ARTIST: Fourcc = Fourcc(*b"\xa9ART");
/// (`©alb`)
pub(crate) const ALBUM: Fourcc = Fourcc(*b"\xa9alb");
/// (`©gen`)
pub(crate) const CUSTOM_GENRE: Fourcc = Fourcc(*b"\xa9gen");
/// (`©day`)
pub(crate) const YEAR: Fourcc = Fourcc(*b"\xa9day");
/// (`©cmt`)
pub(crate) const COMMENT: Fourcc = Fourcc(*b"\xa9cmt");
/// (`covr`)
pub(crate) const ARTWORK: Fourcc = Fourcc(*b"covr");

/// A 4 byte atom identifier (four character code).
#[derive(Clone, Copy, Default, Eq, PartialEq)]
pub struct Fourcc(pub [u8; 4]);

impl Deref for Fourcc {
    type Target = [u8; 4];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Fourcc {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Debug for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Fourcc(")?;
        for c in self.0.iter().map(|b| char::from(*b)) {
            f.write_char(c)?;
        }
        f.write_str(")")?;
        Ok(())
    }
}

impl fmt::Display for Fourcc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.iter().map(|b| char::from(*b)) {
            f.write_char(c)?;
        }
        Ok(())
    }
}

impl Fourcc {
    /// Returns whether all 4 bytes are printable ASCII, a cheap plausibility check used when
    /// probing ambiguous container layouts.
    pub(crate) fn is_printable(&self) -> bool {
        self.0.iter().all(|b| (0x20..=0x7E).contains(b))
    }
}
