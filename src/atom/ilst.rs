use super::*;
use crate::types::{ImgFmt, MetadataSet};

/// A metadata item: an identified atom wrapping a single typed `data` atom.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MetaItem {
    pub ident: Fourcc,
    pub data: Data,
}

impl MetaItem {
    pub const fn new(ident: Fourcc, data: Data) -> Self {
        Self { ident, data }
    }

    pub fn len(&self) -> u64 {
        8 + self.data.len()
    }

    pub fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        writer.write_u32::<BigEndian>(self.len() as u32)?;
        writer.write_all(&*self.ident)?;
        self.data.write(writer)
    }
}

/// A struct representing a metadata item list atom (`ilst`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ilst {
    pub content: IlstContent,
}

/// The content of an item list: either items built from a [`MetadataSet`], or the verbatim
/// payload of the source file's item list when the caller supplied no metadata.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IlstContent {
    Items(Vec<MetaItem>),
    Raw(Vec<u8>),
}

impl Atom for Ilst {
    const FOURCC: Fourcc = ITEM_LIST;
}

impl Ilst {
    /// Creates an item list reusing a verbatim source payload.
    pub const fn raw(payload: Vec<u8>) -> Self {
        Self { content: IlstContent::Raw(payload) }
    }

    /// Encodes the metadata set as an item list. Items are emitted in a fixed order (title,
    /// artist, album, genre, year, comment, cover) so output is deterministic; absent fields
    /// emit nothing. The cover's type code is derived by sniffing the image bytes.
    pub fn from_metadata(metadata: &MetadataSet) -> crate::Result<Self> {
        let mut items = Vec::new();

        let mut text = |ident: Fourcc, value: &Option<String>| {
            if let Some(v) = value {
                items.push(MetaItem::new(ident, Data::Utf8(v.clone())));
            }
        };
        text(TITLE, &metadata.title);
        text(ARTIST, &metadata.artist);
        text(ALBUM, &metadata.album);
        text(CUSTOM_GENRE, &metadata.genre);
        text(YEAR, &metadata.year);
        text(COMMENT, &metadata.comment);

        if let Some(cover) = &metadata.cover {
            let data = match ImgFmt::sniff(cover) {
                Some(ImgFmt::Jpeg) => Data::Jpeg(cover.clone()),
                Some(ImgFmt::Png) => Data::Png(cover.clone()),
                None => {
                    return Err(Error::new(
                        ErrorKind::InvalidInput,
                        "Cover bytes are neither JPEG nor PNG",
                    ));
                }
            };
            items.push(MetaItem::new(ARTWORK, data));
        }

        Ok(Self { content: IlstContent::Items(items) })
    }
}

impl WriteAtom for Ilst {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        match &self.content {
            IlstContent::Items(items) => {
                for i in items.iter() {
                    i.write(writer)?;
                }
            }
            IlstContent::Raw(payload) => writer.write_all(payload)?,
        }
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = match &self.content {
            IlstContent::Items(items) => items.iter().map(|i| i.len()).sum(),
            IlstContent::Raw(payload) => payload.len() as u64,
        };
        Size::from(content_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::test::png_header;

    #[test]
    fn empty_metadata_emits_no_items() {
        let ilst = Ilst::from_metadata(&MetadataSet::default()).unwrap();
        assert_eq!(ilst.content, IlstContent::Items(Vec::new()));
        assert_eq!(ilst.size().content_len(), 0);

        let mut buf = Vec::new();
        ilst.write(&mut buf).unwrap();
        assert_eq!(buf.len(), 8);
    }

    #[test]
    fn fixed_item_order() {
        let metadata = MetadataSet {
            comment: Some("c".to_owned()),
            title: Some("t".to_owned()),
            artist: Some("a".to_owned()),
            ..Default::default()
        };
        let ilst = Ilst::from_metadata(&metadata).unwrap();
        match &ilst.content {
            IlstContent::Items(items) => {
                let idents: Vec<Fourcc> = items.iter().map(|i| i.ident).collect();
                assert_eq!(idents, vec![TITLE, ARTIST, COMMENT]);
            }
            IlstContent::Raw(_) => panic!("expected items"),
        }
    }

    #[test]
    fn cover_type_is_sniffed() {
        let metadata = MetadataSet { cover: Some(png_header(4, 4)), ..Default::default() };
        let ilst = Ilst::from_metadata(&metadata).unwrap();
        match &ilst.content {
            IlstContent::Items(items) => assert!(matches!(items[0].data, Data::Png(_))),
            IlstContent::Raw(_) => panic!("expected items"),
        }

        let metadata = MetadataSet { cover: Some(vec![1, 2, 3]), ..Default::default() };
        let err = Ilst::from_metadata(&metadata).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidInput));
    }
}
