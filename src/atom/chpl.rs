use super::*;

/// Ticks per second of chapter list start times.
pub(crate) const CHPL_TIMESCALE: u64 = 10_000_000;

/// A struct representing a Nero chapter list atom (`chpl`), written alongside the chapter track
/// so players that don't follow the `tref`/`chap` reference also discover chapters.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Chpl {
    pub items: Vec<ChplItem>,
}

/// One chapter list entry.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChplItem {
    /// The start time in 100 nanosecond units.
    pub start: u64,
    pub title: String,
}

impl Atom for Chpl {
    const FOURCC: Fourcc = CHAPTER_LIST;
}

impl Chpl {
    /// The chapter list stores one byte counts, longer titles are truncated at a character
    /// boundary and at most 255 entries are written.
    fn truncated_title(title: &str) -> &str {
        let mut end = title.len().min(255);
        while !title.is_char_boundary(end) {
            end -= 1;
        }
        &title[..end]
    }

    fn emitted(&self) -> impl Iterator<Item = &ChplItem> {
        self.items.iter().take(255)
    }
}

impl WriteAtom for Chpl {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_all(&[self.items.len().min(255) as u8])?;
        for item in self.emitted() {
            let title = Self::truncated_title(&item.title);
            writer.write_u64::<BigEndian>(item.start)?;
            writer.write_all(&[title.len() as u8])?;
            writer.write_all(title.as_bytes())?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 5
            + self
                .emitted()
                .map(|i| 9 + Self::truncated_title(&i.title).len() as u64)
                .sum::<u64>();
        Size::from(content_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn written_length_matches_size() {
        let chpl = Chpl {
            items: vec![
                ChplItem { start: 0, title: "Intro".to_owned() },
                ChplItem { start: 120_000 * 10_000, title: "Chapter 2".to_owned() },
            ],
        };
        let mut buf = Vec::new();
        chpl.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, chpl.len());
        // version/flags + count
        assert_eq!(buf[12], 2);
    }

    #[test]
    fn long_titles_are_truncated_at_char_boundaries() {
        let title: String = "ä".repeat(200);
        assert_eq!(title.len(), 400);
        let truncated = Chpl::truncated_title(&title);
        assert_eq!(truncated.len(), 254);
        assert!(truncated.is_char_boundary(truncated.len()));
    }
}
