use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 12;

/// A struct representing a sample to chunk atom (`stsc`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsc {
    pub items: Vec<StscItem>,
}

/// One run of consecutive chunks sharing the same sample count.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StscItem {
    /// The 1-based index of the first chunk the entry applies to.
    pub first_chunk: u32,
    pub samples_per_chunk: u32,
    pub sample_description_id: u32,
}

impl Atom for Stsc {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_TO_CHUNK;
}

impl Stsc {
    /// Run-length encodes a samples-per-chunk plan.
    pub fn from_plan(plan: &[u32]) -> Self {
        let mut items: Vec<StscItem> = Vec::new();
        for (i, samples) in plan.iter().enumerate() {
            match items.last() {
                Some(last) if last.samples_per_chunk == *samples => (),
                _ => items.push(StscItem {
                    first_chunk: i as u32 + 1,
                    samples_per_chunk: *samples,
                    sample_description_id: 1,
                }),
            }
        }
        Self { items }
    }

    /// Parses a sample to chunk content span, validating the table length against the span.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Sample to chunk (stsc)")?;
        if version != 0 {
            return Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample to chunk (stsc) version",
            ));
        }

        let num_entries = read_be_u32(data, 4).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Sample to chunk (stsc) is missing the entry count")
        })?;
        if HEADER_SIZE + ENTRY_SIZE * num_entries as u64 != data.len() as u64 {
            return Err(Error::new(
                ErrorKind::SizeMismatch,
                format!(
                    "Sample to chunk (stsc) table of {} entries doesn't match content length {}",
                    num_entries,
                    data.len(),
                ),
            ));
        }

        let mut items = Vec::with_capacity(num_entries as usize);
        for i in 0..num_entries as usize {
            let pos = HEADER_SIZE as usize + i * ENTRY_SIZE as usize;
            items.push(StscItem {
                first_chunk: be_u32_at(data, pos),
                samples_per_chunk: be_u32_at(data, pos + 4),
                sample_description_id: be_u32_at(data, pos + 8),
            });
        }

        Ok(Self { items })
    }

    /// Expands the run-length encoded table into a samples-per-chunk plan covering `chunk_count`
    /// chunks and exactly `sample_count` samples. Returns `None` when the table doesn't describe
    /// that layout consistently, callers then fall back to a reconstructed plan.
    pub fn plan(&self, sample_count: u64, chunk_count: usize) -> Option<Vec<u32>> {
        if self.items.is_empty() || self.items[0].first_chunk != 1 {
            return None;
        }

        let mut plan = Vec::with_capacity(chunk_count);
        let mut total: u64 = 0;
        for (i, item) in self.items.iter().enumerate() {
            let run_end = match self.items.get(i + 1) {
                Some(next) if next.first_chunk > item.first_chunk => next.first_chunk - 1,
                Some(_) => return None,
                None => chunk_count as u32,
            };
            if run_end < item.first_chunk || run_end as usize > chunk_count {
                return None;
            }
            for _ in item.first_chunk..=run_end {
                plan.push(item.samples_per_chunk);
                total += item.samples_per_chunk as u64;
            }
        }

        if plan.len() != chunk_count || total != sample_count {
            return None;
        }
        Some(plan)
    }
}

impl WriteAtom for Stsc {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.items.len() as u32)?;
        for i in self.items.iter() {
            writer.write_u32::<BigEndian>(i.first_chunk)?;
            writer.write_u32::<BigEndian>(i.samples_per_chunk)?;
            writer.write_u32::<BigEndian>(i.sample_description_id)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + ENTRY_SIZE * self.items.len() as u64;
        Size::from(content_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_length_encoding() {
        let stsc = Stsc::from_plan(&[21, 21, 21, 13]);
        assert_eq!(stsc.items.len(), 2);
        assert_eq!(stsc.items[0], StscItem {
            first_chunk: 1,
            samples_per_chunk: 21,
            sample_description_id: 1,
        });
        assert_eq!(stsc.items[1].first_chunk, 4);

        assert_eq!(stsc.plan(76, 4).unwrap(), vec![21, 21, 21, 13]);
    }

    #[test]
    fn inconsistent_plans_are_rejected() {
        let stsc = Stsc::from_plan(&[10, 10]);
        // wrong sample total
        assert_eq!(stsc.plan(21, 2), None);
        // wrong chunk count
        assert_eq!(stsc.plan(20, 3), None);

        // first chunk not starting at 1
        let stsc = Stsc {
            items: vec![StscItem { first_chunk: 2, samples_per_chunk: 1, sample_description_id: 1 }],
        };
        assert_eq!(stsc.plan(2, 2), None);
    }

    #[test]
    fn roundtrip() {
        let stsc = Stsc::from_plan(&[1, 1, 1]);
        let mut buf = Vec::new();
        stsc.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stsc.len());
        assert_eq!(Stsc::parse(&buf[8..]).unwrap(), stsc);
    }
}
