use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 8;

/// A struct representing a time to sample atom (`stts`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stts {
    pub items: Vec<SttsItem>,
}

/// One run of consecutive samples sharing the same duration in a time to sample table.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SttsItem {
    /// The number of consecutive samples the duration applies to.
    pub sample_count: u32,
    /// The duration of each sample in media timescale units.
    pub sample_duration: u32,
}

impl Atom for Stts {
    const FOURCC: Fourcc = SAMPLE_TABLE_TIME_TO_SAMPLE;
}

impl Stts {
    /// Creates a table with one entry per sample, mirroring the layout of Apple authored chapter
    /// files which never run-length collapse chapter durations.
    pub fn per_sample(durations: &[u32]) -> Self {
        let items = durations
            .iter()
            .map(|d| SttsItem { sample_count: 1, sample_duration: *d })
            .collect();
        Self { items }
    }

    /// Creates a table with a single run of uniform sample durations.
    pub fn single_run(sample_count: u32, sample_duration: u32) -> Self {
        Self { items: vec![SttsItem { sample_count, sample_duration }] }
    }

    /// Parses a time to sample content span, validating the table length against the span.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Time to sample (stts)")?;
        if version != 0 {
            return Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown time to sample (stts) version",
            ));
        }

        let num_entries = read_be_u32(data, 4).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Time to sample (stts) is missing the entry count")
        })?;
        if HEADER_SIZE + ENTRY_SIZE * num_entries as u64 != data.len() as u64 {
            return Err(Error::new(
                ErrorKind::SizeMismatch,
                format!(
                    "Time to sample (stts) table of {} entries doesn't match content length {}",
                    num_entries,
                    data.len(),
                ),
            ));
        }

        let mut items = Vec::with_capacity(num_entries as usize);
        for i in 0..num_entries as usize {
            let pos = HEADER_SIZE as usize + i * ENTRY_SIZE as usize;
            items.push(SttsItem {
                sample_count: be_u32_at(data, pos),
                sample_duration: be_u32_at(data, pos + 4),
            });
        }

        Ok(Self { items })
    }

    /// Returns the total number of samples described by the table.
    pub fn total_samples(&self) -> u64 {
        self.items.iter().map(|i| i.sample_count as u64).sum()
    }

    /// Returns the total duration of all samples in media timescale units.
    pub fn total_duration(&self) -> u64 {
        self.items.iter().map(|i| i.sample_count as u64 * i.sample_duration as u64).sum()
    }
}

impl WriteAtom for Stts {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.items.len() as u32)?;
        for i in self.items.iter() {
            writer.write_u32::<BigEndian>(i.sample_count)?;
            writer.write_u32::<BigEndian>(i.sample_duration)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + ENTRY_SIZE * self.items.len() as u64;
        Size::from(content_len)
    }
}
