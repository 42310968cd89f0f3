use super::*;

const HEADER_SIZE: u64 = 12;
const ENTRY_SIZE: u64 = 4;

/// A struct representing a sample size atom (`stsz`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stsz {
    /// If this field is non-zero every sample has this size and the size list is empty.
    pub uniform_sample_size: u32,
    pub sample_count: u32,
    pub sizes: Vec<u32>,
}

impl Atom for Stsz {
    const FOURCC: Fourcc = SAMPLE_TABLE_SAMPLE_SIZE;
}

impl Stsz {
    /// Creates a table of individual sample sizes.
    pub fn variable(sizes: Vec<u32>) -> Self {
        Self { uniform_sample_size: 0, sample_count: sizes.len() as u32, sizes }
    }

    /// Parses a sample size content span, validating the table length against the span.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Sample size (stsz)")?;
        if version != 0 {
            return Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown sample size (stsz) version",
            ));
        }

        let uniform_sample_size = read_be_u32(data, 4).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Sample size (stsz) is missing the uniform size field")
        })?;
        let sample_count = read_be_u32(data, 8).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Sample size (stsz) is missing the sample count")
        })?;

        let sizes = if uniform_sample_size == 0 {
            if HEADER_SIZE + ENTRY_SIZE * sample_count as u64 != data.len() as u64 {
                return Err(Error::new(
                    ErrorKind::SizeMismatch,
                    format!(
                        "Sample size (stsz) table of {} entries doesn't match content length {}",
                        sample_count,
                        data.len(),
                    ),
                ));
            }
            let mut sizes = Vec::with_capacity(sample_count as usize);
            for i in 0..sample_count as usize {
                let pos = HEADER_SIZE as usize + i * ENTRY_SIZE as usize;
                sizes.push(be_u32_at(data, pos));
            }
            sizes
        } else {
            if data.len() as u64 != HEADER_SIZE {
                return Err(Error::new(
                    ErrorKind::SizeMismatch,
                    format!(
                        "Sample size (stsz) uniform size set, but content length {} doesn't match",
                        data.len(),
                    ),
                ));
            }
            Vec::new()
        };

        Ok(Self { uniform_sample_size, sample_count, sizes })
    }

    /// Returns the size of the sample at the index.
    pub fn size_of(&self, index: usize) -> u32 {
        if self.uniform_sample_size != 0 {
            self.uniform_sample_size
        } else {
            self.sizes[index]
        }
    }

    /// Returns every sample size as an owned list, expanding the uniform encoding.
    pub fn expanded(&self) -> Vec<u32> {
        if self.uniform_sample_size != 0 {
            vec![self.uniform_sample_size; self.sample_count as usize]
        } else {
            self.sizes.clone()
        }
    }
}

impl WriteAtom for Stsz {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.uniform_sample_size)?;
        writer.write_u32::<BigEndian>(self.sample_count)?;
        for s in self.sizes.iter() {
            writer.write_u32::<BigEndian>(*s)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + ENTRY_SIZE * self.sizes.len() as u64;
        Size::from(content_len)
    }
}
