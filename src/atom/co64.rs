use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 8;

/// A struct representing a 64 bit chunk offset atom (`co64`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Co64 {
    pub offsets: Vec<u64>,
}

impl Atom for Co64 {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET_64;
}

impl Co64 {
    /// Parses a 64 bit chunk offset content span, validating the table length against the span.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Chunk offset (co64)")?;
        if version != 0 {
            return Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown chunk offset (co64) version",
            ));
        }

        let num_entries = read_be_u32(data, 4).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Chunk offset (co64) is missing the entry count")
        })?;
        if HEADER_SIZE + ENTRY_SIZE * num_entries as u64 != data.len() as u64 {
            return Err(Error::new(
                ErrorKind::SizeMismatch,
                format!(
                    "Chunk offset (co64) table of {} entries doesn't match content length {}",
                    num_entries,
                    data.len(),
                ),
            ));
        }

        let mut offsets = Vec::with_capacity(num_entries as usize);
        for i in 0..num_entries as usize {
            let pos = HEADER_SIZE as usize + i * ENTRY_SIZE as usize;
            offsets.push(be_u64_at(data, pos));
        }

        Ok(Self { offsets })
    }
}

impl WriteAtom for Co64 {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.offsets.len() as u32)?;
        for o in self.offsets.iter() {
            writer.write_u64::<BigEndian>(*o)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + ENTRY_SIZE * self.offsets.len() as u64;
        Size::from(content_len)
    }
}
