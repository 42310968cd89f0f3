use super::*;

const HEADER_SIZE: u64 = 8;
const ENTRY_SIZE: u64 = 4;

/// A struct representing a 32 bit chunk offset atom (`stco`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stco {
    pub offsets: Vec<u32>,
}

impl Atom for Stco {
    const FOURCC: Fourcc = SAMPLE_TABLE_CHUNK_OFFSET;
}

impl Stco {
    /// Parses a chunk offset content span, validating the table length against the span.
    pub fn parse(data: &[u8]) -> crate::Result<Self> {
        let (version, _) = parse_full_head(data, "Chunk offset (stco)")?;
        if version != 0 {
            return Err(Error::new(
                ErrorKind::UnknownVersion(version),
                "Unknown chunk offset (stco) version",
            ));
        }

        let num_entries = read_be_u32(data, 4).ok_or_else(|| {
            Error::new(ErrorKind::Parsing, "Chunk offset (stco) is missing the entry count")
        })?;
        if HEADER_SIZE + ENTRY_SIZE * num_entries as u64 != data.len() as u64 {
            return Err(Error::new(
                ErrorKind::SizeMismatch,
                format!(
                    "Chunk offset (stco) table of {} entries doesn't match content length {}",
                    num_entries,
                    data.len(),
                ),
            ));
        }

        let mut offsets = Vec::with_capacity(num_entries as usize);
        for i in 0..num_entries as usize {
            let pos = HEADER_SIZE as usize + i * ENTRY_SIZE as usize;
            offsets.push(be_u32_at(data, pos));
        }

        Ok(Self { offsets })
    }
}

impl WriteAtom for Stco {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(self.offsets.len() as u32)?;
        for o in self.offsets.iter() {
            writer.write_u32::<BigEndian>(*o)?;
        }

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = HEADER_SIZE + ENTRY_SIZE * self.offsets.len() as u64;
        Size::from(content_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn roundtrip() {
        let stco = Stco { offsets: vec![40, 4096, 123_456] };
        let mut buf = Vec::new();
        stco.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, stco.len());
        assert_eq!(Stco::parse(&buf[8..]).unwrap(), stco);
    }
}
