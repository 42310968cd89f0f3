use super::*;

/// The chunk offset table of a track, either 32 or 64 bit. The muxer chooses the width once for
/// the whole file, offset tables of different widths are never mixed within one output.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkOffsets {
    Stco(Stco),
    Co64(Co64),
}

impl ChunkOffsets {
    /// Creates a table of yet unassigned offsets, sized for the chunk count. Offsets are filled
    /// in by the muxer once the final layout is known.
    pub fn placeholder(chunk_count: usize) -> Self {
        Self::Stco(Stco { offsets: vec![0; chunk_count] })
    }

    pub fn entry_count(&self) -> usize {
        match self {
            Self::Stco(a) => a.offsets.len(),
            Self::Co64(a) => a.offsets.len(),
        }
    }

    /// Switches the table to the 64 bit encoding, keeping the entry count.
    pub fn widen(&mut self) {
        if let Self::Stco(a) = self {
            let offsets = a.offsets.iter().map(|o| *o as u64).collect();
            *self = Self::Co64(Co64 { offsets });
        }
    }

    /// Fills in the final absolute chunk offsets. The caller has already verified that every
    /// offset fits the table's width.
    pub fn assign(&mut self, offsets: &[u64]) -> crate::Result<()> {
        if offsets.len() != self.entry_count() {
            return Err(Error::new(
                ErrorKind::Internal,
                format!(
                    "Chunk offset table of {} entries can't hold {} computed offsets",
                    self.entry_count(),
                    offsets.len(),
                ),
            ));
        }
        match self {
            Self::Stco(a) => {
                for (dst, src) in a.offsets.iter_mut().zip(offsets) {
                    if *src > u32::MAX as u64 {
                        return Err(Error::new(
                            ErrorKind::Internal,
                            "64 bit chunk offset assigned to a 32 bit table",
                        ));
                    }
                    *dst = *src as u32;
                }
            }
            Self::Co64(a) => {
                for (dst, src) in a.offsets.iter_mut().zip(offsets) {
                    *dst = *src;
                }
            }
        }
        Ok(())
    }

    fn write(&self, writer: &mut impl Write) -> crate::Result<()> {
        match self {
            Self::Stco(a) => a.write(writer),
            Self::Co64(a) => a.write(writer),
        }
    }

    fn len(&self) -> u64 {
        match self {
            Self::Stco(a) => a.len(),
            Self::Co64(a) => a.len(),
        }
    }
}

/// A struct representing a sample table atom (`stbl`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Stbl {
    pub stsd: Stsd,
    pub stts: Stts,
    pub stss: Option<Stss>,
    pub stsc: Stsc,
    pub stsz: Stsz,
    pub offsets: ChunkOffsets,
}

impl Atom for Stbl {
    const FOURCC: Fourcc = SAMPLE_TABLE;
}

impl WriteAtom for Stbl {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        self.stsd.write(writer)?;
        self.stts.write(writer)?;
        if let Some(a) = &self.stss {
            a.write(writer)?;
        }
        self.stsc.write(writer)?;
        self.stsz.write(writer)?;
        self.offsets.write(writer)?;
        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = self.stsd.len()
            + self.stts.len()
            + self.stss.as_ref().map_or(0, |a| a.len())
            + self.stsc.len()
            + self.stsz.len()
            + self.offsets.len();
        Size::from(content_len)
    }
}
