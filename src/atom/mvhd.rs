use super::*;

/// A struct representing a movie header atom (`mvhd`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Mvhd {
    pub timescale: u32,
    pub duration: u64,
    pub next_track_id: u32,
}

impl Atom for Mvhd {
    const FOURCC: Fourcc = MOVIE_HEADER;
}

impl WriteAtom for Mvhd {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(0)?; // creation time
        writer.write_u32::<BigEndian>(0)?; // modification time
        writer.write_u32::<BigEndian>(self.timescale)?;
        writer.write_u32::<BigEndian>(self.duration as u32)?;

        writer.write_u32::<BigEndian>(0x0001_0000)?; // rate 1.0
        writer.write_u16::<BigEndian>(0x0100)?; // volume 1.0
        writer.write_u16::<BigEndian>(0)?; // reserved
        writer.write_u64::<BigEndian>(0)?; // reserved

        write_matrix(writer)?;

        // pre defined
        writer.write_all(&[0; 24])?;

        writer.write_u32::<BigEndian>(self.next_track_id)?;

        Ok(())
    }

    fn size(&self) -> Size {
        Size::from(100)
    }
}

/// Writes the identity transformation matrix used by QuickTime.
pub(crate) fn write_matrix(writer: &mut impl Write) -> crate::Result<()> {
    writer.write_u32::<BigEndian>(0x0001_0000)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0x0001_0000)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0)?;
    writer.write_u32::<BigEndian>(0x4000_0000)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn written_length_matches_size() {
        let mvhd = Mvhd { timescale: 600, duration: 1200, next_track_id: 3 };
        let mut buf = Vec::new();
        mvhd.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, mvhd.len());
        assert_eq!(&buf[4..8], b"mvhd");
    }
}
