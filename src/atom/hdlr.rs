use super::*;

/// A struct representing a handler reference atom (`hdlr`).
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Hdlr {
    pub handler_type: Fourcc,
    pub name: String,
}

impl Atom for Hdlr {
    const FOURCC: Fourcc = HANDLER_REFERENCE;
}

impl Hdlr {
    pub fn sound() -> Self {
        Self { handler_type: AUDIO_HANDLER, name: "sound handler".to_owned() }
    }

    pub fn text(name: impl Into<String>) -> Self {
        Self { handler_type: TEXT_HANDLER, name: name.into() }
    }

    pub fn video(name: impl Into<String>) -> Self {
        Self { handler_type: VIDEO_HANDLER, name: name.into() }
    }

    pub fn metadata_dir() -> Self {
        Self { handler_type: METADATA_HANDLER, name: "ilst handler".to_owned() }
    }

    /// Reads the handler type from a handler reference content span. Returns `None` when the
    /// span is too small to contain the required fields, callers treat such a track as not
    /// matching any handler.
    pub fn parse_handler_type(data: &[u8]) -> Option<Fourcc> {
        // version/flags + pre defined + handler type
        if data.len() < 12 {
            return None;
        }
        let mut fourcc = Fourcc::default();
        fourcc.copy_from_slice(&data[8..12]);
        Some(fourcc)
    }
}

impl WriteAtom for Hdlr {
    fn write_atom(&self, writer: &mut impl Write) -> crate::Result<()> {
        write_full_head(writer, 0, [0; 3])?;

        writer.write_u32::<BigEndian>(0)?; // pre defined
        writer.write_all(&*self.handler_type)?;
        writer.write_all(&[0; 12])?; // reserved

        writer.write_all(self.name.as_bytes())?;
        writer.write_all(&[0])?;

        Ok(())
    }

    fn size(&self) -> Size {
        let content_len = 4 + 4 + 4 + 12 + self.name.len() as u64 + 1;
        Size::from(content_len)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn handler_type_roundtrip() {
        let hdlr = Hdlr::sound();
        let mut buf = Vec::new();
        hdlr.write(&mut buf).unwrap();
        assert_eq!(buf.len() as u64, hdlr.len());
        assert_eq!(Hdlr::parse_handler_type(&buf[8..]), Some(AUDIO_HANDLER));
    }
}
