use super::*;

/// A struct storing the size of an atom and whether it uses the extended length encoding.
///
/// ```md
/// 4 bytes standard length
/// 4 bytes identifier
/// 8 bytes optional extended length
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Size {
    /// Whether the head is of standard size (8 bytes) with a 32 bit length or extended
    /// (16 bytes) with a 64 bit length.
    ext: bool,
    /// The length including the head.
    len: u64,
}

impl Size {
    /// Creates a size for the content length, switching to the extended encoding when the total
    /// doesn't fit into 32 bits.
    pub const fn from(content_len: u64) -> Self {
        let mut len = content_len + 8;
        let ext = len > u32::MAX as u64;
        if ext {
            len += 8;
        }
        Self { ext, len }
    }

    /// Creates a size with the exact encoding read from a file.
    pub const fn parsed(ext: bool, len: u64) -> Self {
        Self { ext, len }
    }

    pub const fn ext(&self) -> bool {
        self.ext
    }

    pub const fn len(&self) -> u64 {
        self.len
    }

    pub const fn head_len(&self) -> u64 {
        match self.ext {
            true => 16,
            false => 8,
        }
    }

    pub const fn content_len(&self) -> u64 {
        match self.ext {
            true => self.len - 16,
            false => self.len - 8,
        }
    }
}

/// A head specifying the size and type of an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Head {
    size: Size,
    fourcc: Fourcc,
}

impl Deref for Head {
    type Target = Size;

    fn deref(&self) -> &Self::Target {
        &self.size
    }
}

impl Head {
    pub const fn from(size: Size, fourcc: Fourcc) -> Self {
        Self { size, fourcc }
    }

    pub const fn size(&self) -> Size {
        self.size
    }

    pub const fn fourcc(&self) -> Fourcc {
        self.fourcc
    }
}

/// Writes an atom head, using the extended 64 bit length encoding if the size requires it.
pub fn write_head(writer: &mut impl Write, head: Head) -> crate::Result<()> {
    if head.ext() {
        writer.write_u32::<BigEndian>(1)?;
        writer.write_all(&*head.fourcc)?;
        writer.write_u64::<BigEndian>(head.len())?;
    } else {
        writer.write_u32::<BigEndian>(head.len() as u32)?;
        writer.write_all(&*head.fourcc)?;
    }
    Ok(())
}

/// Writes a full atom head.
///
/// ```md
/// 1 byte version
/// 3 bytes flags
/// ```
pub fn write_full_head(writer: &mut impl Write, version: u8, flags: [u8; 3]) -> crate::Result<()> {
    writer.write_all(&[version])?;
    writer.write_all(&flags)?;
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn size_encoding() {
        let size = Size::from(100);
        assert!(!size.ext());
        assert_eq!(size.len(), 108);
        assert_eq!(size.head_len(), 8);
        assert_eq!(size.content_len(), 100);

        let size = Size::from(u32::MAX as u64);
        assert!(size.ext());
        assert_eq!(size.head_len(), 16);
        assert_eq!(size.content_len(), u32::MAX as u64);
    }
}
