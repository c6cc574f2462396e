/// Index into the section table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct SectionIndex(pub usize);

/// Index into a string table.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct StringIndex(pub u32);

/// An index into a byte within an ELF file.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Offset(pub u64);

/// A range of bytes within the ELF file.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Bytes {
    pub start: Offset,
    pub size: u64,
}

impl Bytes {
    pub fn from_raw(start: u64, size: u64) -> Self {
        Bytes {
            start: Offset(start),
            size,
        }
    }

    /// One past the last byte. Saturates so that garbage sizes can still be reported.
    pub fn end(&self) -> Offset {
        Offset(self.start.0.saturating_add(self.size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end() {
        let bytes = Bytes::from_raw(0x10, 4);
        assert_eq!(bytes.end(), Offset(0x14));
        assert_eq!(Bytes::from_raw(u64::MAX, 2).end(), Offset(u64::MAX));
    }
}
