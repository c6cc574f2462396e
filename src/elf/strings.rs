//! String tables: NUL terminated strings packed together and referenced by their
//! offset from the start of the table.
use super::{Bytes, ElfError, Reader, StringIndex};

pub struct StringTable<'a> {
    reader: Reader<'a>,
    region: Bytes,
}

impl<'a> StringTable<'a> {
    /// The region has to lie within the file.
    pub fn new(reader: Reader<'a>, region: Bytes) -> Result<Self, ElfError> {
        reader.slice(region.start.0, region.size)?;
        Ok(StringTable { reader, region })
    }

    /// Returns the string at index. Note that index can point into the middle of a
    /// string (linkers share suffixes).
    pub fn get(&self, index: StringIndex) -> Result<String, ElfError> {
        let index = index.0 as u64;
        if index >= self.region.size {
            return Err(ElfError::malformed(format!(
                "string index {index} is past the end of a {} byte string table",
                self.region.size
            )));
        }
        self.reader
            .read_string(self.region.start.0 + index, self.region.end().0)
    }

    /// Walks the table from the start. Each call starts over.
    pub fn iter(&self) -> Strings<'a> {
        Strings {
            reader: self.reader,
            region: self.region,
            cursor: 0,
            failed: false,
        }
    }
}

/// (offset within the table, string) pairs. An unterminated string at the end of the
/// table is reported once as an error and ends the walk.
pub struct Strings<'a> {
    reader: Reader<'a>,
    region: Bytes,
    cursor: u64,
    failed: bool,
}

impl Iterator for Strings<'_> {
    type Item = Result<(u64, String), ElfError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor >= self.region.size {
            return None;
        }

        let start = self.region.start.0 + self.cursor;
        match self.reader.read_cstr(start, self.region.end().0) {
            Ok(bytes) => {
                let offset = self.cursor;
                self.cursor += bytes.len() as u64 + 1;
                Some(Ok((offset, String::from_utf8_lossy(bytes).into_owned())))
            }
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}
