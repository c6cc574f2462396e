use super::ElfError;

/// Magic number at the start of every ELF file.
pub const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];

/// Size of the identification bytes at the start of the file header.
pub const EI_NIDENT: usize = 16;

pub const EI_CLASS: usize = 4;
pub const EI_DATA: usize = 5;
pub const EI_VERSION: usize = 6;
pub const EI_OSABI: usize = 7;
pub const EI_ABIVERSION: usize = 8;

pub const ELFCLASS32: u8 = 1;
pub const ELFCLASS64: u8 = 2;
pub const ELFDATA2LSB: u8 = 1;
pub const ELFDATA2MSB: u8 = 2;

/// Bounds checked, endian aware access to the bytes of an ELF64 file. Every read
/// goes through `slice` so an offset or size that came out of a corrupted header
/// turns into an error instead of a bad read.
#[derive(Clone, Copy)]
pub struct Reader<'a> {
    pub little_endian: bool,
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    /// Checks the identification bytes: we only handle 64-bit files but either byte
    /// order.
    pub fn new(bytes: &'a [u8]) -> Result<Self, ElfError> {
        // see https://en.wikipedia.org/wiki/Executable_and_Linkable_Format
        let ident = Reader::raw(bytes).slice(0, EI_NIDENT as u64)?;
        if ident[0..4] != ELF_MAGIC {
            return Err(ElfError::unsupported("not an ELF file (bad magic)"));
        }

        let little_endian = match ident[EI_DATA] {
            ELFDATA2LSB => true,
            ELFDATA2MSB => false,
            data => {
                return Err(ElfError::unsupported(format!(
                    "bad data encoding: {data}"
                )));
            }
        };
        match ident[EI_CLASS] {
            ELFCLASS64 => (),
            ELFCLASS32 => {
                return Err(ElfError::unsupported(
                    "32-bit ELF files are not supported",
                ));
            }
            class => return Err(ElfError::unsupported(format!("bad ELF class: {class}"))),
        }
        if ident[EI_VERSION] != 1 {
            log::warn!("unexpected ELF identification version {}", ident[EI_VERSION]);
        }

        Ok(Reader {
            little_endian,
            bytes,
        })
    }

    /// A little endian reader with no checks on the contents.
    pub fn raw(bytes: &'a [u8]) -> Self {
        Reader {
            little_endian: true,
            bytes,
        }
    }

    pub fn slice(&self, offset: u64, size: u64) -> Result<&'a [u8], ElfError> {
        let len = self.bytes.len();
        match offset.checked_add(size) {
            Some(end) if end <= len as u64 => Ok(&self.bytes[offset as usize..end as usize]),
            _ => Err(ElfError::Truncated { offset, size, len }),
        }
    }

    pub fn read_half(&self, offset: u64) -> Result<u16, ElfError> {
        let bytes = self.array::<2>(offset)?;
        if self.little_endian {
            Ok(u16::from_le_bytes(bytes))
        } else {
            Ok(u16::from_be_bytes(bytes))
        }
    }

    pub fn read_word(&self, offset: u64) -> Result<u32, ElfError> {
        let bytes = self.array::<4>(offset)?;
        if self.little_endian {
            Ok(u32::from_le_bytes(bytes))
        } else {
            Ok(u32::from_be_bytes(bytes))
        }
    }

    pub fn read_xword(&self, offset: u64) -> Result<u64, ElfError> {
        let bytes = self.array::<8>(offset)?;
        if self.little_endian {
            Ok(u64::from_le_bytes(bytes))
        } else {
            Ok(u64::from_be_bytes(bytes))
        }
    }

    /// Returns the bytes of a NUL terminated string starting at offset, not including
    /// the NUL. The string has to end before limit.
    pub fn read_cstr(&self, offset: u64, limit: u64) -> Result<&'a [u8], ElfError> {
        if offset >= limit {
            return Err(ElfError::malformed(format!(
                "string at 0x{offset:x} starts past its table end 0x{limit:x}"
            )));
        }
        let bytes = self.slice(offset, limit - offset)?;
        match bytes.iter().position(|&b| b == 0) {
            Some(n) => Ok(&bytes[..n]),
            None => Err(ElfError::malformed(format!(
                "string at 0x{offset:x} isn't terminated before 0x{limit:x}"
            ))),
        }
    }

    /// Like read_cstr but returns the string, replacing invalid UTF-8.
    pub fn read_string(&self, offset: u64, limit: u64) -> Result<String, ElfError> {
        let bytes = self.read_cstr(offset, limit)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn array<const N: usize>(&self, offset: u64) -> Result<[u8; N], ElfError> {
        let mut result = [0u8; N];
        result.copy_from_slice(self.slice(offset, N as u64)?);
        Ok(result)
    }
}

/// Sequential reads from a Reader, used to decode the fixed layout records.
pub struct Stream<'a> {
    pub reader: Reader<'a>,
    pub offset: u64,
}

impl<'a> Stream<'a> {
    pub fn new(reader: Reader<'a>, offset: u64) -> Self {
        Stream { reader, offset }
    }

    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], ElfError> {
        let bytes = self.reader.array::<N>(self.offset)?;
        self.offset += N as u64;
        Ok(bytes)
    }

    pub fn read_half(&mut self) -> Result<u16, ElfError> {
        let half = self.reader.read_half(self.offset)?;
        self.offset += 2;
        Ok(half)
    }

    pub fn read_word(&mut self) -> Result<u32, ElfError> {
        let word = self.reader.read_word(self.offset)?;
        self.offset += 4;
        Ok(word)
    }

    pub fn read_xword(&mut self) -> Result<u64, ElfError> {
        let xword = self.reader.read_xword(self.offset)?;
        self.offset += 8;
        Ok(xword)
    }
}

/// The inverse of Stream: lays fields out in the file's byte order.
pub struct Encoder {
    little_endian: bool,
    bytes: Vec<u8>,
}

impl Encoder {
    pub fn new(little_endian: bool, capacity: usize) -> Self {
        Encoder {
            little_endian,
            bytes: Vec::with_capacity(capacity),
        }
    }

    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    pub fn put_half(&mut self, value: u16) {
        if self.little_endian {
            self.put_bytes(&value.to_le_bytes());
        } else {
            self.put_bytes(&value.to_be_bytes());
        }
    }

    pub fn put_word(&mut self, value: u32) {
        if self.little_endian {
            self.put_bytes(&value.to_le_bytes());
        } else {
            self.put_bytes(&value.to_be_bytes());
        }
    }

    pub fn put_xword(&mut self, value: u64) {
        if self.little_endian {
            self.put_bytes(&value.to_le_bytes());
        } else {
            self.put_bytes(&value.to_be_bytes());
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
