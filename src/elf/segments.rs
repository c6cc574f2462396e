//! Used by the run-time loader. Also see sections.
use super::{ElfError, Encoder, Offset, Reader, Stream};

/// Size of an Elf64_Phdr.
pub const PHDR_SIZE: u64 = 56;

const EXECUTE_FLAG: u32 = 0x1;
const WRITE_FLAG: u32 = 0x2;
const READ_FLAG: u32 = 0x4;

/// Describes a segment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ProgramHeader {
    // Elf64_Phdr, see https://llvm.org/doxygen/BinaryFormat_2ELF_8h_source.html
    /// Raw segment type, see SegmentType.
    pub ptype: u32,

    /// Read/Write/Execute flags.
    pub flags: u32,

    /// Offset to the first byte of the segment.
    pub offset: u64,

    /// Virtual address of the first byte in the segment.
    pub vaddr: u64,

    /// Physical address of the first byte in the segment. Usually the same as vaddr.
    pub paddr: u64,

    /// Number of bytes in the segment in the file.
    pub file_size: u64,

    /// Number of bytes in the segment in memory.
    pub mem_size: u64,

    pub align: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentType {
    /// Unused entry.
    Null,

    /// A loadable segment, described by p_filesz and p_memsz.
    Load,

    /// Specifies dynamic linking information.
    Dynamic,

    /// Location and size of a null-terminated path name to invoke as an interpreter.
    Interpreter,

    /// The location and size of auxiliary information.
    Note,

    /// Reserved but has unspecified semantics.
    Shlib,

    /// The location and size of the program header table itself.
    Phdr,

    // The Thread-Local Storage template.
    Tls,

    /// Location of the .eh_frame_hdr section.
    GnuEhFrame,

    /// Whether the stack should be executable.
    GnuStack,

    /// Read-only after relocation.
    GnuRelro,

    /// Location of the .note.gnu.property section.
    GnuProperty,

    /// Reserved for OS-specific semantics.
    Os(u32),

    /// Reserved for processor-specific semantics.
    Proc(u32),

    Unknown(u32),
}

impl SegmentType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => SegmentType::Null,
            1 => SegmentType::Load,
            2 => SegmentType::Dynamic,
            3 => SegmentType::Interpreter,
            4 => SegmentType::Note,
            5 => SegmentType::Shlib,
            6 => SegmentType::Phdr,
            7 => SegmentType::Tls,
            0x6474e550 => SegmentType::GnuEhFrame,
            0x6474e551 => SegmentType::GnuStack,
            0x6474e552 => SegmentType::GnuRelro,
            0x6474e553 => SegmentType::GnuProperty,
            0x60000000..0x70000000 => SegmentType::Os(value),
            0x70000000..0x80000000 => SegmentType::Proc(value),
            _ => {
                log::warn!("unknown segment type: 0x{value:x}");
                SegmentType::Unknown(value)
            }
        }
    }

    /// The name readelf uses.
    pub fn name(&self) -> String {
        match self {
            SegmentType::Null => "NULL".to_string(),
            SegmentType::Load => "LOAD".to_string(),
            SegmentType::Dynamic => "DYNAMIC".to_string(),
            SegmentType::Interpreter => "INTERP".to_string(),
            SegmentType::Note => "NOTE".to_string(),
            SegmentType::Shlib => "SHLIB".to_string(),
            SegmentType::Phdr => "PHDR".to_string(),
            SegmentType::Tls => "TLS".to_string(),
            SegmentType::GnuEhFrame => "GNU_EH_FRAME".to_string(),
            SegmentType::GnuStack => "GNU_STACK".to_string(),
            SegmentType::GnuRelro => "GNU_RELRO".to_string(),
            SegmentType::GnuProperty => "GNU_PROPERTY".to_string(),
            SegmentType::Os(v) => format!("LOOS+0x{:x}", v - 0x60000000),
            SegmentType::Proc(v) => format!("LOPROC+0x{:x}", v - 0x70000000),
            SegmentType::Unknown(v) => format!("0x{v:x}"),
        }
    }
}

impl ProgramHeader {
    pub fn new(reader: Reader, offset: Offset) -> Result<Self, ElfError> {
        let mut s = Stream::new(reader, offset.0);
        Ok(ProgramHeader {
            ptype: s.read_word()?,
            flags: s.read_word()?,
            offset: s.read_xword()?,
            vaddr: s.read_xword()?,
            paddr: s.read_xword()?,
            file_size: s.read_xword()?,
            mem_size: s.read_xword()?,
            align: s.read_xword()?,
        })
    }

    pub fn to_bytes(&self, little_endian: bool) -> Vec<u8> {
        let mut e = Encoder::new(little_endian, PHDR_SIZE as usize);
        e.put_word(self.ptype);
        e.put_word(self.flags);
        e.put_xword(self.offset);
        e.put_xword(self.vaddr);
        e.put_xword(self.paddr);
        e.put_xword(self.file_size);
        e.put_xword(self.mem_size);
        e.put_xword(self.align);
        e.into_bytes()
    }

    pub fn stype(&self) -> SegmentType {
        SegmentType::from_u32(self.ptype)
    }

    pub fn flags(flags: u32) -> String {
        let mut result = String::new();
        if flags & READ_FLAG != 0 {
            result.push('r');
        } else {
            result.push('-');
        }
        if flags & WRITE_FLAG != 0 {
            result.push('w');
        } else {
            result.push('-');
        }
        if flags & EXECUTE_FLAG != 0 {
            result.push('x');
        } else {
            result.push('-');
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode() {
        let ph = ProgramHeader {
            ptype: 1,
            flags: READ_FLAG | EXECUTE_FLAG,
            offset: 0x1000,
            vaddr: 0x401000,
            paddr: 0x401000,
            file_size: 0x123,
            mem_size: 0x456,
            align: 0x1000,
        };
        let mut bytes = vec![0xffu8; 8];
        bytes.extend(ph.to_bytes(true));
        assert_eq!(bytes.len(), 8 + PHDR_SIZE as usize);

        let decoded = ProgramHeader::new(Reader::raw(&bytes), Offset(8)).unwrap();
        assert_eq!(decoded, ph);
        assert_eq!(decoded.stype(), SegmentType::Load);
        assert_eq!(ProgramHeader::flags(decoded.flags), "r-x");

        assert!(ProgramHeader::new(Reader::raw(&bytes), Offset(9)).is_err());
    }

    #[test]
    fn type_names() {
        assert_eq!(SegmentType::from_u32(3).name(), "INTERP");
        assert_eq!(SegmentType::from_u32(0x6474e551).name(), "GNU_STACK");
        assert_eq!(SegmentType::from_u32(0x60000010).name(), "LOOS+0x10");
        assert_eq!(SegmentType::from_u32(0x70000001).name(), "LOPROC+0x1");
        assert_eq!(SegmentType::from_u32(42).name(), "0x2a");
    }
}
