//! The file header, always at offset zero.
use super::{
    EI_ABIVERSION, EI_DATA, EI_NIDENT, EI_OSABI, ELFDATA2MSB, ElfError, Encoder, Reader, Stream,
};

/// Size of an Elf64_Ehdr.
pub const EHDR_SIZE: u64 = 64;

pub const ET_NONE: u16 = 0;
pub const ET_REL: u16 = 1;
pub const ET_EXEC: u16 = 2;
pub const ET_DYN: u16 = 3;
pub const ET_CORE: u16 = 4;

pub const EM_X86_64: u16 = 62;

/// Elf64_Ehdr, see https://refspecs.linuxfoundation.org/elf/gabi4+/ch4.eheader.html
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElfHeader {
    /// Magic, class, data encoding, version, OS ABI, ABI version, padding.
    pub ident: [u8; EI_NIDENT],

    /// Relocatable, executable, shared object, or core.
    pub etype: u16,

    pub machine: u16,
    pub version: u32,

    /// Virtual address execution starts at, zero if there is none.
    pub entry: u64,

    /// Offset to the program header table.
    pub ph_offset: u64,

    /// Offset to the section header table.
    pub section_offset: u64,

    pub flags: u32,
    pub header_size: u16,
    pub ph_entry_size: u16,
    pub num_ph_entries: u16,
    pub section_entry_size: u16,

    /// Number of sections. Zero with a non-zero section_offset means the real count
    /// is in the first section header.
    pub num_section_entries: u16,

    /// Section index of the string table with the section names.
    pub string_table_index: u16,
}

impl ElfHeader {
    pub fn new(reader: Reader) -> Result<Self, ElfError> {
        reader.slice(0, EHDR_SIZE)?;
        let mut s = Stream::new(reader, 0);
        let header = ElfHeader {
            ident: s.read_bytes::<EI_NIDENT>()?,
            etype: s.read_half()?,
            machine: s.read_half()?,
            version: s.read_word()?,
            entry: s.read_xword()?,
            ph_offset: s.read_xword()?,
            section_offset: s.read_xword()?,
            flags: s.read_word()?,
            header_size: s.read_half()?,
            ph_entry_size: s.read_half()?,
            num_ph_entries: s.read_half()?,
            section_entry_size: s.read_half()?,
            num_section_entries: s.read_half()?,
            string_table_index: s.read_half()?,
        };
        debug_assert_eq!(s.offset, EHDR_SIZE);
        log::debug!(
            "{} file for {}: {} program headers at 0x{:x}, {} sections at 0x{:x}",
            header.stype(),
            header.machine(),
            header.num_ph_entries,
            header.ph_offset,
            header.num_section_entries,
            header.section_offset
        );
        Ok(header)
    }

    /// The on-disk bytes for the header, in the byte order named by ident.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut e = Encoder::new(self.little_endian(), EHDR_SIZE as usize);
        e.put_bytes(&self.ident);
        e.put_half(self.etype);
        e.put_half(self.machine);
        e.put_word(self.version);
        e.put_xword(self.entry);
        e.put_xword(self.ph_offset);
        e.put_xword(self.section_offset);
        e.put_word(self.flags);
        e.put_half(self.header_size);
        e.put_half(self.ph_entry_size);
        e.put_half(self.num_ph_entries);
        e.put_half(self.section_entry_size);
        e.put_half(self.num_section_entries);
        e.put_half(self.string_table_index);
        e.into_bytes()
    }

    pub fn little_endian(&self) -> bool {
        self.ident[EI_DATA] != ELFDATA2MSB
    }

    pub fn abiversion(&self) -> u8 {
        self.ident[EI_ABIVERSION]
    }

    pub fn data(&self) -> &'static str {
        if self.little_endian() {
            "little endian"
        } else {
            "big endian"
        }
    }

    pub fn stype(&self) -> &'static str {
        match self.etype {
            ET_NONE => "NONE (no file type)",
            ET_REL => "REL (relocatable file)",
            ET_EXEC => "EXEC (executable file)",
            ET_DYN => "DYN (shared object file)",
            ET_CORE => "CORE (core file)",
            0xfe00..=0xfeff => "OS specific",
            0xff00..=0xffff => "processor specific",
            _ => "unknown",
        }
    }

    pub fn abi(&self) -> &'static str {
        match self.ident[EI_OSABI] {
            0 => "UNIX - System V",
            1 => "HP-UX",
            2 => "NetBSD",
            3 => "GNU/Linux",
            6 => "Solaris",
            7 => "AIX",
            8 => "IRIX",
            9 => "FreeBSD",
            10 => "Tru64",
            12 => "OpenBSD",
            97 => "ARM",
            255 => "standalone",
            _ => "unknown",
        }
    }

    pub fn machine(&self) -> &'static str {
        // see https://refspecs.linuxfoundation.org/elf/gabi4+/ch4.eheader.html
        match self.machine {
            0 => "none",
            2 => "SPARC",
            3 => "Intel 80386",
            8 => "MIPS",
            20 => "PowerPC",
            21 => "PowerPC64",
            22 => "IBM S/390",
            40 => "ARM",
            43 => "SPARC v9",
            50 => "Intel IA-64",
            EM_X86_64 => "AMD x86-64",
            183 => "AArch64",
            243 => "RISC-V",
            247 => "Linux BPF",
            258 => "LoongArch",
            _ => "unknown",
        }
    }
}
