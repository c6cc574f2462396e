//! Used by the linker and debugger. Also see segments.
use super::{Bytes, ElfError, Encoder, Offset, Reader, Stream, StringIndex};

/// Size of an Elf64_Shdr.
pub const SHDR_SIZE: u64 = 64;

/// Undefined section index, e.g. "there is no section name string table".
pub const SHN_UNDEF: u16 = 0;

/// Start of the reserved section indices.
pub const SHN_LORESERVE: u16 = 0xff00;

/// The real index is too big to fit and is stored in the first section header.
pub const SHN_XINDEX: u16 = 0xffff;

const WRITE_FLAG: u64 = 1 << 0; // Writable
const ALLOC_FLAG: u64 = 1 << 1; // Occupies memory during execution
const EXECINSTR_FLAG: u64 = 1 << 2; // Executable
const MERGE_FLAG: u64 = 1 << 4; // Might be merged
const STRINGS_FLAG: u64 = 1 << 5; // Contains nul-terminated strings
const INFO_LINK_FLAG: u64 = 1 << 6; // `sh_info' contains SHT index
const LINK_ORDER_FLAG: u64 = 1 << 7; // Preserve order after combining
const OS_NONCONFORMING_FLAG: u64 = 1 << 8; // Non-standard OS specific handling required
const GROUP_FLAG: u64 = 1 << 9; // Section is member of a group.
const TLS_FLAG: u64 = 1 << 10; // Section hold thread-local data.
const COMPRESSED_FLAG: u64 = 1 << 11; // Section with compressed data.
const MASKOS_FLAG: u64 = 0x0ff00000; // OS-specific.
const MASKPROC_FLAG: u64 = 0xf0000000; // Processor-specific

/// Describes a section.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SectionHeader {
    // Elf64_Shdr, see https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
    /// Index into the section name string table. Zero means no name.
    pub name: StringIndex,

    /// Raw section type, see SectionType.
    pub stype: u32,

    /// Write, alloc, and/or exec.
    pub flags: u64,

    /// Virtual address at execution, zero if the section isn't loaded.
    pub addr: u64,

    /// Offset into the ELF file for the start of the section.
    pub offset: u64,

    /// Section size in bytes.
    pub size: u64,

    /// Link to another section with related information, usually a string
    /// or symbol table.
    pub link: u32,

    /// Additional section info.
    pub info: u32,

    /// Section alignment.
    pub align: u64,

    /// Set if the section holds a table of entries.
    pub entry_size: u64,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SectionType {
    /// Not to be used.
    Null,

    /// CPU instructions or constant data.
    ProgBits,

    /// Debugging info.
    SymbolTable,

    /// Strings for use by the linker and debugger.
    StringTable,

    /// Relocation entries with addends.
    RelocationsWith,

    /// Symbol hash table.
    SymbolHashTable,

    /// Dynamic linking information.
    Dynamic,

    /// Arbitrary metadata.
    Note,

    /// Uninitialized data.
    NoBits,

    /// Relocation entries without addends.
    RelocationsWithout,

    Shlib,

    // Dynamic linker symbol table.
    DynamicSymbolTable,

    /// Array of pointers to initialization functions.
    InitArray,

    /// Array of pointers to termination functions.
    FiniArray,

    /// Array of pointers to functions to be called before the regular
    /// initialization functions.
    PreinitArray,

    /// Section group.
    Group,

    /// Extended section indices for a symbol table.
    SymbolTableIndices,

    /// GNU object attributes.
    GnuAttributes,

    /// GNU style hash table.
    Hash,

    /// GNU symbol versions that are provided.
    VerDef,

    /// GNU symbol versions that are required.
    VerNeed,

    /// GNU symbol version table.
    VerSym,

    /// Reserved for OS-specific semantics.
    Os(u32),

    /// Reserved for processor-specific semantics, e.g. x86-64 unwind tables.
    Proc(u32),

    /// Reserved for applications.
    User(u32),

    Unknown(u32),
}

impl SectionType {
    pub fn from_u32(value: u32) -> Self {
        // see https://android.googlesource.com/platform/art/+/e34fa1d/runtime/elf.h
        match value {
            0x0 => SectionType::Null,
            0x1 => SectionType::ProgBits,
            0x2 => SectionType::SymbolTable,
            0x3 => SectionType::StringTable,
            0x4 => SectionType::RelocationsWith,
            0x5 => SectionType::SymbolHashTable,
            0x6 => SectionType::Dynamic,
            0x7 => SectionType::Note,
            0x8 => SectionType::NoBits,
            0x9 => SectionType::RelocationsWithout,
            0xa => SectionType::Shlib,
            0xb => SectionType::DynamicSymbolTable,
            0xe => SectionType::InitArray,
            0xf => SectionType::FiniArray,
            0x10 => SectionType::PreinitArray,
            0x11 => SectionType::Group,
            0x12 => SectionType::SymbolTableIndices,
            0x6ffffff5 => SectionType::GnuAttributes,
            0x6ffffff6 => SectionType::Hash,
            0x6ffffffd => SectionType::VerDef,
            0x6ffffffe => SectionType::VerNeed,
            0x6fffffff => SectionType::VerSym,
            0x60000000..0x70000000 => SectionType::Os(value),
            0x70000000..0x80000000 => SectionType::Proc(value),
            0x80000000.. => SectionType::User(value),
            _ => {
                log::warn!("unknown section type: 0x{value:x}");
                SectionType::Unknown(value)
            }
        }
    }

    /// The name readelf uses.
    pub fn name(&self) -> String {
        match self {
            SectionType::Null => "NULL".to_string(),
            SectionType::ProgBits => "PROGBITS".to_string(),
            SectionType::SymbolTable => "SYMTAB".to_string(),
            SectionType::StringTable => "STRTAB".to_string(),
            SectionType::RelocationsWith => "RELA".to_string(),
            SectionType::SymbolHashTable => "HASH".to_string(),
            SectionType::Dynamic => "DYNAMIC".to_string(),
            SectionType::Note => "NOTE".to_string(),
            SectionType::NoBits => "NOBITS".to_string(),
            SectionType::RelocationsWithout => "REL".to_string(),
            SectionType::Shlib => "SHLIB".to_string(),
            SectionType::DynamicSymbolTable => "DYNSYM".to_string(),
            SectionType::InitArray => "INIT_ARRAY".to_string(),
            SectionType::FiniArray => "FINI_ARRAY".to_string(),
            SectionType::PreinitArray => "PREINIT_ARRAY".to_string(),
            SectionType::Group => "GROUP".to_string(),
            SectionType::SymbolTableIndices => "SYMTAB_SHNDX".to_string(),
            SectionType::GnuAttributes => "GNU_ATTRIBUTES".to_string(),
            SectionType::Hash => "GNU_HASH".to_string(),
            SectionType::VerDef => "VERDEF".to_string(),
            SectionType::VerNeed => "VERNEED".to_string(),
            SectionType::VerSym => "VERSYM".to_string(),
            SectionType::Os(v) => format!("LOOS+0x{:x}", v - 0x60000000),
            SectionType::Proc(v) => format!("LOPROC+0x{:x}", v - 0x70000000),
            SectionType::User(v) => format!("LOUSER+0x{:x}", v - 0x80000000),
            SectionType::Unknown(v) => format!("0x{v:x}"),
        }
    }
}

impl SectionHeader {
    pub fn new(reader: Reader, offset: Offset) -> Result<Self, ElfError> {
        let mut s = Stream::new(reader, offset.0);
        Ok(SectionHeader {
            name: StringIndex(s.read_word()?),
            stype: s.read_word()?,
            flags: s.read_xword()?,
            addr: s.read_xword()?,
            offset: s.read_xword()?,
            size: s.read_xword()?,
            link: s.read_word()?,
            info: s.read_word()?,
            align: s.read_xword()?,
            entry_size: s.read_xword()?,
        })
    }

    pub fn to_bytes(&self, little_endian: bool) -> Vec<u8> {
        let mut e = Encoder::new(little_endian, SHDR_SIZE as usize);
        e.put_word(self.name.0);
        e.put_word(self.stype);
        e.put_xword(self.flags);
        e.put_xword(self.addr);
        e.put_xword(self.offset);
        e.put_xword(self.size);
        e.put_word(self.link);
        e.put_word(self.info);
        e.put_xword(self.align);
        e.put_xword(self.entry_size);
        e.into_bytes()
    }

    pub fn section_type(&self) -> SectionType {
        SectionType::from_u32(self.stype)
    }

    /// Addressing for the bytes in the section using offsets from the start of the ELF file.
    pub fn obytes(&self) -> Bytes {
        Bytes::from_raw(self.offset, self.size)
    }

    pub fn flags(flags: u64) -> String {
        let mut result = Vec::new();
        if flags & WRITE_FLAG != 0 {
            result.push("WRITE");
        }
        if flags & ALLOC_FLAG != 0 {
            result.push("ALLOC");
        }
        if flags & EXECINSTR_FLAG != 0 {
            result.push("EXEC");
        }
        if flags & MERGE_FLAG != 0 {
            result.push("MERGE");
        }
        if flags & STRINGS_FLAG != 0 {
            result.push("STRINGS");
        }
        if flags & INFO_LINK_FLAG != 0 {
            result.push("INFO");
        }
        if flags & LINK_ORDER_FLAG != 0 {
            result.push("LINK");
        }
        if flags & OS_NONCONFORMING_FLAG != 0 {
            result.push("OS_NONCONFORMING");
        }
        if flags & GROUP_FLAG != 0 {
            result.push("GROUP");
        }
        if flags & TLS_FLAG != 0 {
            result.push("TLS");
        }
        if flags & COMPRESSED_FLAG != 0 {
            result.push("COMPRESSED");
        }
        if flags & MASKOS_FLAG != 0 {
            result.push("MASKOS");
        }
        if flags & MASKPROC_FLAG != 0 {
            result.push("MASKPROC");
        }
        if result.is_empty() {
            result.push("none");
        }
        result.join(" ")
    }
}
