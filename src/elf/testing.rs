//! Builds small ELF64 images in memory for unit tests.
use super::{
    EHDR_SIZE, EI_CLASS, EI_DATA, EI_NIDENT, EI_VERSION, ELF_MAGIC, ELFCLASS64, ELFDATA2LSB,
    ELFDATA2MSB, EM_X86_64, ET_EXEC, ElfHeader, PHDR_SIZE, ProgramHeader, SHDR_SIZE,
    SectionHeader, StringIndex,
};

/// A header for an x86-64 executable with no tables.
pub fn file_header(little_endian: bool) -> ElfHeader {
    let mut ident = [0u8; EI_NIDENT];
    ident[0..4].copy_from_slice(&ELF_MAGIC);
    ident[EI_CLASS] = ELFCLASS64;
    ident[EI_DATA] = if little_endian {
        ELFDATA2LSB
    } else {
        ELFDATA2MSB
    };
    ident[EI_VERSION] = 1;
    ElfHeader {
        ident,
        etype: ET_EXEC,
        machine: EM_X86_64,
        version: 1,
        entry: 0x401000,
        ph_offset: 0,
        section_offset: 0,
        flags: 0,
        header_size: EHDR_SIZE as u16,
        ph_entry_size: PHDR_SIZE as u16,
        num_ph_entries: 0,
        section_entry_size: SHDR_SIZE as u16,
        num_section_entries: 0,
        string_table_index: 0,
    }
}

/// A read-only executable segment.
pub fn load_segment(offset: u64, size: u64) -> ProgramHeader {
    ProgramHeader {
        ptype: 1,
        flags: 0x5,
        offset,
        vaddr: 0x400000 + offset,
        paddr: 0x400000 + offset,
        file_size: size,
        mem_size: size,
        align: 0x1000,
    }
}

/// Lays out: file header, program headers, section contents, section names, section
/// headers. Section 0 is the usual null section and the names go in a trailing
/// .shstrtab section.
pub struct ElfBuilder {
    little_endian: bool,
    segments: Vec<ProgramHeader>,
    sections: Vec<(String, SectionHeader, Vec<u8>)>,
}

impl ElfBuilder {
    pub fn new() -> Self {
        ElfBuilder {
            little_endian: true,
            segments: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn big_endian(mut self) -> Self {
        self.little_endian = false;
        self
    }

    pub fn segment(mut self, segment: ProgramHeader) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn section(mut self, name: &str, stype: u32, flags: u64, data: &[u8]) -> Self {
        let header = SectionHeader {
            stype,
            flags,
            align: 1,
            ..Default::default()
        };
        self.sections
            .push((name.to_string(), header, data.to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let le = self.little_endian;
        let mut header = file_header(le);
        let mut bytes = vec![0u8; EHDR_SIZE as usize];

        if !self.segments.is_empty() {
            header.ph_offset = bytes.len() as u64;
            header.num_ph_entries = self.segments.len() as u16;
            for segment in self.segments.iter() {
                bytes.extend(segment.to_bytes(le));
            }
        }

        let mut names = vec![0u8];
        let mut headers = vec![SectionHeader::default()];
        for (name, section, data) in self.sections.iter() {
            let mut section = section.clone();
            section.name = add_name(&mut names, name);
            section.offset = bytes.len() as u64;
            section.size = data.len() as u64;
            bytes.extend(data);
            headers.push(section);
        }

        let names_name = add_name(&mut names, ".shstrtab");
        headers.push(SectionHeader {
            name: names_name,
            stype: 3,
            offset: bytes.len() as u64,
            size: names.len() as u64,
            align: 1,
            ..Default::default()
        });
        bytes.extend(&names);
        header.string_table_index = (headers.len() - 1) as u16;

        while bytes.len() % 8 != 0 {
            bytes.push(0);
        }
        header.section_offset = bytes.len() as u64;
        header.num_section_entries = headers.len() as u16;
        for section in headers.iter() {
            bytes.extend(section.to_bytes(le));
        }

        bytes[0..EHDR_SIZE as usize].copy_from_slice(&header.to_bytes());
        bytes
    }
}

fn add_name(names: &mut Vec<u8>, name: &str) -> StringIndex {
    let index = StringIndex(names.len() as u32);
    names.extend(name.as_bytes());
    names.push(0);
    index
}
