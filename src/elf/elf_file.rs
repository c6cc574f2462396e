//! An ELF file along with the tables hanging off of its header.
use super::{
    ElfError, ElfHeader, Offset, PHDR_SIZE, ProgramHeader, Reader, SHDR_SIZE, SHN_LORESERVE,
    SHN_UNDEF, SHN_XINDEX, SectionHeader, SectionIndex, StringTable,
};

pub struct ElfFile<'a> {
    pub header: ElfHeader,
    pub reader: Reader<'a>,
}

impl<'a> ElfFile<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self, ElfError> {
        let reader = Reader::new(bytes)?;
        let header = ElfHeader::new(reader)?;
        Ok(ElfFile { header, reader })
    }

    /// All of the program headers. The whole table has to be within the file.
    pub fn program_headers(&self) -> Result<Vec<ProgramHeader>, ElfError> {
        let h = &self.header;
        self.table_offsets(
            "program header",
            h.ph_offset,
            h.num_ph_entries as u64,
            h.ph_entry_size,
            PHDR_SIZE,
        )?
        .map(|offset| ProgramHeader::new(self.reader, offset))
        .collect()
    }

    /// All of the section headers. The whole table has to be within the file.
    pub fn section_headers(&self) -> Result<Vec<SectionHeader>, ElfError> {
        let count = self.num_sections()?;
        self.table_offsets(
            "section header",
            self.header.section_offset,
            count,
            self.header.section_entry_size,
            SHDR_SIZE,
        )?
        .map(|offset| SectionHeader::new(self.reader, offset))
        .collect()
    }

    /// Number of section headers. Files with too many sections for e_shnum store the
    /// count in the first section header's size field.
    pub fn num_sections(&self) -> Result<u64, ElfError> {
        let h = &self.header;
        if h.num_section_entries == 0 && h.section_offset != 0 {
            let first = self.first_section()?;
            log::debug!("extended section count: {}", first.size);
            Ok(first.size)
        } else {
            Ok(h.num_section_entries as u64)
        }
    }

    /// Returns the index of the section holding the section names. None if the file
    /// has no such section or the index is bad.
    pub fn names_index(&self, sections: &[SectionHeader]) -> Option<SectionIndex> {
        let index = match self.header.string_table_index {
            SHN_UNDEF => return None,
            SHN_XINDEX => match sections.first() {
                Some(first) if first.link != 0 => first.link as usize,
                _ => {
                    log::warn!("section name table index is SHN_XINDEX but section 0 has no link");
                    return None;
                }
            },
            index if index >= SHN_LORESERVE => {
                log::warn!("section name table index 0x{index:x} is reserved");
                return None;
            }
            index => index as usize,
        };
        if index < sections.len() {
            Some(SectionIndex(index))
        } else {
            log::warn!(
                "section name table index {index} is out of range ({} sections)",
                sections.len()
            );
            None
        }
    }

    /// The string table holding the section names, if there is one.
    pub fn section_names(
        &self,
        sections: &[SectionHeader],
    ) -> Result<Option<StringTable<'a>>, ElfError> {
        match self.names_index(sections) {
            Some(index) => {
                let section = &sections[index.0];
                log::debug!(
                    "section names are in section {} at 0x{:x} ({} bytes)",
                    index.0,
                    section.offset,
                    section.size
                );
                Ok(Some(self.string_table(section)?))
            }
            None => Ok(None),
        }
    }

    /// Treats the section's bytes as a string table. The caller is responsible for
    /// picking a section that is one.
    pub fn string_table(&self, section: &SectionHeader) -> Result<StringTable<'a>, ElfError> {
        StringTable::new(self.reader, section.obytes())
    }

    fn first_section(&self) -> Result<SectionHeader, ElfError> {
        let mut offsets = self.table_offsets(
            "section header",
            self.header.section_offset,
            1,
            self.header.section_entry_size,
            SHDR_SIZE,
        )?;
        match offsets.next() {
            Some(offset) => SectionHeader::new(self.reader, offset),
            None => Err(ElfError::malformed("missing first section header")),
        }
    }

    /// Offsets of the entries in a table of fixed size records after checking that the
    /// records are big enough and the table fits in the file.
    fn table_offsets(
        &self,
        table: &str,
        offset: u64,
        count: u64,
        entry_size: u16,
        min_entry_size: u64,
    ) -> Result<impl Iterator<Item = Offset> + use<>, ElfError> {
        let entry_size = entry_size as u64;
        if count > 0 {
            if entry_size < min_entry_size {
                return Err(ElfError::malformed(format!(
                    "{table} entry size is {entry_size} but needs to be at least {min_entry_size}"
                )));
            }
            let size = count.checked_mul(entry_size).unwrap_or(u64::MAX);
            self.reader.slice(offset, size)?;
            log::debug!("{count} {table}s at 0x{offset:x}, {entry_size} bytes each");
        }
        Ok((0..count).map(move |i| Offset(offset + i * entry_size)))
    }
}
