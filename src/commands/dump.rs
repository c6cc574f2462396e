use super::tables::{SimpleTableBuilder, TableBuilder, add_field, add_simple};
use crate::cli::{Request, View};
use crate::elf::{ElfError, ElfFile, ProgramHeader, SectionHeader, SectionType, StringTable};
use crate::utils::dec_hex;
use std::io::{self, Write};

/// Decodes bytes as an ELF64 file and writes the requested view to out. Everything a
/// view needs is decoded before anything is written so errors never leave partial
/// output behind.
pub fn inspect(bytes: &[u8], request: &Request, out: &mut impl Write) -> Result<(), ElfError> {
    let file = ElfFile::new(bytes)?;
    match request.view {
        View::Header => file_header(&file, request, out),
        View::Program => program_headers(&file, request, out),
        View::Sections => section_headers(&file, request, out),
        View::Strings => string_table(&file, request, out),
    }
}

fn field(out: &mut impl Write, name: &str, value: impl Into<u64>) -> io::Result<()> {
    writeln!(out, "  {name} = {}", dec_hex(value))
}

// Avoids a trailing space for empty values.
fn text(out: &mut impl Write, name: &str, value: &str) -> io::Result<()> {
    if value.is_empty() {
        writeln!(out, "  {name} =")
    } else {
        writeln!(out, "  {name} = {value}")
    }
}

pub fn file_header(
    file: &ElfFile,
    request: &Request,
    out: &mut impl Write,
) -> Result<(), ElfError> {
    let h = &file.header;
    writeln!(out, "ELF file header (readelf -h)")?;
    if request.table {
        let mut b = SimpleTableBuilder::new();
        add_simple!(b, "class", "ELF64", "pointers and offsets are eight bytes");
        add_simple!(b, "data", h.data(), "byte order of multi-byte fields");
        add_simple!(b, "osabi", h.abi(), "the OS the binary was compiled for");
        add_simple!(b, "abiversion", h.abiversion(), "zero for Linux");
        add_simple!(b, "type", h.stype(), "type of ELF file");
        add_simple!(b, "machine", h.machine(), "CPU architecture");
        add_simple!(b, "version", h.version, "ELF version, always 1");
        add_simple!(b, "entry", "{:x}", h.entry, "virtual address execution starts at");
        add_simple!(
            b,
            "ph_offset",
            "{:x}",
            h.ph_offset,
            "offset in the ELF file to the program header table"
        );
        add_simple!(
            b,
            "ph_entry_size",
            h.ph_entry_size,
            "size of each program header"
        );
        add_simple!(
            b,
            "num_ph_entries",
            h.num_ph_entries,
            "number of entries in the program header table"
        );
        add_simple!(
            b,
            "section_offset",
            "{:x}",
            h.section_offset,
            "offset in the ELF file to the section header table"
        );
        add_simple!(
            b,
            "section_entry_size",
            h.section_entry_size,
            "size of each section header"
        );
        add_simple!(
            b,
            "num_section_entries",
            h.num_section_entries,
            "number of entries in the section header table"
        );
        add_simple!(
            b,
            "string_table_index",
            h.string_table_index,
            "section index containing the section names"
        );
        add_simple!(b, "flags", "{:x}", h.flags, "processor specific flags");
        add_simple!(b, "header_size", h.header_size, "size of this header");
        b.writeln(out, request.explain)?;
    } else {
        let ident: Vec<String> = h.ident.iter().map(|b| format!("{b:02x}")).collect();
        writeln!(out, "  e_ident = {}", ident.join(" "))?;
        field(out, "e_type", h.etype)?;
        field(out, "e_machine", h.machine)?;
        field(out, "e_version", h.version)?;
        field(out, "e_entry", h.entry)?;
        field(out, "e_phoff", h.ph_offset)?;
        field(out, "e_shoff", h.section_offset)?;
        field(out, "e_flags", h.flags)?;
        field(out, "e_ehsize", h.header_size)?;
        field(out, "e_phentsize", h.ph_entry_size)?;
        field(out, "e_phnum", h.num_ph_entries)?;
        field(out, "e_shentsize", h.section_entry_size)?;
        field(out, "e_shnum", h.num_section_entries)?;
        field(out, "e_shstrndx", h.string_table_index)?;
        text(out, "class", "ELF64")?;
        text(out, "data", h.data())?;
        text(out, "osabi", h.abi())?;
        text(out, "abiversion", &h.abiversion().to_string())?;
        text(out, "type", h.stype())?;
        text(out, "machine", h.machine())?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn program_headers(
    file: &ElfFile,
    request: &Request,
    out: &mut impl Write,
) -> Result<(), ElfError> {
    let segments = file.program_headers()?;
    writeln!(out, "Program headers (readelf -l)")?;
    if request.table {
        let mut builder = TableBuilder::new();
        builder.add_col_r("index", "index into the program header table");
        builder.add_col_l("type", "the segment type");
        builder.add_col_r(
            "offset",
            "the offset into the ELF file at which the segment appears",
        );
        builder.add_col_r("vaddr", "the virtual address the segment starts at");
        builder.add_col_r("paddr", "the physical address, usually the same as vaddr");
        builder.add_col_r("file size", "the size of the segment on disk");
        builder.add_col_r("memory size", "the size of the segment in memory");
        builder.add_col_r("flags", "readable, writeable, and/or executable");
        builder.add_col_r("align", "alignment of the segment in memory and the file");

        for (i, segment) in segments.iter().enumerate() {
            add_field!(builder, "index", i);
            add_field!(builder, "type", segment.stype().name());
            add_field!(builder, "offset", "{:x}", segment.offset);
            add_field!(builder, "vaddr", "{:x}", segment.vaddr);
            add_field!(builder, "paddr", "{:x}", segment.paddr);
            add_field!(builder, "file size", "{:x}", segment.file_size);
            add_field!(builder, "memory size", "{:x}", segment.mem_size);
            add_field!(builder, "flags", ProgramHeader::flags(segment.flags));
            add_field!(builder, "align", "{:x}", segment.align);
        }
        builder.writeln(out, request.titles, request.explain)?;
        if request.explain {
            writeln!(out)?;
            writeln!(out, "Numeric fields are all in hex.")?;
        }
    } else {
        for (i, segment) in segments.iter().enumerate() {
            writeln!(out, "  index {i}")?;
            text(out, "type", &segment.stype().name())?;
            text(out, "flags", &ProgramHeader::flags(segment.flags))?;
            field(out, "p_type", segment.ptype)?;
            field(out, "p_flags", segment.flags)?;
            field(out, "p_offset", segment.offset)?;
            field(out, "p_vaddr", segment.vaddr)?;
            field(out, "p_paddr", segment.paddr)?;
            field(out, "p_filesz", segment.file_size)?;
            field(out, "p_memsz", segment.mem_size)?;
            field(out, "p_align", segment.align)?;
            writeln!(out)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

pub fn section_headers(
    file: &ElfFile,
    request: &Request,
    out: &mut impl Write,
) -> Result<(), ElfError> {
    let sections = file.section_headers()?;
    let names = section_names(file, &sections)?;

    writeln!(out, "Section headers (readelf -S)")?;
    if request.table {
        let mut builder = TableBuilder::new();
        builder.add_col_r("index", "index into sections");
        builder.add_col_l("name", "from the section name string table");
        builder.add_col_l("type", "type of the section");
        builder.add_col_r("addr", "virtual address at execution");
        builder.add_col_r(
            "offset",
            "offset into the ELF file for the start of the section",
        );
        builder.add_col_r("size", "section size in bytes");
        builder.add_col_r("entry_size", "set if the section holds a table of entries");
        builder.add_col_l("flags", "write, alloc, exec, etc");
        builder.add_col_r(
            "link",
            "link to another section with related information, usually a string or symbol table",
        );
        builder.add_col_r("info", "additional section info");
        builder.add_col_r("align", "section alignment");

        // sections are often referenced by index so this is handy
        for (i, (section, name)) in sections.iter().zip(names.iter()).enumerate() {
            add_field!(builder, "index", i);
            add_field!(builder, "name", name);
            add_field!(builder, "type", section.section_type().name());
            add_field!(builder, "addr", "{:x}", section.addr);
            add_field!(builder, "offset", "{:x}", section.offset);
            add_field!(builder, "size", "{:x}", section.size);
            add_field!(builder, "entry_size", "{:x}", section.entry_size);
            add_field!(builder, "flags", SectionHeader::flags(section.flags));
            add_field!(builder, "link", section.link);
            add_field!(builder, "info", section.info);
            add_field!(builder, "align", "{:x}", section.align);
        }
        builder.writeln(out, request.titles, request.explain)?;
        if request.explain {
            writeln!(out)?;
            writeln!(out, "Numeric fields other than index, link, and info are in hex.")?;
        }
    } else {
        for (i, (section, name)) in sections.iter().zip(names.iter()).enumerate() {
            writeln!(out, "  index {i}")?;
            text(out, "name", name)?;
            text(out, "type", &section.section_type().name())?;
            text(out, "flags", &SectionHeader::flags(section.flags))?;
            field(out, "sh_name", section.name.0)?;
            field(out, "sh_type", section.stype)?;
            field(out, "sh_flags", section.flags)?;
            field(out, "sh_addr", section.addr)?;
            field(out, "sh_offset", section.offset)?;
            field(out, "sh_size", section.size)?;
            field(out, "sh_link", section.link)?;
            field(out, "sh_info", section.info)?;
            field(out, "sh_addralign", section.align)?;
            field(out, "sh_entsize", section.entry_size)?;
            writeln!(out)?;
        }
    }
    writeln!(out)?;
    Ok(())
}

/// Resolved names, empty if the file has no section name string table.
fn section_names(file: &ElfFile, sections: &[SectionHeader]) -> Result<Vec<String>, ElfError> {
    match file.section_names(sections)? {
        Some(table) => sections.iter().map(|s| table.get(s.name)).collect(),
        None => Ok(vec![String::new(); sections.len()]),
    }
}

pub fn string_table(
    file: &ElfFile,
    request: &Request,
    out: &mut impl Write,
) -> Result<(), ElfError> {
    let sections = file.section_headers()?;
    let (title, table) = match request.section {
        Some(index) => {
            let section = sections.get(index).ok_or_else(|| {
                ElfError::malformed(format!(
                    "there is no section {index} ({} sections)",
                    sections.len()
                ))
            })?;
            if section.section_type() != SectionType::StringTable {
                log::warn!(
                    "section {index} is a {} section, not a string table",
                    section.section_type().name()
                );
            }
            (
                format!("String table (section {index})"),
                Some(file.string_table(section)?),
            )
        }
        None => ("String table".to_string(), file.section_names(&sections)?),
    };
    let strings = match &table {
        Some(table) => Some(collect_strings(table)?),
        None => None,
    };

    writeln!(out, "{title}")?;
    match strings {
        Some(strings) => {
            for (offset, s) in strings.iter() {
                if s.is_empty() {
                    writeln!(out, "  {offset:03}:")?;
                } else {
                    writeln!(out, "  {offset:03}: {s}")?;
                }
            }
        }
        None => writeln!(out, "  (no section name string table)")?,
    }
    writeln!(out)?;
    Ok(())
}

fn collect_strings(table: &StringTable) -> Result<Vec<(u64, String)>, ElfError> {
    table.iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elf::testing::{self, ElfBuilder};
    use crate::elf::{EHDR_SIZE, SHN_UNDEF, StringIndex};
    use crate::utils::strip_escapes;

    /// Two sections, .text and .data, named by the string table "\0.text\0.data\0"
    /// which is also the contents of .data.
    fn two_sections() -> Vec<u8> {
        let names = b"\0.text\0.data\0";
        let mut header = testing::file_header(true);
        header.section_offset = 80;
        header.num_section_entries = 2;
        header.string_table_index = 1;

        let text = SectionHeader {
            name: StringIndex(1),
            stype: 1,
            flags: 0x6,
            addr: 0x401000,
            offset: EHDR_SIZE,
            size: 4,
            align: 16,
            ..Default::default()
        };
        let data = SectionHeader {
            name: StringIndex(7),
            stype: 1,
            flags: 0x3,
            addr: 0x402000,
            offset: EHDR_SIZE,
            size: names.len() as u64,
            align: 1,
            ..Default::default()
        };

        let mut bytes = header.to_bytes();
        bytes.extend(names);
        bytes.resize(80, 0);
        bytes.extend(text.to_bytes(true));
        bytes.extend(data.to_bytes(true));
        bytes
    }

    fn render(bytes: &[u8], request: &Request) -> Result<String, ElfError> {
        let mut out = Vec::new();
        inspect(bytes, request, &mut out)?;
        let s = String::from_utf8(out).unwrap();
        Ok(strip_escapes(&s))
    }

    fn dump(bytes: &[u8], view: View) -> String {
        render(bytes, &Request::new(view)).unwrap()
    }

    fn table(bytes: &[u8], view: View) -> String {
        let mut request = Request::new(view);
        request.table = true;
        request.titles = true;
        render(bytes, &request).unwrap()
    }

    #[test]
    fn header_dump() {
        let s = dump(&two_sections(), View::Header);
        insta::assert_snapshot!(s, @r"
        ELF file header (readelf -h)
          e_ident = 7f 45 4c 46 02 01 01 00 00 00 00 00 00 00 00 00
          e_type = 2(0x2)
          e_machine = 62(0x3e)
          e_version = 1(0x1)
          e_entry = 4198400(0x401000)
          e_phoff = 0(0x0)
          e_shoff = 80(0x50)
          e_flags = 0(0x0)
          e_ehsize = 64(0x40)
          e_phentsize = 56(0x38)
          e_phnum = 0(0x0)
          e_shentsize = 64(0x40)
          e_shnum = 2(0x2)
          e_shstrndx = 1(0x1)
          class = ELF64
          data = little endian
          osabi = UNIX - System V
          abiversion = 0
          type = EXEC (executable file)
          machine = AMD x86-64
        ");
    }

    #[test]
    fn section_dump() {
        let s = dump(&two_sections(), View::Sections);
        insta::assert_snapshot!(s, @r"
        Section headers (readelf -S)
          index 0
          name = .text
          type = PROGBITS
          flags = ALLOC EXEC
          sh_name = 1(0x1)
          sh_type = 1(0x1)
          sh_flags = 6(0x6)
          sh_addr = 4198400(0x401000)
          sh_offset = 64(0x40)
          sh_size = 4(0x4)
          sh_link = 0(0x0)
          sh_info = 0(0x0)
          sh_addralign = 16(0x10)
          sh_entsize = 0(0x0)

          index 1
          name = .data
          type = PROGBITS
          flags = WRITE ALLOC
          sh_name = 7(0x7)
          sh_type = 1(0x1)
          sh_flags = 3(0x3)
          sh_addr = 4202496(0x402000)
          sh_offset = 64(0x40)
          sh_size = 13(0xd)
          sh_link = 0(0x0)
          sh_info = 0(0x0)
          sh_addralign = 1(0x1)
          sh_entsize = 0(0x0)
        ");
    }

    #[test]
    fn string_dump() {
        let s = dump(&two_sections(), View::Strings);
        assert_eq!(s, "String table\n  000:\n  001: .text\n  007: .data\n\n");
    }

    #[test]
    fn empty_program_headers() {
        let s = dump(&two_sections(), View::Program);
        assert_eq!(s, "Program headers (readelf -l)\n\n");
    }

    #[test]
    fn program_dump() {
        let bytes = ElfBuilder::new()
            .segment(testing::load_segment(0x0, 0x1000))
            .segment(testing::load_segment(0x1000, 0x80))
            .build();
        let s = dump(&bytes, View::Program);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Program headers (readelf -l)");
        assert_eq!(lines.iter().filter(|l| l.starts_with("  index ")).count(), 2);
        assert_eq!(
            &lines[1..12],
            &[
                "  index 0",
                "  type = LOAD",
                "  flags = r-x",
                "  p_type = 1(0x1)",
                "  p_flags = 5(0x5)",
                "  p_offset = 0(0x0)",
                "  p_vaddr = 4194304(0x400000)",
                "  p_paddr = 4194304(0x400000)",
                "  p_filesz = 4096(0x1000)",
                "  p_memsz = 4096(0x1000)",
                "  p_align = 4096(0x1000)",
            ]
        );
        assert!(s.contains("  index 1\n  type = LOAD\n"));
        assert!(s.contains("  p_offset = 4096(0x1000)\n  p_vaddr = 4198400(0x401000)\n"));
        assert!(s.ends_with("(0x1000)\n\n\n"));
    }

    #[test]
    fn idempotent() {
        let bytes = ElfBuilder::new()
            .segment(testing::load_segment(0x0, 0x1000))
            .section(".text", 1, 0x6, &[0x90; 16])
            .build();
        for view in [View::Header, View::Program, View::Sections, View::Strings] {
            assert_eq!(dump(&bytes, view), dump(&bytes, view));
            assert_eq!(table(&bytes, view), table(&bytes, view));
        }
    }

    #[test]
    fn no_name_table() {
        let mut bytes = two_sections();
        let mut header = ElfFile::new(&bytes).unwrap().header;
        header.string_table_index = SHN_UNDEF;
        bytes[0..EHDR_SIZE as usize].copy_from_slice(&header.to_bytes());

        let s = dump(&bytes, View::Sections);
        assert_eq!(s.lines().filter(|l| *l == "  name =").count(), 2);
        assert!(!s.contains(".text"));
        assert!(s.contains("  sh_name = 7(0x7)"));

        let s = dump(&bytes, View::Strings);
        assert_eq!(s, "String table\n  (no section name string table)\n\n");
    }

    #[test]
    fn other_string_table() {
        let bytes = ElfBuilder::new()
            .section(".text", 1, 0x6, &[0xc3])
            .section(".strtab", 3, 0, b"\0main\0_start\0")
            .build();
        let mut request = Request::new(View::Strings);
        request.section = Some(2);
        let s = render(&bytes, &request).unwrap();
        assert_eq!(
            s,
            "String table (section 2)\n  000:\n  001: main\n  006: _start\n\n"
        );

        request.section = Some(4);
        let err = render(&bytes, &request).unwrap_err();
        assert!(matches!(err, ElfError::Malformed(_)), "{err}");
    }

    #[test]
    fn builder_section_names() {
        let bytes = ElfBuilder::new()
            .section(".text", 1, 0x6, &[0xc3])
            .section(".data", 1, 0x3, &[0; 8])
            .build();
        let s = dump(&bytes, View::Strings);
        assert_eq!(
            s,
            "String table\n  000:\n  001: .text\n  007: .data\n  013: .shstrtab\n\n"
        );
        let s = dump(&bytes, View::Sections);
        let names: Vec<&str> = s.lines().filter(|l| l.starts_with("  name")).collect();
        assert_eq!(
            names,
            vec!["  name =", "  name = .text", "  name = .data", "  name = .shstrtab"]
        );
    }

    #[test]
    fn errors_leave_no_output() {
        let mut bytes = two_sections();
        let mut header = ElfFile::new(&bytes).unwrap().header;
        header.num_section_entries = 40;
        bytes[0..EHDR_SIZE as usize].copy_from_slice(&header.to_bytes());

        for view in [View::Sections, View::Strings] {
            let mut out = Vec::new();
            let result = inspect(&bytes, &Request::new(view), &mut out);
            assert!(matches!(result, Err(ElfError::Truncated { .. })));
            assert!(out.is_empty());
        }
    }

    #[test]
    fn bad_name_offset() {
        let mut bytes = two_sections();
        // .data's sh_name is the first word of the second section header
        let at = 80 + 64;
        bytes[at..at + 4].copy_from_slice(&100u32.to_le_bytes());
        let err = render(&bytes, &Request::new(View::Sections)).unwrap_err();
        assert!(matches!(err, ElfError::Malformed(_)), "{err}");
    }

    #[test]
    fn not_elf() {
        let err = render(b"#!/bin/sh\necho hello\n", &Request::new(View::Header)).unwrap_err();
        assert!(matches!(err, ElfError::Unsupported(_)), "{err}");

        let err = render(&[], &Request::new(View::Header)).unwrap_err();
        assert!(matches!(err, ElfError::Truncated { .. }), "{err}");
    }

    #[test]
    fn big_endian() {
        let bytes = ElfBuilder::new()
            .big_endian()
            .segment(testing::load_segment(0x40, 0x10))
            .section(".text", 1, 0x6, &[0x90; 4])
            .build();
        let s = dump(&bytes, View::Header);
        assert!(s.contains("  e_ident = 7f 45 4c 46 02 02 01"));
        assert!(s.contains("  data = big endian"));
        assert!(s.contains("  e_machine = 62(0x3e)"));

        let s = dump(&bytes, View::Program);
        assert!(s.contains("  p_offset = 64(0x40)"));

        let s = dump(&bytes, View::Sections);
        assert!(s.contains("  name = .text"));
    }

    #[test]
    fn tables() {
        let bytes = ElfBuilder::new()
            .segment(testing::load_segment(0x0, 0x1000))
            .section(".text", 1, 0x6, &[0x90; 16])
            .build();

        let s = table(&bytes, View::Sections);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines[0], "Section headers (readelf -S)");
        assert!(lines[1].starts_with("index"));
        assert!(lines[2].starts_with("-----"));
        assert_eq!(lines.len(), 1 + 2 + 3 + 1);
        assert!(lines[4].contains(".text"));
        assert!(lines[4].contains("PROGBITS"));
        assert!(lines[4].contains("ALLOC EXEC"));
        assert!(lines[5].contains(".shstrtab"));
        assert!(lines[5].contains("STRTAB"));

        let s = table(&bytes, View::Program);
        let lines: Vec<&str> = s.lines().collect();
        assert_eq!(lines.len(), 1 + 2 + 1 + 1);
        assert!(lines[3].contains("LOAD"));
        assert!(lines[3].contains("r-x"));
        assert!(lines[3].contains("400000"));

        let s = table(&bytes, View::Header);
        assert!(s.contains("AMD x86-64"));
        assert!(s.contains("401000"));
    }

    #[test]
    fn explain() {
        let bytes = ElfBuilder::new()
            .section(".text", 1, 0x6, &[0x90; 16])
            .build();
        let mut request = Request::new(View::Sections);
        request.table = true;
        request.explain = true;
        let s = render(&bytes, &request).unwrap();
        assert!(s.contains("\nlink: link to another section"));
        assert!(s.contains("Numeric fields other than index, link, and info are in hex."));
    }
}
