//! Helpers for building tables using the tabled crate.
use crate::utils::Styling;
use std::io::{self, Write};
use tabled::{
    builder::Builder,
    settings::{Alignment, Padding, Style, object::Columns},
};

struct TableCol {
    header: String,
    align: Alignment,
    help: String,
    fields: Vec<String>,
}

/// General table. They look like this:
/// index  type     offset   vaddr   file size  memory size  flags   if titles
/// -----  ----     ------   -----   ---------  -----------  -----
///     0  PHDR         40  400040         2d8          2d8    r--
///     1  INTERP      318  400318          1c           1c    r--
///
/// index: index into the program header table                         if explain
/// type: the segment type
/// ...
pub struct TableBuilder {
    cols: Vec<TableCol>,
}

impl TableBuilder {
    pub fn new() -> TableBuilder {
        TableBuilder { cols: Vec::new() }
    }

    /// Left aligned column
    pub fn add_col_l(&mut self, header: &str, help: &str) {
        self.add_col(header, help, Alignment::left());
    }

    /// Right aligned column
    pub fn add_col_r(&mut self, header: &str, help: &str) {
        self.add_col(header, help, Alignment::right());
    }

    /// Typically add_field! is used instead.
    pub fn add_str_field(&mut self, header: &str, value: String) {
        let col = self.find_col(header);
        if value.is_empty() {
            // For some reason empty fields screw up tabled formatting.
            col.fields.push(" ".to_string());
        } else {
            col.fields.push(value);
        }
    }

    pub fn writeln(&self, out: &mut impl Write, titles: bool, explain: bool) -> io::Result<()> {
        writeln!(out, "{}", self.table_str(titles))?;

        if explain {
            writeln!(out)?;
            writeln!(out, "{}", self.explain_str())?;
        }
        Ok(())
    }

    fn add_col(&mut self, header: &str, help: &str, align: Alignment) {
        debug_assert!(!self.has_col(header));
        let col = TableCol {
            header: header.to_string(),
            align,
            help: help.to_string(),
            fields: Vec::new(),
        };
        self.cols.push(col);
    }

    // We need to preserve add_col ordering so we can't use a HashMap
    // but O(n) should be fine for tables.
    fn has_col(&self, header: &str) -> bool {
        self.cols.iter().any(|c| c.header == header)
    }

    fn find_col(&mut self, header: &str) -> &mut TableCol {
        self.cols
            .iter_mut()
            .find(|c| c.header == header)
            .unwrap_or_else(|| panic!("no {header} column")) // programmer error
    }

    fn table_str(&self, titles: bool) -> String {
        let height = self.cols.first().map_or(0, |c| c.fields.len());
        let mut builder = Builder::with_capacity(height + 2, self.cols.len());
        if titles {
            let header: Vec<String> = self.cols.iter().map(|c| c.header.clone()).collect();
            let dashes: Vec<String> = header
                .iter()
                .map(|s| "-".repeat(s.len()).table_sep())
                .collect();
            let header: Vec<String> = header.into_iter().map(|s| s.table_header()).collect();
            builder.push_record(header);
            builder.push_record(dashes);
        }
        for i in 0..height {
            let row: Vec<String> = self.cols.iter().map(|c| c.fields[i].clone()).collect();
            builder.push_record(row);
        }

        let mut table = builder.build();
        for (i, col) in self.cols.iter().enumerate() {
            table.modify(Columns::one(i), col.align);
        }
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());

        table.to_string()
    }

    fn explain_str(&self) -> String {
        let explains: Vec<String> = self
            .cols
            .iter()
            .map(|c| {
                format!(
                    "{}: {}",
                    c.header.as_str().explain_title(),
                    c.help.as_str().explain_text()
                )
            })
            .collect();
        explains.join("\n")
    }
}

macro_rules! add_field {
    ($builder:ident, $header:literal, $value:expr) => {
        let s = format!("{}", $value);
        $builder.add_str_field($header, s);
    };
    ($builder:ident, $header:literal, $format:literal, $value:expr) => {
        let s = format!($format, $value);
        $builder.add_str_field($header, s);
    };
}
pub(crate) use add_field;

struct SimpleRow {
    name: String,
    value: String,
    help: String,
}

/// Table with just name and value columns. They look like this:
/// class          ELF64                         these have no titles
/// data           little endian
///
/// class: 32 or 64 bit                          if explain
/// data: byte order of multi-byte fields
pub struct SimpleTableBuilder {
    rows: Vec<SimpleRow>,
}

impl SimpleTableBuilder {
    pub fn new() -> SimpleTableBuilder {
        SimpleTableBuilder { rows: Vec::new() }
    }

    /// Typically add_simple! is used instead.
    pub fn add_str_row(&mut self, name: &str, value: String, help: &str) {
        let row = SimpleRow {
            name: name.to_string(),
            value,
            help: help.to_string(),
        };
        self.rows.push(row);
    }

    pub fn writeln(&self, out: &mut impl Write, explain: bool) -> io::Result<()> {
        writeln!(out, "{}", self.table_str())?;

        if explain {
            writeln!(out)?;
            writeln!(out, "{}", self.explain_str())?;
        }
        Ok(())
    }

    fn table_str(&self) -> String {
        let mut builder = Builder::with_capacity(self.rows.len(), 2);
        for row in self.rows.iter() {
            builder.push_record(vec![row.name.clone(), row.value.clone()]);
        }

        let mut table = builder.build();
        table.modify(Columns::one(0), Alignment::left());
        table.modify(Columns::one(1), Alignment::left());
        table.modify(Columns::first(), Padding::new(0, 1, 0, 0));
        table.with(Style::empty());

        table.to_string()
    }

    fn explain_str(&self) -> String {
        let explains: Vec<String> = self
            .rows
            .iter()
            .map(|r| {
                format!(
                    "{}: {}",
                    r.name.as_str().explain_title(),
                    r.help.as_str().explain_text()
                )
            })
            .collect();
        explains.join("\n")
    }
}

macro_rules! add_simple {
    ($builder:ident, $name:literal, $value:expr, $help:expr) => {
        let s = format!("{}", $value);
        $builder.add_str_row($name, s, $help);
    };
    ($builder:ident, $name:literal, $format:literal, $value:expr, $help:expr) => {
        let s = format!($format, $value);
        $builder.add_str_row($name, s, $help);
    };
}
pub(crate) use add_simple;

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(out: Vec<u8>) -> Vec<String> {
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| crate::utils::strip_escapes(l).trim_end().to_string())
            .collect()
    }

    #[test]
    fn table_with_titles() {
        let mut b = TableBuilder::new();
        b.add_col_r("index", "row number");
        b.add_col_l("name", "what it's called");
        add_field!(b, "index", 0);
        add_field!(b, "name", ".text");
        add_field!(b, "index", 1);
        add_field!(b, "name", "");

        let mut out = Vec::new();
        b.writeln(&mut out, true, true).unwrap();
        let lines = lines(out);
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("index"));
        assert!(lines[0].ends_with("name"));
        assert!(lines[1].starts_with("-----"));
        assert!(lines[2].ends_with(".text"));
        assert_eq!(lines[5], "index: row number");
        assert_eq!(lines[6], "name: what it's called");
    }

    #[test]
    fn simple_table() {
        let mut b = SimpleTableBuilder::new();
        add_simple!(b, "class", "ELF64", "32 or 64 bit");
        add_simple!(b, "entry", "{:x}", 0x401000, "where execution starts");

        let mut out = Vec::new();
        b.writeln(&mut out, false).unwrap();
        let lines = lines(out);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("class"));
        assert!(lines[0].ends_with("ELF64"));
        assert!(lines[1].ends_with("401000"));
    }
}
