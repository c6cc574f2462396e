//! Command line arguments and the request they turn into.
use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about = "Dump the headers and string tables of an ELF64 file", long_about = None)]
pub struct Cli {
    /// What to show
    #[arg(value_name = "VIEW")]
    pub view: View,

    /// Path to the ELF file
    pub file: PathBuf,

    /// Show program and section headers as tables (one row per entry)
    #[arg(short, long)]
    pub table: bool,

    /// Add column headers to tables
    #[arg(long)]
    pub titles: bool,

    /// Explain table columns
    #[arg(short, long)]
    pub explain: bool,

    /// With the S view, dump the string table in this section instead of the
    /// section name table
    #[arg(short = 'i', long = "section", value_name = "INDEX")]
    pub section: Option<usize>,

    /// When to style warnings and table headers
    #[arg(long, value_name = "WHEN")]
    #[arg(default_value_t = ColorWhen::Auto)]
    pub color: ColorWhen,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum View {
    /// File header (like readelf -h)
    #[value(name = "h", alias = "header")]
    Header,

    /// Program headers (like readelf -l)
    #[value(name = "p", alias = "program")]
    Program,

    /// Section headers (like readelf -S)
    #[value(name = "s", alias = "sections")]
    Sections,

    /// String table with the section names
    #[value(name = "S", alias = "strings")]
    Strings,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ColorWhen {
    /// Style when stdout is a terminal and NO_COLOR isn't set
    Auto,

    Always,

    Never,
}

/// What the core is asked to print. Built from Cli by main.
#[derive(Clone, Debug)]
pub struct Request {
    pub view: View,
    pub table: bool,
    pub titles: bool,
    pub explain: bool,
    pub section: Option<usize>,
}

impl Request {
    pub fn new(view: View) -> Self {
        Request {
            view,
            table: false,
            titles: false,
            explain: false,
            section: None,
        }
    }
}

impl From<&Cli> for Request {
    fn from(cli: &Cli) -> Self {
        Request {
            view: cli.view,
            table: cli.table,
            titles: cli.titles,
            explain: cli.explain,
            section: cli.section,
        }
    }
}

impl fmt::Display for ColorWhen {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ColorWhen::Auto => fmt.write_str("auto")?,
            ColorWhen::Always => fmt.write_str("always")?,
            ColorWhen::Never => fmt.write_str("never")?,
        }
        Ok(())
    }
}
