mod cli;
mod commands;
mod elf;
mod utils;
use clap::Parser;
use cli::{Cli, Request};
use elf::ElfError;
use memmap2::Mmap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::process;

use crate::utils::warn;

/// The whole file, either memory mapped or (for empty files which can't be mapped)
/// an empty slice.
enum Contents {
    Mapped(Mmap),
    Empty,
}

impl Contents {
    fn bytes(&self) -> &[u8] {
        match self {
            Contents::Mapped(map) => &map[..],
            Contents::Empty => &[],
        }
    }
}

fn load(path: &Path) -> Result<Contents, ElfError> {
    let access = |source| ElfError::FileAccess {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(access)?;
    let len = file.metadata().map_err(access)?.len();
    if len == 0 {
        return Ok(Contents::Empty);
    }

    // This is unsafe because it has undefined behavior if the underlying file is
    // modified while the memory map is in use.
    let map = unsafe { Mmap::map(&file) }.map_err(access)?;
    log::debug!("mapped {} ({len} bytes)", path.display());
    Ok(Contents::Mapped(map))
}

fn run(cli: &Cli) -> Result<(), ElfError> {
    let contents = load(&cli.file)?;
    let request = Request::from(cli);

    // Buffer so that nothing is printed if decoding fails part way through.
    let mut text = Vec::new();
    commands::inspect(contents.bytes(), &request, &mut text)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(&text)?;
    stdout.flush()?;
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    utils::styles::init(cli.color);

    if let Err(err) = run(&cli) {
        warn(&err.to_string());
        process::exit(1);
    }
}
