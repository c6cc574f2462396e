//! ELF64 decoding. Everything here is a read-only view over the bytes of the file.
//! Quick ELF reference: https://gist.github.com/x0nu11byt3/bcb35c3de461e5fb66173071a2379779
//!
//! ELF files start with an ELF header which includes:
//! * A magic number to identify the file as an ELF file.
//! * The class (32 or 64 bit) and byte order used for the rest of the file.
//! * The architecture, e.g. Linux AMD x86-64.
//! * The offset to and number of program headers.
//! * The offset to and number of section headers.
//! * The index of the section holding the section names.
//!
//! Program headers identify segments. Segments are used by the OS to load an exe into
//! memory. A program header has type, vaddr, offset, etc.
//!
//! Section headers identify sections. Sections are used for static linking. Section
//! headers have name, type, vaddr, offset, size, etc. Names are offsets into a string
//! table which is itself a section.
pub mod elf_file;
pub mod error;
pub mod header;
pub mod io;
pub mod primitives;
pub mod sections;
pub mod segments;
pub mod strings;

#[cfg(test)]
pub mod testing;

pub use elf_file::*;
pub use error::*;
pub use header::*;
pub use io::*;
pub use primitives::*;
pub use sections::*;
pub use segments::*;
pub use strings::*;
