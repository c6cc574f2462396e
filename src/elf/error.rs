use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Everything that can go wrong while inspecting a file. All of these end the run.
#[derive(Debug)]
pub enum ElfError {
    /// The file couldn't be opened or mapped.
    FileAccess { path: PathBuf, source: io::Error },

    /// A read would have gone past the end of the buffer.
    Truncated { offset: u64, size: u64, len: usize },

    /// The bytes are there but don't hang together, e.g. a string with no NUL.
    Malformed(String),

    /// Not an ELF file, or an ELF file we don't decode (e.g. 32-bit).
    Unsupported(String),

    /// Writing the output failed.
    Io(io::Error),
}

impl ElfError {
    pub fn malformed(mesg: impl Into<String>) -> Self {
        ElfError::Malformed(mesg.into())
    }

    pub fn unsupported(mesg: impl Into<String>) -> Self {
        ElfError::Unsupported(mesg.into())
    }
}

impl fmt::Display for ElfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElfError::FileAccess { path, source } => {
                write!(f, "couldn't read {}: {source}", path.display())
            }
            ElfError::Truncated { offset, size, len } => write!(
                f,
                "truncated file: {size} bytes at offset 0x{offset:x} would read past the end ({len} bytes)"
            ),
            ElfError::Malformed(mesg) => write!(f, "malformed file: {mesg}"),
            ElfError::Unsupported(mesg) => write!(f, "unsupported file: {mesg}"),
            ElfError::Io(err) => write!(f, "couldn't write output: {err}"),
        }
    }
}

impl Error for ElfError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ElfError::FileAccess { source, .. } => Some(source),
            ElfError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ElfError {
    fn from(err: io::Error) -> Self {
        ElfError::Io(err)
    }
}
