//! Handlers for the views users ask for, e.g. `s` for section headers.
pub mod dump;
pub mod tables;

pub use dump::*;
