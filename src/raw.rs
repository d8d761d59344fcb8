//! The serialized table format.
//!
//! A payload is a 4-byte [`Header`] followed by `(tag, payload)` records. Tags are one
//! byte, counts and widths are unsigned LEB128 varints and references are 2-byte
//! little-endian ids.

mod header;
mod reader;
mod writer;

pub use self::header::{Header, PayloadKind, FORMAT_VERSION, HEADER_LEN, MAGIC};
pub use self::reader::StreamReader;
pub use self::writer::StreamWriter;

/// The length of an encoded reference.
pub const REFERENCE_LEN: usize = 2;
