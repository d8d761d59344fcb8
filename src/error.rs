use core::fmt;
use thiserror::Error;

/// The kind of a dangling reference.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum RefKind {
    Handler,
    Array,
}

impl fmt::Display for RefKind {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Handler => fmt.write_str("handler"),
            Self::Array => fmt.write_str("array"),
        }
    }
}

/// Why a formatter payload was rejected.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Malformed {
    #[error("no current template to fold from")]
    NoCurrentTemplate,
    #[error("read pattern runs past the end of the stream")]
    Truncated,
    #[error("emits {emitted} templates but only {left} instruction ids are left")]
    TooManyTemplates { emitted: usize, left: usize },
    #[error("invalid operand width {0}")]
    InvalidWidth(u32),
    #[error("invalid variant count {0}")]
    InvalidVariantCount(u32),
}

/// A build-time fault.
///
/// The payloads are trusted build artifacts, so every variant is fatal for the table
/// being built. Each variant carries the byte offset of the fault.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Truncated stream at offset {offset:#x}, need {needed} more bytes")]
    TruncatedStream { offset: usize, needed: usize },
    #[error("Invalid {kind} tag {value} at offset {offset:#x}")]
    InvalidTag {
        kind: &'static str,
        value: u8,
        offset: usize,
    },
    #[error("Invalid varint at offset {offset:#x}")]
    InvalidVarint { offset: usize },
    #[error("Dangling {kind} reference {id} at offset {offset:#x}")]
    DanglingReference {
        kind: RefKind,
        id: u32,
        offset: usize,
    },
    #[error("Array {id} defined twice, second definition at offset {offset:#x}")]
    DuplicateArray { id: u16, offset: usize },
    #[error("Dispatch array at offset {offset:#x} nested deeper than {max} levels")]
    DispatchTooDeep { max: usize, offset: usize },
    #[error("Malformed template stream at offset {offset:#x} ({tag}): {reason}")]
    MalformedTemplateStream {
        offset: usize,
        tag: &'static str,
        reason: Malformed,
    },
    #[error("{len} trailing bytes at offset {offset:#x}")]
    TrailingData { offset: usize, len: usize },
    #[error("Invalid payload magic {found:#06x}")]
    BadMagic { found: u16 },
    #[error("Expected a {expected} payload, found kind {found}")]
    WrongPayloadKind { expected: &'static str, found: u8 },
    #[error("Unsupported payload version {found}, expected {expected}")]
    UnsupportedVersion { expected: u8, found: u8 },
}
