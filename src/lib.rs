//! Loader for the compressed x86 decoder and formatter tables.
//!
//! Two payloads ship with a decoder/formatter: a dispatch tree mapping decode fields to
//! handler ids ([`decoder`]) and one format template per instruction id ([`formatter`]).
//! Both are deserialized once by a [`raw::StreamReader`] and are immutable afterwards.

#[macro_use]
mod macros;

pub mod decoder;
pub mod formatter;
pub mod ordinal;
pub mod raw;

mod error;
mod tables;
mod util;

pub use crate::error::{Error, Malformed, RefKind};
pub use crate::tables::{LazyTables, Tables};
