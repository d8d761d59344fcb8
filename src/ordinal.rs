//! Dense enumerations and their canonical names.

use core::fmt;

/// An enumeration that behaves as a dense range of ordinals `0..COUNT`.
pub trait Ordinal: Copy + Sized + 'static {
    /// Canonical names indexed by ordinal.
    const NAMES: &'static [&'static str];
    /// All values indexed by ordinal.
    const VALUES: &'static [Self];

    /// Returns the ordinal of the value.
    fn to_ordinal(self) -> usize;

    /// Returns the value with the given ordinal, or `None` if out of range.
    fn from_ordinal(ordinal: usize) -> Option<Self> {
        Self::VALUES.get(ordinal).copied()
    }

    /// Returns the canonical name of the value.
    fn name(self) -> &'static str {
        Self::NAMES[self.to_ordinal()]
    }

    /// Returns the number of values.
    fn count() -> usize {
        Self::VALUES.len()
    }

    /// Iterates all values in ordinal order.
    fn iter() -> core::iter::Copied<core::slice::Iter<'static, Self>> {
        Self::VALUES.iter().copied()
    }
}

/// Displays a canonical name or the decimal ordinal if it is out of range.
#[derive(Copy, Clone, Debug)]
pub struct NameOrDecimal {
    names: &'static [&'static str],
    ordinal: usize,
}

impl fmt::Display for NameOrDecimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.names.get(self.ordinal) {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.ordinal),
        }
    }
}

/// Returns a displayable name for any ordinal of `T`.
///
/// # Examples
///
/// ```
/// # use x86_tables::formatter::SizeOverride;
/// # use x86_tables::ordinal::name_or_decimal;
/// assert_eq!(name_or_decimal::<SizeOverride>(2).to_string(), "Size32");
/// assert_eq!(name_or_decimal::<SizeOverride>(9).to_string(), "9");
/// ```
pub fn name_or_decimal<T: Ordinal>(ordinal: usize) -> NameOrDecimal {
    NameOrDecimal {
        names: T::NAMES,
        ordinal,
    }
}
