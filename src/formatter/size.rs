//! Per-operand size decisions made while rendering.

ordinal_enum! {
    /// Whether a branch target is annotated with an explicit size.
    pub enum BranchSizeInfo: u8 {
        None,
        Short,
    }
}

impl BranchSizeInfo {
    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Short => "short",
        }
    }
}

ordinal_enum! {
    /// An explicit operand-size token.
    pub enum SizeOverride: u8 {
        None,
        Size16,
        Size32,
        Size64,
    }
}

impl SizeOverride {
    /// Returns the token for an operand width in bits, if such a token exists.
    pub fn from_width(bits: u32) -> Option<Self> {
        match bits {
            16 => Some(Self::Size16),
            32 => Some(Self::Size32),
            64 => Some(Self::Size64),
            _ => Option::None,
        }
    }

    pub fn width(self) -> Option<u32> {
        match self {
            Self::None => Option::None,
            Self::Size16 => Some(16),
            Self::Size32 => Some(32),
            Self::Size64 => Some(64),
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Size16 => "o16",
            Self::Size32 => "o32",
            Self::Size64 => "o64",
        }
    }
}

/// Formatter state the size decisions depend on.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FormatterMode {
    /// Annotates short branches with `short`.
    pub show_branch_size: bool,
}

impl Default for FormatterMode {
    fn default() -> Self {
        Self {
            show_branch_size: true,
        }
    }
}

/// Decides whether a branch target of `width` bits needs a size annotation.
pub fn resolve_branch_size(width: u32, mode: FormatterMode) -> BranchSizeInfo {
    if mode.show_branch_size && width == 8 {
        BranchSizeInfo::Short
    } else {
        BranchSizeInfo::None
    }
}

/// Decides which size token disambiguates an operand.
///
/// # Examples
///
/// ```
/// # use x86_tables::formatter::{resolve_size_override, SizeOverride};
/// assert_eq!(resolve_size_override(16, 32), SizeOverride::Size16);
/// assert_eq!(resolve_size_override(32, 32), SizeOverride::None);
/// ```
pub fn resolve_size_override(operand_width: u32, default_width: u32) -> SizeOverride {
    if operand_width == default_width {
        return SizeOverride::None;
    }
    SizeOverride::from_width(operand_width).unwrap_or(SizeOverride::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_override() {
        assert_eq!(resolve_size_override(16, 32), SizeOverride::Size16);
        assert_eq!(resolve_size_override(32, 32), SizeOverride::None);
        assert_eq!(resolve_size_override(64, 32), SizeOverride::Size64);
        assert_eq!(resolve_size_override(32, 64), SizeOverride::Size32);
        assert_eq!(resolve_size_override(8, 32), SizeOverride::None);
        assert_eq!(resolve_size_override(128, 64), SizeOverride::None);
        assert_eq!(resolve_size_override(16, 32).keyword(), "o16");
    }

    #[test]
    fn branch_size() {
        let mode = FormatterMode::default();
        assert_eq!(resolve_branch_size(8, mode), BranchSizeInfo::Short);
        assert_eq!(resolve_branch_size(32, mode), BranchSizeInfo::None);
        let mode = FormatterMode {
            show_branch_size: false,
        };
        assert_eq!(resolve_branch_size(8, mode), BranchSizeInfo::None);
        assert_eq!(BranchSizeInfo::Short.keyword(), "short");
    }

    #[test]
    fn width_round_trip() {
        for &bits in &[16, 32, 64] {
            assert_eq!(SizeOverride::from_width(bits).and_then(SizeOverride::width), Some(bits));
        }
        assert_eq!(SizeOverride::from_width(8), Option::None);
    }
}
