//! Record tags of a formatter payload.

use super::{SizeOverride, TemplateFlags};

ordinal_enum! {
    /// A template constructor tag.
    ///
    /// Every tag has a fixed [`Shape`]: what it reads after the tag byte and how many
    /// templates it emits. The ordinals are part of the wire format.
    #[allow(non_camel_case_types)]
    pub enum CtorKind: u8 {
        /// Repeats the current template.
        Previous,
        Normal_1,
        Normal_2,
        AamAad,
        asz,
        String,
        STIG2_2b,
        bcst,
        bnd,
        SignExt_4,
        DeclareData,
        XLAT,
        er_2,
        er_3,
        far,
        far_mem,
        invlpga,
        maskmovq,
        SignExt_3,
        STIG1,
        STIG2_2a,
        movabs,
        sae,
        nop,
        OpSize,
        OpSize2_bnd,
        OpSize3,
        os_2,
        os_3,
        os_call,
        push_imm,
        CC_1,
        CC_2,
        CC_3,
        os_jcc_a_1,
        os_jcc_a_2,
        os_jcc_a_3,
        os_jcc_b_1,
        os_jcc_b_2,
        os_jcc_b_3,
        os_loopcc,
        os_loop,
        os_mem,
        os_mem_reg16,
        os_mem2,
        pblendvb,
        push_imm8,
        pclmulqdq,
        pops,
        imul,
        Reg16,
        Reg32,
        /// Repeats the current template with its operands in reverse order.
        reverse,
    }
}

const SIZES_16_32: &[SizeOverride] = &[SizeOverride::Size16, SizeOverride::Size32];
const SIZES_16_64: &[SizeOverride] = &[
    SizeOverride::Size16,
    SizeOverride::Size32,
    SizeOverride::Size64,
];

/// The largest number of pseudo-op siblings a `pops` record may declare.
pub const MAX_PSEUDO_OPS: u32 = 32;

/// What a tag emits.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Emit {
    /// A clone of the current template.
    Previous,
    /// A clone of the current template with its operands reversed.
    Reverse,
    One,
    /// One sibling per operand size.
    Sizes(&'static [SizeOverride]),
    /// One sibling per condition-code spelling.
    ConditionCodes(u8),
    /// One sibling per pseudo-op spelling.
    PseudoOps(u8),
    /// One sibling per pseudo-op spelling, the count follows the operands.
    PseudoOpsRead,
}

impl Emit {
    /// Returns `true` if the tag folds the current template and reads nothing.
    pub fn is_fold(&self) -> bool {
        matches!(self, Self::Previous | Self::Reverse)
    }
}

/// A read pattern and emission of a tag.
///
/// A non-folding tag reads a mnemonic reference, `operands` operand references, then a
/// width varint if `width` is set, or a pseudo-op count for [`Emit::PseudoOpsRead`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Shape {
    pub operands: u8,
    pub width: bool,
    pub emit: Emit,
    pub flags: TemplateFlags,
}

impl CtorKind {
    pub fn shape(self) -> Shape {
        type F = TemplateFlags;
        use self::Emit::*;

        let (operands, width, emit, flags) = match self {
            Self::Previous => (0, false, Previous, F::empty()),
            Self::reverse => (0, false, Reverse, F::empty()),
            Self::Normal_1 => (1, false, One, F::empty()),
            Self::Normal_2 => (2, false, One, F::empty()),
            Self::AamAad => (1, false, One, F::HIDE_DEFAULT_IMM),
            Self::asz => (1, true, One, F::ADDRESS_SIZE),
            Self::String => (0, false, One, F::STRING),
            Self::STIG2_2b => (2, false, One, F::ST_IMPLICIT | F::REVERSE_OPERANDS),
            Self::bcst => (2, false, One, F::BROADCAST),
            Self::bnd => (1, false, One, F::BND_PREFIX),
            Self::SignExt_4 => (4, false, One, F::SIGN_EXTEND_IMM),
            Self::DeclareData => (0, false, One, F::DECLARE_DATA),
            Self::XLAT => (0, false, One, F::IMPLICIT_MEMORY),
            Self::er_2 => (2, false, One, F::ROUNDING),
            Self::er_3 => (3, false, One, F::ROUNDING),
            Self::far => (1, true, One, F::FAR),
            Self::far_mem => (1, true, One, F::FAR | F::MEMORY),
            Self::invlpga => (2, true, One, F::ADDRESS_SIZE),
            Self::maskmovq => (2, true, One, F::IMPLICIT_MEMORY | F::ADDRESS_SIZE),
            Self::SignExt_3 => (3, false, One, F::SIGN_EXTEND_IMM),
            Self::STIG1 => (1, false, One, F::ST_IMPLICIT),
            Self::STIG2_2a => (2, false, One, F::ST_IMPLICIT),
            Self::movabs => (2, false, One, F::ABSOLUTE_ADDRESS),
            Self::sae => (2, false, One, F::SAE),
            Self::nop => (1, true, One, F::empty()),
            Self::OpSize => (0, true, One, F::empty()),
            Self::OpSize2_bnd => (0, true, One, F::BND_PREFIX),
            Self::OpSize3 => (1, true, One, F::empty()),
            Self::os_2 => (1, false, Sizes(SIZES_16_32), F::empty()),
            Self::os_3 => (1, false, Sizes(SIZES_16_64), F::empty()),
            Self::os_call => (1, false, Sizes(SIZES_16_64), F::BRANCH),
            Self::push_imm => (1, false, Sizes(SIZES_16_64), F::empty()),
            Self::CC_1 => (1, false, ConditionCodes(1), F::CONDITION_CODE),
            Self::CC_2 => (1, false, ConditionCodes(2), F::CONDITION_CODE),
            Self::CC_3 => (1, false, ConditionCodes(3), F::CONDITION_CODE),
            Self::os_jcc_a_1 => (1, true, ConditionCodes(1), F::BRANCH | F::CONDITION_CODE),
            Self::os_jcc_a_2 => (1, true, ConditionCodes(2), F::BRANCH | F::CONDITION_CODE),
            Self::os_jcc_a_3 => (1, true, ConditionCodes(3), F::BRANCH | F::CONDITION_CODE),
            Self::os_jcc_b_1 => (
                1,
                true,
                ConditionCodes(1),
                F::BRANCH | F::CONDITION_CODE | F::BND_PREFIX,
            ),
            Self::os_jcc_b_2 => (
                1,
                true,
                ConditionCodes(2),
                F::BRANCH | F::CONDITION_CODE | F::BND_PREFIX,
            ),
            Self::os_jcc_b_3 => (
                1,
                true,
                ConditionCodes(3),
                F::BRANCH | F::CONDITION_CODE | F::BND_PREFIX,
            ),
            Self::os_loopcc => (1, true, ConditionCodes(2), F::BRANCH | F::CONDITION_CODE),
            Self::os_loop => (1, true, One, F::BRANCH),
            Self::os_mem => (1, false, Sizes(SIZES_16_64), F::MEMORY),
            Self::os_mem_reg16 => (1, false, Sizes(SIZES_16_64), F::MEMORY | F::REG16),
            Self::os_mem2 => (1, false, Sizes(SIZES_16_32), F::MEMORY),
            Self::pblendvb => (2, false, One, F::IMPLICIT_XMM0),
            Self::push_imm8 => (1, false, Sizes(SIZES_16_64), F::SIGN_EXTEND_IMM),
            Self::pclmulqdq => (3, false, PseudoOps(4), F::PSEUDO_OPS),
            Self::pops => (2, false, PseudoOpsRead, F::PSEUDO_OPS),
            Self::imul => (3, false, One, F::HIDE_DUPLICATE_OPERAND),
            Self::Reg16 => (1, false, Sizes(&[SizeOverride::Size16]), F::REG16),
            Self::Reg32 => (1, false, Sizes(&[SizeOverride::Size32]), F::REG32),
        };
        Shape {
            operands,
            width,
            emit,
            flags,
        }
    }

    /// Returns the number of operands of every template the tag emits, or `None` if the
    /// tag folds the current template and inherits its operands.
    pub fn operand_count(self) -> Option<usize> {
        let shape = self.shape();
        if shape.emit.is_fold() {
            None
        } else {
            Some(shape.operands as usize)
        }
    }

    /// Returns the number of templates the tag emits, or `None` if the count is read
    /// from the payload.
    pub fn emission_count(self) -> Option<usize> {
        match self.shape().emit {
            Emit::Previous | Emit::Reverse | Emit::One => Some(1),
            Emit::Sizes(sizes) => Some(sizes.len()),
            Emit::ConditionCodes(n) | Emit::PseudoOps(n) => Some(n as usize),
            Emit::PseudoOpsRead => None,
        }
    }
}
