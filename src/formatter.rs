//! Instruction format templates.
//!
//! The formatter payload describes one [`FormatTemplate`] per instruction id. Families of
//! near-identical instructions (condition codes, operand sizes, pseudo-ops) are stored as
//! one record that expands into several sibling templates, and runs of identical
//! templates are folded into `Previous` records.

mod builder;
mod ctor;
mod size;

pub use self::builder::TemplateConfig;
pub use self::ctor::{CtorKind, Emit, Shape, MAX_PSEUDO_OPS};
pub use self::size::{
    resolve_branch_size, resolve_size_override, BranchSizeInfo, FormatterMode, SizeOverride,
};

use crate::error::Error;
use crate::raw::{PayloadKind, StreamReader, StreamWriter};
use bitflags::bitflags;
use core::slice;

newtype! {
    /// A dense instruction id, shared with the decoder.
    pub struct InstructionId(u32) {
        const FMT = "{}";
    }
}

newtype! {
    /// A reference to a mnemonic string.
    pub struct MnemonicRef(u16) {
        const FMT = "mnemonic {}";
    }
}

newtype! {
    /// A reference to an operand descriptor.
    pub struct OperandRef(u16) {
        const FMT = "operand {}";
    }
}

bitflags! {
    /// Rendering hints of a template.
    #[derive(Default)]
    pub struct TemplateFlags: u32 {
        const REVERSE_OPERANDS = 1 << 0;
        /// x87 form with an implicit `st(0)` operand.
        const ST_IMPLICIT = 1 << 1;
        const BROADCAST = 1 << 2;
        const BND_PREFIX = 1 << 3;
        const SIGN_EXTEND_IMM = 1 << 4;
        const DECLARE_DATA = 1 << 5;
        const IMPLICIT_MEMORY = 1 << 6;
        /// Embedded rounding control.
        const ROUNDING = 1 << 7;
        const FAR = 1 << 8;
        const MEMORY = 1 << 9;
        const ADDRESS_SIZE = 1 << 10;
        const ABSOLUTE_ADDRESS = 1 << 11;
        /// Suppress all exceptions.
        const SAE = 1 << 12;
        const BRANCH = 1 << 13;
        const CONDITION_CODE = 1 << 14;
        const REG16 = 1 << 15;
        const REG32 = 1 << 16;
        const IMPLICIT_XMM0 = 1 << 17;
        const PSEUDO_OPS = 1 << 18;
        const HIDE_DUPLICATE_OPERAND = 1 << 19;
        const HIDE_DEFAULT_IMM = 1 << 20;
        const STRING = 1 << 21;
    }
}

/// How one instruction is rendered.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct FormatTemplate {
    pub instruction_id: InstructionId,
    /// The tag the template was constructed by, a `Previous` clone keeps the tag of
    /// its source.
    pub kind: CtorKind,
    pub mnemonic: MnemonicRef,
    /// The sibling index inside a family: the condition-code spelling, the pseudo-op or
    /// the operand-size form.
    pub variant: u8,
    pub size: SizeOverride,
    pub operands: Vec<OperandRef>,
    pub flags: TemplateFlags,
}

/// An immutable table of templates indexed by instruction id.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TemplateTable {
    templates: Box<[FormatTemplate]>,
}

impl TemplateTable {
    /// Builds a template table from a formatter payload.
    ///
    /// # Examples
    ///
    /// ```
    /// # use x86_tables::formatter::{CtorKind, InstructionId, TemplateConfig, TemplateTable};
    /// # use x86_tables::raw::{PayloadKind, StreamWriter};
    /// let mut writer = StreamWriter::new(PayloadKind::Formatter);
    /// writer.template(CtorKind::Normal_1, 5, &[3]);
    /// writer.tag(CtorKind::Previous);
    /// let data = writer.finish();
    /// let table = TemplateTable::from_bytes(&data, TemplateConfig::new(2))?;
    /// assert_eq!(table.template_for(InstructionId::new(1)).mnemonic.get(), 5);
    /// # Ok::<(), x86_tables::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Any fault of the payload is fatal, see [`Error`].
    pub fn from_bytes(data: &[u8], config: TemplateConfig) -> Result<Self, Error> {
        let reader = StreamReader::new(data, PayloadKind::Formatter)?;
        builder::build(reader, config)
    }

    /// Returns the template of an instruction.
    ///
    /// # Panics
    ///
    /// Panics if `id` is outside of the declared instruction count.
    pub fn template_for(&self, id: InstructionId) -> &FormatTemplate {
        &self.templates[id.index()]
    }

    pub fn get(&self, id: InstructionId) -> Option<&FormatTemplate> {
        self.templates.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, FormatTemplate> {
        self.templates.iter()
    }
}

impl<'a> IntoIterator for &'a TemplateTable {
    type Item = &'a FormatTemplate;
    type IntoIter = slice::Iter<'a, FormatTemplate>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl StreamWriter {
    /// Writes a record tag with its mnemonic and operand references.
    ///
    /// A width or a pseudo-op count read by the tag follows with [`StreamWriter::varint`].
    pub fn template(&mut self, kind: CtorKind, mnemonic: u16, operands: &[u16]) -> &mut Self {
        self.tag(kind).reference(mnemonic);
        for &operand in operands {
            self.reference(operand);
        }
        self
    }
}
