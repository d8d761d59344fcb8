use super::ctor::{Emit, MAX_PSEUDO_OPS};
use super::{
    CtorKind, FormatTemplate, InstructionId, MnemonicRef, OperandRef, SizeOverride,
    TemplateFlags, TemplateTable,
};
use crate::error::{Error, Malformed};
use crate::ordinal::Ordinal;
use crate::raw::StreamReader;
use log::{debug, trace};

/// The shape of a template table, known from the decoder's instruction id space.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct TemplateConfig {
    pub instruction_count: usize,
}

impl TemplateConfig {
    pub const fn new(instruction_count: usize) -> Self {
        Self { instruction_count }
    }
}

/// Fields of a non-folding record.
struct Record {
    mnemonic: MnemonicRef,
    operands: Vec<OperandRef>,
    size: SizeOverride,
    count: usize,
}

struct Builder<'a> {
    reader: StreamReader<'a>,
    templates: Vec<FormatTemplate>,
    instruction_count: usize,
}

impl Builder<'_> {
    fn malformed(kind: CtorKind, offset: usize, reason: Malformed) -> Error {
        Error::MalformedTemplateStream {
            offset,
            tag: kind.name(),
            reason,
        }
    }

    fn current(&self, kind: CtorKind, offset: usize) -> Result<FormatTemplate, Error> {
        self.templates
            .last()
            .cloned()
            .ok_or_else(|| Self::malformed(kind, offset, Malformed::NoCurrentTemplate))
    }

    fn read_record(&mut self, kind: CtorKind, offset: usize) -> Result<Record, Error> {
        let shape = kind.shape();
        let mnemonic = MnemonicRef::new(self.reader.read_reference()?);
        let mut operands = Vec::with_capacity(shape.operands as usize);
        for _ in 0..shape.operands {
            operands.push(OperandRef::new(self.reader.read_reference()?));
        }
        let size = if shape.width {
            let bits = self.reader.read_varint()?;
            SizeOverride::from_width(bits)
                .ok_or_else(|| Self::malformed(kind, offset, Malformed::InvalidWidth(bits)))?
        } else {
            SizeOverride::None
        };
        let count = match shape.emit {
            Emit::PseudoOpsRead => {
                let count = self.reader.read_varint()?;
                if count == 0 || count > MAX_PSEUDO_OPS {
                    return Err(Self::malformed(
                        kind,
                        offset,
                        Malformed::InvalidVariantCount(count),
                    ));
                }
                count as usize
            }
            Emit::Sizes(sizes) => sizes.len(),
            Emit::ConditionCodes(n) | Emit::PseudoOps(n) => n as usize,
            Emit::Previous | Emit::Reverse | Emit::One => 1,
        };
        Ok(Record {
            mnemonic,
            operands,
            size,
            count,
        })
    }

    fn reserve(&self, kind: CtorKind, offset: usize, count: usize) -> Result<(), Error> {
        let left = self.instruction_count - self.templates.len();
        if count > left {
            return Err(Self::malformed(
                kind,
                offset,
                Malformed::TooManyTemplates {
                    emitted: count,
                    left,
                },
            ));
        }
        Ok(())
    }

    fn push(&mut self, mut template: FormatTemplate) {
        template.instruction_id = InstructionId::new(self.templates.len() as u32);
        self.templates.push(template);
    }

    fn expand(&mut self, kind: CtorKind, offset: usize) -> Result<(), Error> {
        let shape = kind.shape();
        match shape.emit {
            Emit::Previous => {
                let template = self.current(kind, offset)?;
                self.push(template);
                return Ok(());
            }
            Emit::Reverse => {
                let mut template = self.current(kind, offset)?;
                template.kind = kind;
                template.operands.reverse();
                template.flags.toggle(TemplateFlags::REVERSE_OPERANDS);
                self.push(template);
                return Ok(());
            }
            _ => {}
        }

        let record = self.read_record(kind, offset).map_err(|err| match err {
            Error::TruncatedStream { .. } => Self::malformed(kind, offset, Malformed::Truncated),
            err => err,
        })?;
        self.reserve(kind, offset, record.count)?;
        trace!(
            "{} at {:#x} emits {} templates from id {}",
            kind,
            offset,
            record.count,
            self.templates.len()
        );

        let base = FormatTemplate {
            instruction_id: InstructionId::default(),
            kind,
            mnemonic: record.mnemonic,
            variant: 0,
            size: record.size,
            operands: record.operands,
            flags: shape.flags,
        };
        match shape.emit {
            Emit::Sizes(sizes) => {
                for (variant, &size) in sizes.iter().enumerate() {
                    self.push(FormatTemplate {
                        variant: variant as u8,
                        size,
                        ..base.clone()
                    });
                }
            }
            _ => {
                for variant in 1..record.count {
                    self.push(FormatTemplate {
                        variant: (variant - 1) as u8,
                        ..base.clone()
                    });
                }
                self.push(FormatTemplate {
                    variant: (record.count - 1) as u8,
                    ..base
                });
            }
        }
        Ok(())
    }
}

pub(super) fn build(reader: StreamReader, config: TemplateConfig) -> Result<TemplateTable, Error> {
    // every record is at least one byte, larger families grow the vector on demand
    let capacity = config.instruction_count.min(reader.remaining());
    let mut builder = Builder {
        reader,
        templates: Vec::with_capacity(capacity),
        instruction_count: config.instruction_count,
    };
    while builder.templates.len() < builder.instruction_count {
        let offset = builder.reader.offset();
        let kind = builder.reader.read_tag::<CtorKind>()?;
        builder.expand(kind, offset)?;
    }

    let Builder {
        reader, templates, ..
    } = builder;
    let len = reader.offset();
    reader.finish()?;
    debug!(
        "built template table: {} templates from {} bytes",
        templates.len(),
        len
    );
    Ok(TemplateTable {
        templates: templates.into_boxed_slice(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{PayloadKind, StreamWriter, HEADER_LEN};
    use proptest::prelude::*;

    fn build(writer: StreamWriter, instruction_count: usize) -> Result<TemplateTable, Error> {
        let data = writer.finish();
        TemplateTable::from_bytes(&data, TemplateConfig::new(instruction_count))
    }

    fn operands(refs: &[u16]) -> Vec<OperandRef> {
        refs.iter().copied().map(OperandRef::new).collect()
    }

    #[test]
    fn fold_and_condition_codes() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::Normal_1, 5, &[3]);
        writer.tag(CtorKind::Previous);
        writer.template(CtorKind::CC_2, 6, &[4]);
        let table = build(writer, 4).unwrap();

        assert_eq!(table.len(), 4);
        let first = table.template_for(InstructionId::new(0));
        assert_eq!(first.kind, CtorKind::Normal_1);
        assert_eq!(first.mnemonic, MnemonicRef::new(5));
        assert_eq!(first.operands, operands(&[3]));

        let clone = table.template_for(InstructionId::new(1));
        assert_eq!(clone.instruction_id, InstructionId::new(1));
        assert_eq!(
            clone,
            &FormatTemplate {
                instruction_id: InstructionId::new(1),
                ..first.clone()
            }
        );

        for (variant, id) in (2..4).enumerate() {
            let template = table.template_for(InstructionId::new(id));
            assert_eq!(template.instruction_id.get(), id);
            assert_eq!(template.kind, CtorKind::CC_2);
            assert_eq!(template.mnemonic, MnemonicRef::new(6));
            assert_eq!(template.variant, variant as u8);
            assert_eq!(template.operands, operands(&[4]));
            assert!(template.flags.contains(TemplateFlags::CONDITION_CODE));
        }
        assert!(table.get(InstructionId::new(4)).is_none());
    }

    #[test]
    fn leading_previous() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.tag(CtorKind::Previous);
        writer.template(CtorKind::Normal_1, 5, &[3]);
        assert_eq!(
            build(writer, 2),
            Err(Error::MalformedTemplateStream {
                offset: HEADER_LEN,
                tag: "Previous",
                reason: Malformed::NoCurrentTemplate,
            })
        );

        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.tag(CtorKind::reverse);
        assert!(matches!(
            build(writer, 1),
            Err(Error::MalformedTemplateStream {
                reason: Malformed::NoCurrentTemplate,
                ..
            })
        ));
    }

    #[test]
    fn operand_size_family() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::os_mem_reg16, 9, &[2]);
        writer.tag(CtorKind::Previous);
        let table = build(writer, 4).unwrap();

        let sizes: Vec<_> = table.iter().map(|t| t.size).collect();
        assert_eq!(
            sizes,
            [
                SizeOverride::Size16,
                SizeOverride::Size32,
                SizeOverride::Size64,
                SizeOverride::Size64
            ]
        );
        assert!(table
            .iter()
            .all(|t| t.flags == TemplateFlags::MEMORY | TemplateFlags::REG16));
        assert_eq!(table.template_for(InstructionId::new(3)).variant, 2);
    }

    #[test]
    fn width_and_pseudo_ops() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::os_jcc_b_2, 1, &[2]).varint(64);
        writer.template(CtorKind::pops, 3, &[4, 5]).varint(3);
        writer.template(CtorKind::Reg32, 6, &[7]);
        let table = build(writer, 6).unwrap();

        let jcc = table.template_for(InstructionId::new(1));
        assert_eq!(jcc.size, SizeOverride::Size64);
        assert_eq!(jcc.variant, 1);
        assert!(jcc.flags.contains(TemplateFlags::BND_PREFIX | TemplateFlags::BRANCH));

        let pops: Vec<_> = table.iter().skip(2).take(3).map(|t| t.variant).collect();
        assert_eq!(pops, [0, 1, 2]);
        assert!(table.iter().skip(2).take(3).all(|t| t.kind == CtorKind::pops));

        let reg = table.template_for(InstructionId::new(5));
        assert_eq!(reg.size, SizeOverride::Size32);
        assert_eq!(reg.flags, TemplateFlags::REG32);
    }

    #[test]
    fn reverse_folds_previous() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::Normal_2, 1, &[10, 11]);
        writer.tag(CtorKind::reverse);
        writer.tag(CtorKind::reverse);
        let table = build(writer, 3).unwrap();

        let reversed = table.template_for(InstructionId::new(1));
        assert_eq!(reversed.kind, CtorKind::reverse);
        assert_eq!(reversed.mnemonic, MnemonicRef::new(1));
        assert_eq!(reversed.operands, operands(&[11, 10]));
        assert!(reversed.flags.contains(TemplateFlags::REVERSE_OPERANDS));

        let twice = table.template_for(InstructionId::new(2));
        assert_eq!(twice.operands, operands(&[10, 11]));
        assert!(twice.flags.is_empty());
    }

    #[test]
    fn truncated_family() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::Normal_1, 5, &[3]);
        writer.template(CtorKind::SignExt_4, 1, &[2]);
        assert_eq!(
            build(writer, 2),
            Err(Error::MalformedTemplateStream {
                offset: HEADER_LEN + 5,
                tag: "SignExt_4",
                reason: Malformed::Truncated,
            })
        );

        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::Normal_1, 5, &[3]);
        assert!(matches!(
            build(writer, 2),
            Err(Error::TruncatedStream { .. })
        ));
    }

    #[test]
    fn too_many_templates() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::Normal_1, 5, &[3]);
        writer.template(CtorKind::CC_3, 6, &[4]);
        assert_eq!(
            build(writer, 3),
            Err(Error::MalformedTemplateStream {
                offset: HEADER_LEN + 5,
                tag: "CC_3",
                reason: Malformed::TooManyTemplates { emitted: 3, left: 2 },
            })
        );
    }

    #[test]
    fn invalid_fields() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::asz, 1, &[2]).varint(8);
        assert!(matches!(
            build(writer, 1),
            Err(Error::MalformedTemplateStream {
                reason: Malformed::InvalidWidth(8),
                ..
            })
        ));

        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::pops, 1, &[2, 3]).varint(0);
        assert!(matches!(
            build(writer, 1),
            Err(Error::MalformedTemplateStream {
                reason: Malformed::InvalidVariantCount(0),
                ..
            })
        ));

        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.byte(CtorKind::count() as u8);
        assert_eq!(
            build(writer, 1),
            Err(Error::InvalidTag {
                kind: "CtorKind",
                value: 53,
                offset: HEADER_LEN
            })
        );
    }

    #[test]
    fn trailing_records() {
        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::String, 1, &[]);
        writer.tag(CtorKind::Previous);
        assert_eq!(
            build(writer, 1),
            Err(Error::TrailingData {
                offset: HEADER_LEN + 3,
                len: 1
            })
        );
        assert_eq!(
            build(StreamWriter::new(PayloadKind::Formatter), 0).map(|t| t.len()),
            Ok(0)
        );
    }

    #[test]
    fn instruction_count_beyond_payload() {
        assert!(matches!(
            build(StreamWriter::new(PayloadKind::Formatter), usize::MAX / 2),
            Err(Error::TruncatedStream {
                offset: HEADER_LEN,
                ..
            })
        ));

        let mut writer = StreamWriter::new(PayloadKind::Formatter);
        writer.template(CtorKind::CC_2, 6, &[4]);
        assert!(matches!(
            build(writer, usize::MAX / 2),
            Err(Error::TruncatedStream {
                offset,
                ..
            }) if offset == HEADER_LEN + 5
        ));
    }

    fn write_record(writer: &mut StreamWriter, kind: CtorKind, seed: u16) -> usize {
        writer.tag(kind);
        let shape = kind.shape();
        if shape.emit.is_fold() {
            return 1;
        }
        writer.reference(seed);
        for i in 0..shape.operands {
            writer.reference(seed.wrapping_add(i as u16 + 1));
        }
        if shape.width {
            writer.varint(32);
        }
        match kind.emission_count() {
            Some(count) => count,
            None => {
                let count = u32::from(seed) % MAX_PSEUDO_OPS + 1;
                writer.varint(count);
                count as usize
            }
        }
    }

    proptest! {
        #[test]
        fn every_family_matches_its_arity(
            records in prop::collection::vec((1..CtorKind::count(), any::<u16>()), 1..40)
        ) {
            let mut writer = StreamWriter::new(PayloadKind::Formatter);
            let mut count = 0;
            let mut kinds = Vec::new();
            for &(ordinal, seed) in &records {
                let kind = CtorKind::from_ordinal(ordinal).unwrap();
                let emitted = write_record(&mut writer, kind, seed);
                kinds.extend(std::iter::repeat(kind).take(emitted));
                count += emitted;
            }
            // `reverse` may only lead if something precedes it
            prop_assume!(kinds[0] != CtorKind::reverse);
            let data = writer.finish();
            let table = TemplateTable::from_bytes(&data, TemplateConfig::new(count)).unwrap();

            prop_assert_eq!(table.len(), count);
            for (i, (template, kind)) in table.iter().zip(&kinds).enumerate() {
                prop_assert_eq!(template.instruction_id.index(), i);
                prop_assert_eq!(template.kind, *kind);
                if let Some(arity) = kind.operand_count() {
                    prop_assert_eq!(template.operands.len(), arity);
                }
            }

            let again = TemplateTable::from_bytes(&data, TemplateConfig::new(count)).unwrap();
            prop_assert_eq!(again, table);
        }
    }
}
