use super::{ArrayId, DecodeNode, DispatchTable, HandlerId, SerializedDataKind};
use crate::error::{Error, RefKind};
use crate::raw::{StreamReader, REFERENCE_LEN};
use log::{debug, trace};
use std::collections::BTreeMap;

/// The maximum number of decode fields needed to resolve an opcode.
pub const MAX_DEPTH: usize = 8;

/// The smallest encoded node, a tag and a handler reference.
const MIN_NODE_LEN: usize = 1 + REFERENCE_LEN;

/// The shape of a dispatch table, known from the opcode map.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DispatchConfig {
    /// A number of top-level slots, e.g. 256 for a one-byte opcode table.
    pub slot_count: usize,
    /// A number of known handlers, every handler reference must be below it.
    pub handler_count: u32,
    /// A handler every out-of-domain lookup resolves to.
    pub invalid_handler: HandlerId,
}

impl DispatchConfig {
    pub const fn new(slot_count: usize, handler_count: u32) -> Self {
        Self {
            slot_count,
            handler_count,
            invalid_handler: HandlerId::new(0),
        }
    }

    pub const fn with_invalid_handler(mut self, handler: HandlerId) -> Self {
        self.invalid_handler = handler;
        self
    }
}

struct Builder<'a> {
    reader: StreamReader<'a>,
    config: DispatchConfig,
    arrays: Vec<Box<[DecodeNode]>>,
    ids: BTreeMap<u16, ArrayId>,
}

impl Builder<'_> {
    fn handler(&self, id: u16, offset: usize) -> Result<HandlerId, Error> {
        if u32::from(id) < self.config.handler_count {
            Ok(HandlerId::new(id))
        } else {
            Err(Error::DanglingReference {
                kind: RefKind::Handler,
                id: id.into(),
                offset,
            })
        }
    }

    /// Rejects `count` nodes the rest of the payload cannot hold, before anything is
    /// allocated for them.
    fn check_fits(&self, count: usize) -> Result<(), Error> {
        let needed = count.saturating_mul(MIN_NODE_LEN);
        let remaining = self.reader.remaining();
        if remaining < needed {
            return Err(Error::TruncatedStream {
                offset: self.reader.offset(),
                needed: needed - remaining,
            });
        }
        Ok(())
    }

    fn read_node(&mut self, depth: usize) -> Result<DecodeNode, Error> {
        let offset = self.reader.offset();
        match self.reader.read_tag::<SerializedDataKind>()? {
            SerializedDataKind::HandlerReference => {
                let id = self.reader.read_reference()?;
                self.handler(id, offset).map(DecodeNode::Handler)
            }
            SerializedDataKind::ArrayReference => {
                let size = self.reader.read_varint()?;
                let id = self.reader.read_reference()?;
                if size == 0 {
                    return match self.ids.get(&id) {
                        Some(&array) => {
                            let width = self.arrays[array.index()].len() as u32;
                            Ok(DecodeNode::Array(array, width))
                        }
                        None => Err(Error::DanglingReference {
                            kind: RefKind::Array,
                            id: id.into(),
                            offset,
                        }),
                    };
                }
                self.read_array(id, size, depth, offset)
            }
        }
    }

    fn read_array(
        &mut self,
        id: u16,
        size: u32,
        depth: usize,
        offset: usize,
    ) -> Result<DecodeNode, Error> {
        if depth + 1 >= MAX_DEPTH {
            return Err(Error::DispatchTooDeep {
                max: MAX_DEPTH,
                offset,
            });
        }
        if self.ids.contains_key(&id) {
            return Err(Error::DuplicateArray { id, offset });
        }
        self.check_fits(size as usize)?;

        let mut children = Vec::with_capacity(size as usize);
        for _ in 0..size {
            children.push(self.read_node(depth + 1)?);
        }
        let array = ArrayId::new(self.arrays.len() as u32);
        if self.ids.insert(id, array).is_some() {
            return Err(Error::DuplicateArray { id, offset });
        }
        trace!("reference {} defines {} with {} slots", id, array, size);
        self.arrays.push(children.into_boxed_slice());
        Ok(DecodeNode::Array(array, size))
    }
}

pub(super) fn build(reader: StreamReader, config: DispatchConfig) -> Result<DispatchTable, Error> {
    let mut builder = Builder {
        reader,
        config,
        arrays: Vec::new(),
        ids: BTreeMap::new(),
    };
    let invalid_handler = builder.handler(config.invalid_handler.get(), 0)?;
    builder.check_fits(config.slot_count)?;

    let mut roots = Vec::with_capacity(config.slot_count);
    for _ in 0..config.slot_count {
        roots.push(builder.read_node(0)?);
    }

    let Builder { reader, arrays, .. } = builder;
    let len = reader.offset();
    reader.finish()?;
    debug!(
        "built dispatch table: {} slots, {} arrays from {} bytes",
        roots.len(),
        arrays.len(),
        len
    );
    Ok(DispatchTable {
        roots: roots.into_boxed_slice(),
        arrays: arrays.into_boxed_slice(),
        invalid_handler,
    })
}
