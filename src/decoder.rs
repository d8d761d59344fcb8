//! The opcode dispatch tree.
//!
//! A dispatch table maps a sequence of decode fields (opcode byte, mode bits, `ModRM.reg`
//! and so on) to the identifier of the routine that decodes the instruction. The table is
//! built once from a decoder payload and never changes afterwards.

mod builder;

pub use self::builder::{DispatchConfig, MAX_DEPTH};

use crate::error::Error;
use crate::raw::{PayloadKind, StreamReader, StreamWriter};

ordinal_enum! {
    /// A record tag of a decoder payload.
    pub enum SerializedDataKind: u8 {
        /// A terminal node, followed by a handler reference.
        HandlerReference,
        /// An interior node, followed by a varint size and an array reference.
        ///
        /// A non-zero size defines a new array whose slots follow inline, a zero size
        /// refers to an array defined earlier under the same reference.
        ArrayReference,
    }
}

newtype! {
    /// An identifier of a decode routine.
    pub struct HandlerId(u16) {
        const FMT = "handler {}";
    }
}

newtype! {
    /// A dense index of a dispatch array in its table.
    pub struct ArrayId(u32) {
        const FMT = "array {}";
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DecodeNode {
    /// The opcode is fully resolved.
    Handler(HandlerId),
    /// The next decode field indexes the array, the second value is its width.
    Array(ArrayId, u32),
}

/// An immutable opcode dispatch tree.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DispatchTable {
    roots: Box<[DecodeNode]>,
    arrays: Box<[Box<[DecodeNode]>]>,
    invalid_handler: HandlerId,
}

impl DispatchTable {
    /// Builds a dispatch table from a decoder payload.
    ///
    /// # Errors
    ///
    /// Any fault of the payload is fatal, see [`Error`].
    pub fn from_bytes(data: &[u8], config: DispatchConfig) -> Result<Self, Error> {
        let reader = StreamReader::new(data, PayloadKind::Decoder)?;
        builder::build(reader, config)
    }

    /// Resolves a decode field sequence to a handler.
    ///
    /// The lookup is total: a field outside of its array, or a sequence that ends before
    /// a handler is reached, resolves to the invalid handler. Fields after the resolving
    /// handler are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// # use x86_tables::decoder::{DispatchConfig, DispatchTable, HandlerId};
    /// # use x86_tables::raw::{PayloadKind, StreamWriter};
    /// let mut writer = StreamWriter::new(PayloadKind::Decoder);
    /// writer
    ///     .handler_reference(1)
    ///     .array_reference(2, 0)
    ///     .handler_reference(2)
    ///     .handler_reference(3);
    /// let data = writer.finish();
    /// let table = DispatchTable::from_bytes(&data, DispatchConfig::new(2, 4))?;
    /// assert_eq!(table.lookup_handler(&[0]), HandlerId::new(1));
    /// assert_eq!(table.lookup_handler(&[1, 1]), HandlerId::new(3));
    /// assert_eq!(table.lookup_handler(&[1]), table.invalid_handler());
    /// # Ok::<(), x86_tables::Error>(())
    /// ```
    pub fn lookup_handler(&self, fields: &[u32]) -> HandlerId {
        let mut nodes: &[DecodeNode] = &self.roots;
        for &field in fields {
            match nodes.get(field as usize) {
                Some(DecodeNode::Handler(handler)) => return *handler,
                Some(DecodeNode::Array(id, _)) => nodes = &self.arrays[id.index()],
                None => break,
            }
        }
        self.invalid_handler
    }

    pub fn root(&self, slot: usize) -> Option<&DecodeNode> {
        self.roots.get(slot)
    }

    pub fn roots(&self) -> &[DecodeNode] {
        &self.roots
    }

    /// Returns the slots of an array of this table.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not produced by this table.
    pub fn children(&self, id: ArrayId) -> &[DecodeNode] {
        &self.arrays[id.index()]
    }

    pub fn slot_count(&self) -> usize {
        self.roots.len()
    }

    pub fn array_count(&self) -> usize {
        self.arrays.len()
    }

    pub fn invalid_handler(&self) -> HandlerId {
        self.invalid_handler
    }
}

impl StreamWriter {
    pub fn handler_reference(&mut self, id: u16) -> &mut Self {
        self.tag(SerializedDataKind::HandlerReference).reference(id)
    }

    pub fn array_reference(&mut self, size: u32, id: u16) -> &mut Self {
        self.tag(SerializedDataKind::ArrayReference)
            .varint(size)
            .reference(id)
    }
}
