use super::header::{Header, PayloadKind};
use crate::util;

/// Serializes records in the format read by [`StreamReader`](super::StreamReader).
#[derive(Clone, Debug)]
pub struct StreamWriter {
    data: Vec<u8>,
}

impl StreamWriter {
    /// Creates a writer for a payload of the current format version.
    pub fn new(kind: PayloadKind) -> Self {
        Self::with_header(Header::new(kind))
    }

    pub fn with_header(header: Header) -> Self {
        Self {
            data: header.to_le_bytes().to_vec(),
        }
    }

    pub fn byte(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn tag<T: Into<u8>>(&mut self, tag: T) -> &mut Self {
        self.byte(tag.into())
    }

    pub fn varint(&mut self, value: u32) -> &mut Self {
        util::encode_varint(value, &mut self.data);
        self
    }

    pub fn reference(&mut self, id: u16) -> &mut Self {
        self.data.extend_from_slice(&id.to_le_bytes());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.data
    }
}
