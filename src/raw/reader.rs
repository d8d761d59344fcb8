use super::header::{Header, PayloadKind, HEADER_LEN};
use super::REFERENCE_LEN;
use crate::error::Error;
use crate::util::{self, Varint};
use num_enum::TryFromPrimitive;

/// A sequential cursor over a serialized payload.
///
/// Reading never looks back: every read advances the cursor and fails with
/// [`Error::TruncatedStream`] if the payload ends first.
#[derive(Clone, Debug)]
pub struct StreamReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> StreamReader<'a> {
    /// Creates a reader over `data` and validates its header.
    ///
    /// # Examples
    ///
    /// ```
    /// # use x86_tables::raw::{PayloadKind, StreamReader, StreamWriter};
    /// let mut writer = StreamWriter::new(PayloadKind::Formatter);
    /// writer.varint(300).reference(7);
    /// let data = writer.finish();
    /// let mut reader = StreamReader::new(&data, PayloadKind::Formatter)?;
    /// assert_eq!(reader.read_varint()?, 300);
    /// assert_eq!(reader.read_reference()?, 7);
    /// assert!(reader.at_end());
    /// # Ok::<(), x86_tables::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Fails fast if the payload was produced for another consumer or another format
    /// version.
    pub fn new(data: &'a [u8], kind: PayloadKind) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::TruncatedStream {
                offset: 0,
                needed: HEADER_LEN - data.len(),
            });
        }
        let header = Header::from_le_slice(data);
        header.check(kind)?;
        Ok(Self {
            data,
            offset: HEADER_LEN,
        })
    }

    /// Returns the offset of the next byte to read.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn at_end(&self) -> bool {
        self.offset == self.data.len()
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if self.remaining() < len {
            return Err(Error::TruncatedStream {
                offset: self.offset,
                needed: len - self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    /// Reads a tag of the type expected by the caller.
    ///
    /// The tag type decides the valid domain, a byte outside of it fails with
    /// [`Error::InvalidTag`].
    pub fn read_tag<T>(&mut self) -> Result<T, Error>
    where
        T: TryFromPrimitive<Primitive = u8>,
    {
        let offset = self.offset;
        let value = self.read_u8()?;
        T::try_from_primitive(value).map_err(|_| Error::InvalidTag {
            kind: T::NAME,
            value,
            offset,
        })
    }

    /// Reads an unsigned LEB128 `u32`.
    pub fn read_varint(&mut self) -> Result<u32, Error> {
        match util::decode_varint(&self.data[self.offset..]) {
            Varint::Value(value, len) => {
                self.offset += len;
                Ok(value)
            }
            Varint::Incomplete => Err(Error::TruncatedStream {
                offset: self.data.len(),
                needed: 1,
            }),
            Varint::Overflow => Err(Error::InvalidVarint {
                offset: self.offset,
            }),
        }
    }

    /// Reads a 2-byte reference id.
    pub fn read_reference(&mut self) -> Result<u16, Error> {
        let bytes = self.take(REFERENCE_LEN)?;
        Ok(util::u16_from_le_slice(bytes))
    }

    /// Checks that the whole payload was consumed.
    pub fn finish(self) -> Result<(), Error> {
        if self.at_end() {
            Ok(())
        } else {
            Err(Error::TrailingData {
                offset: self.offset,
                len: self.remaining(),
            })
        }
    }
}
