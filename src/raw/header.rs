use crate::error::Error;
use crate::util;
use bitfield::bitfield;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The wire format version understood by this loader.
pub const FORMAT_VERSION: u8 = 1;
/// The magic number of every payload.
pub const MAGIC: u16 = 0x1ced;
/// The length of an encoded header.
pub const HEADER_LEN: usize = 4;

/// The consumer a payload is serialized for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum PayloadKind {
    Decoder,
    Formatter,
}

impl PayloadKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decoder => "decoder",
            Self::Formatter => "formatter",
        }
    }
}

bitfield! {
    /// A payload header.
    ///
    /// Stored little-endian as the first word of every payload.
    #[derive(Copy, Clone, Default, Eq, PartialEq)]
    pub struct Header(u32);
    impl Debug;
    /// A version of the wire format.
    pub u8, version, set_version: 7, 0;
    /// A raw [`PayloadKind`].
    pub u8, raw_kind, set_raw_kind: 15, 8;
    /// A magic number, always [`MAGIC`].
    pub u16, magic, set_magic: 31, 16;
}

impl Header {
    /// Creates a header of the current format version.
    pub fn new(kind: PayloadKind) -> Self {
        let mut header = Self(0);
        header.set_magic(MAGIC);
        header.set_raw_kind(kind.into());
        header.set_version(FORMAT_VERSION);
        header
    }

    /// Reads a header from the first 4 bytes of `s`.
    pub fn from_le_slice(s: &[u8]) -> Self {
        Self(util::u32_from_le_slice(s))
    }

    pub fn to_le_bytes(self) -> [u8; HEADER_LEN] {
        self.0.to_le_bytes()
    }

    /// Checks that a payload of `expected` kind can be read by this loader.
    ///
    /// The magic is checked first, then the kind, then the version.
    pub fn check(&self, expected: PayloadKind) -> Result<(), Error> {
        if self.magic() != MAGIC {
            return Err(Error::BadMagic {
                found: self.magic(),
            });
        }
        if PayloadKind::try_from_primitive(self.raw_kind()).ok() != Some(expected) {
            return Err(Error::WrongPayloadKind {
                expected: expected.as_str(),
                found: self.raw_kind(),
            });
        }
        if self.version() != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: self.version(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let header = Header::new(PayloadKind::Formatter);
        assert_eq!(header.to_le_bytes(), [0x01, 0x01, 0xed, 0x1c]);
        assert!(header.check(PayloadKind::Formatter).is_ok());
    }

    #[test]
    fn header_mismatch() {
        let header = Header::new(PayloadKind::Decoder);
        assert_eq!(
            header.check(PayloadKind::Formatter),
            Err(Error::WrongPayloadKind {
                expected: "formatter",
                found: 0
            })
        );

        let mut header = Header::new(PayloadKind::Decoder);
        header.set_version(FORMAT_VERSION + 1);
        assert_eq!(
            header.check(PayloadKind::Decoder),
            Err(Error::UnsupportedVersion {
                expected: FORMAT_VERSION,
                found: FORMAT_VERSION + 1
            })
        );

        let mut header = Header::new(PayloadKind::Decoder);
        header.set_magic(0xbeef);
        assert_eq!(
            header.check(PayloadKind::Decoder),
            Err(Error::BadMagic { found: 0xbeef })
        );
    }
}
