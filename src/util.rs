/// The maximum length of a `u32` encoded as an unsigned LEB128 varint.
pub const VARINT_MAX_LEN: usize = 5;

pub const fn u16_from_le_slice(s: &[u8]) -> u16 {
    u16::from_le_bytes([s[0], s[1]])
}

pub const fn u32_from_le_slice(s: &[u8]) -> u32 {
    u32::from_le_bytes([s[0], s[1], s[2], s[3]])
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Varint {
    /// The decoded value and the number of consumed bytes.
    Value(u32, usize),
    /// The slice ends inside the varint.
    Incomplete,
    /// The encoding is longer than 5 bytes or does not fit into `u32`.
    Overflow,
}

pub fn decode_varint(s: &[u8]) -> Varint {
    let mut value = 0u32;
    for (i, &byte) in s.iter().take(VARINT_MAX_LEN).enumerate() {
        let bits = (byte & 0x7f) as u32;
        if i == VARINT_MAX_LEN - 1 && bits > 0x0f {
            return Varint::Overflow;
        }
        value |= bits << (i * 7);
        if byte & 0x80 == 0 {
            return Varint::Value(value, i + 1);
        }
    }
    if s.len() >= VARINT_MAX_LEN {
        Varint::Overflow
    } else {
        Varint::Incomplete
    }
}

pub fn encode_varint(mut value: u32, out: &mut Vec<u8>) {
    while value >= 0x80 {
        out.push(value as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}
