//! SCALE codec
//!
//! A small, self-contained implementation of the SCALE wire format:
//! - fixed-width integers are little-endian
//! - booleans are a single `0x00`/`0x01` byte
//! - `Vec<T>` and strings carry a compact length prefix
//! - `Option<T>` is a `0x00`/`0x01` presence byte followed by the value
//! - arrays and tuples are plain concatenations
//! - enums are a one-byte discriminant followed by the variant payload

mod compact;
mod primitives;

pub use compact::{compact_len, decode_compact, encode_compact, Compact};

use crate::error::DecodeError;

/// Read cursor over an immutable byte slice
#[derive(Debug, Clone)]
pub struct Input<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Input<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Input { data, offset: 0 }
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.offset
    }

    pub fn read_byte(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn peek_byte(&self) -> Result<u8, DecodeError> {
        self.data
            .get(self.offset)
            .copied()
            .ok_or(DecodeError::NotEnoughData {
                needed: 1,
                remaining: 0,
            })
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::NotEnoughData {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Everything left in the input
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = &self.data[self.offset..];
        self.offset = self.data.len();
        rest
    }
}

/// Types with a SCALE encoding
pub trait Encode {
    /// Append the encoding to `dest`
    fn encode_to(&self, dest: &mut Vec<u8>);

    fn encode(&self) -> Vec<u8> {
        let mut dest = Vec::new();
        self.encode_to(&mut dest);
        dest
    }
}

/// Types that can be read back from their SCALE encoding
pub trait Decode: Sized {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError>;
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        (**self).encode_to(dest)
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        (**self).encode_to(dest)
    }
}

/// Decode a value from the front of `bytes`, returning it with the number of
/// bytes consumed
pub fn decode_prefix<T: Decode>(bytes: &[u8]) -> Result<(T, usize), DecodeError> {
    let mut input = Input::new(bytes);
    let value = T::decode(&mut input)?;
    Ok((value, input.consumed()))
}

/// Decode a value that must span the whole of `bytes`
pub fn decode_all<T: Decode>(bytes: &[u8]) -> Result<T, DecodeError> {
    let mut input = Input::new(bytes);
    let value = T::decode(&mut input)?;
    match input.remaining() {
        0 => Ok(value),
        n => Err(DecodeError::TrailingBytes(n)),
    }
}

/// Encode to a `0x`-prefixed hex string
pub fn encode_to_hex<T: Encode + ?Sized>(value: &T) -> String {
    format!("0x{}", hex::encode(value.encode()))
}

/// Decode from a hex string, with or without the `0x` prefix
pub fn decode_from_hex<T: Decode>(hex_str: &str) -> Result<T, DecodeError> {
    decode_all(&hex_to_bytes(hex_str)?)
}

pub(crate) fn hex_to_bytes(hex_str: &str) -> Result<Vec<u8>, DecodeError> {
    let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
    hex::decode(hex_str).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}
