//! Compact (variable-length) unsigned integers
//!
//! The low two bits of the first byte select the width class:
//! - `0b00`: single byte, values up to 2^6 - 1
//! - `0b01`: two bytes, values up to 2^14 - 1
//! - `0b10`: four bytes, values up to 2^30 - 1
//! - `0b11`: big-integer mode, the upper six bits hold `byte_count - 4`
//!   and `byte_count` little-endian bytes follow
//!
//! Encoding always picks the smallest class; decoding rejects anything else.

use super::{Decode, Encode, Input};
use crate::error::DecodeError;

const SINGLE_BYTE_MAX: u128 = 0x3f;
const TWO_BYTE_MAX: u128 = 0x3fff;
const FOUR_BYTE_MAX: u128 = 0x3fff_ffff;

/// Wrapper selecting the compact encoding for an unsigned integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Compact<T>(pub T);

impl<T> From<T> for Compact<T> {
    fn from(value: T) -> Self {
        Compact(value)
    }
}

/// Number of bytes the compact encoding of `value` occupies
pub fn compact_len(value: u128) -> usize {
    match value {
        0..=SINGLE_BYTE_MAX => 1,
        0..=TWO_BYTE_MAX => 2,
        0..=FOUR_BYTE_MAX => 4,
        _ => 1 + big_int_bytes(value),
    }
}

/// Encode `value` in its minimal compact form
pub fn encode_compact(value: u128, dest: &mut Vec<u8>) {
    match value {
        0..=SINGLE_BYTE_MAX => dest.push((value as u8) << 2),
        0..=TWO_BYTE_MAX => dest.extend_from_slice(&(((value as u16) << 2) | 0b01).to_le_bytes()),
        0..=FOUR_BYTE_MAX => dest.extend_from_slice(&(((value as u32) << 2) | 0b10).to_le_bytes()),
        _ => {
            let bytes_needed = big_int_bytes(value);
            dest.push((((bytes_needed - 4) as u8) << 2) | 0b11);
            dest.extend_from_slice(&value.to_le_bytes()[..bytes_needed]);
        }
    }
}

/// Decode a compact integer, rejecting over-long encodings
pub fn decode_compact(input: &mut Input<'_>) -> Result<u128, DecodeError> {
    let first = input.peek_byte()?;
    match first & 0b11 {
        0b00 => {
            input.read_byte()?;
            Ok((first >> 2) as u128)
        }
        0b01 => {
            let value = (u16::from_le_bytes(input.read_array()?) >> 2) as u128;
            if value <= SINGLE_BYTE_MAX {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(value)
        }
        0b10 => {
            let value = (u32::from_le_bytes(input.read_array()?) >> 2) as u128;
            if value <= TWO_BYTE_MAX {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(value)
        }
        _ => {
            let len = (first >> 2) as usize + 4;
            if len > 16 {
                return Err(DecodeError::CompactOverflow("u128"));
            }
            // validate the whole encoding is present before consuming anything
            if input.remaining() < 1 + len {
                return Err(DecodeError::NotEnoughData {
                    needed: 1 + len,
                    remaining: input.remaining(),
                });
            }
            input.read_byte()?;
            let mut buf = [0u8; 16];
            buf[..len].copy_from_slice(input.read_bytes(len)?);
            let value = u128::from_le_bytes(buf);
            if value <= FOUR_BYTE_MAX || big_int_bytes(value) != len {
                return Err(DecodeError::NonCanonicalCompact);
            }
            Ok(value)
        }
    }
}

/// Minimal little-endian byte count for big-integer mode (at least four)
fn big_int_bytes(value: u128) -> usize {
    let significant = (128 - value.leading_zeros() as usize).div_ceil(8);
    significant.max(4)
}

macro_rules! impl_compact {
    ($($t:ty),*) => {$(
        impl Encode for Compact<$t> {
            fn encode_to(&self, dest: &mut Vec<u8>) {
                encode_compact(self.0 as u128, dest)
            }
        }

        impl Decode for Compact<$t> {
            fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
                let value = decode_compact(input)?;
                <$t>::try_from(value)
                    .map(Compact)
                    .map_err(|_| DecodeError::CompactOverflow(stringify!($t)))
            }
        }
    )*};
}

impl_compact!(u8, u16, u32, u64, u128);
