//! Encode/Decode for primitive and composite std types

use super::{decode_compact, encode_compact, Decode, Encode, Input};
use crate::error::DecodeError;

macro_rules! impl_fixed_width {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode_to(&self, dest: &mut Vec<u8>) {
                dest.extend_from_slice(&self.to_le_bytes());
            }
        }

        impl Decode for $t {
            fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
                Ok(<$t>::from_le_bytes(input.read_array()?))
            }
        }
    )*};
}

impl_fixed_width!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128);

impl Encode for bool {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        dest.push(*self as u8);
    }
}

impl Decode for bool {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0x00 => Ok(false),
            0x01 => Ok(true),
            b => Err(DecodeError::InvalidBool(b)),
        }
    }
}

impl Encode for () {
    fn encode_to(&self, _dest: &mut Vec<u8>) {}
}

impl Decode for () {
    fn decode(_input: &mut Input<'_>) -> Result<Self, DecodeError> {
        Ok(())
    }
}

impl<T: Encode> Encode for [T] {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        encode_compact(self.len() as u128, dest);
        for item in self {
            item.encode_to(dest);
        }
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.as_slice().encode_to(dest)
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let len = decode_compact(input)?;
        let len = usize::try_from(len).map_err(|_| DecodeError::CompactOverflow("usize"))?;
        // a hostile length prefix must not drive the allocation
        let mut items = Vec::with_capacity(len.min(input.remaining()));
        for _ in 0..len {
            items.push(T::decode(input)?);
        }
        Ok(items)
    }
}

impl Encode for str {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.as_bytes().encode_to(dest)
    }
}

impl Encode for String {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.as_str().encode_to(dest)
    }
}

impl Decode for String {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let bytes = Vec::<u8>::decode(input)?;
        String::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        for item in self {
            item.encode_to(dest);
        }
    }
}

impl<T: Decode, const N: usize> Decode for [T; N] {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let mut items = Vec::with_capacity(N);
        for _ in 0..N {
            items.push(T::decode(input)?);
        }
        items
            .try_into()
            .map_err(|items: Vec<T>| DecodeError::NotEnoughData {
                needed: N,
                remaining: items.len(),
            })
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            None => dest.push(0x00),
            Some(value) => {
                dest.push(0x01);
                value.encode_to(dest);
            }
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0x00 => Ok(None),
            0x01 => Ok(Some(T::decode(input)?)),
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "Option",
                index,
            }),
        }
    }
}

macro_rules! impl_tuple {
    ($($name:ident),+) => {
        impl<$($name: Encode),+> Encode for ($($name,)+) {
            #[allow(non_snake_case)]
            fn encode_to(&self, dest: &mut Vec<u8>) {
                let ($($name,)+) = self;
                $($name.encode_to(dest);)+
            }
        }

        impl<$($name: Decode),+> Decode for ($($name,)+) {
            fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
                Ok(($($name::decode(input)?,)+))
            }
        }
    };
}

impl_tuple!(A);
impl_tuple!(A, B);
impl_tuple!(A, B, C);
impl_tuple!(A, B, C, D);
impl_tuple!(A, B, C, D, E);
impl_tuple!(A, B, C, D, E, F);
