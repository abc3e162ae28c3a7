//! Chain primitive types: account ids, hashes, addresses, signatures and eras

use crate::codec::{hex_to_bytes, Compact, Decode, Encode, Input};
use crate::error::{DecodeError, SigningError, WasmSubstrateError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

macro_rules! fixed_bytes {
    ($(#[$meta:meta])* $name:ident, $len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub const LEN: usize = $len;

            /// Parse from hex, with or without the `0x` prefix
            pub fn from_hex(hex_str: &str) -> Result<Self, WasmSubstrateError> {
                let bytes = hex_to_bytes(hex_str)?;
                Self::from_slice(&bytes)
            }

            pub fn from_slice(bytes: &[u8]) -> Result<Self, WasmSubstrateError> {
                let array: [u8; $len] = bytes.try_into().map_err(|_| {
                    WasmSubstrateError::InvalidInput(format!(
                        "{} must be {} bytes, got {}",
                        stringify!($name),
                        $len,
                        bytes.len()
                    ))
                })?;
                Ok($name(array))
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl From<[u8; $len]> for $name {
            fn from(bytes: [u8; $len]) -> Self {
                $name(bytes)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }

        impl Encode for $name {
            fn encode_to(&self, dest: &mut Vec<u8>) {
                dest.extend_from_slice(&self.0);
            }
        }

        impl Decode for $name {
            fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
                Ok($name(input.read_array()?))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                $name::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

fixed_bytes!(
    /// 32-byte account identifier (a public key)
    AccountId,
    32
);

fixed_bytes!(
    /// 32-byte block or genesis hash
    H256,
    32
);

/// Legacy indices-style account reference
///
/// Wire format: `0xff` followed by a 32-byte account id, or an account index
/// in one byte (below `0xf0`), `0xfc` + u16 or `0xfd` + u32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    AccountId(AccountId),
    AccountIndex(u32),
}

impl Address {
    pub fn from_hex_account_id(hex_str: &str) -> Result<Self, WasmSubstrateError> {
        Ok(Address::AccountId(AccountId::from_hex(hex_str)?))
    }
}

impl From<AccountId> for Address {
    fn from(id: AccountId) -> Self {
        Address::AccountId(id)
    }
}

impl Encode for Address {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match *self {
            Address::AccountId(ref id) => {
                dest.push(0xff);
                id.encode_to(dest);
            }
            Address::AccountIndex(index) if index < 0xf0 => dest.push(index as u8),
            Address::AccountIndex(index) if index <= u16::MAX as u32 => {
                dest.push(0xfc);
                (index as u16).encode_to(dest);
            }
            Address::AccountIndex(index) => {
                dest.push(0xfd);
                index.encode_to(dest);
            }
        }
    }
}

impl Decode for Address {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let invalid = |index| DecodeError::InvalidDiscriminant {
            type_name: "Address",
            index,
        };
        match input.read_byte()? {
            0xff => Ok(Address::AccountId(AccountId::decode(input)?)),
            0xfd => {
                let index = u32::decode(input)?;
                if index <= u16::MAX as u32 {
                    return Err(invalid(0xfd));
                }
                Ok(Address::AccountIndex(index))
            }
            0xfc => {
                let index = u16::decode(input)?;
                if index < 0xf0 {
                    return Err(invalid(0xfc));
                }
                Ok(Address::AccountIndex(index as u32))
            }
            b @ 0x00..=0xef => Ok(Address::AccountIndex(b as u32)),
            // 0xfe would carry a u64 index; 0xf0..=0xfb are reserved
            b => Err(invalid(b)),
        }
    }
}

/// Multi-format account reference used by newer runtimes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MultiAddress {
    Id(AccountId),
    Index(u32),
    Raw(Vec<u8>),
    Address32([u8; 32]),
    Address20([u8; 20]),
}

impl From<AccountId> for MultiAddress {
    fn from(id: AccountId) -> Self {
        MultiAddress::Id(id)
    }
}

impl Encode for MultiAddress {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match self {
            MultiAddress::Id(id) => {
                dest.push(0);
                id.encode_to(dest);
            }
            MultiAddress::Index(index) => {
                dest.push(1);
                Compact(*index).encode_to(dest);
            }
            MultiAddress::Raw(bytes) => {
                dest.push(2);
                bytes.encode_to(dest);
            }
            MultiAddress::Address32(bytes) => {
                dest.push(3);
                bytes.encode_to(dest);
            }
            MultiAddress::Address20(bytes) => {
                dest.push(4);
                bytes.encode_to(dest);
            }
        }
    }
}

impl Decode for MultiAddress {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0 => Ok(MultiAddress::Id(AccountId::decode(input)?)),
            1 => Ok(MultiAddress::Index(Compact::<u32>::decode(input)?.0)),
            2 => Ok(MultiAddress::Raw(Vec::decode(input)?)),
            3 => Ok(MultiAddress::Address32(input.read_array()?)),
            4 => Ok(MultiAddress::Address20(input.read_array()?)),
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "MultiAddress",
                index,
            }),
        }
    }
}

/// Signature scheme of a [`MultiSignature`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SignatureScheme {
    Ed25519,
    Sr25519,
    Ecdsa,
}

impl SignatureScheme {
    /// Byte length of a signature in this scheme
    pub fn signature_len(self) -> usize {
        match self {
            SignatureScheme::Ed25519 | SignatureScheme::Sr25519 => 64,
            SignatureScheme::Ecdsa => 65,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SignatureScheme::Ed25519 => "Ed25519",
            SignatureScheme::Sr25519 => "Sr25519",
            SignatureScheme::Ecdsa => "Ecdsa",
        }
    }
}

impl fmt::Display for SignatureScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature tagged with its scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MultiSignature {
    Ed25519([u8; 64]),
    Sr25519([u8; 64]),
    Ecdsa([u8; 65]),
}

impl MultiSignature {
    /// Wrap raw signature bytes, checking the length against the scheme
    pub fn from_scheme_bytes(scheme: SignatureScheme, bytes: &[u8]) -> Result<Self, SigningError> {
        let wrong_len = || SigningError::InvalidSignatureLength {
            scheme: scheme.name(),
            expected: scheme.signature_len(),
            actual: bytes.len(),
        };
        Ok(match scheme {
            SignatureScheme::Ed25519 => {
                MultiSignature::Ed25519(bytes.try_into().map_err(|_| wrong_len())?)
            }
            SignatureScheme::Sr25519 => {
                MultiSignature::Sr25519(bytes.try_into().map_err(|_| wrong_len())?)
            }
            SignatureScheme::Ecdsa => {
                MultiSignature::Ecdsa(bytes.try_into().map_err(|_| wrong_len())?)
            }
        })
    }

    pub fn scheme(&self) -> SignatureScheme {
        match self {
            MultiSignature::Ed25519(_) => SignatureScheme::Ed25519,
            MultiSignature::Sr25519(_) => SignatureScheme::Sr25519,
            MultiSignature::Ecdsa(_) => SignatureScheme::Ecdsa,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            MultiSignature::Ed25519(sig) | MultiSignature::Sr25519(sig) => &sig[..],
            MultiSignature::Ecdsa(sig) => &sig[..],
        }
    }
}

impl Encode for MultiSignature {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        let index = match self {
            MultiSignature::Ed25519(_) => 0u8,
            MultiSignature::Sr25519(_) => 1,
            MultiSignature::Ecdsa(_) => 2,
        };
        dest.push(index);
        dest.extend_from_slice(self.as_bytes());
    }
}

impl Decode for MultiSignature {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        match input.read_byte()? {
            0 => Ok(MultiSignature::Ed25519(input.read_array()?)),
            1 => Ok(MultiSignature::Sr25519(input.read_array()?)),
            2 => Ok(MultiSignature::Ecdsa(input.read_array()?)),
            index => Err(DecodeError::InvalidDiscriminant {
                type_name: "MultiSignature",
                index,
            }),
        }
    }
}

/// Transaction validity window
///
/// A mortal era is valid for `period` blocks starting at the block whose
/// number modulo `period` equals `phase`. The period is a power of two in
/// `[4, 65536]`, the phase is below the period and, for periods above 4096,
/// a multiple of `period / 4096`. Eras from [`Era::mortal`],
/// [`Era::checked_mortal`], decoding and deserialization always hold this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "EraRepr", into = "EraRepr")]
pub enum Era {
    /// Immortal transaction (never expires)
    #[default]
    Immortal,
    /// Mortal transaction with period and phase
    Mortal { period: u64, phase: u64 },
}

impl Era {
    /// Mortal era covering `period` blocks from `current` onwards
    ///
    /// The period is rounded up to a power of two in `[4, 65536]` and the
    /// phase is quantised the same way the runtime does.
    pub fn mortal(period: u64, current: u64) -> Self {
        let period = period
            .checked_next_power_of_two()
            .unwrap_or(1 << 16)
            .clamp(4, 1 << 16);
        let phase = current % period;
        let quantize_factor = (period >> 12).max(1);
        Era::Mortal {
            period,
            phase: phase / quantize_factor * quantize_factor,
        }
    }

    /// Mortal era from an explicit period and phase, rejecting any pair that
    /// would not survive an encode/decode round trip
    pub fn checked_mortal(period: u64, phase: u64) -> Result<Self, WasmSubstrateError> {
        let invalid = |reason: &str| {
            WasmSubstrateError::InvalidInput(format!(
                "invalid mortal era (period {}, phase {}): {}",
                period, phase, reason
            ))
        };
        if !period.is_power_of_two() || !(4..=1 << 16).contains(&period) {
            return Err(invalid("period must be a power of two in [4, 65536]"));
        }
        if phase >= period {
            return Err(invalid("phase must be below the period"));
        }
        if phase % (period >> 12).max(1) != 0 {
            return Err(invalid("phase is not quantised for this period"));
        }
        Ok(Era::Mortal { period, phase })
    }

    /// Check if this is an immortal era
    pub fn is_immortal(&self) -> bool {
        matches!(self, Era::Immortal)
    }

    /// First block (at or before `current`) in which the era is valid
    pub fn birth(&self, current: u64) -> u64 {
        match *self {
            Era::Immortal => 0,
            Era::Mortal { period, phase } => {
                let period = period.max(1);
                (current.max(phase) - phase) / period * period + phase
            }
        }
    }

    /// First block after the era expires
    pub fn death(&self, current: u64) -> u64 {
        match *self {
            Era::Immortal => u64::MAX,
            Era::Mortal { period, .. } => self.birth(current).saturating_add(period),
        }
    }
}

impl Encode for Era {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        match *self {
            Era::Immortal => dest.push(0),
            Era::Mortal { period, phase } => {
                let quantize_factor = (period >> 12).max(1);
                let low = (period.trailing_zeros().saturating_sub(1)).clamp(1, 15) as u64;
                let encoded = (low | ((phase / quantize_factor) << 4)) as u16;
                encoded.encode_to(dest);
            }
        }
    }
}

impl Decode for Era {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let first = input.read_byte()?;
        if first == 0 {
            return Ok(Era::Immortal);
        }
        let encoded = first as u64 + ((input.read_byte()? as u64) << 8);
        let period = 2u64 << (encoded % (1 << 4));
        let quantize_factor = (period >> 12).max(1);
        let phase = (encoded >> 4) * quantize_factor;
        if period >= 4 && phase < period {
            Ok(Era::Mortal { period, phase })
        } else {
            Err(DecodeError::InvalidEra(encoded as u16))
        }
    }
}

/// Wire shape of [`Era`] in JSON and JS objects
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum EraRepr {
    Immortal,
    Mortal { period: u64, phase: u64 },
}

impl TryFrom<EraRepr> for Era {
    type Error = WasmSubstrateError;

    fn try_from(repr: EraRepr) -> Result<Self, Self::Error> {
        match repr {
            EraRepr::Immortal => Ok(Era::Immortal),
            EraRepr::Mortal { period, phase } => Era::checked_mortal(period, phase),
        }
    }
}

impl From<Era> for EraRepr {
    fn from(era: Era) -> Self {
        match era {
            Era::Immortal => EraRepr::Immortal,
            Era::Mortal { period, phase } => EraRepr::Mortal { period, phase },
        }
    }
}

/// Deserialize u128 from either a number or a decimal string
pub(crate) fn deserialize_u128<'de, D>(deserializer: D) -> Result<u128, D::Error>
where
    D: Deserializer<'de>,
{
    struct U128Visitor;

    impl<'de> serde::de::Visitor<'de> for U128Visitor {
        type Value = u128;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a u128 as number or string")
        }

        fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<u128, E> {
            Ok(value as u128)
        }

        fn visit_u128<E: serde::de::Error>(self, value: u128) -> Result<u128, E> {
            Ok(value)
        }

        fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<u128, E> {
            u128::try_from(value).map_err(|_| E::custom("negative values not allowed"))
        }

        fn visit_str<E: serde::de::Error>(self, value: &str) -> Result<u128, E> {
            value.parse().map_err(E::custom)
        }
    }

    deserializer.deserialize_any(U128Visitor)
}
