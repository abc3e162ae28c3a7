//! Type-name directed encoding of dynamic values
//!
//! Runtime metadata declares call arguments by type name only
//! (`Compact<T::Balance>`, `<T::Lookup as StaticLookup>::Source`, ...).
//! [`TypeRegistry`] maps those names to a [`TypeDef`], which knows how to
//! encode a [`Value`] of that type and decode one back.
//!
//! Names are normalised before lookup: whitespace and `T::` qualifiers are
//! dropped. Names that are not registered are parsed structurally
//! (`Compact<_>`, `Vec<_>`, `Option<_>`, `Box<_>`, tuples and `[_; N]`).

use std::collections::HashMap;
use std::fmt;

use crate::codec::{decode_compact, encode_compact, hex_to_bytes, Decode, Encode, Input};
use crate::error::{DecodeError, WasmSubstrateError};
use crate::types::{AccountId, Address, MultiAddress};
use crate::value::Value;

pub type EncodeFn = fn(&Value, &mut Vec<u8>) -> Result<(), WasmSubstrateError>;
pub type DecodeFn = fn(&mut Input<'_>) -> Result<Value, DecodeError>;

/// Encoder/decoder pair for a type the built-in definitions do not cover
#[derive(Clone, Copy)]
pub struct CustomCodec {
    pub encode: EncodeFn,
    pub decode: DecodeFn,
}

impl fmt::Debug for CustomCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCodec")
    }
}

/// Bit width of a primitive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    W8,
    W16,
    W32,
    W64,
    W128,
}

impl IntWidth {
    pub const ALL: [IntWidth; 5] = [
        IntWidth::W8,
        IntWidth::W16,
        IntWidth::W32,
        IntWidth::W64,
        IntWidth::W128,
    ];

    pub fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    pub fn bytes(self) -> usize {
        match self {
            IntWidth::W8 => 1,
            IntWidth::W16 => 2,
            IntWidth::W32 => 4,
            IntWidth::W64 => 8,
            IntWidth::W128 => 16,
        }
    }

    pub fn from_bits(bits: u32) -> Option<Self> {
        IntWidth::ALL.into_iter().find(|w| w.bits() == bits)
    }

    fn uint_max(self) -> u128 {
        match self {
            IntWidth::W128 => u128::MAX,
            width => (1u128 << width.bits()) - 1,
        }
    }

    fn int_fits(self, n: i128) -> bool {
        match self {
            IntWidth::W128 => true,
            width => {
                let bound = 1i128 << (width.bits() - 1);
                (-bound..bound).contains(&n)
            }
        }
    }

    fn uint_name(self) -> &'static str {
        match self {
            IntWidth::W8 => "u8",
            IntWidth::W16 => "u16",
            IntWidth::W32 => "u32",
            IntWidth::W64 => "u64",
            IntWidth::W128 => "u128",
        }
    }
}

/// Resolved wire shape of a named type
#[derive(Debug, Clone)]
pub enum TypeDef {
    Bool,
    /// Fixed-width unsigned integer
    UInt(IntWidth),
    /// Fixed-width signed integer
    Int(IntWidth),
    /// Compact-encoded unsigned integer bounded by the given width
    Compact(IntWidth),
    /// `Vec<u8>`
    Bytes,
    Text,
    AccountId,
    /// 32-byte hash
    Hash,
    Address,
    MultiAddress,
    Vec(Box<TypeDef>),
    Option(Box<TypeDef>),
    Tuple(Vec<TypeDef>),
    Array(Box<TypeDef>, usize),
    Custom(String, CustomCodec),
}

impl fmt::Display for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeDef::Bool => f.write_str("bool"),
            TypeDef::UInt(width) => write!(f, "u{}", width.bits()),
            TypeDef::Int(width) => write!(f, "i{}", width.bits()),
            TypeDef::Compact(width) => write!(f, "Compact<u{}>", width.bits()),
            TypeDef::Bytes => f.write_str("Bytes"),
            TypeDef::Text => f.write_str("Text"),
            TypeDef::AccountId => f.write_str("AccountId"),
            TypeDef::Hash => f.write_str("Hash"),
            TypeDef::Address => f.write_str("Address"),
            TypeDef::MultiAddress => f.write_str("MultiAddress"),
            TypeDef::Vec(inner) => write!(f, "Vec<{}>", inner),
            TypeDef::Option(inner) => write!(f, "Option<{}>", inner),
            TypeDef::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str(")")
            }
            TypeDef::Array(inner, len) => write!(f, "[{}; {}]", inner, len),
            TypeDef::Custom(name, _) => f.write_str(name),
        }
    }
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "JSON boolean",
        serde_json::Value::Number(_) => "JSON number",
        serde_json::Value::String(_) => "JSON string",
        serde_json::Value::Array(_) => "JSON array",
        serde_json::Value::Object(_) => "JSON object",
    }
}

/// Account id from `0x`-prefixed hex or an SS58 address
fn parse_account_id(s: &str) -> Result<AccountId, WasmSubstrateError> {
    if s.starts_with("0x") {
        AccountId::from_hex(s)
    } else {
        AccountId::from_ss58(s)
    }
}

impl TypeDef {
    fn is_byte(&self) -> bool {
        matches!(self, TypeDef::UInt(IntWidth::W8))
    }

    /// Append the encoding of `value` as this type
    ///
    /// Fails with `TypeMismatch` when the value does not have this shape. On
    /// error `dest` may hold a partial encoding.
    pub fn encode_value(&self, value: &Value, dest: &mut Vec<u8>) -> Result<(), WasmSubstrateError> {
        match (self, value) {
            (TypeDef::Bool, Value::Bool(b)) => b.encode_to(dest),
            (TypeDef::UInt(width), Value::UInt(n)) if *n <= width.uint_max() => {
                dest.extend_from_slice(&n.to_le_bytes()[..width.bytes()])
            }
            (TypeDef::Int(width), Value::Int(n)) if width.int_fits(*n) => {
                dest.extend_from_slice(&n.to_le_bytes()[..width.bytes()])
            }
            (TypeDef::Compact(width), Value::UInt(n)) if *n <= width.uint_max() => {
                encode_compact(*n, dest)
            }
            (TypeDef::Bytes, Value::Bytes(bytes)) => bytes.encode_to(dest),
            (TypeDef::Text, Value::Text(s)) => s.encode_to(dest),
            (TypeDef::AccountId, Value::AccountId(id)) => id.encode_to(dest),
            (TypeDef::AccountId | TypeDef::Hash, Value::Bytes(bytes)) if bytes.len() == 32 => {
                dest.extend_from_slice(bytes)
            }
            (TypeDef::Address, Value::Address(address)) => address.encode_to(dest),
            (TypeDef::Address, Value::AccountId(id)) => Address::from(*id).encode_to(dest),
            (TypeDef::MultiAddress, Value::MultiAddress(address)) => address.encode_to(dest),
            (TypeDef::MultiAddress, Value::AccountId(id)) => {
                MultiAddress::from(*id).encode_to(dest)
            }
            (TypeDef::Vec(inner), Value::Sequence(items)) => {
                encode_compact(items.len() as u128, dest);
                for item in items {
                    inner.encode_value(item, dest)?;
                }
            }
            (TypeDef::Option(_), Value::Option(None)) => dest.push(0),
            (TypeDef::Option(inner), Value::Option(Some(item))) => {
                dest.push(1);
                inner.encode_value(item, dest)?;
            }
            (TypeDef::Tuple(defs), Value::Sequence(items)) if defs.len() == items.len() => {
                for (def, item) in defs.iter().zip(items) {
                    def.encode_value(item, dest)?;
                }
            }
            (TypeDef::Array(inner, len), Value::Sequence(items)) if items.len() == *len => {
                for item in items {
                    inner.encode_value(item, dest)?;
                }
            }
            (TypeDef::Array(inner, len), Value::Bytes(bytes))
                if inner.is_byte() && bytes.len() == *len =>
            {
                dest.extend_from_slice(bytes)
            }
            (TypeDef::Custom(_, codec), value) => (codec.encode)(value, dest)?,
            (def, value) => {
                return Err(WasmSubstrateError::type_mismatch(def.to_string(), value.kind()))
            }
        }
        Ok(())
    }

    /// Read a value of this type from `input`
    pub fn decode_value(&self, input: &mut Input<'_>) -> Result<Value, DecodeError> {
        Ok(match self {
            TypeDef::Bool => Value::Bool(bool::decode(input)?),
            TypeDef::UInt(width) => {
                let len = width.bytes();
                let mut buf = [0u8; 16];
                buf[..len].copy_from_slice(input.read_bytes(len)?);
                Value::UInt(u128::from_le_bytes(buf))
            }
            TypeDef::Int(width) => {
                let len = width.bytes();
                let bytes = input.read_bytes(len)?;
                // sign-extend into 16 bytes
                let fill = if bytes[len - 1] & 0x80 != 0 { 0xff } else { 0 };
                let mut buf = [fill; 16];
                buf[..len].copy_from_slice(bytes);
                Value::Int(i128::from_le_bytes(buf))
            }
            TypeDef::Compact(width) => {
                let n = decode_compact(input)?;
                if n > width.uint_max() {
                    return Err(DecodeError::CompactOverflow(width.uint_name()));
                }
                Value::UInt(n)
            }
            TypeDef::Bytes => Value::Bytes(Vec::<u8>::decode(input)?),
            TypeDef::Text => Value::Text(String::decode(input)?),
            TypeDef::AccountId => Value::AccountId(AccountId::decode(input)?),
            TypeDef::Hash => Value::Bytes(input.read_bytes(32)?.to_vec()),
            TypeDef::Address => Value::Address(Address::decode(input)?),
            TypeDef::MultiAddress => Value::MultiAddress(MultiAddress::decode(input)?),
            TypeDef::Vec(inner) => {
                let len = decode_compact(input)?;
                let len = usize::try_from(len).map_err(|_| DecodeError::CompactOverflow("usize"))?;
                let mut items = Vec::with_capacity(len.min(input.remaining()));
                for _ in 0..len {
                    items.push(inner.decode_value(input)?);
                }
                Value::Sequence(items)
            }
            TypeDef::Option(inner) => match input.read_byte()? {
                0 => Value::Option(None),
                1 => Value::Option(Some(Box::new(inner.decode_value(input)?))),
                index => {
                    return Err(DecodeError::InvalidDiscriminant {
                        type_name: "Option",
                        index,
                    })
                }
            },
            TypeDef::Tuple(defs) => Value::Sequence(
                defs.iter()
                    .map(|def| def.decode_value(input))
                    .collect::<Result<_, _>>()?,
            ),
            TypeDef::Array(inner, len) if inner.is_byte() => {
                Value::Bytes(input.read_bytes(*len)?.to_vec())
            }
            TypeDef::Array(inner, len) => Value::Sequence(
                (0..*len)
                    .map(|_| inner.decode_value(input))
                    .collect::<Result<_, _>>()?,
            ),
            TypeDef::Custom(_, codec) => (codec.decode)(input)?,
        })
    }

    /// Build a value of this type from JSON
    ///
    /// Integers may be JSON numbers or decimal strings; byte strings are hex;
    /// accounts are hex or SS58; addresses also accept a numeric index.
    pub fn value_from_json(&self, json: &serde_json::Value) -> Result<Value, WasmSubstrateError> {
        use serde_json::Value as Json;

        let mismatch = || WasmSubstrateError::type_mismatch(self.to_string(), json_kind(json));
        let parse_int = |s: &str| {
            s.parse::<u128>()
                .map_err(|_| WasmSubstrateError::type_mismatch(self.to_string(), format!("{:?}", s)))
        };

        Ok(match (self, json) {
            (TypeDef::Bool, Json::Bool(b)) => Value::Bool(*b),
            (TypeDef::UInt(_) | TypeDef::Compact(_), Json::Number(n)) => {
                Value::UInt(n.as_u64().ok_or_else(mismatch)? as u128)
            }
            (TypeDef::UInt(_) | TypeDef::Compact(_), Json::String(s)) => Value::UInt(parse_int(s)?),
            (TypeDef::Int(_), Json::Number(n)) => Value::Int(n.as_i64().ok_or_else(mismatch)? as i128),
            (TypeDef::Int(_), Json::String(s)) => Value::Int(s.parse::<i128>().map_err(|_| mismatch())?),
            (TypeDef::Bytes, Json::String(s)) if s.starts_with("0x") => Value::Bytes(hex_to_bytes(s)?),
            (TypeDef::Bytes, Json::String(s)) => Value::Bytes(s.as_bytes().to_vec()),
            (TypeDef::Text, Json::String(s)) => Value::Text(s.clone()),
            (TypeDef::AccountId, Json::String(s)) => Value::AccountId(parse_account_id(s)?),
            (TypeDef::Hash, Json::String(s)) => {
                let bytes = hex_to_bytes(s)?;
                if bytes.len() != 32 {
                    return Err(WasmSubstrateError::type_mismatch(
                        "Hash",
                        format!("{} bytes", bytes.len()),
                    ));
                }
                Value::Bytes(bytes)
            }
            (TypeDef::Address, Json::String(s)) => {
                Value::Address(Address::AccountId(parse_account_id(s)?))
            }
            (TypeDef::Address, Json::Number(n)) => {
                let index = n.as_u64().and_then(|n| u32::try_from(n).ok()).ok_or_else(mismatch)?;
                Value::Address(Address::AccountIndex(index))
            }
            (TypeDef::MultiAddress, Json::String(s)) => {
                Value::MultiAddress(MultiAddress::Id(parse_account_id(s)?))
            }
            (TypeDef::MultiAddress, Json::Number(n)) => {
                let index = n.as_u64().and_then(|n| u32::try_from(n).ok()).ok_or_else(mismatch)?;
                Value::MultiAddress(MultiAddress::Index(index))
            }
            (TypeDef::Vec(inner), Json::Array(items)) => Value::Sequence(
                items
                    .iter()
                    .map(|item| inner.value_from_json(item))
                    .collect::<Result<_, _>>()?,
            ),
            (TypeDef::Option(_), Json::Null) => Value::Option(None),
            (TypeDef::Option(inner), json) => Value::Option(Some(Box::new(inner.value_from_json(json)?))),
            (TypeDef::Tuple(defs), Json::Array(items)) if defs.len() == items.len() => Value::Sequence(
                defs.iter()
                    .zip(items)
                    .map(|(def, item)| def.value_from_json(item))
                    .collect::<Result<_, _>>()?,
            ),
            (TypeDef::Array(inner, _), Json::String(s)) if inner.is_byte() => {
                Value::Bytes(hex_to_bytes(s)?)
            }
            (TypeDef::Array(inner, len), Json::Array(items)) if items.len() == *len => Value::Sequence(
                items
                    .iter()
                    .map(|item| inner.value_from_json(item))
                    .collect::<Result<_, _>>()?,
            ),
            (TypeDef::Custom(name, _), _) => {
                return Err(WasmSubstrateError::InvalidInput(format!(
                    "type {} cannot be built from JSON",
                    name
                )))
            }
            _ => return Err(mismatch()),
        })
    }
}

/// Drop whitespace and `T::` qualifiers
fn normalize(type_name: &str) -> String {
    let compact: String = type_name.chars().filter(|c| !c.is_whitespace()).collect();
    compact.replace("T::", "")
}

fn strip_generic<'a>(name: &'a str, wrapper: &str) -> Option<&'a str> {
    name.strip_prefix(wrapper)?
        .strip_prefix('<')?
        .strip_suffix('>')
}

/// Split on `sep` outside of any `<>`, `()` or `[]` nesting
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Registry of type names known to the call builder
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDef>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Registry with primitives and the common runtime aliases
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: HashMap::new(),
        };

        registry.register("bool", TypeDef::Bool);
        for width in IntWidth::ALL {
            registry.register(&format!("u{}", width.bits()), TypeDef::UInt(width));
            registry.register(&format!("i{}", width.bits()), TypeDef::Int(width));
        }
        for name in ["Bytes", "Vec<u8>"] {
            registry.register(name, TypeDef::Bytes);
        }
        for name in ["Text", "String", "&str"] {
            registry.register(name, TypeDef::Text);
        }
        registry.register("AccountId", TypeDef::AccountId);
        for name in ["Hash", "H256", "BlockHash"] {
            registry.register(name, TypeDef::Hash);
        }
        for name in [
            "Address",
            "LookupSource",
            "<T::Lookup as StaticLookup>::Source",
        ] {
            registry.register(name, TypeDef::Address);
        }
        registry.register("MultiAddress", TypeDef::MultiAddress);
        for name in ["Balance", "BalanceOf<T>"] {
            registry.register(name, TypeDef::UInt(IntWidth::W128));
        }
        for name in ["BlockNumber", "Index", "AccountIndex", "Perbill", "Permill"] {
            registry.register(name, TypeDef::UInt(IntWidth::W32));
        }
        for name in ["Moment", "Weight"] {
            registry.register(name, TypeDef::UInt(IntWidth::W64));
        }

        registry
    }

    pub fn register(&mut self, type_name: &str, def: TypeDef) {
        self.types.insert(normalize(type_name), def);
    }

    /// Make `type_name` an alias of the already resolvable `target`
    pub fn register_alias(&mut self, type_name: &str, target: &str) -> Result<(), WasmSubstrateError> {
        let def = self.resolve(target)?;
        self.register(type_name, def);
        Ok(())
    }

    /// Register a hand-written encoder/decoder pair under `type_name`
    pub fn register_codec(&mut self, type_name: &str, encode: EncodeFn, decode: DecodeFn) {
        self.register(
            type_name,
            TypeDef::Custom(type_name.to_string(), CustomCodec { encode, decode }),
        );
    }

    pub fn resolve(&self, type_name: &str) -> Result<TypeDef, WasmSubstrateError> {
        self.resolve_normalized(&normalize(type_name))
            .ok_or_else(|| WasmSubstrateError::UnknownType(type_name.to_string()))
    }

    fn resolve_normalized(&self, name: &str) -> Option<TypeDef> {
        if let Some(def) = self.types.get(name) {
            return Some(def.clone());
        }
        if let Some(inner) = strip_generic(name, "Compact") {
            return match self.resolve_normalized(inner)? {
                TypeDef::UInt(width) => Some(TypeDef::Compact(width)),
                _ => None,
            };
        }
        if let Some(inner) = strip_generic(name, "Vec") {
            return Some(match self.resolve_normalized(inner)? {
                TypeDef::UInt(IntWidth::W8) => TypeDef::Bytes,
                def => TypeDef::Vec(Box::new(def)),
            });
        }
        if let Some(inner) = strip_generic(name, "Option") {
            return Some(TypeDef::Option(Box::new(self.resolve_normalized(inner)?)));
        }
        if let Some(inner) = strip_generic(name, "Box") {
            return self.resolve_normalized(inner);
        }
        if let Some(body) = name.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
            return split_top_level(body, ',')
                .into_iter()
                .filter(|part| !part.is_empty())
                .map(|part| self.resolve_normalized(part))
                .collect::<Option<Vec<_>>>()
                .map(TypeDef::Tuple);
        }
        if let Some(body) = name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            let (elem, len) = body.rsplit_once(';')?;
            let len = len.parse().ok()?;
            return Some(TypeDef::Array(Box::new(self.resolve_normalized(elem)?), len));
        }
        None
    }

    /// Encode `value` as the named type
    pub fn encode(
        &self,
        type_name: &str,
        value: &Value,
        dest: &mut Vec<u8>,
    ) -> Result<(), WasmSubstrateError> {
        let def = self.resolve(type_name)?;
        tracing::trace!(type_name, resolved = %def, "encoding value");
        def.encode_value(value, dest)
    }

    /// Decode a value of the named type from `input`
    pub fn decode(&self, type_name: &str, input: &mut Input<'_>) -> Result<Value, WasmSubstrateError> {
        Ok(self.resolve(type_name)?.decode_value(input)?)
    }

    pub fn value_from_json(
        &self,
        type_name: &str,
        json: &serde_json::Value,
    ) -> Result<Value, WasmSubstrateError> {
        self.resolve(type_name)?.value_from_json(json)
    }
}
