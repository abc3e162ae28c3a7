//! Dynamic argument values
//!
//! Call arguments are not known at compile time, so they travel as [`Value`]s
//! and are encoded by the type registry according to the declared type name.

use crate::types::{AccountId, Address, MultiAddress};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    /// Any unsigned integer, fixed-width or compact
    UInt(u128),
    Int(i128),
    Bytes(Vec<u8>),
    Text(String),
    AccountId(AccountId),
    Address(Address),
    MultiAddress(MultiAddress),
    /// Elements of a `Vec<T>`, a fixed-size array or a tuple
    Sequence(Vec<Value>),
    Option(Option<Box<Value>>),
}

impl Value {
    /// Short description used in type mismatch errors
    pub fn kind(&self) -> String {
        match self {
            Value::Bool(_) => "bool".to_string(),
            Value::UInt(n) => format!("unsigned integer {}", n),
            Value::Int(n) => format!("signed integer {}", n),
            Value::Bytes(b) => format!("{} bytes", b.len()),
            Value::Text(_) => "text".to_string(),
            Value::AccountId(_) => "account id".to_string(),
            Value::Address(_) => "address".to_string(),
            Value::MultiAddress(_) => "multi-address".to_string(),
            Value::Sequence(items) => format!("sequence of {}", items.len()),
            Value::Option(None) => "none".to_string(),
            Value::Option(Some(_)) => "some".to_string(),
        }
    }

    /// JSON rendering for inspection output
    ///
    /// Integers beyond 2^53 are rendered as decimal strings so JavaScript
    /// readers do not lose precision.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        const MAX_SAFE_INTEGER: u128 = (1 << 53) - 1;

        match self {
            Value::Bool(b) => Json::Bool(*b),
            Value::UInt(n) if *n <= MAX_SAFE_INTEGER => Json::from(*n as u64),
            Value::UInt(n) => Json::String(n.to_string()),
            Value::Int(n) if n.unsigned_abs() <= MAX_SAFE_INTEGER => Json::from(*n as i64),
            Value::Int(n) => Json::String(n.to_string()),
            Value::Bytes(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
            Value::Text(s) => Json::String(s.clone()),
            Value::AccountId(id) => Json::String(id.to_hex()),
            Value::Address(Address::AccountId(id)) => Json::String(id.to_hex()),
            Value::Address(Address::AccountIndex(index)) => Json::from(*index),
            Value::MultiAddress(address) => match address {
                MultiAddress::Id(id) => Json::String(id.to_hex()),
                MultiAddress::Index(index) => Json::from(*index),
                MultiAddress::Raw(bytes) => Json::String(format!("0x{}", hex::encode(bytes))),
                MultiAddress::Address32(bytes) => {
                    Json::String(format!("0x{}", hex::encode(bytes)))
                }
                MultiAddress::Address20(bytes) => {
                    Json::String(format!("0x{}", hex::encode(bytes)))
                }
            },
            Value::Sequence(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Option(None) => Json::Null,
            Value::Option(Some(inner)) => inner.to_json(),
        }
    }
}

macro_rules! value_from_uint {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::UInt(n as u128)
            }
        }
    )*};
}

macro_rules! value_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(n: $t) -> Self {
                Value::Int(n as i128)
            }
        }
    )*};
}

value_from_uint!(u8, u16, u32, u64, u128);
value_from_int!(i8, i16, i32, i64, i128);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(bytes: Vec<u8>) -> Self {
        Value::Bytes(bytes)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<AccountId> for Value {
    fn from(id: AccountId) -> Self {
        Value::AccountId(id)
    }
}

impl From<Address> for Value {
    fn from(address: Address) -> Self {
        Value::Address(address)
    }
}

impl From<MultiAddress> for Value {
    fn from(address: MultiAddress) -> Self {
        Value::MultiAddress(address)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        Value::Option(value.map(|v| Box::new(v.into())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(6969u32), Value::UInt(6969));
        assert_eq!(Value::from(-1i8), Value::Int(-1));
        assert_eq!(Value::from(Some(true)), Value::Option(Some(Box::new(Value::Bool(true)))));
        assert_eq!(Value::from(None::<u8>), Value::Option(None));
        assert_eq!(Value::from("hi"), Value::Text("hi".to_string()));
    }

    #[test]
    fn test_to_json_keeps_large_integers_exact() {
        assert_eq!(Value::UInt(42).to_json(), serde_json::json!(42));
        assert_eq!(
            Value::UInt(u64::MAX as u128).to_json(),
            serde_json::json!("18446744073709551615")
        );
        assert_eq!(Value::Int(-7).to_json(), serde_json::json!(-7));
    }

    #[test]
    fn test_to_json_nested() {
        let value = Value::Sequence(vec![
            Value::Bytes(vec![0xde, 0xad]),
            Value::Option(None),
            Value::Address(Address::AccountIndex(3)),
        ]);
        assert_eq!(value.to_json(), serde_json::json!(["0xdead", null, 3]));
    }
}
