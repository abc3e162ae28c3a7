//! Call construction from `module.function` names
//!
//! The builder resolves the call index through the runtime metadata and
//! encodes the positional arguments with the type registry, in declared
//! order. The resulting [`Call`] owns its encoded arguments and keeps no
//! reference to the metadata.

use crate::codec::{Decode, Encode, Input};
use crate::error::{DecodeError, WasmSubstrateError};
use crate::metadata::{CallIndex, Metadata};
use crate::registry::TypeRegistry;
use crate::value::Value;

/// An encoded chain call: call index plus already-encoded arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub call_index: CallIndex,
    pub args: Vec<u8>,
}

/// Split `module.function` into its two parts
pub fn split_call_name(call_name: &str) -> Result<(&str, &str), WasmSubstrateError> {
    let mut parts = call_name.split('.');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(module), Some(function), None) if !module.is_empty() && !function.is_empty() => {
            Ok((module, function))
        }
        _ => Err(WasmSubstrateError::InvalidCallName(call_name.to_string())),
    }
}

/// Call index and declared argument types, checked against the supplied arity
fn resolve_call<'m>(
    metadata: &'m Metadata,
    call_name: &str,
    supplied: usize,
) -> Result<(CallIndex, Vec<&'m str>), WasmSubstrateError> {
    let (module, function) = split_call_name(call_name)?;
    let call_index = metadata.find_call_index(module, function)?;
    let arg_types = metadata.argument_types_for(call_index.module_index, call_index.function_index)?;
    if arg_types.len() != supplied {
        return Err(WasmSubstrateError::ArgumentCountMismatch {
            call: call_name.to_string(),
            expected: arg_types.len(),
            actual: supplied,
        });
    }
    Ok((call_index, arg_types))
}

impl Call {
    pub fn new(call_index: CallIndex, args: Vec<u8>) -> Self {
        Call { call_index, args }
    }

    pub fn module_index(&self) -> u8 {
        self.call_index.module_index
    }

    pub fn function_index(&self) -> u8 {
        self.call_index.function_index
    }

    /// Build a call with the default type registry
    ///
    /// # Example
    /// ```ignore
    /// let call = Call::build(&metadata, "balances.transfer", &[bob.into(), 6969u128.into()])?;
    /// ```
    pub fn build(
        metadata: &Metadata,
        call_name: &str,
        args: &[Value],
    ) -> Result<Self, WasmSubstrateError> {
        Self::build_with_registry(metadata, &TypeRegistry::default(), call_name, args)
    }

    pub fn build_with_registry(
        metadata: &Metadata,
        registry: &TypeRegistry,
        call_name: &str,
        args: &[Value],
    ) -> Result<Self, WasmSubstrateError> {
        let (call_index, arg_types) = resolve_call(metadata, call_name, args.len())?;

        let mut encoded = Vec::new();
        for (type_name, value) in arg_types.iter().zip(args) {
            registry.encode(type_name, value, &mut encoded)?;
        }

        tracing::debug!(
            call = call_name,
            module_index = call_index.module_index,
            function_index = call_index.function_index,
            args_len = encoded.len(),
            "built call"
        );
        Ok(Call::new(call_index, encoded))
    }

    /// Build a call from JSON arguments, converting each one according to
    /// its declared type
    pub fn build_from_json(
        metadata: &Metadata,
        registry: &TypeRegistry,
        call_name: &str,
        args: &[serde_json::Value],
    ) -> Result<Self, WasmSubstrateError> {
        let (_, arg_types) = resolve_call(metadata, call_name, args.len())?;
        let values = arg_types
            .iter()
            .zip(args)
            .map(|(type_name, json)| registry.value_from_json(type_name, json))
            .collect::<Result<Vec<_>, _>>()?;
        Self::build_with_registry(metadata, registry, call_name, &values)
    }

    /// Decode the arguments back into values using the declared types
    pub fn decode_args(
        &self,
        metadata: &Metadata,
        registry: &TypeRegistry,
    ) -> Result<Vec<Value>, WasmSubstrateError> {
        let arg_types = metadata.argument_types_for(self.module_index(), self.function_index())?;
        let mut input = Input::new(&self.args);
        let values = arg_types
            .iter()
            .map(|type_name| registry.decode(type_name, &mut input))
            .collect::<Result<Vec<_>, _>>()?;
        match input.remaining() {
            0 => Ok(values),
            n => Err(DecodeError::TrailingBytes(n).into()),
        }
    }
}

impl Encode for Call {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.call_index.encode_to(dest);
        dest.extend_from_slice(&self.args);
    }
}

/// A call carries no length of its own, so decoding takes the call index and
/// everything after it as arguments.
impl Decode for Call {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let call_index = CallIndex::decode(input)?;
        Ok(Call::new(call_index, input.read_rest().to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode_all;
    use crate::metadata::fixtures::example_metadata;
    use crate::types::{AccountId, Address};
    use rstest::rstest;
    use serde_json::json;

    const BOB_HEX: &str = "0x8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";

    fn bob() -> AccountId {
        AccountId::from_hex(BOB_HEX).unwrap()
    }

    #[test]
    fn test_build_balances_transfer() {
        let call = Call::build(
            &example_metadata(),
            "balances.transfer",
            &[bob().into(), 6969u128.into()],
        )
        .unwrap();
        assert_eq!(
            hex::encode(call.encode()),
            format!("0300ff{}e56c", &BOB_HEX[2..])
        );
    }

    #[test]
    fn test_build_matches_names_loosely() {
        let metadata = example_metadata();
        let args = [Value::from(bob()), Value::UInt(1)];
        let a = Call::build(&metadata, "balances.transfer_keep_alive", &args).unwrap();
        let b = Call::build(&metadata, "Balances.transferKeepAlive", &args).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.function_index(), 2);
    }

    #[rstest]
    #[case("balances")]
    #[case("balances.transfer.now")]
    #[case(".transfer")]
    #[case("balances.")]
    #[case("")]
    fn test_invalid_call_name(#[case] name: &str) {
        assert_eq!(
            Call::build(&example_metadata(), name, &[]),
            Err(WasmSubstrateError::InvalidCallName(name.to_string()))
        );
    }

    #[test]
    fn test_unknown_call() {
        let metadata = example_metadata();
        assert!(matches!(
            Call::build(&metadata, "staking.bond", &[]),
            Err(WasmSubstrateError::UnknownCall(_))
        ));
        assert!(matches!(
            Call::build(&metadata, "balances.mint", &[]),
            Err(WasmSubstrateError::UnknownCall(_))
        ));
    }

    #[test]
    fn test_argument_count_mismatch() {
        assert_eq!(
            Call::build(&example_metadata(), "balances.transfer", &[bob().into()]),
            Err(WasmSubstrateError::ArgumentCountMismatch {
                call: "balances.transfer".to_string(),
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn test_argument_type_mismatch() {
        let err = Call::build(
            &example_metadata(),
            "balances.transfer",
            &[bob().into(), Value::Text("6969".to_string())],
        )
        .unwrap_err();
        assert!(matches!(err, WasmSubstrateError::TypeMismatch { .. }));
    }

    #[test]
    fn test_build_from_json_matches_typed_build() {
        let metadata = example_metadata();
        let registry = TypeRegistry::default();
        let from_json = Call::build_from_json(
            &metadata,
            &registry,
            "balances.transfer",
            &[json!(BOB_HEX), json!(6969)],
        )
        .unwrap();
        let typed = Call::build(&metadata, "balances.transfer", &[bob().into(), 6969u32.into()])
            .unwrap();
        assert_eq!(from_json, typed);
    }

    #[test]
    fn test_decode_args_roundtrip() {
        let metadata = example_metadata();
        let registry = TypeRegistry::default();
        let call = Call::build(&metadata, "balances.transfer", &[bob().into(), 6969u128.into()])
            .unwrap();
        assert_eq!(
            call.decode_args(&metadata, &registry).unwrap(),
            vec![Value::Address(Address::AccountId(bob())), Value::UInt(6969)]
        );

        let mut padded = call.clone();
        padded.args.push(0);
        assert_eq!(
            padded.decode_args(&metadata, &registry),
            Err(WasmSubstrateError::Decode(DecodeError::TrailingBytes(1)))
        );
    }

    #[test]
    fn test_call_decode_takes_remaining_bytes() {
        let bytes = hex::decode(format!("0300ff{}e56c", &BOB_HEX[2..])).unwrap();
        let call = decode_all::<Call>(&bytes).unwrap();
        assert_eq!(call.module_index(), 3);
        assert_eq!(call.function_index(), 0);
        assert_eq!(call.args.len(), 35);
        assert!(decode_all::<Call>(&[0x03]).is_err());
    }

    #[test]
    fn test_anchor_commit_with_hashes() {
        let hash = |b: u8| Value::Bytes(vec![b; 32]);
        let call = Call::build(
            &example_metadata(),
            "anchor.commit",
            &[hash(1), hash(2), hash(3), Value::UInt(1_600_000_000)],
        )
        .unwrap();
        assert_eq!(call.args.len(), 3 * 32 + 8);
        assert_eq!(&call.encode()[..2], &[4, 1]);
    }
}
