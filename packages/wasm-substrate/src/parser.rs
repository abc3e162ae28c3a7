//! Extrinsic inspection
//!
//! Decodes raw extrinsic bytes and, with the runtime metadata at hand, names
//! the call and decodes its arguments for display.

use crate::address::encode_ss58;
use crate::codec::decode_all;
use crate::error::WasmSubstrateError;
use crate::extrinsic::Extrinsic;
use crate::metadata::Metadata;
use crate::registry::TypeRegistry;
use crate::types::Era;
use serde::Serialize;

/// Parsed extrinsic data
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedExtrinsic {
    /// Blake2-256 of the encoding
    pub hash: String,
    pub is_signed: bool,
    /// Signer address (SS58 encoded)
    pub signer: Option<String>,
    pub nonce: Option<u64>,
    /// Tip as a decimal string for BigInt compatibility
    pub tip: Option<String>,
    pub era: Option<Era>,
    pub method: ParsedMethod,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMethod {
    /// Module name as declared in the metadata
    pub module: String,
    pub function: String,
    pub module_index: u8,
    pub function_index: u8,
    pub args: Vec<ParsedArgument>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedArgument {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub value: serde_json::Value,
}

/// Parse raw extrinsic bytes against `metadata`
///
/// # Arguments
/// * `bytes` - Raw extrinsic bytes, length prefix included
/// * `metadata` - Runtime metadata used to name the call and decode arguments
/// * `ss58_prefix` - Network prefix for the signer address
pub fn parse_extrinsic(
    bytes: &[u8],
    metadata: &Metadata,
    ss58_prefix: u16,
) -> Result<ParsedExtrinsic, WasmSubstrateError> {
    let extrinsic: Extrinsic = decode_all(bytes)?;
    let method = extrinsic.method();

    let (module, function) = metadata.function(method.call_index)?;
    let values = method.decode_args(metadata, &TypeRegistry::default())?;
    let args = function
        .arguments
        .iter()
        .zip(values)
        .map(|(arg, value)| ParsedArgument {
            name: arg.name.clone(),
            ty: arg.ty.clone(),
            value: value.to_json(),
        })
        .collect();

    let signature = extrinsic.signature();
    let signer = extrinsic
        .signer_account_id()
        .map(|id| encode_ss58(id.as_bytes(), ss58_prefix))
        .transpose()?;

    Ok(ParsedExtrinsic {
        hash: extrinsic.hash().to_hex(),
        is_signed: extrinsic.is_signed(),
        signer,
        nonce: signature.map(|s| s.nonce),
        tip: signature.map(|s| s.tip.to_string()),
        era: signature.map(|s| s.era),
        method: ParsedMethod {
            module: module.name.clone(),
            function: function.name.clone(),
            module_index: method.module_index(),
            function_index: method.function_index(),
            args,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Call;
    use crate::codec::Encode;
    use crate::metadata::fixtures::example_metadata;
    use crate::signing::{SignatureOptions, Sr25519Signer};
    use crate::types::{AccountId, H256};
    use crate::value::Value;

    const BOB_HEX: &str = "0x8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";

    fn transfer() -> Extrinsic {
        let call = Call::build(
            &example_metadata(),
            "balances.transfer",
            &[AccountId::from_hex(BOB_HEX).unwrap().into(), Value::UInt(6969)],
        )
        .unwrap();
        Extrinsic::new_unsigned(call)
    }

    #[test]
    fn test_parse_unsigned() {
        let parsed = parse_extrinsic(&transfer().encode(), &example_metadata(), 42).unwrap();
        assert!(!parsed.is_signed);
        assert!(parsed.signer.is_none());
        assert_eq!(parsed.method.module, "balances");
        assert_eq!(parsed.method.function, "transfer");
        assert_eq!(parsed.method.args.len(), 2);
        assert_eq!(parsed.method.args[0].name, "dest");
        assert_eq!(parsed.method.args[0].value, serde_json::json!(BOB_HEX));
        assert_eq!(parsed.method.args[1].value, serde_json::json!(6969));
    }

    #[test]
    fn test_parse_signed() {
        let signer = Sr25519Signer::from_seed(&[3u8; 32]).unwrap();
        let options = SignatureOptions {
            block_hash: H256([1; 32]),
            genesis_hash: H256([1; 32]),
            era: Era::mortal(128, 4_000),
            nonce: 12,
            spec_version: 1,
            transaction_version: Some(1),
            tip: 1_000_000_000_000_000_000_000,
        };
        let mut extrinsic = transfer();
        extrinsic.sign(&signer, &options).unwrap();

        let parsed = parse_extrinsic(&extrinsic.encode(), &example_metadata(), 42).unwrap();
        assert!(parsed.is_signed);
        assert_eq!(
            parsed.signer,
            Some(signer.account_id().to_ss58(42).unwrap())
        );
        assert_eq!(parsed.nonce, Some(12));
        assert_eq!(parsed.tip.as_deref(), Some("1000000000000000000000"));
        assert_eq!(parsed.era, Some(options.era));
        assert_eq!(parsed.hash, extrinsic.hash().to_hex());

        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["method"]["args"][1]["type"], "Compact<T::Balance>");
        assert_eq!(json["isSigned"], true);
    }

    #[test]
    fn test_parse_unknown_call_index() {
        let call = Call::new(
            crate::metadata::CallIndex {
                module_index: 9,
                function_index: 0,
            },
            vec![],
        );
        let bytes = Extrinsic::<crate::types::Address>::new_unsigned(call).encode();
        assert!(matches!(
            parse_extrinsic(&bytes, &example_metadata(), 42),
            Err(WasmSubstrateError::UnknownCall(_))
        ));
    }
}
