//! Call and extrinsic building from JSON requests

pub mod types;

use crate::call::Call;
use crate::error::WasmSubstrateError;
use crate::extrinsic::Extrinsic;
use crate::metadata::Metadata;
use crate::registry::TypeRegistry;
use types::CallRequest;

/// Registry with the request's aliases layered over the defaults
fn registry_for(request: &CallRequest) -> Result<TypeRegistry, WasmSubstrateError> {
    let mut registry = TypeRegistry::default();
    for (name, target) in &request.types {
        registry.register_alias(name, target)?;
    }
    Ok(registry)
}

/// Build the encoded call described by `request`
pub fn build_call(metadata: &Metadata, request: &CallRequest) -> Result<Call, WasmSubstrateError> {
    let registry = registry_for(request)?;
    Call::build_from_json(metadata, &registry, &request.call, &request.args)
}

/// Build an unsigned extrinsic, ready for signing
pub fn build_extrinsic(
    metadata: &Metadata,
    request: &CallRequest,
) -> Result<Extrinsic, WasmSubstrateError> {
    Ok(Extrinsic::new_unsigned(build_call(metadata, request)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Encode;
    use crate::metadata::fixtures::example_metadata;
    use crate::metadata::{FunctionArgument, FunctionMetadata};

    fn request(json: serde_json::Value) -> CallRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_build_transfer_from_ss58() {
        let extrinsic = build_extrinsic(
            &example_metadata(),
            &request(serde_json::json!({
                "call": "balances.transfer",
                "args": ["5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty", 6969]
            })),
        )
        .unwrap();
        assert_eq!(
            extrinsic.to_hex(),
            "0x98040300ff8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48e56c"
        );
    }

    #[test]
    fn test_request_aliases() {
        let mut metadata = example_metadata();
        metadata.modules[0]
            .calls
            .as_mut()
            .unwrap()
            .push(FunctionMetadata {
                name: "touch".to_string(),
                arguments: vec![FunctionArgument {
                    name: "asset".to_string(),
                    ty: "Compact<T::AssetId>".to_string(),
                }],
                documentation: vec![],
            });

        let without = request(serde_json::json!({ "call": "system.touch", "args": [1] }));
        assert_eq!(
            build_call(&metadata, &without),
            Err(WasmSubstrateError::UnknownType("Compact<T::AssetId>".to_string()))
        );

        let with = request(serde_json::json!({
            "call": "system.touch",
            "args": [1],
            "types": { "AssetId": "u32" }
        }));
        assert_eq!(build_call(&metadata, &with).unwrap().encode(), vec![0, 2, 4]);
    }

    #[test]
    fn test_missing_args_default_to_empty() {
        let err = build_call(
            &example_metadata(),
            &request(serde_json::json!({ "call": "balances.transfer" })),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            WasmSubstrateError::ArgumentCountMismatch { actual: 0, .. }
        ));
    }
}
