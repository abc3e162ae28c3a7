//! WASM bindings for call and extrinsic building
//!
//! BuilderNamespace is the entry point for building extrinsics from a
//! metadata blob and a JSON call request.

use crate::builder::{build_call, build_extrinsic, types::CallRequest};
use crate::codec::{decode_all, Encode};
use crate::metadata::Metadata;
use crate::storage::StorageKey;
use crate::wasm::extrinsic::WasmExtrinsic;
use crate::WasmSubstrateError;
use wasm_bindgen::prelude::*;

/// Namespace for building operations
#[wasm_bindgen]
pub struct BuilderNamespace;

#[wasm_bindgen]
impl BuilderNamespace {
    /// Encode a call (call index + arguments)
    ///
    /// # Arguments
    /// * `metadata` - SCALE-encoded runtime metadata
    /// * `request` - Call request (JSON object)
    ///
    /// # Example Request
    /// ```json
    /// {
    ///   "call": "balances.transfer",
    ///   "args": ["5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty", "1000000000000"],
    ///   "types": { "AssetId": "u32" }
    /// }
    /// ```
    #[wasm_bindgen(js_name = buildCall)]
    pub fn build_call_wasm(metadata: &[u8], request: JsValue) -> Result<Vec<u8>, JsValue> {
        let metadata: Metadata = decode_all(metadata)?;
        let request = parse_request(request)?;
        Ok(build_call(&metadata, &request)?.encode())
    }

    /// Build an unsigned extrinsic from a call request
    ///
    /// # Returns
    /// WasmExtrinsic ready for signing
    #[wasm_bindgen(js_name = buildExtrinsic)]
    pub fn build_extrinsic_wasm(
        metadata: &[u8],
        request: JsValue,
    ) -> Result<WasmExtrinsic, JsValue> {
        let metadata: Metadata = decode_all(metadata)?;
        let request = parse_request(request)?;
        let extrinsic = build_extrinsic(&metadata, &request)?;
        Ok(WasmExtrinsic::from_inner(extrinsic))
    }

    /// Derive a storage key for a plain item or map entry
    ///
    /// # Arguments
    /// * `module` - Module name, e.g. "System"
    /// * `item` - Storage item name, e.g. "AccountNonce"
    /// * `key` - Encoded map key; omit for plain items
    #[wasm_bindgen(js_name = storageKey)]
    pub fn storage_key(
        metadata: &[u8],
        module: &str,
        item: &str,
        key: Option<Vec<u8>>,
    ) -> Result<Vec<u8>, JsValue> {
        let metadata: Metadata = decode_all(metadata)?;
        let key = StorageKey::new(&metadata, module, item, key.as_deref())?;
        Ok(key.0)
    }

    /// Derive a storage key for a double map entry
    #[wasm_bindgen(js_name = doubleMapStorageKey)]
    pub fn double_map_storage_key(
        metadata: &[u8],
        module: &str,
        item: &str,
        key1: &[u8],
        key2: &[u8],
    ) -> Result<Vec<u8>, JsValue> {
        let metadata: Metadata = decode_all(metadata)?;
        let key = StorageKey::new_double_map(&metadata, module, item, key1, key2)?;
        Ok(key.0)
    }
}

fn parse_request(request: JsValue) -> Result<CallRequest, WasmSubstrateError> {
    serde_wasm_bindgen::from_value(request)
        .map_err(|e| WasmSubstrateError::InvalidInput(format!("Invalid call request: {}", e)))
}
