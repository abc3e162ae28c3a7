//! WASM bindings for extrinsic parsing
//!
//! ParserNamespace provides static methods for inspecting extrinsics

use crate::codec::{decode_all, hex_to_bytes};
use crate::metadata::Metadata;
use crate::parser::parse_extrinsic;
use crate::wasm::to_js_value;
use wasm_bindgen::prelude::*;

/// Namespace for parsing operations
#[wasm_bindgen]
pub struct ParserNamespace;

#[wasm_bindgen]
impl ParserNamespace {
    /// Parse an extrinsic from raw bytes
    ///
    /// # Arguments
    /// * `bytes` - Raw extrinsic bytes
    /// * `metadata` - SCALE-encoded runtime metadata
    /// * `prefix` - SS58 prefix for the signer address (default 42)
    ///
    /// # Returns
    /// Parsed extrinsic as JSON-compatible JS object
    #[wasm_bindgen(js_name = parseExtrinsic)]
    pub fn parse_extrinsic_wasm(
        bytes: &[u8],
        metadata: &[u8],
        prefix: Option<u16>,
    ) -> Result<JsValue, JsValue> {
        let metadata: Metadata = decode_all(metadata)?;
        let parsed = parse_extrinsic(bytes, &metadata, prefix.unwrap_or(42))?;
        to_js_value(&parsed)
    }

    /// Parse an extrinsic from hex string
    ///
    /// # Arguments
    /// * `hex` - Hex-encoded extrinsic bytes (with or without 0x prefix)
    #[wasm_bindgen(js_name = parseExtrinsicHex)]
    pub fn parse_extrinsic_hex(
        hex: &str,
        metadata: &[u8],
        prefix: Option<u16>,
    ) -> Result<JsValue, JsValue> {
        let bytes = hex_to_bytes(hex)?;
        Self::parse_extrinsic_wasm(&bytes, metadata, prefix)
    }
}
