//! WASM bindings for wasm-substrate
//!
//! This module contains thin wrappers with #[wasm_bindgen] that delegate
//! to the core Rust implementations.

pub mod builder;
pub mod extrinsic;
pub mod parser;

// Re-export WASM types
pub use builder::BuilderNamespace;
pub use extrinsic::WasmExtrinsic;
pub use parser::ParserNamespace;

use serde::Serialize;
use wasm_bindgen::JsValue;

/// Convert a serializable result to a plain JS object (maps become objects)
pub(crate) fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}
