//! wasm-substrate: SCALE codec and extrinsic construction for Substrate chains
//!
//! This crate provides:
//! - SCALE encoding/decoding (compact integers, options, sequences, tagged unions)
//! - Runtime metadata decoding and call index lookup
//! - Call building from `module.function` names with type-directed argument encoding
//! - Extrinsic envelopes (unsigned and signed v4)
//! - Signing payload construction and in-process sr25519/ed25519 signers
//! - Storage key derivation
//!
//! # Architecture
//!
//! The crate follows a two-layer architecture:
//! - **Core layer** (`src/*.rs`): Pure Rust logic, no WASM dependencies
//! - **WASM layer** (`src/wasm/*.rs`): Thin wrappers with `#[wasm_bindgen]`

pub mod address;
pub mod builder;
pub mod call;
pub mod codec;
pub mod error;
pub mod extrinsic;
pub mod hashing;
pub mod metadata;
pub mod parser;
pub mod registry;
pub mod signing;
pub mod storage;
pub mod types;
pub mod value;
pub mod wasm;

// Re-export main types for convenience
pub use address::{decode_ss58, encode_ss58, validate_address, Ss58Format};
pub use call::Call;
pub use codec::{decode_all, decode_prefix, Compact, Decode, Encode, Input};
pub use error::{DecodeError, SigningError, WasmSubstrateError};
pub use extrinsic::{Extrinsic, ExtrinsicAccountId, ExtrinsicSignature, SignerAddress};
pub use metadata::{CallIndex, Metadata};
pub use parser::{parse_extrinsic, ParsedExtrinsic};
pub use registry::{IntWidth, TypeDef, TypeRegistry};
pub use signing::{
    verify_signature, Ed25519Signer, SignatureOptions, Signer, SignerOutput, Sr25519Signer,
};
pub use storage::StorageKey;
pub use types::{
    AccountId, Address, Era, MultiAddress, MultiSignature, SignatureScheme, H256,
};
pub use value::Value;
