//! Error types for wasm-substrate

use wasm_bindgen::prelude::*;

/// Failure while decoding SCALE bytes
///
/// Decoding always works on an immutable input and builds a fresh value, so a
/// failed decode leaves nothing half-populated behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("not enough data: needed {needed} bytes, {remaining} remaining")]
    NotEnoughData { needed: usize, remaining: usize },

    #[error("invalid boolean byte 0x{0:02x}")]
    InvalidBool(u8),

    #[error("invalid discriminant 0x{index:02x} for {type_name}")]
    InvalidDiscriminant {
        type_name: &'static str,
        index: u8,
    },

    #[error("compact integer is not in its minimal encoding")]
    NonCanonicalCompact,

    #[error("compact integer does not fit in {0}")]
    CompactOverflow(&'static str),

    #[error("{0} trailing bytes after decoded value")]
    TrailingBytes(usize),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("invalid mortal era encoding 0x{0:04x}")]
    InvalidEra(u16),

    #[error("invalid metadata magic number 0x{0:08x}")]
    InvalidMetadataMagic(u32),

    #[error("unsupported metadata version {0}")]
    UnsupportedMetadataVersion(u8),

    #[error("unsupported extrinsic format version {0}")]
    UnsupportedExtrinsicVersion(u8),

    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Failure while producing or attaching a signature
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    /// The external signer reported a failure
    #[error("signer failed: {0}")]
    Signer(String),

    #[error("{scheme} signature must be {expected} bytes, got {actual}")]
    InvalidSignatureLength {
        scheme: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{scheme} public key must be {expected} bytes, got {actual}")]
    InvalidPublicKey {
        scheme: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("{0} signatures are not supported here")]
    UnsupportedScheme(&'static str),

    #[error("extrinsic is not signed")]
    NotSigned,

    #[error("signature verification failed")]
    Verification,
}

/// Main error type for wasm-substrate operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WasmSubstrateError {
    #[error("SCALE decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// No module/function in the metadata matches the requested call
    #[error("Unknown call: {0}")]
    UnknownCall(String),

    /// Call name is not of the form `module.function`
    #[error("Invalid call name: {0:?}")]
    InvalidCallName(String),

    #[error("Argument count mismatch for {call}: expected {expected}, got {actual}")]
    ArgumentCountMismatch {
        call: String,
        expected: usize,
        actual: usize,
    },

    /// Type name has no encoder in the registry
    #[error("Unknown type: {0}")]
    UnknownType(String),

    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch { expected: String, found: String },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl WasmSubstrateError {
    pub(crate) fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        WasmSubstrateError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

// REQUIRED: Converts to JS Error with stack trace
impl From<WasmSubstrateError> for JsValue {
    fn from(err: WasmSubstrateError) -> Self {
        js_sys::Error::new(&err.to_string()).into()
    }
}

impl From<DecodeError> for JsValue {
    fn from(err: DecodeError) -> Self {
        WasmSubstrateError::from(err).into()
    }
}

impl From<SigningError> for JsValue {
    fn from(err: SigningError) -> Self {
        WasmSubstrateError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WasmSubstrateError::InvalidAddress("bad address".to_string());
        assert_eq!(err.to_string(), "Invalid address: bad address");

        let err = WasmSubstrateError::ArgumentCountMismatch {
            call: "balances.transfer".to_string(),
            expected: 2,
            actual: 1,
        };
        assert_eq!(
            err.to_string(),
            "Argument count mismatch for balances.transfer: expected 2, got 1"
        );
    }

    #[test]
    fn test_from_decode_error() {
        let err: WasmSubstrateError = DecodeError::InvalidBool(2).into();
        assert_eq!(err.to_string(), "SCALE decode error: invalid boolean byte 0x02");
        assert!(matches!(err, WasmSubstrateError::Decode(_)));
    }

    #[test]
    fn test_signing_error_display() {
        let err = SigningError::InvalidSignatureLength {
            scheme: "Ecdsa",
            expected: 65,
            actual: 64,
        };
        assert_eq!(err.to_string(), "Ecdsa signature must be 65 bytes, got 64");
    }
}
