//! WASM bindings for Extrinsic
//!
//! Thin wrapper around core Extrinsic with #[wasm_bindgen]

use crate::codec::{decode_all, hex_to_bytes, Encode};
use crate::extrinsic::Extrinsic;
use crate::signing::{
    signer_account_id, Ed25519Signer, SignatureOptions, Signer, Sr25519Signer,
};
use crate::error::{SigningError, WasmSubstrateError};
use crate::types::{MultiSignature, SignatureScheme};
use crate::wasm::to_js_value;
use wasm_bindgen::prelude::*;

/// WASM-exposed extrinsic wrapper
#[wasm_bindgen]
pub struct WasmExtrinsic {
    inner: Extrinsic,
}

impl WasmExtrinsic {
    pub fn from_inner(inner: Extrinsic) -> Self {
        WasmExtrinsic { inner }
    }

    pub fn inner(&self) -> &Extrinsic {
        &self.inner
    }
}

#[wasm_bindgen]
impl WasmExtrinsic {
    /// Decode an extrinsic from raw bytes (length prefix included)
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8]) -> Result<WasmExtrinsic, JsValue> {
        let inner = decode_all(bytes)?;
        Ok(WasmExtrinsic { inner })
    }

    /// Create from hex string
    #[wasm_bindgen(js_name = fromHex)]
    pub fn from_hex(hex: &str) -> Result<WasmExtrinsic, JsValue> {
        let bytes = hex_to_bytes(hex)?;
        WasmExtrinsic::new(&bytes)
    }

    #[wasm_bindgen(getter, js_name = isSigned)]
    pub fn is_signed(&self) -> bool {
        self.inner.is_signed()
    }

    /// Version byte, signed flag included
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> u8 {
        self.inner.version()
    }

    /// Get sender address (SS58 encoded)
    ///
    /// # Arguments
    /// * `prefix` - SS58 address prefix (0 for Polkadot, 2 for Kusama, 42 for generic)
    #[wasm_bindgen]
    pub fn sender(&self, prefix: Option<u16>) -> Result<Option<String>, JsValue> {
        let sender = self
            .inner
            .signer_account_id()
            .map(|id| id.to_ss58(prefix.unwrap_or(42)))
            .transpose()?;
        Ok(sender)
    }

    #[wasm_bindgen(getter)]
    pub fn nonce(&self) -> Option<js_sys::BigInt> {
        self.inner
            .signature()
            .map(|s| js_sys::BigInt::from(s.nonce))
    }

    /// Get tip amount as BigInt
    #[wasm_bindgen(getter)]
    pub fn tip(&self) -> Option<js_sys::BigInt> {
        self.inner.signature().map(|s| js_sys::BigInt::from(s.tip))
    }

    /// Get era information as JS object (`{ type: "immortal" }` or
    /// `{ type: "mortal", period, phase }`)
    #[wasm_bindgen(getter)]
    pub fn era(&self) -> Result<JsValue, JsValue> {
        match self.inner.signature() {
            Some(signature) => to_js_value(&signature.era),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Encoded call (call index + arguments)
    #[wasm_bindgen(js_name = callData)]
    pub fn call_data(&self) -> Vec<u8> {
        self.inner.method().encode()
    }

    #[wasm_bindgen(js_name = callDataHex)]
    pub fn call_data_hex(&self) -> String {
        format!("0x{}", hex::encode(self.inner.method().encode()))
    }

    /// Bytes an external signer must sign
    ///
    /// # Example Options
    /// ```json
    /// {
    ///   "blockHash": "0xec7afaf1cca720ce88c1d1b689d81f0583cc15a97d621cf046dd9abf605ef22f",
    ///   "genesisHash": "0xdcd1346701ca8396496e52aa2785b1748deb6db09551b72159dcb3e08991025b",
    ///   "era": { "type": "immortal" },
    ///   "nonce": 1,
    ///   "specVersion": 123,
    ///   "transactionVersion": 1,
    ///   "tip": "0"
    /// }
    /// ```
    #[wasm_bindgen(js_name = signingPayload)]
    pub fn signing_payload(&self, options: JsValue) -> Result<Vec<u8>, JsValue> {
        let options = parse_options(options)?;
        Ok(self.inner.signing_payload(&options))
    }

    #[wasm_bindgen(js_name = signingPayloadHex)]
    pub fn signing_payload_hex(&self, options: JsValue) -> Result<String, JsValue> {
        let payload = self.signing_payload(options)?;
        Ok(format!("0x{}", hex::encode(payload)))
    }

    /// Attach a signature produced elsewhere
    ///
    /// # Arguments
    /// * `signature` - Signature bytes (64 for ed25519/sr25519, 65 for ecdsa)
    /// * `public_key` - Signer public key
    /// * `scheme` - "ed25519", "sr25519" or "ecdsa"
    /// * `options` - The options the payload was built with
    #[wasm_bindgen(js_name = addSignature)]
    pub fn add_signature(
        &mut self,
        signature: &[u8],
        public_key: &[u8],
        scheme: &str,
        options: JsValue,
    ) -> Result<(), JsValue> {
        let scheme = parse_scheme(scheme)?;
        let options = parse_options(options)?;
        let signature = MultiSignature::from_scheme_bytes(scheme, signature)?;
        let account = signer_account_id(scheme, public_key)?;
        self.inner.add_signature(account.into(), signature, &options);
        Ok(())
    }

    /// Sign in place with a key derived from a 32-byte seed
    #[wasm_bindgen(js_name = signWithSeed)]
    pub fn sign_with_seed(
        &mut self,
        seed: &[u8],
        scheme: &str,
        options: JsValue,
    ) -> Result<(), JsValue> {
        let options = parse_options(options)?;
        let signer: Box<dyn Signer> = match parse_scheme(scheme)? {
            SignatureScheme::Sr25519 => Box::new(Sr25519Signer::from_seed(seed)?),
            SignatureScheme::Ed25519 => Box::new(Ed25519Signer::from_seed(seed)?),
            SignatureScheme::Ecdsa => {
                return Err(SigningError::UnsupportedScheme("Ecdsa").into())
            }
        };
        self.inner.sign(signer.as_ref(), &options)?;
        Ok(())
    }

    /// Serialize to bytes
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.inner.encode()
    }

    /// Serialize to hex string
    #[wasm_bindgen(js_name = toHex)]
    pub fn to_hex(&self) -> String {
        self.inner.to_hex()
    }

    /// Blake2-256 of the encoding, hex encoded
    #[wasm_bindgen(getter)]
    pub fn hash(&self) -> String {
        self.inner.hash().to_hex()
    }
}

fn parse_options(options: JsValue) -> Result<SignatureOptions, WasmSubstrateError> {
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| WasmSubstrateError::InvalidInput(format!("Invalid signature options: {}", e)))
}

fn parse_scheme(scheme: &str) -> Result<SignatureScheme, WasmSubstrateError> {
    match scheme.to_ascii_lowercase().as_str() {
        "ed25519" => Ok(SignatureScheme::Ed25519),
        "sr25519" => Ok(SignatureScheme::Sr25519),
        "ecdsa" => Ok(SignatureScheme::Ecdsa),
        _ => Err(WasmSubstrateError::InvalidInput(format!(
            "Unknown signature scheme: {}",
            scheme
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scheme() {
        assert_eq!(parse_scheme("Sr25519").unwrap(), SignatureScheme::Sr25519);
        assert_eq!(parse_scheme("ed25519").unwrap(), SignatureScheme::Ed25519);
        assert_eq!(parse_scheme("ECDSA").unwrap(), SignatureScheme::Ecdsa);
        assert!(matches!(
            parse_scheme("secp256r1"),
            Err(WasmSubstrateError::InvalidInput(_))
        ));
    }
}
