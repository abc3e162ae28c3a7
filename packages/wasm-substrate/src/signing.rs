//! Signing engine
//!
//! Payload layout (SCALE concatenation):
//! - encoded call (call index + arguments)
//! - era
//! - compact nonce
//! - compact tip
//! - spec version (u32)
//! - transaction version (u32, only when supplied)
//! - genesis hash
//! - checkpoint block hash
//!
//! Payloads longer than 256 bytes are replaced by their Blake2-256 hash
//! before signing.

use ed25519_dalek::{Signer as _, Verifier as _};
use schnorrkel::{signing_context, ExpansionMode, MiniSecretKey};
use serde::{Deserialize, Serialize};

use crate::codec::{Compact, Encode};
use crate::error::SigningError;
use crate::extrinsic::{Extrinsic, ExtrinsicSignature, SignerAddress};
use crate::hashing::blake2_256;
use crate::types::{deserialize_u128, AccountId, Era, MultiSignature, SignatureScheme, H256};

/// Signing context shared by all Substrate sr25519 signatures
pub const SR25519_SIGNING_CONTEXT: &[u8] = b"substrate";

/// Payloads above this size are hashed before signing
pub const MAX_UNHASHED_PAYLOAD_LEN: usize = 256;

/// Per-signature context supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureOptions {
    /// Checkpoint block; the genesis hash for immortal transactions
    pub block_hash: H256,
    pub genesis_hash: H256,
    #[serde(default)]
    pub era: Era,
    pub nonce: u64,
    pub spec_version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_version: Option<u32>,
    #[serde(default, deserialize_with = "deserialize_u128")]
    pub tip: u128,
}

/// What an external signer hands back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerOutput {
    pub signature: Vec<u8>,
    pub scheme: SignatureScheme,
    pub public_key: Vec<u8>,
}

/// Anything that can sign a payload and name its public key
///
/// Implementations may block (an out-of-process tool, a hardware device);
/// timeouts are theirs to enforce.
pub trait Signer {
    fn sign(&self, payload: &[u8]) -> Result<SignerOutput, SigningError>;
}

impl<S: Signer + ?Sized> Signer for &S {
    fn sign(&self, payload: &[u8]) -> Result<SignerOutput, SigningError> {
        (**self).sign(payload)
    }
}

/// Raw payload bytes for `method` under `options`, before any hashing
pub fn raw_signing_payload(method: &impl Encode, options: &SignatureOptions) -> Vec<u8> {
    let mut payload = method.encode();
    options.era.encode_to(&mut payload);
    Compact(options.nonce).encode_to(&mut payload);
    Compact(options.tip).encode_to(&mut payload);
    options.spec_version.encode_to(&mut payload);
    if let Some(transaction_version) = options.transaction_version {
        transaction_version.encode_to(&mut payload);
    }
    options.genesis_hash.encode_to(&mut payload);
    options.block_hash.encode_to(&mut payload);
    payload
}

/// Bytes the signer must sign: the raw payload, or its hash when oversized
pub fn signing_payload(method: &impl Encode, options: &SignatureOptions) -> Vec<u8> {
    let payload = raw_signing_payload(method, options);
    if payload.len() > MAX_UNHASHED_PAYLOAD_LEN {
        blake2_256(&payload).to_vec()
    } else {
        payload
    }
}

/// Account id for a signer public key, checking the length per scheme
pub fn signer_account_id(
    scheme: SignatureScheme,
    public_key: &[u8],
) -> Result<AccountId, SigningError> {
    let expected = match scheme {
        SignatureScheme::Ed25519 | SignatureScheme::Sr25519 => 32,
        // compressed secp256k1 key, hashed into an account id
        SignatureScheme::Ecdsa => 33,
    };
    if public_key.len() != expected {
        return Err(SigningError::InvalidPublicKey {
            scheme: scheme.name(),
            expected,
            actual: public_key.len(),
        });
    }
    Ok(AccountId::from_public_key(public_key))
}

impl<A: SignerAddress> Extrinsic<A> {
    /// Bytes to hand to a signer for this extrinsic's call
    pub fn signing_payload(&self, options: &SignatureOptions) -> Vec<u8> {
        signing_payload(self.method(), options)
    }

    /// Sign in place, replacing any previous signature
    ///
    /// Nothing is modified unless the signer succeeds and its output is well
    /// formed.
    pub fn sign<S: Signer + ?Sized>(
        &mut self,
        signer: &S,
        options: &SignatureOptions,
    ) -> Result<(), SigningError> {
        let payload = self.signing_payload(options);
        let output = signer.sign(&payload)?;
        let signature = MultiSignature::from_scheme_bytes(output.scheme, &output.signature)?;
        let account = signer_account_id(output.scheme, &output.public_key)?;

        tracing::debug!(
            scheme = %output.scheme,
            payload_len = payload.len(),
            nonce = options.nonce,
            resigned = self.is_signed(),
            "signed extrinsic"
        );
        self.attach(A::from(account), signature, options);
        Ok(())
    }

    /// Attach a signature produced elsewhere over `signing_payload(options)`
    pub fn add_signature(
        &mut self,
        signer: A,
        signature: MultiSignature,
        options: &SignatureOptions,
    ) {
        tracing::debug!(scheme = %signature.scheme(), "attached external signature");
        self.attach(signer, signature, options);
    }

    fn attach(&mut self, signer: A, signature: MultiSignature, options: &SignatureOptions) {
        self.set_signature(ExtrinsicSignature {
            signer,
            signature,
            era: options.era,
            nonce: options.nonce,
            tip: options.tip,
        });
    }

    /// Check the attached signature against the payload rebuilt from
    /// `options`
    pub fn verify_signature(&self, options: &SignatureOptions) -> Result<(), SigningError> {
        let signature = self.signature().ok_or(SigningError::NotSigned)?;
        let account = signature
            .signer
            .account_id()
            .ok_or(SigningError::Verification)?;
        verify_signature(
            signature.signature.scheme(),
            &self.signing_payload(options),
            signature.signature.as_bytes(),
            account.as_bytes(),
        )
    }
}

/// Verify `signature` over `payload` for `public_key`
pub fn verify_signature(
    scheme: SignatureScheme,
    payload: &[u8],
    signature: &[u8],
    public_key: &[u8],
) -> Result<(), SigningError> {
    match scheme {
        SignatureScheme::Sr25519 => {
            let public = schnorrkel::PublicKey::from_bytes(public_key).map_err(|_| {
                SigningError::InvalidPublicKey {
                    scheme: scheme.name(),
                    expected: 32,
                    actual: public_key.len(),
                }
            })?;
            let signature = schnorrkel::Signature::from_bytes(signature)
                .map_err(|_| SigningError::Verification)?;
            public
                .verify_simple(SR25519_SIGNING_CONTEXT, payload, &signature)
                .map_err(|_| SigningError::Verification)
        }
        SignatureScheme::Ed25519 => {
            let bytes: [u8; 32] =
                public_key
                    .try_into()
                    .map_err(|_| SigningError::InvalidPublicKey {
                        scheme: scheme.name(),
                        expected: 32,
                        actual: public_key.len(),
                    })?;
            let public = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map_err(|_| SigningError::Verification)?;
            let signature = ed25519_dalek::Signature::from_slice(signature)
                .map_err(|_| SigningError::Verification)?;
            public
                .verify(payload, &signature)
                .map_err(|_| SigningError::Verification)
        }
        SignatureScheme::Ecdsa => Err(SigningError::UnsupportedScheme(scheme.name())),
    }
}

/// In-process sr25519 signer
pub struct Sr25519Signer {
    keypair: schnorrkel::Keypair,
}

impl Sr25519Signer {
    /// Keypair from a 32-byte mini secret key (seed), expanded the way
    /// Substrate tooling does
    pub fn from_seed(seed: &[u8]) -> Result<Self, SigningError> {
        let mini = MiniSecretKey::from_bytes(seed)
            .map_err(|e| SigningError::Signer(format!("invalid sr25519 seed: {}", e)))?;
        Ok(Sr25519Signer {
            keypair: mini.expand_to_keypair(ExpansionMode::Ed25519),
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.keypair.public.to_bytes()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(self.public_key())
    }
}

impl Signer for Sr25519Signer {
    fn sign(&self, payload: &[u8]) -> Result<SignerOutput, SigningError> {
        let context = signing_context(SR25519_SIGNING_CONTEXT);
        let signature = self.keypair.sign(context.bytes(payload));
        Ok(SignerOutput {
            signature: signature.to_bytes().to_vec(),
            scheme: SignatureScheme::Sr25519,
            public_key: self.public_key().to_vec(),
        })
    }
}

/// In-process ed25519 signer
pub struct Ed25519Signer {
    key: ed25519_dalek::SigningKey,
}

impl Ed25519Signer {
    pub fn from_seed(seed: &[u8]) -> Result<Self, SigningError> {
        let seed: [u8; 32] = seed.try_into().map_err(|_| {
            SigningError::Signer(format!("ed25519 seed must be 32 bytes, got {}", seed.len()))
        })?;
        Ok(Ed25519Signer {
            key: ed25519_dalek::SigningKey::from_bytes(&seed),
        })
    }

    pub fn public_key(&self) -> [u8; 32] {
        self.key.verifying_key().to_bytes()
    }

    pub fn account_id(&self) -> AccountId {
        AccountId(self.public_key())
    }
}

impl Signer for Ed25519Signer {
    fn sign(&self, payload: &[u8]) -> Result<SignerOutput, SigningError> {
        Ok(SignerOutput {
            signature: self.key.sign(payload).to_bytes().to_vec(),
            scheme: SignatureScheme::Ed25519,
            public_key: self.public_key().to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::Call;
    use crate::codec::decode_all;
    use crate::metadata::fixtures::example_metadata;
    use crate::types::Address;
    use crate::value::Value;

    const BOB_HEX: &str = "0x8eaf04151687736326c9fea17e25fc5287613693c912909cb226aa4794f26a48";
    const BLOCK_HASH: &str = "0xec7afaf1cca720ce88c1d1b689d81f0583cc15a97d621cf046dd9abf605ef22f";
    const GENESIS_HASH: &str = "0xdcd1346701ca8396496e52aa2785b1748deb6db09551b72159dcb3e08991025b";

    fn options() -> SignatureOptions {
        SignatureOptions {
            block_hash: H256::from_hex(BLOCK_HASH).unwrap(),
            genesis_hash: H256::from_hex(GENESIS_HASH).unwrap(),
            era: Era::Immortal,
            nonce: 1,
            spec_version: 123,
            transaction_version: None,
            tip: 2,
        }
    }

    fn transfer() -> Extrinsic {
        let bob = AccountId::from_hex(BOB_HEX).unwrap();
        let call = Call::build(
            &example_metadata(),
            "balances.transfer",
            &[Value::from(bob), Value::UInt(6969)],
        )
        .unwrap();
        Extrinsic::new_unsigned(call)
    }

    fn alice() -> Sr25519Signer {
        Sr25519Signer::from_seed(&[7u8; 32]).unwrap()
    }

    /// Signer returning a canned output
    struct FixedSigner(Result<SignerOutput, SigningError>);

    impl Signer for FixedSigner {
        fn sign(&self, _payload: &[u8]) -> Result<SignerOutput, SigningError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_payload_layout() {
        let payload = transfer().signing_payload(&options());
        let expected = format!(
            "0300ff{}e56c{}{}{}{}{}",
            &BOB_HEX[2..],
            "00",   // immortal
            "04",   // nonce 1
            "08",   // tip 2
            "7b000000",
            format!("{}{}", &GENESIS_HASH[2..], &BLOCK_HASH[2..])
        );
        assert_eq!(hex::encode(&payload), expected);
    }

    #[test]
    fn test_payload_with_transaction_version() {
        let mut opts = options();
        let without = transfer().signing_payload(&opts);
        opts.transaction_version = Some(1);
        let with = transfer().signing_payload(&opts);
        assert_eq!(with.len(), without.len() + 4);
        let split = with.len() - 64 - 4;
        assert_eq!(&with[split..split + 4], &[1, 0, 0, 0]);
    }

    #[test]
    fn test_large_payload_is_hashed() {
        let call = Call::new(
            crate::metadata::CallIndex {
                module_index: 0,
                function_index: 0,
            },
            vec![0xab; 300],
        );
        let raw = raw_signing_payload(&call, &options());
        assert!(raw.len() > MAX_UNHASHED_PAYLOAD_LEN);
        assert_eq!(signing_payload(&call, &options()), blake2_256(&raw).to_vec());

        // right at the limit nothing is hashed
        let short = Call::new(call.call_index, vec![0xab; 256 - 2 - 3 - 4 - 64]);
        assert_eq!(raw_signing_payload(&short, &options()).len(), 256);
        assert_eq!(
            signing_payload(&short, &options()),
            raw_signing_payload(&short, &options())
        );
    }

    #[test]
    fn test_sign_sets_signed_flag() {
        let signer = alice();
        let mut extrinsic = transfer();
        assert!(!extrinsic.is_signed());

        extrinsic.sign(&signer, &options()).unwrap();
        assert!(extrinsic.is_signed());
        assert_eq!(extrinsic.version(), 0x84);

        let signature = extrinsic.signature().unwrap();
        assert_eq!(signature.signer, Address::AccountId(signer.account_id()));
        assert_eq!(signature.nonce, 1);
        assert_eq!(signature.tip, 2);
        assert_eq!(signature.signature.scheme(), SignatureScheme::Sr25519);

        let decoded = decode_all::<Extrinsic>(&extrinsic.encode()).unwrap();
        assert_eq!(decoded, extrinsic);
        decoded.verify_signature(&options()).unwrap();
    }

    #[test]
    fn test_sr25519_signatures_differ_but_verify() {
        let signer = alice();
        let mut first = transfer();
        let mut second = transfer();
        first.sign(&signer, &options()).unwrap();
        second.sign(&signer, &options()).unwrap();

        assert_ne!(first.signature(), second.signature());
        first.verify_signature(&options()).unwrap();
        second.verify_signature(&options()).unwrap();
    }

    #[test]
    fn test_ed25519_signing_is_deterministic() {
        let signer = Ed25519Signer::from_seed(&[9u8; 32]).unwrap();
        let mut first = transfer();
        let mut second = transfer();
        first.sign(&signer, &options()).unwrap();
        second.sign(&signer, &options()).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            first.signature().unwrap().signature.scheme(),
            SignatureScheme::Ed25519
        );
        first.verify_signature(&options()).unwrap();
    }

    #[test]
    fn test_verification_fails_with_other_options() {
        let mut extrinsic = transfer();
        extrinsic.sign(&alice(), &options()).unwrap();
        let mut other = options();
        other.nonce = 2;
        assert_eq!(
            extrinsic.verify_signature(&other),
            Err(SigningError::Verification)
        );
    }

    #[test]
    fn test_resigning_overwrites() {
        let mut extrinsic = transfer();
        extrinsic.sign(&alice(), &options()).unwrap();

        let bob = Ed25519Signer::from_seed(&[1u8; 32]).unwrap();
        let mut opts = options();
        opts.nonce = 5;
        extrinsic.sign(&bob, &opts).unwrap();

        let signature = extrinsic.signature().unwrap();
        assert_eq!(signature.signer, Address::AccountId(bob.account_id()));
        assert_eq!(signature.nonce, 5);
        extrinsic.verify_signature(&opts).unwrap();
    }

    #[test]
    fn test_signer_failure_leaves_extrinsic_untouched() {
        let mut extrinsic = transfer();
        let before = extrinsic.clone();

        let failing = FixedSigner(Err(SigningError::Signer("device locked".to_string())));
        assert_eq!(
            extrinsic.sign(&failing, &options()),
            Err(SigningError::Signer("device locked".to_string()))
        );
        assert_eq!(extrinsic, before);

        let short = FixedSigner(Ok(SignerOutput {
            signature: vec![0; 63],
            scheme: SignatureScheme::Sr25519,
            public_key: vec![0; 32],
        }));
        assert_eq!(
            extrinsic.sign(&short, &options()),
            Err(SigningError::InvalidSignatureLength {
                scheme: "Sr25519",
                expected: 64,
                actual: 63
            })
        );
        assert!(!extrinsic.is_signed());
    }

    #[test]
    fn test_ecdsa_signer_account_is_hashed() {
        let signer = FixedSigner(Ok(SignerOutput {
            signature: vec![1; 65],
            scheme: SignatureScheme::Ecdsa,
            public_key: vec![2; 33],
        }));
        let mut extrinsic = transfer();
        extrinsic.sign(&signer, &options()).unwrap();
        assert_eq!(
            extrinsic.signer_account_id(),
            Some(AccountId(blake2_256(&[2; 33])))
        );
        assert!(matches!(
            extrinsic.signature().unwrap().signature,
            MultiSignature::Ecdsa(_)
        ));

        let bad_key = FixedSigner(Ok(SignerOutput {
            signature: vec![1; 65],
            scheme: SignatureScheme::Ecdsa,
            public_key: vec![2; 32],
        }));
        assert!(matches!(
            transfer().sign(&bad_key, &options()),
            Err(SigningError::InvalidPublicKey { .. })
        ));
    }

    #[test]
    fn test_add_external_signature() {
        let signer = alice();
        let mut extrinsic = transfer();
        let payload = extrinsic.signing_payload(&options());
        let output = signer.sign(&payload).unwrap();

        extrinsic.add_signature(
            Address::AccountId(signer.account_id()),
            MultiSignature::from_scheme_bytes(output.scheme, &output.signature).unwrap(),
            &options(),
        );
        assert!(extrinsic.is_signed());
        extrinsic.verify_signature(&options()).unwrap();
    }

    #[test]
    fn test_unsigned_verification() {
        assert_eq!(
            transfer().verify_signature(&options()),
            Err(SigningError::NotSigned)
        );
    }

    #[test]
    fn test_options_from_json() {
        let json = serde_json::json!({
            "blockHash": BLOCK_HASH,
            "genesisHash": GENESIS_HASH,
            "nonce": 1,
            "specVersion": 123,
            "tip": "2"
        });
        let parsed: SignatureOptions = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, options());

        let mortal = serde_json::json!({
            "blockHash": BLOCK_HASH,
            "genesisHash": GENESIS_HASH,
            "era": { "type": "mortal", "period": 64, "phase": 40 },
            "nonce": 0,
            "specVersion": 1,
            "transactionVersion": 2
        });
        let parsed: SignatureOptions = serde_json::from_value(mortal).unwrap();
        assert_eq!(parsed.era, Era::Mortal { period: 64, phase: 40 });
        assert_eq!(parsed.transaction_version, Some(2));
        assert_eq!(parsed.tip, 0);
    }

    #[test]
    fn test_options_with_unencodable_era_are_rejected() {
        let json = serde_json::json!({
            "blockHash": BLOCK_HASH,
            "genesisHash": GENESIS_HASH,
            "era": { "type": "mortal", "period": 64, "phase": 100 },
            "nonce": 0,
            "specVersion": 1
        });
        assert!(serde_json::from_value::<SignatureOptions>(json).is_err());
    }

    #[test]
    fn test_mortal_signed_extrinsic_decodes_back() {
        let json = serde_json::json!({
            "blockHash": BLOCK_HASH,
            "genesisHash": GENESIS_HASH,
            "era": { "type": "mortal", "period": 8192, "phase": 4098 },
            "nonce": 3,
            "specVersion": 1
        });
        let options: SignatureOptions = serde_json::from_value(json).unwrap();
        let mut extrinsic = transfer();
        extrinsic.sign(&alice(), &options).unwrap();

        let decoded: Extrinsic = decode_all(&extrinsic.encode()).unwrap();
        assert_eq!(decoded, extrinsic);
        decoded.verify_signature(&options).unwrap();
    }
}
