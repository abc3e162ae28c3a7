//! Extrinsic envelope
//!
//! Wire format:
//! - compact length of everything that follows
//! - version byte: format version (4), top bit set when signed
//! - signed only: signer address, signature, era, compact nonce, compact tip
//! - call: module index, function index, encoded arguments

use crate::call::Call;
use crate::codec::{Compact, Decode, Encode, Input};
use crate::error::DecodeError;
use crate::hashing::blake2_256;
use crate::types::{AccountId, Address, Era, MultiAddress, MultiSignature, H256};

pub const EXTRINSIC_FORMAT_VERSION: u8 = 4;
pub const SIGNED_FLAG: u8 = 0x80;

/// Address types that can identify the signer of an extrinsic
pub trait SignerAddress: Encode + Decode + From<AccountId> {
    /// Account id behind the address, if it carries one directly
    fn account_id(&self) -> Option<AccountId>;
}

impl SignerAddress for Address {
    fn account_id(&self) -> Option<AccountId> {
        match self {
            Address::AccountId(id) => Some(*id),
            Address::AccountIndex(_) => None,
        }
    }
}

impl SignerAddress for MultiAddress {
    fn account_id(&self) -> Option<AccountId> {
        match self {
            MultiAddress::Id(id) => Some(*id),
            MultiAddress::Address32(bytes) => Some(AccountId(*bytes)),
            _ => None,
        }
    }
}

impl SignerAddress for AccountId {
    fn account_id(&self) -> Option<AccountId> {
        Some(*self)
    }
}

/// Signature block of a version 4 extrinsic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrinsicSignature<A = Address> {
    pub signer: A,
    pub signature: MultiSignature,
    pub era: Era,
    pub nonce: u64,
    pub tip: u128,
}

impl<A: Encode> Encode for ExtrinsicSignature<A> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        self.signer.encode_to(dest);
        self.signature.encode_to(dest);
        self.era.encode_to(dest);
        Compact(self.nonce).encode_to(dest);
        Compact(self.tip).encode_to(dest);
    }
}

impl<A: Decode> Decode for ExtrinsicSignature<A> {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        Ok(ExtrinsicSignature {
            signer: A::decode(input)?,
            signature: MultiSignature::decode(input)?,
            era: Era::decode(input)?,
            nonce: Compact::<u64>::decode(input)?.0,
            tip: Compact::<u128>::decode(input)?.0,
        })
    }
}

/// A transaction envelope, unsigned or signed
///
/// Construction always yields an unsigned envelope; the only way to set the
/// signed flag is through `sign` or `add_signature`, which require exclusive
/// access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extrinsic<A = Address> {
    version: u8,
    signature: Option<ExtrinsicSignature<A>>,
    method: Call,
}

/// Extrinsic whose signer is a bare 32-byte account id
pub type ExtrinsicAccountId = Extrinsic<AccountId>;

impl<A> Extrinsic<A> {
    pub fn new_unsigned(method: Call) -> Self {
        Extrinsic {
            version: EXTRINSIC_FORMAT_VERSION,
            signature: None,
            method,
        }
    }

    /// Raw version byte, including the signed flag
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn format_version(&self) -> u8 {
        self.version & !SIGNED_FLAG
    }

    pub fn is_signed(&self) -> bool {
        self.version & SIGNED_FLAG != 0
    }

    pub fn signature(&self) -> Option<&ExtrinsicSignature<A>> {
        self.signature.as_ref()
    }

    pub fn method(&self) -> &Call {
        &self.method
    }

    /// Attach a signature block, replacing any previous one
    pub(crate) fn set_signature(&mut self, signature: ExtrinsicSignature<A>) {
        self.signature = Some(signature);
        self.version |= SIGNED_FLAG;
    }
}

impl<A: Encode> Extrinsic<A> {
    /// Blake2-256 of the full encoding, length prefix included
    pub fn hash(&self) -> H256 {
        H256(blake2_256(&self.encode()))
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.encode()))
    }
}

impl<A: SignerAddress> Extrinsic<A> {
    /// Account id of the signer, if signed by an address that carries one
    pub fn signer_account_id(&self) -> Option<AccountId> {
        self.signature.as_ref()?.signer.account_id()
    }
}

impl<A: Encode> Encode for Extrinsic<A> {
    fn encode_to(&self, dest: &mut Vec<u8>) {
        let mut body = vec![self.version];
        if let Some(signature) = &self.signature {
            signature.encode_to(&mut body);
        }
        self.method.encode_to(&mut body);

        Compact(body.len() as u32).encode_to(dest);
        dest.extend_from_slice(&body);
    }
}

impl<A: Decode> Decode for Extrinsic<A> {
    fn decode(input: &mut Input<'_>) -> Result<Self, DecodeError> {
        let len = Compact::<u32>::decode(input)?.0 as usize;
        let mut body = Input::new(input.read_bytes(len)?);

        let version = body.read_byte()?;
        if version & !SIGNED_FLAG != EXTRINSIC_FORMAT_VERSION {
            return Err(DecodeError::UnsupportedExtrinsicVersion(version & !SIGNED_FLAG));
        }
        let signature = if version & SIGNED_FLAG != 0 {
            Some(ExtrinsicSignature::decode(&mut body)?)
        } else {
            None
        };
        let method = Call::decode(&mut body)?;

        tracing::trace!(
            len,
            signed = signature.is_some(),
            module_index = method.module_index(),
            function_index = method.function_index(),
            "decoded extrinsic"
        );
        Ok(Extrinsic {
            version,
            signature,
            method,
        })
    }
}
