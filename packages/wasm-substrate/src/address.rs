//! SS58 address encoding and decoding for Substrate chains
//!
//! Uses the bs58 crate for base58 encoding, matching the Substrate ecosystem.
//! See: https://docs.substrate.io/reference/address-formats/

use crate::error::WasmSubstrateError;
use crate::hashing::blake2_256;
use crate::types::AccountId;
use blake2::{Blake2b512, Digest};

/// SS58 prefix for checksum calculation
const SS58_PREFIX: &[u8] = b"SS58PRE";

/// Well-known SS58 network prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ss58Format {
    /// Polkadot mainnet (prefix 0, addresses start with '1')
    Polkadot = 0,
    /// Kusama (prefix 2)
    Kusama = 2,
    /// Substrate generic (prefix 42, addresses start with '5')
    Substrate = 42,
}

impl Ss58Format {
    pub fn prefix(self) -> u16 {
        self as u16
    }

    pub fn from_prefix(prefix: u16) -> Option<Self> {
        match prefix {
            0 => Some(Ss58Format::Polkadot),
            2 => Some(Ss58Format::Kusama),
            42 => Some(Ss58Format::Substrate),
            _ => None,
        }
    }
}

impl AccountId {
    /// Parse an SS58 address, accepting any network prefix
    pub fn from_ss58(address: &str) -> Result<Self, WasmSubstrateError> {
        let (public_key, _) = decode_ss58(address)?;
        AccountId::from_slice(&public_key)
    }

    pub fn to_ss58(&self, prefix: u16) -> Result<String, WasmSubstrateError> {
        encode_ss58(&self.0, prefix)
    }

    /// Account id derived from a public key that is not 32 bytes long
    /// (e.g. a 33-byte compressed ECDSA key)
    pub fn from_public_key(public_key: &[u8]) -> Self {
        match public_key.try_into() {
            Ok(bytes) => AccountId(bytes),
            Err(_) => AccountId(blake2_256(public_key)),
        }
    }
}

/// Encode a public key to SS58 address format
///
/// # Arguments
/// * `public_key` - 32-byte public key
/// * `prefix` - Network prefix (0 for Polkadot, 2 for Kusama, 42 for generic Substrate)
pub fn encode_ss58(public_key: &[u8], prefix: u16) -> Result<String, WasmSubstrateError> {
    if public_key.len() != 32 {
        return Err(WasmSubstrateError::InvalidAddress(format!(
            "Public key must be 32 bytes, got {}",
            public_key.len()
        )));
    }

    let mut payload = encode_prefix(prefix)?;
    payload.extend_from_slice(public_key);

    // first 2 bytes of Blake2b-512
    let checksum = ss58_checksum(&payload);
    payload.extend_from_slice(&checksum[..2]);

    Ok(bs58::encode(&payload).into_string())
}

/// Decode an SS58 address to public key and prefix
pub fn decode_ss58(address: &str) -> Result<(Vec<u8>, u16), WasmSubstrateError> {
    let decoded = bs58::decode(address)
        .into_vec()
        .map_err(|e| WasmSubstrateError::InvalidAddress(format!("Invalid base58: {}", e)))?;

    if decoded.len() < 35 {
        return Err(WasmSubstrateError::InvalidAddress(
            "Address too short".to_string(),
        ));
    }

    let (prefix, prefix_len) = decode_prefix(&decoded)?;

    let checksum_start = decoded.len() - 2;
    let public_key = &decoded[prefix_len..checksum_start];
    let checksum = &decoded[checksum_start..];

    if public_key.len() != 32 {
        return Err(WasmSubstrateError::InvalidAddress(format!(
            "Invalid public key length: {}",
            public_key.len()
        )));
    }

    let expected_checksum = ss58_checksum(&decoded[..checksum_start]);
    if checksum != &expected_checksum[..2] {
        return Err(WasmSubstrateError::InvalidAddress(
            "Invalid checksum".to_string(),
        ));
    }

    Ok((public_key.to_vec(), prefix))
}

/// Validate an SS58 address
pub fn validate_address(address: &str, expected_prefix: Option<u16>) -> bool {
    match decode_ss58(address) {
        Ok((_, prefix)) => expected_prefix.map_or(true, |expected| prefix == expected),
        Err(_) => false,
    }
}

/// Encode SS58 prefix (supports single and two-byte prefixes)
fn encode_prefix(prefix: u16) -> Result<Vec<u8>, WasmSubstrateError> {
    if prefix < 64 {
        Ok(vec![prefix as u8])
    } else if prefix < 16384 {
        let first = ((prefix & 0b0000_0000_1111_1100) as u8) >> 2 | 0b0100_0000;
        let second = ((prefix >> 8) as u8) | ((prefix & 0b0000_0000_0000_0011) as u8) << 6;
        Ok(vec![first, second])
    } else {
        Err(WasmSubstrateError::InvalidAddress(format!(
            "Invalid prefix: {}",
            prefix
        )))
    }
}

fn decode_prefix(data: &[u8]) -> Result<(u16, usize), WasmSubstrateError> {
    match data[0] {
        0..=63 => Ok((data[0] as u16, 1)),
        64..=127 => {
            let lower = (data[0] & 0b0011_1111) << 2 | (data[1] >> 6);
            let upper = data[1] & 0b0011_1111;
            Ok((((upper as u16) << 8) | (lower as u16), 2))
        }
        b => Err(WasmSubstrateError::InvalidAddress(format!(
            "Invalid prefix byte: {}",
            b
        ))),
    }
}

/// Blake2b-512 of "SS58PRE" || payload
fn ss58_checksum(payload: &[u8]) -> [u8; 64] {
    let mut hasher = Blake2b512::new();
    hasher.update(SS58_PREFIX);
    hasher.update(payload);
    let mut checksum = [0u8; 64];
    checksum.copy_from_slice(&hasher.finalize());
    checksum
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALICE_SS58: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    const ALICE_HEX: &str = "0xd43593c715fdd31c61141abd04a99fd6822c8558854ccde39a5684e7a56da27d";

    #[test]
    fn test_encode_decode_roundtrip() {
        let pubkey =
            hex::decode("61b18c6dc02ddcabdeac56cb4f21a971cc41cc97640f6f85b073480008c53a0d")
                .unwrap();

        let address = encode_ss58(&pubkey, 42).unwrap();
        assert_eq!(address, "5EGoFA95omzemRssELLDjVenNZ68aXyUeqtKQScXSEBvVJkr");

        let (decoded_pubkey, prefix) = decode_ss58(&address).unwrap();
        assert_eq!(decoded_pubkey, pubkey);
        assert_eq!(prefix, 42);
    }

    #[test]
    fn test_account_id_from_ss58() {
        let alice = AccountId::from_ss58(ALICE_SS58).unwrap();
        assert_eq!(alice, AccountId::from_hex(ALICE_HEX).unwrap());
        assert_eq!(
            alice.to_ss58(Ss58Format::Substrate.prefix()).unwrap(),
            ALICE_SS58
        );
    }

    #[test]
    fn test_polkadot_prefix() {
        let alice = AccountId::from_hex(ALICE_HEX).unwrap();
        let address = alice.to_ss58(Ss58Format::Polkadot.prefix()).unwrap();
        assert!(address.starts_with('1'));
        let (_, prefix) = decode_ss58(&address).unwrap();
        assert_eq!(Ss58Format::from_prefix(prefix), Some(Ss58Format::Polkadot));
    }

    #[test]
    fn test_two_byte_prefix_roundtrip() {
        let alice = AccountId::from_hex(ALICE_HEX).unwrap();
        let address = alice.to_ss58(1284).unwrap();
        let (pubkey, prefix) = decode_ss58(&address).unwrap();
        assert_eq!(prefix, 1284);
        assert_eq!(pubkey, alice.0.to_vec());
    }

    #[test]
    fn test_validate_address() {
        assert!(validate_address(ALICE_SS58, Some(42)));
        assert!(validate_address(ALICE_SS58, None));
        assert!(!validate_address(ALICE_SS58, Some(0)));
        assert!(!validate_address("invalid", None));
    }

    #[test]
    fn test_public_key_to_account_id() {
        let alice = AccountId::from_hex(ALICE_HEX).unwrap();
        assert_eq!(AccountId::from_public_key(&alice.0), alice);
        let compressed = [2u8; 33];
        assert_eq!(
            AccountId::from_public_key(&compressed),
            AccountId(blake2_256(&compressed))
        );
    }

    #[test]
    fn test_invalid_pubkey_length() {
        assert!(encode_ss58(&[0u8; 16], 42).is_err());
    }
}
