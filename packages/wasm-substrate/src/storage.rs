//! Storage key derivation
//!
//! Keys are derived from the module's storage prefix and the item name,
//! joined by a space:
//! - plain items: `twox_128("{prefix} {item}")`
//! - maps: `hasher("{prefix} {item}" ++ key)` with the map's hasher
//! - double maps: the map key as above, followed by `key2_hasher(key2)`

use crate::error::WasmSubstrateError;
use crate::hashing::{blake2_128, blake2_256, twox_128, twox_256, twox_64};
use crate::metadata::{names_match, Metadata, StorageEntryType, StorageHasher};

impl StorageHasher {
    pub fn hash(&self, data: &[u8]) -> Vec<u8> {
        match self {
            StorageHasher::Blake2_128 => blake2_128(data).to_vec(),
            StorageHasher::Blake2_256 => blake2_256(data).to_vec(),
            StorageHasher::Twox128 => twox_128(data).to_vec(),
            StorageHasher::Twox256 => twox_256(data).to_vec(),
            StorageHasher::Twox64Concat => {
                let mut out = twox_64(data).to_vec();
                out.extend_from_slice(data);
                out
            }
        }
    }

    /// Hasher named in a double map's `key2_hasher` field, e.g. `blake2_256`
    pub fn from_name(name: &str) -> Option<Self> {
        [
            ("blake2_128", StorageHasher::Blake2_128),
            ("blake2_256", StorageHasher::Blake2_256),
            ("twox_128", StorageHasher::Twox128),
            ("twox_256", StorageHasher::Twox256),
            ("twox_64_concat", StorageHasher::Twox64Concat),
        ]
        .into_iter()
        .find(|(known, _)| names_match(known, name))
        .map(|(_, hasher)| hasher)
    }
}

/// Key of a storage item, ready to hand to a state query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKey(pub Vec<u8>);

impl StorageKey {
    /// Key of a plain item (`key` is `None`) or a map entry
    pub fn new(
        metadata: &Metadata,
        module: &str,
        item: &str,
        key: Option<&[u8]>,
    ) -> Result<Self, WasmSubstrateError> {
        let (module_meta, entry) = metadata.find_storage_entry(module, item)?;
        let mut material = format!("{} {}", module_meta.prefix, entry.name).into_bytes();

        let hashed = match (&entry.ty, key) {
            (StorageEntryType::Plain(_), None) => twox_128(&material).to_vec(),
            (StorageEntryType::Map { hasher, .. }, Some(key)) => {
                material.extend_from_slice(key);
                hasher.hash(&material)
            }
            (StorageEntryType::Plain(_), Some(_)) => {
                return Err(WasmSubstrateError::InvalidInput(format!(
                    "storage item {}.{} is not a map",
                    module, item
                )))
            }
            (StorageEntryType::Map { .. }, None) => {
                return Err(WasmSubstrateError::InvalidInput(format!(
                    "storage map {}.{} needs a key",
                    module, item
                )))
            }
            (StorageEntryType::DoubleMap { .. }, _) => {
                return Err(WasmSubstrateError::InvalidInput(format!(
                    "storage item {}.{} is a double map",
                    module, item
                )))
            }
        };

        tracing::trace!(module, item, key_len = hashed.len(), "derived storage key");
        Ok(StorageKey(hashed))
    }

    /// Key of a double map entry
    pub fn new_double_map(
        metadata: &Metadata,
        module: &str,
        item: &str,
        key1: &[u8],
        key2: &[u8],
    ) -> Result<Self, WasmSubstrateError> {
        let (module_meta, entry) = metadata.find_storage_entry(module, item)?;
        let StorageEntryType::DoubleMap {
            hasher,
            key2_hasher,
            ..
        } = &entry.ty
        else {
            return Err(WasmSubstrateError::InvalidInput(format!(
                "storage item {}.{} is not a double map",
                module, item
            )));
        };
        let second = StorageHasher::from_name(key2_hasher).ok_or_else(|| {
            WasmSubstrateError::InvalidInput(format!("unknown storage hasher {}", key2_hasher))
        })?;

        let mut material = format!("{} {}", module_meta.prefix, entry.name).into_bytes();
        material.extend_from_slice(key1);
        let mut key = hasher.hash(&material);
        key.extend_from_slice(&second.hash(key2));
        Ok(StorageKey(key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::fixtures::example_metadata;
    use crate::metadata::{StorageEntry, StorageModifier};

    const ALICE: [u8; 32] = [0xd4; 32];

    fn with_double_map() -> Metadata {
        let mut metadata = example_metadata();
        let anchor = metadata
            .modules
            .iter_mut()
            .find(|m| m.name == "anchor")
            .unwrap();
        anchor.storage = Some(vec![StorageEntry {
            name: "Evictions".to_string(),
            modifier: StorageModifier::Optional,
            ty: StorageEntryType::DoubleMap {
                hasher: StorageHasher::Twox128,
                key1: "T::BlockNumber".to_string(),
                key2: "T::Hash".to_string(),
                value: "bool".to_string(),
                key2_hasher: "blake2_256".to_string(),
            },
            default: vec![],
            documentation: vec![],
        }]);
        metadata
    }

    #[test]
    fn test_plain_item_key() {
        let key = StorageKey::new(&example_metadata(), "system", "Number", None).unwrap();
        assert_eq!(key.as_bytes(), &twox_128(b"System Number"));
    }

    #[test]
    fn test_map_key_uses_map_hasher() {
        let key =
            StorageKey::new(&example_metadata(), "System", "account_nonce", Some(&ALICE)).unwrap();
        let mut material = b"System AccountNonce".to_vec();
        material.extend_from_slice(&ALICE);
        assert_eq!(key.0, blake2_256(&material).to_vec());
        assert_eq!(key.to_hex().len(), 2 + 64);
    }

    #[test]
    fn test_key_shape_errors() {
        let metadata = example_metadata();
        assert!(StorageKey::new(&metadata, "system", "Number", Some(&ALICE)).is_err());
        assert!(StorageKey::new(&metadata, "system", "AccountNonce", None).is_err());
        assert!(matches!(
            StorageKey::new(&metadata, "system", "Events", None),
            Err(WasmSubstrateError::UnknownCall(_))
        ));
    }

    #[test]
    fn test_double_map_key() {
        let metadata = with_double_map();
        let key = StorageKey::new_double_map(&metadata, "anchor", "Evictions", &[1, 0, 0, 0], &[7; 32])
            .unwrap();
        let mut expected = twox_128(b"Anchor Evictions\x01\x00\x00\x00").to_vec();
        expected.extend_from_slice(&blake2_256(&[7; 32]));
        assert_eq!(key.0, expected);
        assert!(StorageKey::new(&metadata, "anchor", "Evictions", Some(&[1])).is_err());
    }

    #[test]
    fn test_twox_64_concat_keeps_input() {
        let hashed = StorageHasher::Twox64Concat.hash(b"abc");
        assert_eq!(&hashed[..8], &twox_64(b"abc"));
        assert_eq!(&hashed[8..], b"abc");
    }

    #[test]
    fn test_hasher_from_name() {
        assert_eq!(
            StorageHasher::from_name("Blake2_256"),
            Some(StorageHasher::Blake2_256)
        );
        assert_eq!(
            StorageHasher::from_name("twox64concat"),
            Some(StorageHasher::Twox64Concat)
        );
        assert_eq!(StorageHasher::from_name("sha256"), None);
    }
}
