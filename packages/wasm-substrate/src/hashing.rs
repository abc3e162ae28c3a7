//! Hash functions used for signing payloads, extrinsic hashes and storage keys

use blake2::{
    digest::consts::{U16, U32},
    Blake2b, Digest,
};
use core::hash::Hasher;
use twox_hash::XxHash64;

/// Blake2b with a 16-byte output
pub fn blake2_128(data: &[u8]) -> [u8; 16] {
    let mut hasher = Blake2b::<U16>::new();
    hasher.update(data);
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Blake2b with a 32-byte output
pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

/// Single xxHash64 round with seed 0, little-endian
pub fn twox_64(data: &[u8]) -> [u8; 8] {
    twox_rounds::<1>(data)[0]
}

/// Two concatenated xxHash64 rounds (seeds 0 and 1)
pub fn twox_128(data: &[u8]) -> [u8; 16] {
    let rounds = twox_rounds::<2>(data);
    let mut out = [0u8; 16];
    for (chunk, round) in out.chunks_exact_mut(8).zip(rounds) {
        chunk.copy_from_slice(&round);
    }
    out
}

/// Four concatenated xxHash64 rounds (seeds 0..=3)
pub fn twox_256(data: &[u8]) -> [u8; 32] {
    let rounds = twox_rounds::<4>(data);
    let mut out = [0u8; 32];
    for (chunk, round) in out.chunks_exact_mut(8).zip(rounds) {
        chunk.copy_from_slice(&round);
    }
    out
}

fn twox_rounds<const N: usize>(data: &[u8]) -> [[u8; 8]; N] {
    let mut rounds = [[0u8; 8]; N];
    for (seed, round) in rounds.iter_mut().enumerate() {
        let mut hasher = XxHash64::with_seed(seed as u64);
        hasher.write(data);
        *round = hasher.finish().to_le_bytes();
    }
    rounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blake2_256_empty() {
        assert_eq!(
            hex::encode(blake2_256(b"")),
            "0e5751c026e543b2e8ab2eb06099daa1d1e5df47778f7787faab45cdf12fe3a8"
        );
    }

    #[test]
    fn test_twox_128_known_prefixes() {
        // well-known storage prefixes
        assert_eq!(
            hex::encode(twox_128(b"System")),
            "26aa394eea5630e07c48ae0c9558cef7"
        );
        assert_eq!(
            hex::encode(twox_128(b"Balances")),
            "c2261276cc9d1f8598ea4b6a74b15c2f"
        );
    }

    #[test]
    fn test_twox_widths_share_prefix() {
        let data = b"Sudo Key";
        assert_eq!(twox_128(data)[..8], twox_64(data));
        assert_eq!(twox_256(data)[..16], twox_128(data));
    }

    #[test]
    fn test_blake2_128_differs_from_truncated_256() {
        // output length is a parameter of blake2b, not a truncation
        assert_ne!(blake2_128(b"abc")[..], blake2_256(b"abc")[..16]);
    }
}
