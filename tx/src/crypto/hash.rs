//! # Hashing Utilities
//!
//! Keccak-256 and the address derivation built on top of it.
//!
//! One hash function, used everywhere: signing hashes, wire hashes, and
//! addresses all come out of Keccak-256. Note that this is the original
//! Keccak submission, *not* NIST SHA-3 — the two differ in padding and
//! produce different digests for the same input. The `sha3` crate's
//! `Keccak256` type is the right one; `Sha3_256` is the wrong one. This
//! mistake has been made before. It will be made again. Not here.

use sha3::{Digest, Keccak256};

use crate::config::ADDRESS_LENGTH;

/// Compute the Keccak-256 digest of the input.
///
/// Returns a fixed 32-byte array. Used for transaction signing hashes,
/// wire hashes, and address derivation.
///
/// # Example
///
/// ```
/// use vela_tx::crypto::keccak256;
///
/// let digest = keccak256(b"");
/// assert_eq!(
///     hex::encode(digest),
///     "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
/// );
/// ```
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Derive a Vela address from a public key: the last 20 bytes of the
/// Keccak-256 of the 64-byte public key body.
///
/// Accepts either the 65-byte SEC1 uncompressed form (leading `0x04` tag,
/// which is stripped) or the raw 64-byte X‖Y body. Anything else is a
/// programming error upstream, so we return `None` rather than guess.
pub fn public_key_to_address(public_key: &[u8]) -> Option<[u8; ADDRESS_LENGTH]> {
    let body = match public_key.len() {
        65 if public_key[0] == 0x04 => &public_key[1..],
        64 => public_key,
        _ => return None,
    };
    let digest = keccak256(body);
    let mut addr = [0u8; ADDRESS_LENGTH];
    addr.copy_from_slice(&digest[32 - ADDRESS_LENGTH..]);
    Some(addr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak256_empty_input_known_vector() {
        // Keccak-256 of the empty string. If this returns the SHA-3 value
        // (a7ffc6f8...) instead, the wrong hasher snuck in.
        let digest = keccak256(b"");
        assert_eq!(
            hex::encode(digest),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn keccak256_deterministic() {
        assert_eq!(keccak256(b"vela"), keccak256(b"vela"));
        assert_ne!(keccak256(b"vela"), keccak256(b"Vela"));
    }

    #[test]
    fn address_from_tagged_and_raw_forms_agree() {
        let mut tagged = vec![0x04];
        tagged.extend_from_slice(&[0xAB; 64]);
        let from_tagged = public_key_to_address(&tagged).unwrap();
        let from_raw = public_key_to_address(&[0xAB; 64]).unwrap();
        assert_eq!(from_tagged, from_raw);
    }

    #[test]
    fn address_rejects_malformed_keys() {
        assert!(public_key_to_address(&[0u8; 33]).is_none());
        // 65 bytes without the 0x04 tag is not a valid uncompressed key.
        assert!(public_key_to_address(&[0u8; 65]).is_none());
        assert!(public_key_to_address(b"").is_none());
    }

    #[test]
    fn address_is_20_bytes_of_the_digest_tail() {
        let body = [0x11u8; 64];
        let addr = public_key_to_address(&body).unwrap();
        let digest = keccak256(&body);
        assert_eq!(addr.as_slice(), &digest[12..]);
    }
}
