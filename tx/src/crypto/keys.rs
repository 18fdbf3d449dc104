//! # Key Management
//!
//! secp256k1 keypair handling and public-key recovery for Vela accounts.
//!
//! ## Why secp256k1 and not Ed25519?
//!
//! Because the wire format demands it. A Vela transaction carries no sender
//! address — the sender is *recovered* from the signature, and recoverable
//! signatures are an ECDSA feature. What we do insist on is deterministic
//! nonces (RFC 6979, which `k256` implements): signing the same hash with
//! the same key twice must produce byte-identical output, both for sanity
//! and because a bad RNG at signing time can leak the private key
//! (see: PlayStation 3 master key incident, 2010).
//!
//! ## Security considerations
//!
//! - Key bytes are never logged and never appear in `Debug` output.
//! - Key generation uses the OS RNG. If your OS RNG is broken, you have
//!   bigger problems than Vela.
//! - Error messages are intentionally vague about key material.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;
use rand::rngs::OsRng;
use std::fmt;
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, PUBLIC_KEY_LENGTH, SECP256K1_HALF_N, SECRET_KEY_LENGTH};
use crate::crypto::hash::keccak256;

/// Errors during key operations.
///
/// Intentionally vague about *why* something failed — leaking details about
/// key material through error messages is a classic footgun.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("invalid secret key bytes: wrong length or not a valid scalar")]
    InvalidSecretKey,

    #[error("invalid signature components: r or s is not a valid scalar")]
    InvalidSignature,

    #[error("recovery id out of range")]
    InvalidRecoveryId,

    #[error("public key recovery failed")]
    RecoveryFailed,

    #[error("signing failed")]
    SigningFailed,
}

/// A Vela account keypair wrapping a secp256k1 signing key.
///
/// The signing key is the crown jewel — this crate never persists it, never
/// serializes it implicitly, and never prints it. Getting the 32 bytes in
/// and out is a deliberate act via [`from_bytes`](Self::from_bytes) /
/// [`secret_key_bytes`](Self::secret_key_bytes).
///
/// # Examples
///
/// ```
/// use vela_tx::crypto::keys::VelaKeypair;
///
/// let kp = VelaKeypair::generate();
/// assert_eq!(kp.public_key_bytes().len(), 65);
/// assert_eq!(kp.address().len(), 20);
/// ```
pub struct VelaKeypair {
    signing_key: SigningKey,
}

impl VelaKeypair {
    /// Generate a fresh keypair using the OS cryptographic RNG.
    pub fn generate() -> Self {
        Self {
            signing_key: SigningKey::random(&mut OsRng),
        }
    }

    /// Reconstruct a keypair from raw 32-byte secret key material.
    ///
    /// Fails if the bytes are the wrong length, zero, or not below the
    /// curve order — `k256` checks all of that so we don't have to.
    pub fn from_bytes(secret: &[u8]) -> Result<Self, KeyError> {
        if secret.len() != SECRET_KEY_LENGTH {
            return Err(KeyError::InvalidSecretKey);
        }
        let signing_key = SigningKey::from_slice(secret).map_err(|_| KeyError::InvalidSecretKey)?;
        Ok(Self { signing_key })
    }

    /// Reconstruct a keypair from a hex-encoded secret key, with or without
    /// a `0x` prefix.
    ///
    /// Convenience for test fixtures and dev tooling. Please don't put raw
    /// hex keys in config files in production — but for devnet, we're not
    /// going to pretend you won't do it anyway.
    pub fn from_hex(hex_str: &str) -> Result<Self, KeyError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(stripped).map_err(|_| KeyError::InvalidSecretKey)?;
        Self::from_bytes(&bytes)
    }

    /// Exports the raw 32-byte secret key material.
    ///
    /// **Handle with extreme care.** This is the only secret standing
    /// between an attacker and the associated account.
    pub fn secret_key_bytes(&self) -> [u8; SECRET_KEY_LENGTH] {
        self.signing_key.to_bytes().into()
    }

    /// The public key in SEC1 uncompressed form: `0x04 || X || Y`, 65 bytes.
    ///
    /// This is the form the address derivation and the recovery check both
    /// operate on. Safe to share, log, tattoo on your arm, etc.
    pub fn public_key_bytes(&self) -> [u8; PUBLIC_KEY_LENGTH] {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let mut out = [0u8; PUBLIC_KEY_LENGTH];
        out.copy_from_slice(point.as_bytes());
        out
    }

    /// The 20-byte Vela address: last 20 bytes of Keccak-256 over the
    /// 64-byte public key body.
    pub fn address(&self) -> [u8; ADDRESS_LENGTH] {
        let public = self.public_key_bytes();
        let digest = keccak256(&public[1..]);
        let mut addr = [0u8; ADDRESS_LENGTH];
        addr.copy_from_slice(&digest[32 - ADDRESS_LENGTH..]);
        addr
    }

    /// The address as a `0x`-prefixed hex string, for display and JSON.
    pub fn address_hex(&self) -> String {
        format!("0x{}", hex::encode(self.address()))
    }

    /// Sign a 32-byte message digest, returning the signature and its
    /// recovery id.
    ///
    /// Deterministic per RFC 6979: same key + same digest = same signature,
    /// every time. `k256` also normalizes `s` to the low half of the group
    /// order, so the output never trips the malleability guard on the
    /// verification side.
    pub fn sign_prehash(&self, prehash: &[u8; 32]) -> Result<(Signature, RecoveryId), KeyError> {
        self.signing_key
            .sign_prehash_recoverable(prehash)
            .map_err(|_| KeyError::SigningFailed)
    }
}

impl Clone for VelaKeypair {
    /// Cloning a keypair is allowed but should make you uncomfortable.
    /// Every copy of a private key is another thing to protect.
    fn clone(&self) -> Self {
        Self {
            signing_key: self.signing_key.clone(),
        }
    }
}

impl fmt::Debug for VelaKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print secret key material in debug output. Not even
        // "partially." Grepping logs for hex is trivial.
        write!(f, "VelaKeypair(address={})", self.address_hex())
    }
}

impl PartialEq for VelaKeypair {
    /// Two keypairs are equal if their public keys match. Comparing secret
    /// material in a non-constant-time way is a bad habit.
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for VelaKeypair {}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

/// Recover the SEC1 uncompressed public key from a signed digest.
///
/// `r` and `s` are the 32-byte big-endian signature scalars;
/// `recovery_id` is the raw 0/1 value (chain-id and legacy offsets must
/// already be stripped by the caller — this function speaks pure curve).
pub fn recover_public_key(
    prehash: &[u8; 32],
    recovery_id: u8,
    r: &[u8; 32],
    s: &[u8; 32],
) -> Result<[u8; PUBLIC_KEY_LENGTH], KeyError> {
    let signature =
        Signature::from_scalars(*r, *s).map_err(|_| KeyError::InvalidSignature)?;
    let rec_id = RecoveryId::from_byte(recovery_id).ok_or(KeyError::InvalidRecoveryId)?;

    let verifying_key = VerifyingKey::recover_from_prehash(prehash, &signature, rec_id)
        .map_err(|_| KeyError::RecoveryFailed)?;

    let point = verifying_key.to_encoded_point(false);
    let mut out = [0u8; PUBLIC_KEY_LENGTH];
    out.copy_from_slice(point.as_bytes());
    Ok(out)
}

/// Returns `true` if a 32-byte big-endian `s` lies in the malleable upper
/// half of the group order (`s > n/2`).
///
/// Both byte strings are the same length and big-endian, so numeric order
/// is lexicographic order.
pub fn is_high_s(s: &[u8; 32]) -> bool {
    *s > SECP256K1_HALF_N
}
