//! Signing, sender recovery, and the malleability guard.
//!
//! Signing is a separate step from building because the private key may
//! not live anywhere near the code assembling fields (hardware wallet,
//! remote signer). [`sign_transaction`] takes an unsigned transaction and
//! a keypair, and returns the canonical wire payload — the exact bytes a
//! node's raw-transaction RPC expects.
//!
//! The reverse direction never needs the key: the sender's public key is
//! *recovered* from (signing hash, v, r, s), and the address derived from
//! it. Both are memoized on the transaction, so validators pay the curve
//! math once per instance.
//!
//! Preconditions are errors, not panics. A zero chain id in particular is
//! refused outright: signing without replay protection produces a payload
//! any fork of the ledger will accept, and nobody has ever wanted that on
//! purpose.

use thiserror::Error;
use tracing::{debug, trace};

use super::builder::Transaction;
use super::fields::Uint;
use crate::config::{
    network_name, ADDRESS_LENGTH, LEGACY_V_BASE, PUBLIC_KEY_LENGTH, REPLAY_PROTECTION_OFFSET,
};
use crate::crypto::hash::public_key_to_address;
use crate::crypto::keys::{is_high_s, recover_public_key, KeyError, VelaKeypair};

use once_cell::sync::OnceCell;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failures while signing or recovering. Precondition violations and
/// primitive failures share one enum because callers branch on them the
/// same way: the transaction did not get a valid signature.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignError {
    /// Signing requires `chain_id >= 1`.
    #[error("chain id is missing or zero; refusing to produce a replayable signature")]
    MissingChainId,

    /// Signing requires a non-zero gas limit.
    #[error("gas limit is missing")]
    MissingGasLimit,

    /// Recovery was attempted on an unsigned transaction.
    #[error("transaction is not signed")]
    NotSigned,

    /// `s` lies in the upper half of the group order. Both `s` and
    /// `n - s` verify for the same message, so accepting this form would
    /// let anyone mint a second valid encoding of an already-signed
    /// transaction.
    #[error("signature s-value is in the malleable upper half of the curve order")]
    MalleableSignature,

    /// `v` does not decompose into a 0/1 recovery id for this chain.
    #[error("recovery component v = {v} is inconsistent with chain id {chain_id}")]
    InvalidV { v: u64, chain_id: u64 },

    /// The curve primitive rejected the operation.
    #[error(transparent)]
    Key(#[from] KeyError),
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

/// Sign a transaction in place and return the canonical wire payload.
///
/// The procedure:
/// 1. Check preconditions: `chain_id >= 1`, gas limit present.
/// 2. Compute the signing hash (chain id and two empty placeholders
///    standing in for the signature slots).
/// 3. Produce a deterministic (RFC 6979) recoverable ECDSA signature.
/// 4. Fold the chain id into `v` (`recovery_id + 35 + 2 * chain_id`) and
///    store minimally-encoded `v`, `r`, `s`.
/// 5. Re-encode the full twelve-item list — the returned bytes are the
///    payload for the node's raw-transaction submission call.
///
/// Re-signing an already-signed transaction overwrites the signature
/// slots and drops any previously recovered sender.
///
/// # Errors
///
/// [`SignError::MissingChainId`], [`SignError::MissingGasLimit`], or a
/// wrapped [`KeyError`] from the curve primitive. On error the
/// transaction is left untouched.
pub fn sign_transaction(
    tx: &mut Transaction,
    keypair: &VelaKeypair,
) -> Result<Vec<u8>, SignError> {
    if tx.chain_id == 0 {
        return Err(SignError::MissingChainId);
    }
    if tx.gas_limit.is_zero() {
        return Err(SignError::MissingGasLimit);
    }

    let hash = tx.signing_hash();
    let (signature, recovery_id) = keypair.sign_prehash(&hash)?;

    let sig_bytes = signature.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    tx.v = u64::from(recovery_id.to_byte()) + REPLAY_PROTECTION_OFFSET + 2 * tx.chain_id;
    tx.r = Uint::from_scalar(&r);
    tx.s = Uint::from_scalar(&s);

    // Anything recovered from a previous signature is now stale.
    tx.sender_pubkey_cache = OnceCell::new();
    tx.sender_cache = OnceCell::new();

    debug!(
        chain = %network_name(tx.chain_id),
        signer = %keypair.address_hex(),
        "transaction signed"
    );
    Ok(tx.encode())
}

// ---------------------------------------------------------------------------
// Recovery
// ---------------------------------------------------------------------------

impl Transaction {
    /// Strip the chain-id (or legacy 27/28) offset from `v`, leaving the
    /// raw 0/1 recovery id the curve primitive wants.
    fn raw_recovery_id(&self) -> Result<u8, SignError> {
        let base = if self.chain_id > 0 {
            REPLAY_PROTECTION_OFFSET + 2 * self.chain_id
        } else {
            LEGACY_V_BASE
        };
        match self.v.checked_sub(base) {
            Some(rec @ 0..=1) => Ok(rec as u8),
            _ => Err(SignError::InvalidV {
                v: self.v,
                chain_id: self.chain_id,
            }),
        }
    }

    /// Recover the sender's SEC1 uncompressed public key, memoized.
    ///
    /// The malleability guard runs first and unconditionally: an `s` above
    /// half the group order fails here no matter what the recovery
    /// primitive would have said about it.
    pub fn sender_public_key(&self) -> Result<&[u8; PUBLIC_KEY_LENGTH], SignError> {
        if !self.is_signed() {
            return Err(SignError::NotSigned);
        }
        if is_high_s(&self.s.to_padded_32()) {
            return Err(SignError::MalleableSignature);
        }
        let recovery_id = self.raw_recovery_id()?;

        self.sender_pubkey_cache.get_or_try_init(|| {
            let hash = self.signing_hash();
            trace!(v = self.v, "recovering sender public key");
            recover_public_key(
                &hash,
                recovery_id,
                &self.r.to_padded_32(),
                &self.s.to_padded_32(),
            )
            .map_err(SignError::from)
        })
    }

    /// The sender's 20-byte address, derived from the recovered public
    /// key and memoized. Never an input — always a function of the
    /// signature.
    pub fn sender_address(&self) -> Result<[u8; ADDRESS_LENGTH], SignError> {
        let public_key = self.sender_public_key()?;
        let addr = self.sender_cache.get_or_try_init(|| {
            public_key_to_address(public_key).ok_or(SignError::Key(KeyError::RecoveryFailed))
        })?;
        Ok(*addr)
    }

    /// Boolean form of recovery for callers that only want yes/no. Any
    /// failure — unsigned, malleable `s`, inconsistent `v`, primitive
    /// rejection — is just "no".
    pub fn verify_signature(&self) -> bool {
        self.sender_public_key().is_ok()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SECP256K1_HALF_N;
    use crate::transaction::TransactionBuilder;

    fn test_keypair() -> VelaKeypair {
        VelaKeypair::from_bytes(&[
            0x78, 0x10, 0xBC, 0x2A, 0x63, 0x96, 0x19, 0xF6, 0x16, 0x06, 0xB7, 0x89, 0xED, 0x05,
            0x72, 0x3B, 0x94, 0x3A, 0x57, 0x78, 0x59, 0x41, 0x22, 0x5F, 0x1C, 0xD7, 0x10, 0xA0,
            0x1D, 0xC4, 0xCE, 0xF3,
        ])
        .unwrap()
    }

    fn unsigned_tx(chain_id: u64) -> Transaction {
        TransactionBuilder::new()
            .nonce(1u64)
            .gas_price(25_000_000_000u64)
            .gas_limit(100_000u64)
            .to("0x1234567890123456789012345678901234567890")
            .value(1_000u64)
            .data("0xc0de")
            .chain_id(chain_id)
            .build()
            .unwrap()
    }

    #[test]
    fn sign_embeds_chain_id_in_v() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(101);
        sign_transaction(&mut tx, &kp).unwrap();

        assert!(tx.is_signed());
        let recovery_id = tx.v - REPLAY_PROTECTION_OFFSET - 2 * 101;
        assert!(recovery_id <= 1, "v = {} does not decompose", tx.v);
        assert_eq!(Transaction::chain_id_from_v(tx.v), 101);
    }

    #[test]
    fn chain_id_roundtrip_through_the_wire() {
        // Sign for chain 101, ship the payload, decode it cold: the chain
        // id and the sender must come back out.
        let kp = test_keypair();
        let mut tx = unsigned_tx(101);
        let payload = sign_transaction(&mut tx, &kp).unwrap();

        let decoded = Transaction::decode(&payload).unwrap();
        assert_eq!(decoded.chain_id, 101);
        assert_eq!(decoded, tx);
        assert_eq!(decoded.sender_address().unwrap(), kp.address());
    }

    #[test]
    fn signing_is_deterministic() {
        let kp = test_keypair();
        let mut tx1 = unsigned_tx(101);
        let mut tx2 = unsigned_tx(101);
        let payload1 = sign_transaction(&mut tx1, &kp).unwrap();
        let payload2 = sign_transaction(&mut tx2, &kp).unwrap();
        assert_eq!(
            payload1, payload2,
            "RFC 6979 nonces make signing reproducible byte for byte"
        );
    }

    #[test]
    fn zero_chain_id_is_a_precondition_error() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(0);
        assert_eq!(
            sign_transaction(&mut tx, &kp),
            Err(SignError::MissingChainId)
        );
        assert!(!tx.is_signed(), "a failed sign must not touch the slots");
    }

    #[test]
    fn missing_gas_limit_is_a_precondition_error() {
        let kp = test_keypair();
        let mut tx = TransactionBuilder::new().chain_id(101).build().unwrap();
        assert_eq!(
            sign_transaction(&mut tx, &kp),
            Err(SignError::MissingGasLimit)
        );
    }

    #[test]
    fn recovered_sender_matches_the_signing_key() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(99);
        sign_transaction(&mut tx, &kp).unwrap();

        assert!(tx.verify_signature());
        assert_eq!(*tx.sender_public_key().unwrap(), kp.public_key_bytes());
        assert_eq!(tx.sender_address().unwrap(), kp.address());
    }

    #[test]
    fn sender_is_memoized() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(99);
        sign_transaction(&mut tx, &kp).unwrap();

        assert!(tx.sender_cache.get().is_none());
        let first = tx.sender_address().unwrap();
        assert!(tx.sender_cache.get().is_some());
        assert_eq!(tx.sender_address().unwrap(), first);
    }

    #[test]
    fn high_s_fails_verification_unconditionally() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(101);
        sign_transaction(&mut tx, &kp).unwrap();

        // Replace s with n/2 + 1. Whatever the recovery primitive would
        // make of it, the malleability guard must fire first.
        let mut high = SECP256K1_HALF_N;
        high[31] += 1;
        tx.s = Uint::from_scalar(&high);
        tx.sender_pubkey_cache = OnceCell::new();
        tx.sender_cache = OnceCell::new();

        assert_eq!(
            tx.sender_public_key().err(),
            Some(SignError::MalleableSignature)
        );
        assert!(!tx.verify_signature());
    }

    #[test]
    fn inconsistent_v_fails_recovery() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(101);
        sign_transaction(&mut tx, &kp).unwrap();

        tx.v = 100; // not 237/238, which chain 101 would produce
        assert_eq!(
            tx.sender_public_key().err(),
            Some(SignError::InvalidV { v: 100, chain_id: 101 })
        );
    }

    #[test]
    fn unsigned_transaction_does_not_verify() {
        let tx = unsigned_tx(101);
        assert_eq!(tx.sender_public_key().err(), Some(SignError::NotSigned));
        assert!(!tx.verify_signature());
    }

    #[test]
    fn tampered_payload_changes_the_recovered_sender() {
        let kp = test_keypair();
        let mut tx = unsigned_tx(101);
        sign_transaction(&mut tx, &kp).unwrap();

        let mut tampered = tx.clone();
        tampered.value = Uint::from_u64(2_000);
        tampered.sender_pubkey_cache = OnceCell::new();
        tampered.sender_cache = OnceCell::new();

        // Recovery over the altered hash either fails outright or yields
        // some unrelated key — never the original signer.
        match tampered.sender_address() {
            Ok(addr) => assert_ne!(addr, kp.address()),
            Err(_) => {}
        }
    }

    #[test]
    fn re_signing_overwrites_signature_and_sender() {
        let kp1 = test_keypair();
        let kp2 = VelaKeypair::from_bytes(&[0x42; 32]).unwrap();

        let mut tx = unsigned_tx(101);
        sign_transaction(&mut tx, &kp1).unwrap();
        assert_eq!(tx.sender_address().unwrap(), kp1.address());

        sign_transaction(&mut tx, &kp2).unwrap();
        assert_eq!(
            tx.sender_address().unwrap(),
            kp2.address(),
            "stale recovered sender must not survive a re-sign"
        );
    }

    #[test]
    fn legacy_27_28_signatures_still_verify() {
        // Pre-replay-protection payloads carry chain id zero and v in
        // {27, 28}. We refuse to *create* them, but we still verify them.
        let kp = test_keypair();
        let mut tx = unsigned_tx(0);

        let hash = tx.signing_hash();
        let (signature, recovery_id) = kp.sign_prehash(&hash).unwrap();
        let sig_bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        tx.v = LEGACY_V_BASE + u64::from(recovery_id.to_byte());
        tx.r = Uint::from_scalar(&r);
        tx.s = Uint::from_scalar(&s);

        assert_eq!(tx.sender_address().unwrap(), kp.address());
    }
}
