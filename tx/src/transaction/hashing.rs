//! The two transaction digests: one to sign, one to identify.
//!
//! **Signing hash** — what the private key actually signs. With a chain id
//! present, the nine signed fields are extended with three placeholder
//! items (chainId, empty, empty) standing in for v, r, s; hashing the
//! chain id into the preimage is what makes a signature worthless on any
//! other chain. With no chain id (legacy payloads only), the hash covers
//! just the first six fields, with no placeholders — the original,
//! replayable construction, kept solely so old payloads still verify.
//!
//! **Wire hash** — Keccak-256 over the full twelve-item encoding including
//! the signature. This is the transaction hash a node reports back after
//! broadcast.

use super::builder::Transaction;
use super::codec::encode_items;
use super::fields::Uint;
use crate::config::{LEGACY_SIGNING_FIELD_COUNT, V_POSITION};
use crate::crypto::hash::keccak256;

impl Transaction {
    /// The digest covered by the signature ("exclude signature" mode).
    pub fn signing_hash(&self) -> [u8; 32] {
        let raw = self.raw_items();
        let preimage = if self.chain_id > 0 {
            let mut items = raw[..V_POSITION].to_vec();
            items.push(Uint::from_u64(self.chain_id).as_bytes().to_vec());
            items.push(Vec::new());
            items.push(Vec::new());
            items
        } else {
            raw[..LEGACY_SIGNING_FIELD_COUNT].to_vec()
        };
        keccak256(&encode_items(&preimage))
    }

    /// The digest of the complete wire form ("include signature" mode),
    /// signature slots as they currently stand.
    pub fn wire_hash(&self) -> [u8; 32] {
        keccak256(&self.encode())
    }
}
