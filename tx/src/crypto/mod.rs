//! # Cryptographic Primitives for Vela
//!
//! Thin, type-safe wrappers around the two primitives the transaction
//! format is built on:
//!
//! - **Keccak-256** for every digest: signing hashes, wire hashes, and
//!   address derivation.
//! - **secp256k1 ECDSA** with public-key recovery, via `k256`. Recovery is
//!   the whole point — the wire format carries no sender address, only a
//!   signature you derive it from.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Everything here delegates to audited implementations; this
//! module only decides what bytes go in and what shape comes out. If you're
//! tempted to optimize these functions, please reconsider. Then reconsider
//! again. Then go read about timing attacks and come back when you've lost
//! the urge.

pub mod hash;
pub mod keys;

// Re-export the things people actually need so they don't have to memorize
// our module hierarchy.
pub use hash::{keccak256, public_key_to_address};
pub use keys::{recover_public_key, KeyError, VelaKeypair};
