// Copyright (c) 2026 Vela Labs. MIT License.
// See LICENSE for details.

//! # Vela Transaction Library
//!
//! Everything a wallet needs to put a transaction on the Vela ledger:
//! construction, canonical RLP encoding, Keccak-256 hashing, secp256k1
//! signing with chain-id replay protection, sender recovery, and
//! pre-broadcast validation.
//!
//! Vela is account-based and Ethereum-derived, with two extra routing
//! fields the base ledger doesn't have: a `shardingFlag` that marks a
//! transaction as global or subchain-bound, and a `via` address naming the
//! subchain node that relays it. Both participate in the signing hash, so
//! getting a single byte wrong here doesn't produce an error — it produces
//! a transaction some other chain will happily accept. Hence this crate.
//!
//! ## Architecture
//!
//! The crate mirrors the actual pipeline a transaction moves through:
//!
//! - **transaction** — The field model, codec, hashing, signing, and
//!   validation. The part with real correctness hazards.
//! - **crypto** — Thin, type-safe wrappers over the curve and hash
//!   primitives (`k256`, Keccak-256). We compose audited implementations;
//!   we do not reimplement them.
//! - **config** — Every protocol constant in one place: chain ids, the fee
//!   schedule, field-width limits, the half curve order.
//!
//! ## What this crate is not
//!
//! No RPC client, no keystore, no CLI. Those are collaborators: you hand
//! `sign_transaction` a 32-byte private key from wherever you keep keys,
//! and you hand the returned payload to whatever transport talks to your
//! node. This crate's one promise is that the bytes in between are correct.
//!
//! ## Design Philosophy
//!
//! 1. Correctness over convenience — canonical encodings are enforced, not
//!    suggested.
//! 2. Errors are values. Signing a transaction with a missing chain id
//!    returns an error you can match on; it does not panic.
//! 3. Deterministic everywhere: RFC 6979 nonces, minimal-length integers,
//!    fixed field order. Same inputs, same bytes, every time.

pub mod config;
pub mod crypto;
pub mod transaction;

pub use crypto::keys::VelaKeypair;
pub use transaction::{
    sign_transaction, DecodeError, FieldError, SignError, Transaction, TransactionBuilder,
    ValidationError, ValidationReport,
};
