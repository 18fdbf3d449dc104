//! # Transaction Module
//!
//! Construction, canonical encoding, hashing, signing, recovery, and
//! validation for Vela transactions — the part of the crate where a wrong
//! byte is a security bug, not a formatting nit.
//!
//! ## Architecture
//!
//! ```text
//! fields.rs   — Canonical field types (Uint, AddressField) and normalization
//! builder.rs  — The Transaction record and its fluent builder
//! codec.rs    — RLP wire codec: the twelve-item canonical list
//! hashing.rs  — Signing hash (chain-id aware) and wire hash
//! signing.rs  — ECDSA signing, sender recovery, malleability guard
//! validate.rs — Intrinsic fee + signature checks with full diagnostics
//! ```
//!
//! ## Transaction Lifecycle
//!
//! 1. **Build** — [`TransactionBuilder`] normalizes loose field inputs.
//! 2. **Sign** — [`sign_transaction`] fills v/r/s and returns the wire
//!    payload.
//! 3. **Broadcast** — hand the payload to your RPC transport (not our
//!    department).
//! 4. **Verify** — [`Transaction::sender_address`] recovers the sender
//!    from any decoded payload; [`Transaction::validate_report`] runs the
//!    pre-broadcast checks.
//!
//! ## Design Decisions
//!
//! - One struct, not a runtime schema: every field has a static type that
//!   enforces its own canonical form at assignment time.
//! - The unsigned wire form carries the chain id in the v slot, so
//!   "which chain is this for" survives serialization even before signing.
//! - Signing requires a chain id. The legacy chain-id-zero hash exists
//!   only to verify old payloads, never to make new ones.

pub mod builder;
pub mod codec;
pub mod fields;
pub mod hashing;
pub mod signing;
pub mod validate;

pub use builder::{Transaction, TransactionBuilder};
pub use codec::DecodeError;
pub use fields::{AddressField, FieldError, Uint};
pub use signing::{sign_transaction, SignError};
pub use validate::{ValidationError, ValidationReport};
