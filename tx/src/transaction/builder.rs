//! The transaction record and its builder.
//!
//! [`Transaction`] is the canonical in-memory form: every field already
//! normalized, ready to be listed in wire order. [`TransactionBuilder`]
//! is the only way to construct one from loose inputs — it accepts the
//! same polymorphic shapes the RPC ecosystem uses (integers, hex strings,
//! raw bytes) and reports the first structural problem as a typed error
//! instead of producing a transaction that hashes wrong.
//!
//! The builder does not sign — that happens in [`super::signing`]. This
//! separation keeps construction testable without key material.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::config::{ADDRESS_LENGTH, PUBLIC_KEY_LENGTH, RAW_FIELD_COUNT, REPLAY_PROTECTION_OFFSET};
use super::fields::{serde_hex_bytes, AddressField, AddressInput, DataInput, FieldError, Uint, UintInput};

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// A Vela transaction.
///
/// Twelve logical fields in canonical form. Unsigned fresh from the
/// builder (`v == 0`, empty `r`/`s`), signed after
/// [`sign_transaction`](super::signing::sign_transaction) fills the
/// signature slots. The sender is never stored — it is recovered from the
/// signature on demand and memoized.
///
/// The JSON view (serde) renders byte fields as `0x`-prefixed hex and
/// accepts the original wire-format aliases `gas` and `input` for
/// `gasLimit` and `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Per-sender sequence number.
    pub nonce: Uint,

    /// Price per gas unit, in the ledger's smallest denomination.
    pub gas_price: Uint,

    /// Gas ceiling for execution. Must cover at least the intrinsic fee
    /// (see [`base_fee`](Transaction::base_fee)).
    #[serde(alias = "gas")]
    pub gas_limit: Uint,

    /// Recipient address; empty means contract creation.
    pub to: AddressField,

    /// Transferred amount.
    pub value: Uint,

    /// Call data or contract init code.
    #[serde(with = "serde_hex_bytes", alias = "input")]
    pub data: Vec<u8>,

    /// 0 for a global transaction, non-zero for subchain routing.
    pub sharding_flag: Uint,

    /// Subchain node ("vnode") relay address; empty for global
    /// transactions.
    pub via: AddressField,

    /// The chain this transaction is bound to. Zero only for legacy
    /// payloads that predate replay protection.
    pub chain_id: u64,

    /// Recovery component with the chain id folded in
    /// (`recovery_id + 35 + 2 * chain_id`). Zero while unsigned.
    pub v: u64,

    /// ECDSA signature scalar r. Empty while unsigned.
    pub r: Uint,

    /// ECDSA signature scalar s. Empty while unsigned; never above half
    /// the group order in anything this crate produces.
    pub s: Uint,

    // Memoized recovery results. Idempotent caches: recomputation yields
    // the same value, so a race costs duplicate work, never a wrong answer.
    #[serde(skip)]
    pub(crate) sender_pubkey_cache: OnceCell<[u8; PUBLIC_KEY_LENGTH]>,
    #[serde(skip)]
    pub(crate) sender_cache: OnceCell<[u8; ADDRESS_LENGTH]>,
}

impl PartialEq for Transaction {
    /// Equality is over the twelve logical fields; the memoization cells
    /// are derived state and deliberately excluded.
    fn eq(&self, other: &Self) -> bool {
        self.nonce == other.nonce
            && self.gas_price == other.gas_price
            && self.gas_limit == other.gas_limit
            && self.to == other.to
            && self.value == other.value
            && self.data == other.data
            && self.sharding_flag == other.sharding_flag
            && self.via == other.via
            && self.chain_id == other.chain_id
            && self.v == other.v
            && self.r == other.r
            && self.s == other.s
    }
}

impl Eq for Transaction {}

impl Transaction {
    /// True once the signature slots are populated.
    pub fn is_signed(&self) -> bool {
        self.v != 0
    }

    /// True iff `to` is empty — the transaction deploys code instead of
    /// calling an account.
    pub fn is_contract_creation(&self) -> bool {
        self.to.is_empty()
    }

    /// Derive a chain id from an embedded `v`: `(v - 35) / 2`, clamped to
    /// zero for legacy 27/28 values.
    pub fn chain_id_from_v(v: u64) -> u64 {
        v.saturating_sub(REPLAY_PROTECTION_OFFSET) / 2
    }

    /// The ordered raw field list — the exact twelve byte strings the
    /// codec serializes, in wire order.
    ///
    /// Slot 1 is the reserved systemContractFlag, always empty (zero).
    /// Slot 9 holds `v` once signed and the chain id before that, which is
    /// what makes an unsigned encoding carry its replay-protection intent.
    pub fn raw_items(&self) -> Vec<Vec<u8>> {
        let v_slot = if self.is_signed() {
            Uint::from_u64(self.v)
        } else {
            Uint::from_u64(self.chain_id)
        };

        let items = vec![
            self.nonce.as_bytes().to_vec(),
            Vec::new(), // systemContractFlag, reserved as zero
            self.gas_price.as_bytes().to_vec(),
            self.gas_limit.as_bytes().to_vec(),
            self.to.as_slice().to_vec(),
            self.value.as_bytes().to_vec(),
            self.data.clone(),
            self.sharding_flag.as_bytes().to_vec(),
            self.via.as_slice().to_vec(),
            v_slot.as_bytes().to_vec(),
            self.r.as_bytes().to_vec(),
            self.s.as_bytes().to_vec(),
        ];
        debug_assert_eq!(items.len(), RAW_FIELD_COUNT);
        items
    }
}

// ---------------------------------------------------------------------------
// TransactionBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`Transaction`].
///
/// Every setter takes the field's natural polymorphic input — `u64`,
/// `&[u8]`, or a hex string — and normalization happens once, in
/// [`build`](Self::build). Unset fields default the way the wire format
/// expects: integers to zero, addresses and data to empty.
///
/// # Usage
///
/// ```
/// use vela_tx::transaction::TransactionBuilder;
///
/// let tx = TransactionBuilder::new()
///     .nonce(0u64)
///     .gas_price("0x09184e72a000")
///     .gas_limit(100_000u64)
///     .to("0x7f3b2a00000000000000000000000000000000ff")
///     .value(1_000_000u64)
///     .chain_id(101)
///     .build()
///     .expect("well-formed fields");
///
/// assert!(!tx.is_signed());
/// assert!(!tx.is_contract_creation());
/// ```
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    nonce: Option<UintInput>,
    gas_price: Option<UintInput>,
    gas_limit: Option<UintInput>,
    to: Option<AddressInput>,
    value: Option<UintInput>,
    data: Option<DataInput>,
    sharding_flag: Option<UintInput>,
    via: Option<AddressInput>,
    chain_id: u64,
}

impl TransactionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, nonce: impl Into<UintInput>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn gas_price(mut self, gas_price: impl Into<UintInput>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    pub fn gas_limit(mut self, gas_limit: impl Into<UintInput>) -> Self {
        self.gas_limit = Some(gas_limit.into());
        self
    }

    /// Alias for [`gas_limit`](Self::gas_limit), matching the RPC field
    /// name `gas`.
    pub fn gas(self, gas: impl Into<UintInput>) -> Self {
        self.gas_limit(gas)
    }

    /// Recipient. Omit (or pass `"0x"`) for contract creation.
    pub fn to(mut self, to: impl Into<AddressInput>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn value(mut self, value: impl Into<UintInput>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn data(mut self, data: impl Into<DataInput>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Alias for [`data`](Self::data), matching the RPC field name
    /// `input`.
    pub fn input(self, input: impl Into<DataInput>) -> Self {
        self.data(input)
    }

    /// Subchain routing flag. Defaults to 0 (a global transaction).
    pub fn sharding_flag(mut self, flag: impl Into<UintInput>) -> Self {
        self.sharding_flag = Some(flag.into());
        self
    }

    /// Subchain relay address. Defaults to empty.
    pub fn via(mut self, via: impl Into<AddressInput>) -> Self {
        self.via = Some(via.into());
        self
    }

    /// The chain to bind the signature to. Required (≥ 1) before signing;
    /// leaving it zero builds a legacy transaction that
    /// [`sign_transaction`](super::signing::sign_transaction) will refuse.
    pub fn chain_id(mut self, chain_id: u64) -> Self {
        self.chain_id = chain_id;
        self
    }

    /// Normalize every field and produce an unsigned [`Transaction`].
    ///
    /// # Errors
    ///
    /// Returns the first [`FieldError`] encountered: oversized integers,
    /// malformed hex, or addresses that are neither empty nor 20 bytes.
    pub fn build(self) -> Result<Transaction, FieldError> {
        let normalize_uint = |input: Option<UintInput>, field: &'static str| match input {
            Some(value) => value.normalize(field),
            None => Ok(Uint::zero()),
        };
        let normalize_addr = |input: Option<AddressInput>, field: &'static str| match input {
            Some(value) => value.normalize(field),
            None => Ok(AddressField::empty()),
        };

        Ok(Transaction {
            nonce: normalize_uint(self.nonce, "nonce")?,
            gas_price: normalize_uint(self.gas_price, "gasPrice")?,
            gas_limit: normalize_uint(self.gas_limit, "gasLimit")?,
            to: normalize_addr(self.to, "to")?,
            value: normalize_uint(self.value, "value")?,
            data: match self.data {
                Some(d) => d.normalize("data")?,
                None => Vec::new(),
            },
            sharding_flag: normalize_uint(self.sharding_flag, "shardingFlag")?,
            via: normalize_addr(self.via, "via")?,
            chain_id: self.chain_id,
            v: 0,
            r: Uint::zero(),
            s: Uint::zero(),
            sender_pubkey_cache: OnceCell::new(),
            sender_cache: OnceCell::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
