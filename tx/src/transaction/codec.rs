//! Wire codec: the canonical RLP form of a transaction.
//!
//! A Vela transaction on the wire is one RLP list of exactly twelve byte
//! strings in fixed order: nonce, systemContractFlag, gasPrice, gasLimit,
//! to, value, data, shardingFlag, via, v, r, s. Unsigned transactions put
//! the chain id in the v slot and leave r and s empty.
//!
//! Encoding is a straight walk over [`Transaction::raw_items`]. Decoding
//! is the adversarial direction — the input came off a network — so every
//! structural assumption is checked: list shape, item count, item types,
//! integer canonicality, address widths, trailing garbage. The round-trip
//! law `decode(encode(tx)) == tx` holds for every well-formed transaction
//! and is enforced by a property test below.

use once_cell::sync::OnceCell;
use rlp::{Rlp, RlpStream};
use thiserror::Error;

use super::builder::Transaction;
use super::fields::{AddressField, FieldError, Uint};
use crate::config::RAW_FIELD_COUNT;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural failures while decoding a wire payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The payload is not an RLP list.
    #[error("transaction payload is not an RLP list")]
    NotAList,

    /// The list does not carry exactly twelve items.
    #[error("expected {RAW_FIELD_COUNT} fields, got {got}")]
    WrongItemCount { got: usize },

    /// Bytes remain after the end of the transaction list.
    #[error("trailing bytes after transaction payload")]
    TrailingBytes,

    /// The reserved systemContractFlag slot carries a non-zero value.
    #[error("reserved system contract flag must be zero")]
    ReservedFieldNotZero,

    /// A field failed normalization (padding, width, address length).
    #[error(transparent)]
    Field(#[from] FieldError),

    /// Malformed RLP: truncated input, bad length prefixes, nested lists
    /// where byte strings belong.
    #[error("malformed RLP: {0}")]
    Rlp(#[from] rlp::DecoderError),
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// RLP-encode an ordered slice of raw byte-string items as a list.
///
/// Shared by the wire encoder and the hasher, which feeds it shorter
/// slices (the six- or twelve-item signing tuples).
pub fn encode_items(items: &[Vec<u8>]) -> Vec<u8> {
    let mut stream = RlpStream::new_list(items.len());
    for item in items {
        stream.append(&item.as_slice());
    }
    stream.out().to_vec()
}

impl Transaction {
    /// The canonical wire encoding: the twelve-item RLP list with the
    /// current signature state. For a signed transaction this is the
    /// payload a node's raw-transaction RPC accepts verbatim.
    pub fn encode(&self) -> Vec<u8> {
        encode_items(&self.raw_items())
    }

    /// Parse a canonical wire payload back into a [`Transaction`].
    ///
    /// Whether the result is signed is decided by the signature slots: a
    /// payload with empty `r` and `s` is unsigned and its v slot is read
    /// as the chain id; otherwise the v slot is the recovery component and
    /// the chain id is derived from it (`(v - 35) / 2`, clamped to zero
    /// for legacy 27/28 values).
    ///
    /// # Errors
    ///
    /// Any structural violation is a [`DecodeError`]; nothing is repaired
    /// silently. A padded integer is corruption, not a formatting choice —
    /// accepting it would change the signing hash.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let list = Rlp::new(payload);
        if !list.is_list() {
            return Err(DecodeError::NotAList);
        }

        let info = list.payload_info()?;
        let total = info.header_len + info.value_len;
        if total > payload.len() {
            return Err(DecodeError::Rlp(rlp::DecoderError::RlpIsTooShort));
        }
        if total < payload.len() {
            return Err(DecodeError::TrailingBytes);
        }

        let count = list.item_count()?;
        if count != RAW_FIELD_COUNT {
            return Err(DecodeError::WrongItemCount { got: count });
        }

        let item = |index: usize| -> Result<Vec<u8>, DecodeError> {
            Ok(list.val_at::<Vec<u8>>(index)?)
        };

        let nonce = Uint::from_canonical("nonce", &item(0)?)?;
        if !item(1)?.is_empty() {
            return Err(DecodeError::ReservedFieldNotZero);
        }
        let gas_price = Uint::from_canonical("gasPrice", &item(2)?)?;
        let gas_limit = Uint::from_canonical("gasLimit", &item(3)?)?;
        let to = AddressField::from_bytes("to", &item(4)?)?;
        let value = Uint::from_canonical("value", &item(5)?)?;
        let data = item(6)?;
        let sharding_flag = Uint::from_canonical("shardingFlag", &item(7)?)?;
        let via = AddressField::from_bytes("via", &item(8)?)?;

        let v_slot = Uint::from_canonical("v", &item(9)?)?
            .to_u64()
            .ok_or(FieldError::Overflow { field: "v" })?;
        let r = Uint::from_canonical("r", &item(10)?)?;
        let s = Uint::from_canonical("s", &item(11)?)?;

        // Empty r and s mean the payload was never signed, so the v slot
        // holds the chain id directly.
        let (v, chain_id) = if r.is_zero() && s.is_zero() {
            (0, v_slot)
        } else {
            (v_slot, Transaction::chain_id_from_v(v_slot))
        };

        Ok(Transaction {
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            data,
            sharding_flag,
            via,
            chain_id,
            v,
            r,
            s,
            sender_pubkey_cache: OnceCell::new(),
            sender_cache: OnceCell::new(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TransactionBuilder;
    use proptest::prelude::*;

    fn sample_tx() -> Transaction {
        TransactionBuilder::new()
            .nonce(7u64)
            .gas_price("0x09184e72a000")
            .gas_limit(100_000u64)
            .to("0x1234567890123456789012345678901234567890")
            .value(1_000u64)
            .data("0x7f7465737432")
            .sharding_flag(1u64)
            .via("0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa")
            .chain_id(101)
            .build()
            .unwrap()
    }

    #[test]
    fn roundtrip_unsigned() {
        let tx = sample_tx();
        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert_eq!(tx, decoded);
        assert!(!decoded.is_signed());
        assert_eq!(decoded.chain_id, 101, "chain id survives the v slot");
    }

    #[test]
    fn roundtrip_contract_creation() {
        let tx = TransactionBuilder::new()
            .nonce(0u64)
            .gas_limit(3_000_000u64)
            .data(vec![0x60, 0x00, 0x57])
            .chain_id(99)
            .build()
            .unwrap();
        let decoded = Transaction::decode(&tx.encode()).unwrap();
        assert!(decoded.is_contract_creation());
        assert_eq!(tx, decoded);
    }

    #[test]
    fn zero_fields_encode_as_empty_items() {
        let tx = TransactionBuilder::new().chain_id(1).build().unwrap();
        let items = tx.raw_items();
        for (i, item) in items.iter().enumerate() {
            if i == 9 {
                assert_eq!(item, &vec![1], "v slot carries the chain id");
            } else {
                assert!(item.is_empty(), "slot {} should be empty", i);
            }
        }
    }

    #[test]
    fn decode_rejects_non_list() {
        // An RLP byte string, not a list.
        let payload = rlp::encode(&b"not a transaction".to_vec()).to_vec();
        assert_eq!(Transaction::decode(&payload), Err(DecodeError::NotAList));
    }

    #[test]
    fn decode_rejects_wrong_item_count() {
        let items = vec![Vec::new(); 9];
        let payload = encode_items(&items);
        assert_eq!(
            Transaction::decode(&payload),
            Err(DecodeError::WrongItemCount { got: 9 })
        );
    }

    #[test]
    fn decode_rejects_truncated_input() {
        let encoded = sample_tx().encode();
        let truncated = &encoded[..encoded.len() - 3];
        assert!(matches!(
            Transaction::decode(truncated),
            Err(DecodeError::Rlp(_)) | Err(DecodeError::TrailingBytes)
        ));
    }

    #[test]
    fn decode_rejects_trailing_garbage() {
        let mut encoded = sample_tx().encode();
        encoded.extend_from_slice(&[0xDE, 0xAD]);
        assert_eq!(
            Transaction::decode(&encoded),
            Err(DecodeError::TrailingBytes)
        );
    }

    #[test]
    fn decode_rejects_padded_integers() {
        // Hand-build a payload whose nonce is 0x0001 — numerically fine,
        // canonically wrong.
        let mut items = sample_tx().raw_items();
        items[0] = vec![0x00, 0x01];
        let payload = encode_items(&items);
        assert_eq!(
            Transaction::decode(&payload),
            Err(DecodeError::Field(FieldError::PaddedInteger {
                field: "nonce"
            }))
        );
    }

    #[test]
    fn decode_rejects_nonzero_reserved_flag() {
        let mut items = sample_tx().raw_items();
        items[1] = vec![0x01];
        let payload = encode_items(&items);
        assert_eq!(
            Transaction::decode(&payload),
            Err(DecodeError::ReservedFieldNotZero)
        );
    }

    #[test]
    fn decode_rejects_bad_address_width() {
        let mut items = sample_tx().raw_items();
        items[4] = vec![0xAB; 19];
        let payload = encode_items(&items);
        assert!(matches!(
            Transaction::decode(&payload),
            Err(DecodeError::Field(FieldError::BadAddressLength {
                field: "to",
                got: 19
            }))
        ));
    }

    #[test]
    fn decode_rejects_nested_lists() {
        let mut stream = rlp::RlpStream::new_list(RAW_FIELD_COUNT);
        stream.begin_list(0); // a list where the nonce belongs
        for _ in 1..RAW_FIELD_COUNT {
            stream.append_empty_data();
        }
        let payload = stream.out().to_vec();
        assert!(matches!(
            Transaction::decode(&payload),
            Err(DecodeError::Rlp(_))
        ));
    }

    #[test]
    fn signed_v_slot_yields_chain_id_and_signature() {
        let mut items = sample_tx().raw_items();
        // v = 1 + 35 + 2*101 = 238, with non-empty r/s.
        items[9] = vec![238];
        items[10] = vec![0x11; 32];
        items[11] = vec![0x22; 32];
        let decoded = Transaction::decode(&encode_items(&items)).unwrap();
        assert!(decoded.is_signed());
        assert_eq!(decoded.v, 238);
        assert_eq!(decoded.chain_id, 101);
    }

    proptest! {
        // The round-trip law, over the whole field space the builder
        // accepts: decode(encode(tx)) reproduces every field exactly.
        #[test]
        fn prop_roundtrip(
            nonce in any::<u64>(),
            gas_price in any::<u128>(),
            gas_limit in any::<u64>(),
            to in proptest::option::of(proptest::array::uniform20(any::<u8>())),
            value in any::<u128>(),
            data in proptest::collection::vec(any::<u8>(), 0..256),
            sharding_flag in 0u64..4,
            via in proptest::option::of(proptest::array::uniform20(any::<u8>())),
            chain_id in 0u64..1_000,
        ) {
            let mut builder = TransactionBuilder::new()
                .nonce(nonce)
                .gas_price(gas_price)
                .gas_limit(gas_limit)
                .value(value)
                .data(data)
                .sharding_flag(sharding_flag)
                .chain_id(chain_id);
            if let Some(addr) = to {
                builder = builder.to(addr);
            }
            if let Some(addr) = via {
                builder = builder.via(addr);
            }
            let tx = builder.build().unwrap();
            let decoded = Transaction::decode(&tx.encode()).unwrap();
            prop_assert_eq!(tx, decoded);
        }
    }
}
