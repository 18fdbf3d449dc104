//! # Protocol Configuration & Constants
//!
//! Every magic number in the Vela transaction format lives here. If you're
//! hardcoding a constant somewhere else, you're doing it wrong and you owe
//! the team coffee.
//!
//! These values are consensus-critical: the fee schedule and the replay
//! protection offsets must match the node software byte for byte, or the
//! transactions this crate produces will be rejected (best case) or signed
//! for the wrong chain (worst case).

// ---------------------------------------------------------------------------
// Network Identifiers
// ---------------------------------------------------------------------------

/// Mainnet chain id — the real deal. Mistakes here cost real money.
pub const CHAIN_ID_MAINNET: u64 = 99;

/// Testnet chain id — where we break things on purpose and call it "testing."
pub const CHAIN_ID_TESTNET: u64 = 101;

// ---------------------------------------------------------------------------
// Replay Protection
// ---------------------------------------------------------------------------

/// Offset folded into `v` when a chain id is embedded:
/// `v = recovery_id + REPLAY_PROTECTION_OFFSET + 2 * chain_id`.
///
/// The inverse — `chain_id = (v - 35) / 2` — is how a decoded transaction
/// reveals which chain it was signed for.
pub const REPLAY_PROTECTION_OFFSET: u64 = 35;

/// Legacy (pre-replay-protection) signatures carry `v` as `27 + recovery_id`.
pub const LEGACY_V_BASE: u64 = 27;

// ---------------------------------------------------------------------------
// Wire Format
// ---------------------------------------------------------------------------

/// Number of items in the canonical RLP list: nonce, systemContractFlag,
/// gasPrice, gasLimit, to, value, data, shardingFlag, via, v, r, s.
pub const RAW_FIELD_COUNT: usize = 12;

/// Index of the `v` slot in the canonical list. Everything before it is
/// covered by the signing hash; it and the two slots after it hold the
/// signature (or the chain-id placeholder before signing).
pub const V_POSITION: usize = 9;

/// Items covered by the legacy (chain id = 0) signing hash.
pub const LEGACY_SIGNING_FIELD_COUNT: usize = 6;

/// Integer fields (nonce, gasPrice, gasLimit, value, r, s) never exceed
/// 32 bytes in their minimal big-endian form.
pub const MAX_INT_FIELD_LENGTH: usize = 32;

/// Vela addresses are 20 bytes, same derivation as the base ledger:
/// the last 20 bytes of the Keccak-256 of the public key.
pub const ADDRESS_LENGTH: usize = 20;

// ---------------------------------------------------------------------------
// Cryptographic Parameters
// ---------------------------------------------------------------------------

/// secp256k1 — not our choice to make: the ledger requires public-key
/// recovery from signatures, which Ed25519 cannot do. With RFC 6979
/// deterministic nonces the usual ECDSA k-value footguns are defused.
pub const SIGNING_ALGORITHM: &str = "secp256k1-ECDSA";

/// Private keys are 32 bytes.
pub const SECRET_KEY_LENGTH: usize = 32;

/// Public keys travel in SEC1 uncompressed form: 0x04 tag + 32-byte X +
/// 32-byte Y. The address is derived from the 64 bytes after the tag.
pub const PUBLIC_KEY_LENGTH: usize = 65;

/// Keccak-256 digests are 32 bytes. (Keccak, not NIST SHA-3 — the padding
/// differs, and mixing them up is a rite of passage nobody enjoys.)
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Half the secp256k1 group order, big-endian. Signatures with `s` above
/// this line are malleable — `s` and `n - s` both verify — so they are
/// rejected outright during recovery.
pub const SECP256K1_HALF_N: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, //
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, //
    0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

// ---------------------------------------------------------------------------
// Fee Schedule
// ---------------------------------------------------------------------------

/// Flat cost charged to every transaction, contract call or not.
pub const TX_GAS: u64 = 21_000;

/// Per-byte cost for zero bytes in the data payload. Zero bytes compress
/// well in storage, so they're cheap.
pub const TX_DATA_ZERO_GAS: u64 = 4;

/// Per-byte cost for non-zero bytes in the data payload.
pub const TX_DATA_NON_ZERO_GAS: u64 = 68;

/// Surcharge for contract creation (empty `to`). Deploying code costs more
/// than calling it.
pub const TX_CREATE_GAS: u64 = 32_000;

// ---------------------------------------------------------------------------
// Utility
// ---------------------------------------------------------------------------

/// Friendly name for a chain id, mainly for logging. Unknown chains get
/// the number back because we're helpful like that.
pub fn network_name(chain_id: u64) -> String {
    match chain_id {
        CHAIN_ID_MAINNET => "mainnet".to_string(),
        CHAIN_ID_TESTNET => "testnet".to_string(),
        other => format!("chain({})", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_ids_are_distinct() {
        assert_ne!(CHAIN_ID_MAINNET, CHAIN_ID_TESTNET);
    }

    #[test]
    fn test_network_name_formatting() {
        assert_eq!(network_name(CHAIN_ID_MAINNET), "mainnet");
        assert_eq!(network_name(CHAIN_ID_TESTNET), "testnet");
        assert_eq!(network_name(7), "chain(7)");
    }

    #[test]
    fn test_fee_constants_sanity() {
        // Non-zero bytes must cost more than zero bytes, and creation must
        // cost more than the flat fee. Obvious, but stranger things have
        // shipped to production.
        assert!(TX_DATA_NON_ZERO_GAS > TX_DATA_ZERO_GAS);
        assert!(TX_CREATE_GAS > TX_GAS);
    }

    #[test]
    fn test_v_position_splits_the_raw_list() {
        // 9 signed fields + v + r + s = 12.
        assert_eq!(V_POSITION + 3, RAW_FIELD_COUNT);
    }

    #[test]
    fn test_half_n_matches_known_value() {
        let expected =
            hex::decode("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0")
                .unwrap();
        assert_eq!(SECP256K1_HALF_N.as_slice(), expected.as_slice());
    }
}
