//! Pre-broadcast validation: signature and intrinsic fee checks.
//!
//! A node will silently drop a transaction whose gas limit can't cover the
//! intrinsic fee, and reject one whose signature doesn't recover. Both are
//! cheap to check locally, so wallets run this pass before burning an RPC
//! round trip.
//!
//! Unlike the fail-fast style used elsewhere, validation is exhaustive:
//! every check runs and every failure is reported. A user fixing a
//! transaction wants the full list, not a guessing game one error at a
//! time.

use primitive_types::U256;
use thiserror::Error;
use tracing::debug;

use super::builder::Transaction;
use crate::config::{TX_CREATE_GAS, TX_DATA_NON_ZERO_GAS, TX_DATA_ZERO_GAS, TX_GAS};
use super::fields::Uint;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A single failed validation check.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Recovery failed: unsigned, malleable `s`, inconsistent `v`, or the
    /// primitive rejected the signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// The gas limit does not cover the intrinsic fee.
    #[error("gas limit is too low: need at least {required}, got {gas_limit}")]
    FeeTooLow { required: u64, gas_limit: Uint },
}

/// The outcome of a validation pass: empty means valid.
///
/// `Display` joins all failure reasons into one line, which is what ends
/// up in logs and error responses.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

// ---------------------------------------------------------------------------
// Fee arithmetic
// ---------------------------------------------------------------------------

impl Transaction {
    /// Gas charged for the data payload: 4 per zero byte, 68 per non-zero
    /// byte.
    pub fn data_fee(&self) -> u64 {
        self.data.iter().fold(0u64, |fee, &byte| {
            fee.saturating_add(if byte == 0 {
                TX_DATA_ZERO_GAS
            } else {
                TX_DATA_NON_ZERO_GAS
            })
        })
    }

    /// The intrinsic fee: data fee plus the flat per-transaction cost,
    /// plus the creation surcharge when `to` is empty.
    pub fn base_fee(&self) -> u64 {
        let mut fee = self.data_fee().saturating_add(TX_GAS);
        if self.is_contract_creation() {
            fee = fee.saturating_add(TX_CREATE_GAS);
        }
        fee
    }

    /// The balance the sender must hold for this transaction to be
    /// includable: `gas_limit * gas_price + value`, in 256-bit arithmetic
    /// because all three operands can individually be 32 bytes wide.
    pub fn upfront_cost(&self) -> U256 {
        let gas_limit = U256::from_big_endian(self.gas_limit.as_bytes());
        let gas_price = U256::from_big_endian(self.gas_price.as_bytes());
        let value = U256::from_big_endian(self.value.as_bytes());
        gas_limit
            .saturating_mul(gas_price)
            .saturating_add(value)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Run every check and report every failure.
    pub fn validate_report(&self) -> ValidationReport {
        let mut errors = Vec::new();

        // Both checks always run; a bad signature must not hide a bad fee.
        if !self.verify_signature() {
            errors.push(ValidationError::InvalidSignature);
        }

        let required = self.base_fee();
        let covered = match self.gas_limit.to_u128() {
            Some(limit) => limit >= u128::from(required),
            // Wider than 128 bits dwarfs any intrinsic fee.
            None => true,
        };
        if !covered {
            errors.push(ValidationError::FeeTooLow {
                required,
                gas_limit: self.gas_limit.clone(),
            });
        }

        if !errors.is_empty() {
            debug!(failures = errors.len(), "transaction failed validation");
        }
        ValidationReport { errors }
    }

    /// Boolean form: all checks passed.
    pub fn validate(&self) -> bool {
        self.validate_report().is_valid()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
