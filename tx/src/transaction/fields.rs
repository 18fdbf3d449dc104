//! Canonical field representations and normalization.
//!
//! Every scalar in a Vela transaction travels as a variable-length
//! big-endian byte string with no leading zeros, and zero itself is the
//! empty string. [`Uint`] owns that rule; [`AddressField`] owns the
//! "empty or exactly 20 bytes" rule for `to` and `via`. All accepted input
//! shapes — integers, byte slices, hex strings with or without `0x` —
//! funnel through these two types, so the rest of the crate only ever sees
//! canonical bytes.
//!
//! Normalization is deliberately asymmetric: *assignment* is forgiving
//! (leading zeros are trimmed, odd-length hex is left-padded), while the
//! *decode* path is strict (padded integers are rejected). A wallet typing
//! `0x00` for a nonce shouldn't fail; a wire payload carrying `0x00` for a
//! nonce is corrupt.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::config::{ADDRESS_LENGTH, MAX_INT_FIELD_LENGTH};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Structural errors raised while normalizing or decoding a field.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// An integer field is longer than its declared maximum.
    #[error("{field} exceeds {max} bytes: got {got}")]
    Oversized {
        field: &'static str,
        max: usize,
        got: usize,
    },

    /// An address field is neither empty nor exactly 20 bytes.
    #[error("{field} must be empty or exactly {ADDRESS_LENGTH} bytes: got {got}")]
    BadAddressLength { field: &'static str, got: usize },

    /// A decoded integer carries leading zero bytes.
    #[error("{field} is not minimally encoded: leading zero bytes")]
    PaddedInteger { field: &'static str },

    /// A hex string failed to parse.
    #[error("{field} is not valid hex: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    /// A numeric field (v, chainId) is too wide for its 64-bit carrier.
    #[error("{field} does not fit in 64 bits")]
    Overflow { field: &'static str },
}

// ---------------------------------------------------------------------------
// Uint
// ---------------------------------------------------------------------------

/// A non-negative integer in canonical minimal big-endian form.
///
/// Invariants, enforced by every constructor:
/// - no leading zero byte,
/// - at most 32 bytes,
/// - zero is the empty byte string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash)]
pub struct Uint(Vec<u8>);

impl Uint {
    /// The canonical zero.
    pub fn zero() -> Self {
        Self(Vec::new())
    }

    pub fn from_u64(value: u64) -> Self {
        Self::trim(&value.to_be_bytes())
    }

    pub fn from_u128(value: u128) -> Self {
        Self::trim(&value.to_be_bytes())
    }

    /// Normalize a big-endian byte slice: trim leading zeros, then enforce
    /// the 32-byte cap.
    pub fn from_bytes(field: &'static str, bytes: &[u8]) -> Result<Self, FieldError> {
        let trimmed = Self::trim(bytes);
        if trimmed.0.len() > MAX_INT_FIELD_LENGTH {
            return Err(FieldError::Oversized {
                field,
                max: MAX_INT_FIELD_LENGTH,
                got: trimmed.0.len(),
            });
        }
        Ok(trimmed)
    }

    /// Parse a hex string, with or without `0x`. Odd-length hex is
    /// left-padded with a zero nibble before decoding; the empty string
    /// (and bare `0x`) is zero.
    pub fn from_hex(field: &'static str, hex_str: &str) -> Result<Self, FieldError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if stripped.is_empty() {
            return Ok(Self::zero());
        }
        let padded;
        let digits = if stripped.len() % 2 == 1 {
            padded = format!("0{}", stripped);
            padded.as_str()
        } else {
            stripped
        };
        let bytes = hex::decode(digits).map_err(|e| FieldError::InvalidHex {
            field,
            reason: e.to_string(),
        })?;
        Self::from_bytes(field, &bytes)
    }

    /// Strict constructor for the decode path: the input must already be
    /// canonical. Leading zeros are a structural error, not something to
    /// silently repair — a padded integer changes the signing hash.
    pub fn from_canonical(field: &'static str, bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.first() == Some(&0) {
            return Err(FieldError::PaddedInteger { field });
        }
        if bytes.len() > MAX_INT_FIELD_LENGTH {
            return Err(FieldError::Oversized {
                field,
                max: MAX_INT_FIELD_LENGTH,
                got: bytes.len(),
            });
        }
        Ok(Self(bytes.to_vec()))
    }

    /// Trim a fixed 32-byte signature scalar to minimal form. Infallible:
    /// the input is already within the field-width cap.
    pub(crate) fn from_scalar(bytes: &[u8; 32]) -> Self {
        Self::trim(bytes)
    }

    fn trim(bytes: &[u8]) -> Self {
        let first_nonzero = bytes.iter().position(|&b| b != 0);
        match first_nonzero {
            Some(i) => Self(bytes[i..].to_vec()),
            None => Self(Vec::new()),
        }
    }

    /// The canonical byte form. Empty means zero.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_empty()
    }

    /// Numeric value, if it fits in 64 bits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0.len() > 8 {
            return None;
        }
        let mut out = 0u64;
        for &b in &self.0 {
            out = (out << 8) | u64::from(b);
        }
        Some(out)
    }

    /// Numeric value, if it fits in 128 bits.
    pub fn to_u128(&self) -> Option<u128> {
        if self.0.len() > 16 {
            return None;
        }
        let mut out = 0u128;
        for &b in &self.0 {
            out = (out << 8) | u128::from(b);
        }
        Some(out)
    }

    /// The value left-padded to 32 bytes, for handing scalars to the curve
    /// primitive.
    pub fn to_padded_32(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out[32 - self.0.len()..].copy_from_slice(&self.0);
        out
    }

    /// `0x`-prefixed hex. Zero renders as `0x`.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl std::fmt::Display for Uint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<u64> for Uint {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl From<u128> for Uint {
    fn from(value: u128) -> Self {
        Self::from_u128(value)
    }
}

impl Serialize for Uint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Uint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Uint::from_hex("integer field", &s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// AddressField
// ---------------------------------------------------------------------------

/// A `to` or `via` slot: either absent (the empty item on the wire) or a
/// 20-byte address. An absent `to` is what makes a transaction a contract
/// creation, so "empty" is a first-class state here, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct AddressField(Option<[u8; ADDRESS_LENGTH]>);

impl AddressField {
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn from_array(addr: [u8; ADDRESS_LENGTH]) -> Self {
        Self(Some(addr))
    }

    /// Empty slice means absent; anything else must be exactly 20 bytes.
    pub fn from_bytes(field: &'static str, bytes: &[u8]) -> Result<Self, FieldError> {
        if bytes.is_empty() {
            return Ok(Self(None));
        }
        if bytes.len() != ADDRESS_LENGTH {
            return Err(FieldError::BadAddressLength {
                field,
                got: bytes.len(),
            });
        }
        let mut addr = [0u8; ADDRESS_LENGTH];
        addr.copy_from_slice(bytes);
        Ok(Self(Some(addr)))
    }

    /// Parse `""`, `"0x"`, or a 40-digit hex address (prefixed or not).
    pub fn from_hex(field: &'static str, hex_str: &str) -> Result<Self, FieldError> {
        let stripped = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        if stripped.is_empty() {
            return Ok(Self(None));
        }
        let bytes = hex::decode(stripped).map_err(|e| FieldError::InvalidHex {
            field,
            reason: e.to_string(),
        })?;
        Self::from_bytes(field, &bytes)
    }

    /// The wire form: 20 bytes, or empty when absent.
    pub fn as_slice(&self) -> &[u8] {
        match &self.0 {
            Some(addr) => addr.as_slice(),
            None => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    pub fn as_array(&self) -> Option<[u8; ADDRESS_LENGTH]> {
        self.0
    }

    /// `0x`-prefixed hex; absent renders as bare `0x`.
    pub fn to_hex(&self) -> String {
        match &self.0 {
            Some(addr) => format!("0x{}", hex::encode(addr)),
            None => "0x".to_string(),
        }
    }
}

impl Serialize for AddressField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AddressField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        AddressField::from_hex("address field", &s).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Input adapters
// ---------------------------------------------------------------------------

/// The input shapes an integer field accepts: native integers, big-endian
/// bytes, or hex strings. This is the statically-typed version of "pass
/// whatever you have and we'll figure it out".
#[derive(Debug, Clone)]
pub enum UintInput {
    Int(u128),
    Bytes(Vec<u8>),
    Hex(String),
}

impl UintInput {
    pub(crate) fn normalize(self, field: &'static str) -> Result<Uint, FieldError> {
        match self {
            UintInput::Int(v) => Ok(Uint::from_u128(v)),
            UintInput::Bytes(b) => Uint::from_bytes(field, &b),
            UintInput::Hex(s) => Uint::from_hex(field, &s),
        }
    }
}

impl From<u64> for UintInput {
    fn from(v: u64) -> Self {
        Self::Int(v as u128)
    }
}

impl From<u128> for UintInput {
    fn from(v: u128) -> Self {
        Self::Int(v)
    }
}

impl From<&[u8]> for UintInput {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for UintInput {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&str> for UintInput {
    fn from(v: &str) -> Self {
        Self::Hex(v.to_string())
    }
}

impl From<String> for UintInput {
    fn from(v: String) -> Self {
        Self::Hex(v)
    }
}

/// The input shapes an address slot accepts.
#[derive(Debug, Clone)]
pub enum AddressInput {
    Bytes(Vec<u8>),
    Hex(String),
}

impl AddressInput {
    pub(crate) fn normalize(self, field: &'static str) -> Result<AddressField, FieldError> {
        match self {
            AddressInput::Bytes(b) => AddressField::from_bytes(field, &b),
            AddressInput::Hex(s) => AddressField::from_hex(field, &s),
        }
    }
}

impl From<[u8; ADDRESS_LENGTH]> for AddressInput {
    fn from(v: [u8; ADDRESS_LENGTH]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<&[u8]> for AddressInput {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for AddressInput {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&str> for AddressInput {
    fn from(v: &str) -> Self {
        Self::Hex(v.to_string())
    }
}

/// The input shapes the data payload accepts: raw bytes pass through
/// untouched, strings are parsed as hex.
#[derive(Debug, Clone)]
pub enum DataInput {
    Bytes(Vec<u8>),
    Hex(String),
}

impl DataInput {
    pub(crate) fn normalize(self, field: &'static str) -> Result<Vec<u8>, FieldError> {
        match self {
            DataInput::Bytes(b) => Ok(b),
            DataInput::Hex(s) => {
                let stripped = s.strip_prefix("0x").unwrap_or(&s);
                hex::decode(stripped).map_err(|e| FieldError::InvalidHex {
                    field,
                    reason: e.to_string(),
                })
            }
        }
    }
}

impl From<&[u8]> for DataInput {
    fn from(v: &[u8]) -> Self {
        Self::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for DataInput {
    fn from(v: Vec<u8>) -> Self {
        Self::Bytes(v)
    }
}

impl From<&str> for DataInput {
    fn from(v: &str) -> Self {
        Self::Hex(v.to_string())
    }
}

/// Serde adapter rendering `Vec<u8>` as `0x`-prefixed hex, used for the
/// transaction's data payload in the JSON view.
pub(crate) mod serde_hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        let stripped = s.strip_prefix("0x").unwrap_or(&s);
        hex::decode(stripped).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
