use std::fmt;
use std::ops::{Add, Sub};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// Trait representing a monetary amount with fixed precision
pub trait AmountType:
    Copy
    + Ord
    + Add<Output = Self>
    + Sub<Output = Self>
    + Default
    + Send
    + Sync
    + fmt::Debug
    + Serialize
    + DeserializeOwned
    + 'static
{
    /// Parse from decimal string (e.g., "1.5000")
    fn from_decimal_str(s: &str) -> Result<Self, DomainError>;

    /// Convert from a JSON-style floating point number, rejecting sub-precision digits
    fn from_f64(value: f64) -> Result<Self, DomainError>;

    /// Whole currency units (e.g. 10_000 rupees)
    fn from_whole_units(units: i64) -> Self;

    /// Convert to decimal string with 4 decimal places
    fn to_decimal_string(&self) -> String;

    /// Lossy conversion for JSON output
    fn to_f64(&self) -> f64;

    /// Checked addition, returns None on overflow
    fn checked_add(&self, other: Self) -> Option<Self>;

    /// Checked subtraction, returns None on underflow
    fn checked_sub(&self, other: Self) -> Option<Self>;

    /// Zero value
    fn zero() -> Self;
}

/// Fixed-point decimal representation using i64 (multiply by 10,000)
/// Represents amounts with 4 decimal places of precision
///
/// Serialized as a plain JSON number; deserialized from a number or a decimal string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(into = "f64", try_from = "AmountRepr")]
pub struct FixedPoint(i64);

/// Wire representations accepted for an amount
#[derive(Deserialize)]
#[serde(untagged)]
pub enum AmountRepr {
    Number(f64),
    Text(String),
}

impl FixedPoint {
    const SCALE: i64 = 10_000;

    /// Create from raw scaled value (for internal use)
    pub fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Get raw scaled value
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl TryFrom<AmountRepr> for FixedPoint {
    type Error = DomainError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Number(value) => Self::from_f64(value),
            AmountRepr::Text(text) => Self::from_decimal_str(&text),
        }
    }
}

impl From<FixedPoint> for f64 {
    fn from(amount: FixedPoint) -> Self {
        amount.to_f64()
    }
}

impl AmountType for FixedPoint {
    fn from_decimal_str(s: &str) -> Result<Self, DomainError> {
        let s = s.trim();

        // Handle negative sign
        let (is_negative, s) = if let Some(stripped) = s.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, s)
        };

        let (integer_part, decimal_part) = match s.split_once('.') {
            Some((_, rest)) if rest.contains('.') => return Err(DomainError::InvalidAmount),
            Some((integer, decimal)) => (integer, decimal),
            None => (s, ""),
        };

        // Validate decimal places (max 4)
        if decimal_part.len() > 4 || !decimal_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidAmount);
        }

        // Digits only; a second sign would otherwise be accepted by i64::parse
        if integer_part.is_empty() || !integer_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::InvalidAmount);
        }

        let integer: i64 = integer_part
            .parse()
            .map_err(|_| DomainError::InvalidAmount)?;

        // Pad to 4 digits
        let decimal: i64 = format!("{:0<4}", decimal_part)
            .parse()
            .map_err(|_| DomainError::InvalidAmount)?;

        let scaled = integer
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(decimal))
            .ok_or(DomainError::Overflow)?;

        Ok(Self(if is_negative { -scaled } else { scaled }))
    }

    fn from_f64(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidAmount);
        }

        let exact = value * Self::SCALE as f64;
        let scaled = exact.round();
        if scaled.abs() >= i64::MAX as f64 {
            return Err(DomainError::Overflow);
        }
        if (exact - scaled).abs() > 1e-6 * scaled.abs().max(1.0) {
            return Err(DomainError::InvalidAmount);
        }

        Ok(Self(scaled as i64))
    }

    fn from_whole_units(units: i64) -> Self {
        Self(units.saturating_mul(Self::SCALE))
    }

    fn to_decimal_string(&self) -> String {
        let abs_value = self.0.unsigned_abs();
        let scale = Self::SCALE as u64;
        let integer_part = abs_value / scale;
        let decimal_part = abs_value % scale;

        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:04}", sign, integer_part, decimal_part)
    }

    fn to_f64(&self) -> f64 {
        self.0 as f64 / Self::SCALE as f64
    }

    fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    fn checked_sub(&self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    fn zero() -> Self {
        Self(0)
    }
}

impl Add for FixedPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl Sub for FixedPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}
