//! Three-letter currency codes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// A three-letter uppercase currency identifier (ISO 4217-like).
///
/// Only the shape is checked: any three ASCII letters form a valid code, so
/// providers decide which currencies they actually support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// Parses a code, normalising it to uppercase.
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let bytes = code.trim().as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(DomainError::InvalidCurrencyCode(code.to_string()));
        }

        let mut normalised = [0u8; 3];
        for (slot, b) in normalised.iter_mut().zip(bytes) {
            *slot = b.to_ascii_uppercase();
        }
        Ok(Self(normalised))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Always ASCII: enforced by `new`.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.as_str().to_string()
    }
}
