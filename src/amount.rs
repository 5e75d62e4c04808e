use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point decimal with 2 decimal places, stored as a scaled integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Amount(i64);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("'{0}' is not a valid amount")]
    Invalid(String),
    #[error("amount must be greater than zero")]
    NotPositive,
}

impl Amount {
    const SCALE: i64 = 100;
    const DECIMALS: usize = 2;

    pub fn from_scaled(value: i64) -> Self {
        Amount(value)
    }

    pub fn scaled(self) -> i64 {
        self.0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    /// Parse a plain decimal such as `50000`, `50,000` or `1250.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(AmountError::Empty);
        }
        let invalid = || AmountError::Invalid(trimmed.to_string());

        // thousands separators are common in hand-typed amounts
        let digits: String = trimmed.chars().filter(|c| *c != ',').collect();
        let (negative, digits) = match digits.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, digits.as_str()),
        };
        let (whole, frac) = digits.split_once('.').unwrap_or((digits, ""));

        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > Self::DECIMALS
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        let frac: i64 = format!("{frac:0<width$}", width = Self::DECIMALS)
            .parse()
            .map_err(|_| invalid())?;

        let scaled = whole
            .checked_mul(Self::SCALE)
            .and_then(|v| v.checked_add(frac))
            .ok_or_else(invalid)?;
        Ok(Amount(if negative { -scaled } else { scaled }))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let whole = abs / Self::SCALE as u64;
        let frac = abs % Self::SCALE as u64;
        write!(f, "{sign}{whole}.{frac:02}")
    }
}
