//! The catalog's own episode identifier.

use std::fmt;
use std::str::FromStr;

/// Catalog episode number: an integer with at most one fractional digit
/// (`265`, `265.4`). Stored in tenths so ordering and equality are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RemoteNumber {
    tenths: u32,
}

/// Error for strings that are not `<digits>[.<digit>]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRemoteNumberError(pub String);

impl fmt::Display for ParseRemoteNumberError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid remote episode number: {:?}", self.0)
    }
}

impl std::error::Error for ParseRemoteNumberError {}

impl RemoteNumber {
    pub const ZERO: RemoteNumber = RemoteNumber { tenths: 0 };

    pub fn whole(n: u32) -> Self {
        Self { tenths: n * 10 }
    }

    pub fn with_fraction(n: u32, digit: u8) -> Self {
        Self {
            tenths: n * 10 + u32::from(digit.min(9)),
        }
    }

    pub fn integer_part(self) -> u32 {
        self.tenths / 10
    }

    pub fn fraction_digit(self) -> Option<u8> {
        match self.tenths % 10 {
            0 => None,
            d => Some(d as u8),
        }
    }

    /// The identifier to search for when walking the catalog backwards:
    /// `floor(n - 1)`. `265.4 -> 264`, `263 -> 262`, `1 -> 0`.
    ///
    /// Sub-numbered episodes cannot be searched for directly, so the probe is
    /// always an integer even when `self` is fractional. Returns `None` once
    /// the probe would go below zero.
    pub fn previous(self) -> Option<RemoteNumber> {
        if self.tenths < 10 {
            return None;
        }
        let minus_one = self.tenths - 10;
        Some(RemoteNumber::whole(minus_one / 10))
    }
}

impl FromStr for RemoteNumber {
    type Err = ParseRemoteNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRemoteNumberError(s.to_string());
        let (int, frac) = match s.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (s, None),
        };
        if int.is_empty() || !int.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let whole: u32 = int.parse().map_err(|_| err())?;
        let digit = match frac {
            None => 0,
            // "265." is tolerated as 265; the catalog has printed it that way.
            Some("") => 0,
            Some(f) if f.len() == 1 && f.as_bytes()[0].is_ascii_digit() => f.as_bytes()[0] - b'0',
            Some(_) => return Err(err()),
        };
        whole
            .checked_mul(10)
            .and_then(|t| t.checked_add(u32::from(digit)))
            .map(|tenths| RemoteNumber { tenths })
            .ok_or_else(err)
    }
}

impl fmt::Display for RemoteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fraction_digit() {
            Some(d) => write!(f, "{}.{}", self.integer_part(), d),
            None => write!(f, "{}", self.integer_part()),
        }
    }
}
