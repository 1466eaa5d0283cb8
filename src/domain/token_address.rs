//! Case-insensitive token address.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A token address as supplied by the chain-state fetcher.
///
/// EVM addresses arrive in mixed case (checksummed or not), so the
/// address is normalised to lowercase on construction and compared by
/// value afterwards.
///
/// # Examples
///
/// ```
/// use balancer_maths::domain::TokenAddress;
///
/// let a = TokenAddress::new("0xAbC0");
/// let b = TokenAddress::new("0xabc0");
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "0xabc0");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TokenAddress(String);

impl TokenAddress {
    /// Creates a normalised address.
    #[must_use]
    pub fn new(address: &str) -> Self {
        Self(address.to_ascii_lowercase())
    }

    /// Returns the lowercase address string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a raw string.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other)
    }
}

impl From<String> for TokenAddress {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

impl From<&str> for TokenAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<TokenAddress> for String {
    fn from(value: TokenAddress) -> Self {
        value.0
    }
}

impl fmt::Display for TokenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn normalises_case() {
        let addr = TokenAddress::new("0xDEADbeef");
        assert_eq!(addr.as_str(), "0xdeadbeef");
        assert_eq!(addr.to_string(), "0xdeadbeef");
    }

    #[test]
    fn matches_ignores_case() {
        let addr = TokenAddress::new("0xabc");
        assert!(addr.matches("0xABC"));
        assert!(!addr.matches("0xabd"));
    }

    #[test]
    fn equality_after_normalisation() {
        assert_eq!(TokenAddress::from("0xA"), TokenAddress::from("0xa".to_string()));
    }

    #[test]
    fn serde_round_trip_lowercases() {
        let Ok(addr) = serde_json::from_str::<TokenAddress>("\"0xFF\"") else {
            panic!("expected address");
        };
        assert_eq!(addr.as_str(), "0xff");
        let Ok(json) = serde_json::to_string(&addr) else {
            panic!("expected json");
        };
        assert_eq!(json, "\"0xff\"");
    }
}
