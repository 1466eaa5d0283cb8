//! Serde adapters for 256-bit integers in state snapshots.
//!
//! Snapshots produced by chain-state fetchers encode big integers as JSON
//! strings, usually decimal, occasionally `0x`-prefixed hex; small values
//! sometimes arrive as plain JSON numbers.  Every adapter here accepts all
//! three forms on input and always writes decimal strings on output, so a
//! serialized state diffs cleanly against the fixture it came from.
//!
//! ```text
//! #[serde(with = "crate::config::big_int")]        U256
//! #[serde(with = "crate::config::big_int::vec")]   Vec<U256>
//! #[serde(with = "crate::config::big_int::signed")] I256
//! ```

use ethnum::U256;
use serde::{Deserializer, Serializer};

/// Writes a `U256` as a decimal string.
///
/// # Errors
///
/// Propagates the serializer's error.
pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(value)
}

/// Reads a `U256` from a number, decimal string or `0x` string.
///
/// # Errors
///
/// Returns the deserializer's error on malformed or out-of-range input.
pub fn deserialize<'de, D>(deserializer: D) -> Result<U256, D::Error>
where
    D: Deserializer<'de>,
{
    ethnum::serde::permissive::deserialize(deserializer)
}

/// `Vec<U256>` adapter.
pub mod vec {
    use ethnum::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(transparent)]
    struct Item(#[serde(deserialize_with = "super::deserialize")] U256);

    /// Writes each element as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(values: &[U256], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(ToString::to_string))
    }

    /// Reads a sequence of permissive integers.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error on any malformed element.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|item| item.0).collect())
    }
}

/// `I256` adapter.
pub mod signed {
    use ethnum::I256;
    use serde::{Deserializer, Serializer};

    /// Writes an `I256` as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(value: &I256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    /// Reads an `I256` from a number, decimal string or `0x` string.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error on malformed input.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<I256, D::Error>
    where
        D: Deserializer<'de>,
    {
        ethnum::serde::permissive::deserialize(deserializer)
    }
}

/// `Vec<I256>` adapter.
pub mod signed_vec {
    use ethnum::I256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(transparent)]
    struct Item(#[serde(deserialize_with = "super::signed::deserialize")] I256);

    /// Writes each element as a decimal string.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(values: &[I256], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(values.iter().map(ToString::to_string))
    }

    /// Reads a sequence of permissive signed integers.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error on any malformed element.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<I256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Item>::deserialize(deserializer)?;
        Ok(items.into_iter().map(|item| item.0).collect())
    }
}

/// `Option<U256>` adapter; `null` and a missing field both read as `None`.
pub mod option {
    use ethnum::U256;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(transparent)]
    struct Item(#[serde(deserialize_with = "super::deserialize")] U256);

    /// Writes `Some` as a decimal string and `None` as `null`.
    ///
    /// # Errors
    ///
    /// Propagates the serializer's error.
    pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    /// Reads an optional permissive integer.
    ///
    /// # Errors
    ///
    /// Returns the deserializer's error on malformed input.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<U256>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Item>::deserialize(deserializer)?.map(|item| item.0))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use ethnum::{I256, U256};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super")]
        amount: U256,
        #[serde(with = "super::vec")]
        balances: Vec<U256>,
        #[serde(with = "super::signed")]
        delta: I256,
        #[serde(default, with = "super::option")]
        limit: Option<U256>,
    }

    #[test]
    fn accepts_decimal_hex_and_numbers() {
        let json = r#"{"amount":"1000000000000000000","balances":["0x10",7],"delta":"-5"}"#;
        let Ok(sample) = serde_json::from_str::<Sample>(json) else {
            panic!("expected valid sample");
        };
        assert_eq!(sample.amount, U256::new(1_000_000_000_000_000_000));
        assert_eq!(sample.balances, vec![U256::new(16), U256::new(7)]);
        assert_eq!(sample.delta, I256::new(-5));
        assert_eq!(sample.limit, None);
    }

    #[test]
    fn writes_decimal_strings() {
        let sample = Sample {
            amount: U256::new(42),
            balances: vec![U256::new(1), U256::new(2)],
            delta: I256::new(-3),
            limit: Some(U256::new(9)),
        };
        let Ok(json) = serde_json::to_string(&sample) else {
            panic!("expected serialization");
        };
        assert_eq!(
            json,
            r#"{"amount":"42","balances":["1","2"],"delta":"-3","limit":"9"}"#
        );
    }

    #[test]
    fn rejects_garbage() {
        let json = r#"{"amount":"12abc","balances":[],"delta":"0"}"#;
        assert!(serde_json::from_str::<Sample>(json).is_err());
    }
}
