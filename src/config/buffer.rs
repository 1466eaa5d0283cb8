//! State for ERC-4626 buffers.

use ethnum::U256;
use serde::{Deserialize, Serialize};

use crate::domain::TokenAddress;
use crate::error::AmmError;

/// ERC-4626 buffer snapshot.
///
/// `tokens[0]` is the wrapped (vault share) token and `tokens[1]` the
/// underlying asset.  `rate` is the 18-decimal price of one share in
/// assets; the deposit and mint limits are absent when the vault reports
/// none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferState {
    /// Buffer (wrapped token) address; empty means `tokens[0]`.
    #[serde(default)]
    pub pool_address: String,
    /// `[wrapped, underlying]`.
    pub tokens: Vec<TokenAddress>,
    /// Assets per share, 18 decimals.
    #[serde(with = "super::big_int")]
    pub rate: U256,
    /// Largest asset amount a deposit may take.
    #[serde(default, with = "super::big_int::option", skip_serializing_if = "Option::is_none")]
    pub max_deposit: Option<U256>,
    /// Largest share amount a mint may produce.
    #[serde(default, with = "super::big_int::option", skip_serializing_if = "Option::is_none")]
    pub max_mint: Option<U256>,
}

impl BufferState {
    /// The wrapped token.
    #[must_use]
    pub fn wrapped_token(&self) -> Option<&TokenAddress> {
        self.tokens.first()
    }

    /// The address selling which unwraps: `pool_address`, or the wrapped
    /// token when the snapshot omits it.
    #[must_use]
    pub fn share_address(&self) -> &str {
        match self.wrapped_token() {
            Some(token) if self.pool_address.is_empty() => token.as_str(),
            _ => &self.pool_address,
        }
    }

    /// Validates token count and rate.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidConfiguration`] unless the buffer holds
    /// exactly 2 tokens and a non-zero rate.
    pub fn validate(&self) -> Result<(), AmmError> {
        if self.tokens.len() != 2 {
            return Err(AmmError::InvalidConfiguration(
                "buffers hold exactly 2 tokens",
            ));
        }
        if self.rate == U256::ZERO {
            return Err(AmmError::InvalidConfiguration("buffer rate must be non-zero"));
        }
        Ok(())
    }
}
