//! ERC-4626 buffer conversions.
//!
//! A buffer swaps between a yield-bearing vault share (the wrapped token)
//! and its underlying asset at the vault's stored rate.  There is no
//! invariant: each direction maps to one of the four ERC-4626 preview
//! functions.
//!
//! | Direction | Kind | Preview | Rounding |
//! |-----------|------|---------|----------|
//! | Wrap | GivenIn | `preview_deposit` | down |
//! | Wrap | GivenOut | `preview_mint` | up |
//! | Unwrap | GivenIn | `preview_redeem` | down |
//! | Unwrap | GivenOut | `preview_withdraw` | up |

use core::fmt;

use ethnum::U256;
use tracing::debug;

use crate::config::BufferState;
use crate::domain::{SwapInput, SwapKind};
use crate::error::AmmError;
use crate::math::{div_down, div_up, mul_down, mul_up};
use crate::traits::FromConfig;

/// Smallest raw amount a buffer operation accepts.
pub const MINIMUM_WRAP_AMOUNT: U256 = U256::new(1_000_000);

/// Which way a buffer converts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrappingDirection {
    /// Underlying asset in, vault share out.
    Wrap,
    /// Vault share in, underlying asset out.
    Unwrap,
}

impl fmt::Display for WrappingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrap => write!(f, "wrap"),
            Self::Unwrap => write!(f, "unwrap"),
        }
    }
}

/// Converts `amount_raw` through the buffer at `rate`.
///
/// For wraps, `max_deposit` bounds the assets of a GivenIn and `max_mint`
/// the shares of a GivenOut; `None` means unbounded.
///
/// # Errors
///
/// - [`AmmError::ExceededMaxDeposit`] / [`AmmError::ExceededMaxMint`] when
///   a wrap exceeds the vault's limit.
/// - Fixed-point errors from the conversion.
pub fn calculate_buffer_amounts(
    direction: WrappingDirection,
    kind: SwapKind,
    amount_raw: U256,
    rate: U256,
    max_deposit: Option<U256>,
    max_mint: Option<U256>,
) -> Result<U256, AmmError> {
    match (direction, kind) {
        (WrappingDirection::Wrap, SwapKind::GivenIn) => {
            let max = max_deposit.unwrap_or(U256::MAX);
            if amount_raw > max {
                return Err(AmmError::ExceededMaxDeposit {
                    amount: amount_raw,
                    max,
                });
            }
            div_down(amount_raw, rate)
        }
        (WrappingDirection::Wrap, SwapKind::GivenOut) => {
            let max = max_mint.unwrap_or(U256::MAX);
            if amount_raw > max {
                return Err(AmmError::ExceededMaxMint {
                    amount: amount_raw,
                    max,
                });
            }
            mul_up(amount_raw, rate)
        }
        (WrappingDirection::Unwrap, SwapKind::GivenIn) => mul_down(amount_raw, rate),
        (WrappingDirection::Unwrap, SwapKind::GivenOut) => div_up(amount_raw, rate),
    }
}

/// An ERC-4626 buffer frozen at its quote-time rate and limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferPool {
    pool_address: String,
    rate: U256,
    max_deposit: Option<U256>,
    max_mint: Option<U256>,
}

impl BufferPool {
    /// Assets per share, 18 decimals.
    #[must_use]
    pub const fn rate(&self) -> U256 {
        self.rate
    }

    /// Selling the buffer's own token (the share) unwraps it; anything
    /// else wraps.
    #[must_use]
    pub fn direction(&self, token_in: &str) -> WrappingDirection {
        if token_in.eq_ignore_ascii_case(&self.pool_address) {
            WrappingDirection::Unwrap
        } else {
            WrappingDirection::Wrap
        }
    }

    /// Quotes a wrap or unwrap in raw units.
    ///
    /// # Errors
    ///
    /// - [`AmmError::WrapAmountTooSmall`] below [`MINIMUM_WRAP_AMOUNT`].
    /// - Any error of [`calculate_buffer_amounts`].
    pub fn swap(&self, input: &SwapInput) -> Result<U256, AmmError> {
        if input.amount_raw < MINIMUM_WRAP_AMOUNT {
            return Err(AmmError::WrapAmountTooSmall);
        }
        let direction = self.direction(input.token_in.as_str());
        debug!(%direction, kind = %input.swap_kind, "buffer conversion");
        calculate_buffer_amounts(
            direction,
            input.swap_kind,
            input.amount_raw,
            self.rate,
            self.max_deposit,
            self.max_mint,
        )
    }
}

impl FromConfig<BufferState> for BufferPool {
    fn from_config(config: &BufferState) -> Result<Self, AmmError> {
        config.validate()?;
        Ok(Self {
            pool_address: config.share_address().to_owned(),
            rate: config.rate,
            max_deposit: config.max_deposit,
            max_mint: config.max_mint,
        })
    }
}

/// Quotes `input` against a buffer snapshot.
///
/// # Errors
///
/// Invalid snapshots and every error of [`BufferPool::swap`].
pub fn erc4626_buffer_wrap_or_unwrap(
    input: &SwapInput,
    state: &BufferState,
) -> Result<U256, AmmError> {
    BufferPool::from_config(state)?.swap(input)
}
