//! Unified error types for the balancer-maths library.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type, so a quote either succeeds with wei-exact amounts or fails
//! with a variant naming the exact on-chain revert it mirrors.
//!
//! Variants are grouped the same way the vault surfaces them:
//!
//! | Group | Raised by |
//! |-------|-----------|
//! | Arithmetic | fixed-point primitives in [`math`](crate::math) |
//! | Bounds | pool math, vault minimum-amount guards, buffers |
//! | Invariant safety | pool invariant and balance solvers |
//! | Configuration | vault resolution, state validation |
//! | Hook protocol | vault lifecycle when a hook returns `success = false` |

use ethnum::U256;

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;

/// Errors produced by vault, pool, hook and math operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmmError {
    // ========================================================================
    // Arithmetic
    // ========================================================================
    /// An addition or multiplication exceeded the 256-bit range.
    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    /// A subtraction went below zero (or below the signed minimum).
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,

    /// Extended-precision division whose scaled numerator left the domain.
    #[error("DivInterval")]
    DivIntervalError,

    /// `pow` base outside `(0, 2^255)`.
    #[error("BaseOutOfBounds")]
    BaseOutOfBounds,

    /// `pow` exponent above the mild exponent bound.
    #[error("ExponentOutOfBounds")]
    ExponentOutOfBounds,

    /// `ln(base) * exponent` outside the natural exponent range.
    #[error("ProductOutOfBounds")]
    ProductOutOfBounds,

    /// `exp` argument outside the natural exponent range.
    #[error("InvalidExponent")]
    InvalidExponent,

    /// A Gyro square root landed outside its tolerance window.
    #[error("sqrt result outside tolerance")]
    SqrtFailed,

    // ========================================================================
    // Bounds
    // ========================================================================
    /// Swap input above the pool's maximum in-ratio.
    #[error("MaxInRatio exceeded")]
    MaxInRatioExceeded,

    /// Swap output above the pool's maximum out-ratio.
    #[error("MaxOutRatio exceeded")]
    MaxOutRatioExceeded,

    /// QuantAMM trade above its maximum trade-size ratio.
    #[error("maxTradeSizeRatio exceeded")]
    MaxTradeSizeRatioExceeded,

    /// Gyro swap would leave a balance outside its asset bounds.
    #[error("AssetBoundsExceeded")]
    AssetBoundsExceeded,

    /// Computed output larger than the balance available.
    #[error("AmountOutGreaterThanBalance")]
    AmountOutGreaterThanBalance,

    /// Given or calculated scaled-18 amount below the minimum trade amount.
    #[error("TradeAmountTooSmall")]
    TradeAmountTooSmall,

    /// Buffer deposit above the vault's `maxDeposit`.
    #[error("ERC4626ExceededMaxDeposit {amount} {max}")]
    ExceededMaxDeposit {
        /// Requested asset amount.
        amount: U256,
        /// Vault limit.
        max: U256,
    },

    /// Buffer mint above the vault's `maxMint`.
    #[error("ERC4626ExceededMaxMint {amount} {max}")]
    ExceededMaxMint {
        /// Requested share amount.
        amount: U256,
        /// Vault limit.
        max: U256,
    },

    /// Buffer wrap or unwrap below the minimum wrap amount.
    #[error("wrapAmountTooSmall")]
    WrapAmountTooSmall,

    // ========================================================================
    // Invariant safety
    // ========================================================================
    /// Invariant evaluated to zero.
    #[error("ZeroInvariant")]
    ZeroInvariant,

    /// Gyro E-CLP balances above the supported maximum.
    #[error("MaxAssetsExceeded")]
    MaxBalancesExceeded,

    /// Gyro E-CLP invariant above the supported maximum.
    #[error("MaxInvariantExceeded")]
    MaxInvariantExceeded,

    /// A pool formula produced a negative output.
    #[error("NegativeAmountOut")]
    NegativeAmountOut,

    /// ReClamm swap would leave a real balance below the minimum.
    #[error("reClammPool: TokenBalanceTooLow")]
    TokenBalanceTooLow,

    /// ReClamm swap would leave the pool too far off center.
    #[error("reClammPool: PoolCenterednessTooLow")]
    PoolCenterednessTooLow,

    /// Stable Newton iteration did not converge within 255 rounds.
    #[error("Stable invariant didn't converge")]
    StableInvariantDidntConverge,

    /// Liquidity operation pushed the invariant ratio above the pool maximum.
    #[error("InvariantRatioAboveMax")]
    InvariantRatioAboveMax,

    /// Liquidity operation pushed the invariant ratio below the pool minimum.
    #[error("InvariantRatioBelowMin")]
    InvariantRatioBelowMin,

    // ========================================================================
    // Configuration
    // ========================================================================
    /// No built-in or registered pool for this type tag.
    #[error("Unsupported Pool Type: {0}")]
    UnsupportedPoolType(String),

    /// No built-in or registered hook for this type tag.
    #[error("Unsupported Hook Type: {0}")]
    UnsupportedHookType(String),

    /// Pool names a hook but no hook state was supplied.
    #[error("No state for Hook: {0}")]
    MissingHookState(String),

    /// Add-liquidity kind not supported by the selected path.
    #[error("Unsupported AddLiquidity Kind")]
    UnsupportedAddKind,

    /// Remove-liquidity kind not supported by the selected path.
    #[error("Unsupported RemoveLiquidity Kind")]
    UnsupportedRemoveKind,

    /// Single-token or unbalanced operation on a proportional-only pool.
    #[error("DoesNotSupportUnbalancedLiquidity")]
    DoesNotSupportUnbalancedLiquidity,

    /// Swap input token is not registered on the pool.
    #[error("Input token not found on pool")]
    InputTokenNotFound,

    /// Swap output token is not registered on the pool.
    #[error("Output token not found on pool")]
    OutputTokenNotFound,

    /// Single-token operation given more than one non-zero amount.
    #[error("Multiple non-zero inputs for single token add")]
    MultipleNonZeroInputs,

    /// Single-token operation given only zero amounts.
    #[error("All zero inputs for single token add")]
    AllZeroInputs,

    /// A state snapshot violates a structural invariant.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Gyro 2-CLP with `sqrt_alpha >= sqrt_beta`.
    #[error("SqrtParamsWrong")]
    SqrtParamsWrong,

    /// Gyro E-CLP rotation vector `(c, s)` is not unit length.
    #[error("RotationVectorNotNormalized")]
    RotationVectorNotNormalized,

    /// Gyro E-CLP `(c, s)` components out of range.
    #[error("RotationVectorWrong")]
    RotationVectorWrong,

    /// Gyro E-CLP `lambda` out of range.
    #[error("StretchingFactorWrong")]
    StretchingFactorWrong,

    /// Gyro E-CLP derived parameters inconsistent with the base ones.
    #[error("DerivedTauNotNormalized")]
    DerivedTauNotNormalized,

    /// Gyro E-CLP derived `z`, `u`, `v` or `w` out of range.
    #[error("DerivedZWrong")]
    DerivedZWrong,

    /// Gyro E-CLP price bounds inverted or out of range.
    #[error("PriceBoundsWrong")]
    PriceBoundsWrong,

    // ========================================================================
    // Liquidity bootstrapping
    // ========================================================================
    /// Swap outside the bootstrapping window or with swaps disabled.
    #[error("Swaps are disabled")]
    SwapsDisabled,

    /// Selling the project token back into a pool that blocks it.
    #[error("Project token swap in blocked")]
    ProjectTokenSwapInBlocked,

    // ========================================================================
    // Hook protocol
    // ========================================================================
    /// `on_before_swap` returned `success = false`.
    #[error("BeforeSwapHookFailed (pool {pool_type}, hook {hook_type})")]
    BeforeSwapHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },

    /// `on_after_swap` returned `success = false`.
    #[error("AfterSwapHookFailed (pool {pool_type}, hook {hook_type})")]
    AfterSwapHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },

    /// `on_before_add_liquidity` returned `success = false`.
    #[error("BeforeAddLiquidityHookFailed (pool {pool_type}, hook {hook_type})")]
    BeforeAddLiquidityHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },

    /// `on_after_add_liquidity` failed or returned a malformed array.
    #[error("AfterAddLiquidityHookFailed (pool {pool_type}, hook {hook_type})")]
    AfterAddLiquidityHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },

    /// `on_before_remove_liquidity` returned `success = false`.
    #[error("BeforeRemoveLiquidityHookFailed (pool {pool_type}, hook {hook_type})")]
    BeforeRemoveLiquidityHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },

    /// `on_after_remove_liquidity` failed or returned a malformed array.
    #[error("AfterRemoveLiquidityHookFailed (pool {pool_type}, hook {hook_type})")]
    AfterRemoveLiquidityHookFailed {
        /// Pool type tag.
        pool_type: String,
        /// Hook type tag.
        hook_type: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_revert() {
        assert_eq!(AmmError::ZeroInvariant.to_string(), "ZeroInvariant");
        assert_eq!(
            AmmError::UnsupportedPoolType("FOO".into()).to_string(),
            "Unsupported Pool Type: FOO"
        );
    }

    #[test]
    fn buffer_limits_carry_both_values() {
        let err = AmmError::ExceededMaxMint {
            amount: U256::new(11),
            max: U256::new(10),
        };
        assert_eq!(err.to_string(), "ERC4626ExceededMaxMint 11 10");
    }

    #[test]
    fn hook_errors_name_pool_and_hook() {
        let err = AmmError::AfterSwapHookFailed {
            pool_type: "WEIGHTED".into(),
            hook_type: "ExitFee".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("WEIGHTED"));
        assert!(msg.contains("ExitFee"));
    }
}
