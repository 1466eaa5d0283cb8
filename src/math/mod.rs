//! Fixed-point arithmetic for pool calculations.
//!
//! Everything operates on [`ethnum::U256`] / [`ethnum::I256`] integers that
//! represent 18-decimal (or, for the elliptic pool, 38-decimal) fixed-point
//! numbers.  Rounding direction is always explicit.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`checked`] | [`CheckedArithmetic`] over 256-bit integers |
//! | [`fixed_point`] | Unsigned 18-decimal mul/div/pow/complement |
//! | [`log_exp`] | Natural log and exponent approximations behind `pow` |
//! | [`signed_fixed_point`] | Signed 18- and 38-decimal helpers |
//! | [`sqrt`] | Integer and 18-decimal square roots |
//! | [`scaling`] | Raw amount to scaled-18 conversions and fee helpers |

pub mod checked;
pub mod fixed_point;
pub mod log_exp;
pub mod scaling;
pub mod signed_fixed_point;
pub mod sqrt;

pub use checked::{to_signed, to_unsigned, CheckedArithmetic};
pub use fixed_point::{
    complement, div_down, div_up, div_up_raw, mul_div_up, mul_down, mul_up, pow_down, pow_up,
    WAD,
};
pub use scaling::{
    compute_and_charge_aggregate_swap_fees, compute_rate_round_up, get_single_input_index,
    to_raw_undo_rate_round_down, to_raw_undo_rate_round_up, to_scaled18_apply_rate_round_down,
    to_scaled18_apply_rate_round_up,
};
pub use sqrt::{gyro_sqrt, oz_sqrt};
