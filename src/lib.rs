//! # balancer-maths
//!
//! Off-chain Balancer V3 math: quote swaps, liquidity operations and
//! ERC-4626 buffer conversions exactly as the on-chain vault would, down
//! to the last wei.
//!
//! This crate provides state snapshots, core traits, fixed-point math,
//! feature-gated pool implementations and hooks for the Balancer V3 pool
//! families:
//!
//! - **Weighted** (geometric mean invariant), `weighted` feature
//! - **Stable** (StableSwap invariant), `stable` feature
//! - **Gyro E-CLP and 2-CLP** (concentrated liquidity), `gyro` feature
//! - **ReClamm** (range-tracking virtual balances, two releases), `reclamm` feature
//! - **QuantAMM** (time-interpolated weights), `quantamm` feature
//! - **Liquidity bootstrapping** (scheduled weights), `liquidity-bootstrapping` feature
//! - **ERC-4626 buffers** (wrap and unwrap at the vault rate), `buffer` feature
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `std` | yes | Standard library support |
//! | `all-pools` | yes | Enables every pool family and buffers |
//!
//! # Quick Start
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! balancer-maths = "0.1"
//! ```
//!
//! To use only specific pool types:
//!
//! ```toml
//! [dependencies]
//! balancer-maths = { version = "0.1", default-features = false, features = ["std", "stable"] }
//! ```
//!
//! ## Quote a swap against a pool snapshot
//!
//! ```rust
//! use balancer_maths::config::PoolState;
//! use balancer_maths::domain::{SwapInput, SwapKind};
//! use balancer_maths::vault::Vault;
//! use ethnum::U256;
//!
//! // 1. A snapshot as produced by a chain-state fetcher
//! let json = r#"{
//!     "poolType": "STABLE",
//!     "tokens": ["0xa", "0xb"],
//!     "scalingFactors": ["1", "1"],
//!     "tokenRates": ["1000000000000000000", "1000000000000000000"],
//!     "balancesLiveScaled18": ["20000000000000000000000", "20000000000000000000000"],
//!     "swapFee": "0",
//!     "totalSupply": "40000000000000000000000",
//!     "amp": "1000000"
//! }"#;
//! let state: PoolState = serde_json::from_str(json).expect("valid snapshot");
//!
//! // 2. Sell 99.5 of token a for token b
//! let input = SwapInput::new(
//!     SwapKind::GivenIn,
//!     U256::new(99_500_000_000_000_000_000),
//!     "0xa",
//!     "0xb",
//! );
//! let out = Vault::new().swap(&input, &state.into(), None).expect("swap quoted");
//!
//! assert_eq!(out, U256::new(99_499_505_472_260_433_154));
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │   Consumer   │  PoolState / BufferState + optional HookState
//! └──────┬──────┘
//!        │ swap / add_liquidity / remove_liquidity
//!        ▼
//! ┌─────────────┐
//! │    Vault     │  scaling, fees, hooks, minimum amounts
//! └──────┬──────┘
//!        │ DefaultPoolFactory / PoolRegistry, HookBox / HookRegistry
//!        ▼
//! ┌─────────────┐
//! │ Pools, Hooks │  PoolBase + HookBase implementations
//! └──────┬──────┘
//!        │ scaled-18 amounts, explicit Rounding
//!        ▼
//! ┌─────────────┐
//! │    Math      │  fixed point, log/exp, signed extended precision
//! └─────────────┘
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Request and result types: [`SwapInput`](domain::SwapInput), [`AddLiquidityInput`](domain::AddLiquidityInput), [`Rounding`](domain::Rounding), etc. |
//! | [`traits`] | Core abstractions: [`PoolBase`](traits::PoolBase), [`HookBase`](traits::HookBase), [`FromConfig`](traits::FromConfig) |
//! | [`config`] | Serde snapshots: [`PoolState`](config::PoolState), [`BufferState`](config::BufferState), [`HookState`](config::HookState) |
//! | [`pools`]  | Feature-gated pool math and the [`PoolBox`](pools::PoolBox) dispatch enum |
//! | [`hooks`]  | Built-in hooks and the [`HookBox`](hooks::HookBox) dispatch enum |
//! | [`factory`] | [`DefaultPoolFactory`](factory::DefaultPoolFactory) and custom pool/hook registries |
//! | [`vault`]  | [`Vault`](vault::Vault) orchestration and base pool liquidity math |
//! | [`math`]   | Fixed-point primitives, scaling, square roots |
//! | [`error`]  | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports for common types and traits |

// Module declarations (always compiled)
pub mod config;
pub mod domain;
pub mod error;
pub mod factory;
pub mod hooks;
pub mod math;
pub mod pools;
pub mod prelude;
pub mod traits;
pub mod vault;
