//! # Parallel Chudnovsky π Library
//!
//! This library computes π to a configurable number of decimal digits with the Chudnovsky
//! series. Every term of the series is evaluated independently, so the terms are fanned out
//! across a worker pool, joined, summed and finally combined with a constant coefficient.
//! The per-term evaluation is deliberately the simple one (no binary splitting, no shared
//! factorials); the point is to keep every core busy, not to be asymptotically optimal.
//!
//! ## Key Features
//! - **Fixed-Point Decimal**: arbitrary-precision decimal on top of `num-bigint`, with an
//!   explicit scale and round-half-to-even on every division.
//! - **Newton-Raphson Square Root**: bounded iteration used once per run to derive the
//!   coefficient `1 / (426880 × √10005)`.
//! - **Concurrency**: the term sum can be reduced sequentially, on a rayon pool, on tokio
//!   tasks or on OS threads fed through kanal channels. All of them join every term before
//!   summing and produce identical results.
//!
//! ## Overview of Modules
//!
//! ### Errors
//! - `PiError`: configuration faults (non-positive digit counts, an empty pool), square root
//!   failures, arithmetic faults inside a term, and join/acquire/send failures from the
//!   concurrency layers. Every fault aborts the computation.
//!
//! ### `config`
//! `PiConfig` is derived once from the requested digit count: working precision, series
//! length (`ceil(digits / 14.18…)`), worker count and reduction strategy.
//!
//! ### `decimal`
//! `Decimal`, the fixed-point value type everything else computes with.
//!
//! ### `math`
//! `factorial`, exponentiation by squaring and the bounded square root.
//!
//! ### `chudnovsky`
//!
//! #### `expand_term`
//! One addend `(-1)^k (6k)! (13591409 + 545140134k) / ((3k)! (k!)³ 640320^(3k))`, rounded to
//! the working precision.
//!
//! #### `sum_terms`, `sum_terms_rayon`, `sum_terms_tokio`, `sum_terms_kanal`
//! The reduction over all indices, one per concurrency strategy. `reduce` picks one from the
//! configuration.
//!
//! #### `compute_coefficient`, `compute_pi_parallel`, `compute_pi`
//! The two-phase entry points: derive the coefficient once, then run the parallel phase and
//! invert `coefficient × total`.
//!
//! ## Usage Example
//! ```rust
//! use parallel_pi::chudnovsky::{compute_coefficient, compute_pi_parallel};
//! use parallel_pi::config::{PiConfig, Strategy};
//!
//! let config = PiConfig::new(30).unwrap().with_strategy(Strategy::Rayon);
//! let coefficient = compute_coefficient(&config).unwrap();
//! let pi = compute_pi_parallel(&config, &coefficient).unwrap();
//! assert!(pi.to_string().starts_with("3.141592653589793238462643383279"));
//! ```

pub mod chudnovsky;
pub mod config;
pub mod decimal;
pub mod error;
pub mod math;

pub use chudnovsky::{compute_coefficient, compute_pi, compute_pi_parallel};
pub use config::{PiConfig, Strategy};
pub use decimal::Decimal;
pub use error::{DecimalError, PiError};
