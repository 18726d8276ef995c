//! Run configuration for a single π computation.
//!
//! Everything the pipeline needs to agree on (precision, series length, pool size) is derived
//! here once and handed to each stage by reference.

use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::thread;

use crate::chudnovsky::SeriesIndex;
use crate::error::PiError;

/// Series constants and default tuning values.
pub mod limits {
    /// Digits ahead of the decimal point ("3.") kept in addition to the requested digits.
    pub const LEADING_DIGITS: u32 = 2;

    /// Extra fractional digits carried beyond the requested count.
    ///
    /// The coefficient `1 / (426880 × √10005)` is about `2.3 × 10^-8`, so rounding it to the
    /// working precision throws away roughly eight significant digits that the final inversion
    /// then amplifies. Ten guard digits keep every requested digit intact. Zero reproduces the
    /// bare `digits + 2` precision, with its drift in the last several places.
    pub const DEFAULT_GUARD_DIGITS: u32 = 10;

    /// Hard ceiling on Newton-Raphson steps for the square root.
    pub const DEFAULT_MAX_SQRT_ITERATIONS: u32 = 1_000;

    /// Largest digit count accepted.
    pub const MAX_DIGITS: u32 = 100_000_000;

    /// `640320³ / 24`; each Chudnovsky term contributes `log10` of this many digits.
    pub const CONVERGENCE_BASE: f64 = 151_931_373_056_000.0;
}

/// Digits of π gained per additional series term (≈ 14.18).
pub fn convergence_rate() -> f64 {
    limits::CONVERGENCE_BASE.log10()
}

/// How the per-term work is fanned out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Single thread, no pool. Baseline for comparisons.
    Sequential,
    /// Dedicated rayon thread pool.
    #[default]
    Rayon,
    /// Tokio tasks bounded by a semaphore.
    Tokio,
    /// OS threads fed through kanal channels.
    Kanal,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Sequential,
        Strategy::Rayon,
        Strategy::Tokio,
        Strategy::Kanal,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Sequential => "sequential",
            Strategy::Rayon => "rayon",
            Strategy::Tokio => "tokio",
            Strategy::Kanal => "kanal",
        };
        f.write_str(name)
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sequential" => Ok(Strategy::Sequential),
            "rayon" => Ok(Strategy::Rayon),
            "tokio" => Ok(Strategy::Tokio),
            "kanal" => Ok(Strategy::Kanal),
            other => Err(format!(
                "unknown strategy {other:?} (expected sequential, rayon, tokio or kanal)"
            )),
        }
    }
}

/// Immutable configuration for one invocation.
///
/// # Example
/// ```
/// use parallel_pi::config::PiConfig;
/// let config = PiConfig::new(2).unwrap();
/// assert_eq!(config.series_terms(), 1);
/// assert!(PiConfig::new(0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PiConfig {
    digits: u32,
    guard_digits: u32,
    workers: usize,
    strategy: Strategy,
    max_sqrt_iterations: u32,
}

impl PiConfig {
    /// Validates the requested digit count and fills in defaults.
    ///
    /// # Errors
    /// `PiError::InvalidDigits` for zero or negative counts, `PiError::TooManyDigits` above
    /// [`limits::MAX_DIGITS`].
    pub fn new(digits: i64) -> Result<Self, PiError> {
        if digits <= 0 {
            return Err(PiError::InvalidDigits(digits));
        }
        let digits = u32::try_from(digits)
            .ok()
            .filter(|d| *d <= limits::MAX_DIGITS)
            .ok_or(PiError::TooManyDigits {
                requested: digits,
                max: limits::MAX_DIGITS,
            })?;

        Ok(PiConfig {
            digits,
            guard_digits: limits::DEFAULT_GUARD_DIGITS,
            workers: default_workers(),
            strategy: Strategy::default(),
            max_sqrt_iterations: limits::DEFAULT_MAX_SQRT_ITERATIONS,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Result<Self, PiError> {
        if workers == 0 {
            return Err(PiError::InvalidWorkers);
        }
        self.workers = workers;
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_guard_digits(mut self, guard_digits: u32) -> Self {
        self.guard_digits = guard_digits;
        self
    }

    pub fn with_max_sqrt_iterations(mut self, max_sqrt_iterations: u32) -> Self {
        self.max_sqrt_iterations = max_sqrt_iterations;
        self
    }

    /// Requested digits after the decimal point.
    pub fn digits(&self) -> u32 {
        self.digits
    }

    pub fn guard_digits(&self) -> u32 {
        self.guard_digits
    }

    /// Fractional digits kept by every rounding division.
    pub fn precision(&self) -> u32 {
        self.digits
            .saturating_add(limits::LEADING_DIGITS)
            .saturating_add(self.guard_digits)
    }

    /// Highest series index `K`; the sum runs over `0..=K`.
    pub fn series_terms(&self) -> SeriesIndex {
        (f64::from(self.digits) / convergence_rate()).ceil() as SeriesIndex
    }

    pub fn series_indices(&self) -> Vec<SeriesIndex> {
        (0..=self.series_terms()).collect()
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn max_sqrt_iterations(&self) -> u32 {
        self.max_sqrt_iterations
    }
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
