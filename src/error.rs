use kanal::SendError;
use rayon::ThreadPoolBuildError;
use tokio::sync::AcquireError;
use tokio::task::JoinError;

use crate::chudnovsky::SeriesIndex;

/// Failures of the fixed-point arithmetic itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecimalError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("invalid decimal literal: {0:?}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PiError {
    #[error("requested digit count must be positive, got {0}")]
    InvalidDigits(i64),
    #[error("requested digit count {requested} exceeds the supported maximum of {max}")]
    TooManyDigits { requested: i64, max: u32 },
    #[error("worker count must be at least 1")]
    InvalidWorkers,
    #[error("square root is only defined here for positive input, got {0}")]
    NonPositiveRadicand(String),
    #[error("square root did not converge after {iterations} iterations")]
    SqrtDidNotConverge { iterations: u32 },
    #[error("expanding series term {index} failed: {source}")]
    Term {
        index: SeriesIndex,
        source: DecimalError,
    },
    #[error("Arithmetic error: {0}")]
    Arithmetic(#[from] DecimalError),
    #[error("Tokio Join error: {0:?}")]
    TokioJoin(#[from] JoinError),
    #[error("Std Join error: {0:?}")]
    StdJoin(String),
    #[error("Acquire error: {0:?}")]
    Acquire(#[from] AcquireError),
    #[error("Send error: {0:?}")]
    Send(#[from] SendError),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}
