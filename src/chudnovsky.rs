use kanal::bounded;
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use rayon::ThreadPoolBuilder;
use std::sync::Arc;
use std::thread;
use tokio::runtime::Builder;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinHandle};
use tracing::{debug, trace};

use crate::config::{PiConfig, Strategy};
use crate::decimal::Decimal;
use crate::error::PiError;
use crate::math::{epsilon, factorial, power, sqrt};

/// Index `k` of one Chudnovsky addend.
pub type SeriesIndex = u32;

// 640320³
const SIXTY40320_POW_3: u64 = 262_537_412_640_768_000;
const LINEAR_OFFSET: u64 = 13_591_409;
const LINEAR_SLOPE: u64 = 545_140_134;
const COEFFICIENT_FACTOR: u32 = 426_880;
const COEFFICIENT_RADICAND: u32 = 10_005;

/// Computes one term of the Chudnovsky series,
///
/// `(-1)^k (6k)! (13591409 + 545140134k) / ((3k)! (k!)³ 640320^(3k))`,
///
/// rounded half-to-even to `precision` fractional digits.
///
/// # Example
/// ```
/// use parallel_pi::chudnovsky::expand_term;
/// assert_eq!(expand_term(0, 3).unwrap().to_string(), "13591409.000");
/// assert!(expand_term(1, 12).unwrap().is_negative());
/// ```
pub fn expand_term(k: SeriesIndex, precision: u32) -> Result<Decimal, PiError> {
    let k_wide = u64::from(k);

    let sign = if k % 2 == 0 {
        Decimal::from(1u32)
    } else {
        -Decimal::from(1u32)
    };
    // Fits in u64 for every u32 index: 545140134 × (2³² - 1) + 13591409 < 2⁶⁴.
    let linear = Decimal::from(LINEAR_OFFSET + LINEAR_SLOPE * k_wide);
    let numerator = &(&sign * &factorial(6 * k_wide)) * &linear;

    let denominator = &(&factorial(3 * k_wide) * &power(&factorial(k_wide), 3))
        * &power(&Decimal::from(SIXTY40320_POW_3), k);

    trace!(k, "expanding term");
    numerator
        .div_rounded(&denominator, precision)
        .map_err(|source| PiError::Term { index: k, source })
}

/// `1 / (426880 × √10005)`, rounded to the configured precision.
///
/// Computed once per run before any term is expanded; the square root is taken to within
/// `10^-precision`.
pub fn compute_coefficient(config: &PiConfig) -> Result<Decimal, PiError> {
    let precision = config.precision();
    let root = sqrt(
        &Decimal::from(COEFFICIENT_RADICAND),
        &epsilon(precision),
        precision,
        config.max_sqrt_iterations(),
    )?;
    let scaled_root = &Decimal::from(COEFFICIENT_FACTOR) * &root;
    let coefficient = Decimal::from(1u32).div_rounded(&scaled_root, precision)?;
    debug!(precision, "coefficient computed");
    Ok(coefficient)
}

/// Final step: `1 / (coefficient × series_total)` rounded to `precision`.
pub fn assemble(
    coefficient: &Decimal,
    series_total: &Decimal,
    precision: u32,
) -> Result<Decimal, PiError> {
    let combined = coefficient * series_total;
    Ok(Decimal::from(1u32).div_rounded(&combined, precision)?)
}

// Per-index work handed to the reducers; `expand_term` outside of tests
type Expander = fn(SeriesIndex, u32) -> Result<Decimal, PiError>;

fn check_workers(workers: usize) -> Result<(), PiError> {
    if workers == 0 {
        return Err(PiError::InvalidWorkers);
    }
    Ok(())
}

/// Sums the terms for `indices` on the calling thread.
pub fn sum_terms(indices: &[SeriesIndex], precision: u32) -> Result<Decimal, PiError> {
    sum_terms_with(indices, precision, expand_term)
}

fn sum_terms_with(
    indices: &[SeriesIndex],
    precision: u32,
    expand: Expander,
) -> Result<Decimal, PiError> {
    let terms = indices
        .iter()
        .map(|&k| expand(k, precision))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(terms.iter().sum())
}

/// Sums the terms on a dedicated rayon pool of `workers` threads.
///
/// # Errors
/// `PiError::InvalidWorkers` for an empty pool; otherwise the first failing term aborts the sum.
pub fn sum_terms_rayon(
    indices: &[SeriesIndex],
    precision: u32,
    workers: usize,
) -> Result<Decimal, PiError> {
    sum_terms_rayon_with(indices, precision, workers, expand_term)
}

fn sum_terms_rayon_with(
    indices: &[SeriesIndex],
    precision: u32,
    workers: usize,
    expand: Expander,
) -> Result<Decimal, PiError> {
    check_workers(workers)?;
    let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;

    // Every term is expanded before any of them is summed
    let terms: Vec<Decimal> = pool.install(|| {
        indices
            .par_iter()
            .map(|&k| expand(k, precision))
            .collect::<Result<Vec<_>, _>>()
    })?;

    Ok(terms.iter().sum())
}

/// Sums the terms with one tokio task per index, at most `max_concurrent_tasks` running at once.
///
/// # Errors
/// `PiError::InvalidWorkers` if `max_concurrent_tasks` is 0; otherwise the first failing task
/// aborts the sum.
pub async fn sum_terms_tokio(
    indices: &[SeriesIndex],
    precision: u32,
    max_concurrent_tasks: usize,
) -> Result<Decimal, PiError> {
    sum_terms_tokio_with(indices, precision, max_concurrent_tasks, expand_term).await
}

async fn sum_terms_tokio_with(
    indices: &[SeriesIndex],
    precision: u32,
    max_concurrent_tasks: usize,
    expand: Expander,
) -> Result<Decimal, PiError> {
    // No permits would leave every task parked on `acquire` forever
    check_workers(max_concurrent_tasks)?;
    let semaphore = Arc::new(Semaphore::new(max_concurrent_tasks));

    let mut tasks = Vec::with_capacity(indices.len());

    for &k in indices {
        let semaphore = Arc::clone(&semaphore);

        // Spawn a new task for each term
        let task: JoinHandle<Result<Decimal, PiError>> = task::spawn(async move {
            // Acquire a semaphore permit to control concurrency
            let _permit = semaphore.acquire().await?;
            expand(k, precision)
        });

        tasks.push(task);
    }

    // Wait for all tasks to complete before summing
    let mut terms = Vec::with_capacity(tasks.len());
    for task in tasks {
        terms.push(task.await??);
    }

    Ok(terms.iter().sum())
}

/// Sums the terms on a fixed pool of `workers` OS threads fed through kanal channels.
///
/// # Errors
/// `PiError::InvalidWorkers` for an empty pool; otherwise the first failing term aborts the sum.
pub fn sum_terms_kanal(
    indices: &[SeriesIndex],
    precision: u32,
    workers: usize,
) -> Result<Decimal, PiError> {
    sum_terms_kanal_with(indices, precision, workers, expand_term)
}

fn sum_terms_kanal_with(
    indices: &[SeriesIndex],
    precision: u32,
    workers: usize,
    expand: Expander,
) -> Result<Decimal, PiError> {
    // Without workers the result channel would drain empty and sum to zero
    check_workers(workers)?;

    let capacity = indices.len().max(1);
    let (job_sender, job_receiver) = bounded::<SeriesIndex>(capacity);
    let (result_sender, result_receiver) = bounded::<Result<Decimal, PiError>>(capacity);

    // Queue all jobs up front, then close the queue so workers exit when it drains
    for &k in indices {
        job_sender.send(k)?;
    }
    drop(job_sender);

    let mut handles = Vec::with_capacity(workers);

    for _ in 0..workers {
        let jobs = job_receiver.clone();
        let results = result_sender.clone();
        let handle = thread::spawn(move || -> Result<(), PiError> {
            for k in jobs {
                results.send(expand(k, precision))?;
            }
            Ok(())
        });

        handles.push(handle);
    }

    // Drop our copies so the result receiver ends once every worker is done
    drop(job_receiver);
    drop(result_sender);

    // Wait for all threads to finish and propagate any errors
    for handle in handles {
        handle
            .join()
            .map_err(|e| PiError::StdJoin(format!("Thread panicked: {:?}", e)))??;
    }

    let terms = result_receiver
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    Ok(terms.iter().sum())
}

/// Expands and sums every term of the configured series with the configured strategy.
pub fn reduce(config: &PiConfig) -> Result<Decimal, PiError> {
    let indices = config.series_indices();
    let precision = config.precision();
    let workers = config.workers();

    debug!(
        strategy = %config.strategy(),
        workers,
        terms = indices.len(),
        "reducing series"
    );

    match config.strategy() {
        Strategy::Sequential => sum_terms(&indices, precision),
        Strategy::Rayon => sum_terms_rayon(&indices, precision, workers),
        Strategy::Kanal => sum_terms_kanal(&indices, precision, workers),
        Strategy::Tokio => {
            let rt = Builder::new_multi_thread()
                .worker_threads(workers)
                .enable_all()
                .build()?;
            rt.block_on(sum_terms_tokio(&indices, precision, workers))
        }
    }
}

/// Runs the parallel phase: expands and sums the series, then assembles π from the
/// precomputed `coefficient`.
///
/// The returned value carries exactly `config.precision()` fractional digits; its
/// `Display` output is plain notation.
pub fn compute_pi_parallel(config: &PiConfig, coefficient: &Decimal) -> Result<Decimal, PiError> {
    let series_total = reduce(config)?;
    assemble(coefficient, &series_total, config.precision())
}

/// Coefficient derivation followed by the parallel phase.
///
/// # Example
/// ```
/// use parallel_pi::chudnovsky::compute_pi;
/// use parallel_pi::config::PiConfig;
/// let pi = compute_pi(&PiConfig::new(10).unwrap()).unwrap();
/// assert!(pi.to_string().starts_with("3.1415926535"));
/// ```
pub fn compute_pi(config: &PiConfig) -> Result<Decimal, PiError> {
    let coefficient = compute_coefficient(config)?;
    compute_pi_parallel(config, &coefficient)
}
