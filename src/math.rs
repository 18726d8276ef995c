use num_bigint::{BigInt, BigUint};
use num_traits::One;
use tracing::debug;

use crate::decimal::Decimal;
use crate::error::PiError;

// n! by iterative multiplication from n down to 2 (1 for n <= 1)
pub fn factorial(n: u64) -> Decimal {
    let mut result = BigUint::one();
    for i in (2..=n).rev() {
        result *= i;
    }
    Decimal::from(result)
}

// Exponentiation using squaring (O(log n)), exact
pub fn power(base: &Decimal, mut exp: u32) -> Decimal {
    let mut result = Decimal::one();
    let mut base = base.clone();

    while exp > 0 {
        if exp % 2 == 1 {
            result = &result * &base;
        }
        exp /= 2;
        if exp > 0 {
            base = &base * &base;
        }
    }

    result
}

/// Square root of `c` by Newton-Raphson, seeded at 1.
///
/// Each step computes `x - (x² - c) / 2x` with the division rounded half-to-even to
/// `2 × precision` fractional digits, and stops as soon as `|x² - c| < target_precision`.
/// The iteration is bounded by `max_iterations`.
///
/// # Errors
/// - `PiError::NonPositiveRadicand` if `c <= 0`.
/// - `PiError::SqrtDidNotConverge` if the cap is reached first.
///
/// # Example
/// ```
/// use parallel_pi::decimal::Decimal;
/// use parallel_pi::math::sqrt;
/// let eps: Decimal = "0.0000000001".parse().unwrap();
/// let root = sqrt(&Decimal::from(2u32), &eps, 10, 100).unwrap();
/// assert!(root.to_string().starts_with("1.414213562"));
/// ```
pub fn sqrt(
    c: &Decimal,
    target_precision: &Decimal,
    precision: u32,
    max_iterations: u32,
) -> Result<Decimal, PiError> {
    if c.signum() <= 0 {
        return Err(PiError::NonPositiveRadicand(c.to_plain_string()));
    }

    let working_scale = precision.saturating_mul(2);
    let two = Decimal::from(2u32);
    let mut x = Decimal::one();

    for iteration in 1..=max_iterations {
        let fx = &(&x * &x) - c;
        let fpx = &x * &two;
        let step = fx.div_rounded(&fpx, working_scale)?;
        x = &x - &step;

        let error = (&(&x * &x) - c).abs();
        if error < *target_precision {
            debug!(iteration, "square root converged");
            return Ok(x);
        }
    }

    Err(PiError::SqrtDidNotConverge {
        iterations: max_iterations,
    })
}

// 10^-exp, used as the absolute tolerance for `sqrt`
pub fn epsilon(exp: u32) -> Decimal {
    Decimal::new(BigInt::one(), exp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::Zero;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn factorial_base_cases() {
        assert_eq!(factorial(0), Decimal::one());
        assert_eq!(factorial(1), Decimal::one());
        assert_eq!(factorial(5), Decimal::from(120u32));
        assert_eq!(factorial(20), Decimal::from(2_432_902_008_176_640_000u64));
    }

    #[test]
    fn factorial_recurrence() {
        for n in 2..60u64 {
            assert_eq!(factorial(n), &Decimal::from(n) * &factorial(n - 1), "n = {n}");
        }
    }

    #[test]
    fn factorial_is_exact_integer() {
        assert_eq!(factorial(30).scale(), 0);
        assert_eq!(
            factorial(30).to_string(),
            "265252859812191058636308480000000"
        );
    }

    #[test]
    fn power_matches_repeated_multiplication() {
        let base = dec("1.5");
        let mut expected = Decimal::one();
        for exp in 0..20 {
            assert_eq!(power(&base, exp), expected, "exp = {exp}");
            expected = &expected * &base;
        }
    }

    #[test]
    fn power_of_chudnovsky_constant() {
        let c = Decimal::from(262_537_412_640_768_000u64);
        assert_eq!(power(&c, 0), Decimal::one());
        assert_eq!(power(&c, 1), c);
        assert_eq!(
            power(&c, 2).to_string(),
            "68925893036108889235415629824000000"
        );
    }

    #[test]
    fn sqrt_meets_target_precision() {
        for (c, precision) in [("2", 20), ("10005", 30), ("0.25", 10), ("123456789.5", 25)] {
            let c = dec(c);
            let target = epsilon(precision);
            let root = sqrt(&c, &target, precision, 1_000).unwrap();
            let error = (&(&root * &root) - &c).abs();
            assert!(error < target, "sqrt({c}) error {error} >= {target}");
        }
    }

    #[test]
    fn sqrt_of_10005_leading_digits() {
        let root = sqrt(&Decimal::from(10_005u32), &epsilon(40), 40, 1_000).unwrap();
        assert!(root.to_string().starts_with("100.02499687578"), "{root}");
        assert_eq!(root.scale(), 80);
    }

    #[test]
    fn sqrt_is_deterministic() {
        let c = Decimal::from(10_005u32);
        let first = sqrt(&c, &epsilon(50), 50, 1_000).unwrap();
        let second = sqrt(&c, &epsilon(50), 50, 1_000).unwrap();
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn sqrt_rejects_non_positive_input() {
        assert!(matches!(
            sqrt(&Decimal::zero(), &epsilon(5), 5, 100),
            Err(PiError::NonPositiveRadicand(_))
        ));
        assert!(matches!(
            sqrt(&dec("-4"), &epsilon(5), 5, 100),
            Err(PiError::NonPositiveRadicand(_))
        ));
    }

    #[test]
    fn sqrt_stops_at_iteration_cap() {
        // Seeded at 1, reaching √10005 takes several halving steps before quadratic convergence.
        assert!(matches!(
            sqrt(&Decimal::from(10_005u32), &epsilon(30), 30, 3),
            Err(PiError::SqrtDidNotConverge { iterations: 3 })
        ));
    }

    #[test]
    fn epsilon_is_a_negative_power_of_ten() {
        assert_eq!(epsilon(3), dec("0.001"));
        assert_eq!(epsilon(0), Decimal::one());
    }
}
