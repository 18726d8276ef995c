//! Arbitrary-precision fixed-point decimal built on `num_bigint::BigInt`.
//!
//! A [`Decimal`] stores `unscaled × 10^-scale`. Addition, subtraction and
//! multiplication are exact; the only rounding operation is
//! [`Decimal::div_rounded`], which always rounds half-to-even to an explicit number of
//! fractional digits.

use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Mul, Neg, Sub};
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed, Zero};

use crate::error::DecimalError;

#[derive(Clone, Debug)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

fn pow10(exp: u32) -> BigInt {
    BigInt::from(10u32).pow(exp)
}

impl Decimal {
    pub fn new(unscaled: BigInt, scale: u32) -> Self {
        Decimal { unscaled, scale }
    }

    /// Number of fractional digits carried by this value.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_negative(&self) -> bool {
        self.unscaled.is_negative()
    }

    /// -1, 0 or 1.
    pub fn signum(&self) -> i8 {
        match self.unscaled.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    pub fn abs(&self) -> Decimal {
        Decimal::new(self.unscaled.abs(), self.scale)
    }

    // Unscaled value re-expressed at a larger (or equal) scale.
    fn unscaled_at(&self, scale: u32) -> BigInt {
        debug_assert!(scale >= self.scale);
        if scale == self.scale {
            self.unscaled.clone()
        } else {
            &self.unscaled * pow10(scale - self.scale)
        }
    }

    fn aligned(&self, other: &Decimal) -> (BigInt, BigInt, u32) {
        let scale = self.scale.max(other.scale);
        (self.unscaled_at(scale), other.unscaled_at(scale), scale)
    }

    /// Divides `self` by `divisor`, rounding the quotient half-to-even to exactly
    /// `scale` fractional digits.
    ///
    /// # Errors
    /// `DecimalError::DivisionByZero` if `divisor` is zero.
    ///
    /// # Example
    /// ```
    /// use parallel_pi::decimal::Decimal;
    /// let third = Decimal::from(1u32).div_rounded(&Decimal::from(3u32), 5).unwrap();
    /// assert_eq!(third.to_string(), "0.33333");
    /// ```
    pub fn div_rounded(&self, divisor: &Decimal, scale: u32) -> Result<Decimal, DecimalError> {
        if divisor.unscaled.is_zero() {
            return Err(DecimalError::DivisionByZero);
        }

        // (a / 10^sa) / (b / 10^sb) * 10^scale == (a * 10^(sb + scale)) / (b * 10^sa)
        let numerator = &self.unscaled * pow10(divisor.scale + scale);
        let denominator = &divisor.unscaled * pow10(self.scale);

        let negative = numerator.is_negative() != denominator.is_negative();
        let numerator = numerator.magnitude();
        let denominator = denominator.magnitude();

        let mut quotient = numerator / denominator;
        let remainder = numerator % denominator;
        let twice_remainder: BigUint = remainder << 1u32;

        match twice_remainder.cmp(denominator) {
            Ordering::Greater => quotient += 1u32,
            Ordering::Equal if quotient.bit(0) => quotient += 1u32,
            _ => {}
        }

        let sign = if negative { Sign::Minus } else { Sign::Plus };
        Ok(Decimal::new(BigInt::from_biguint(sign, quotient), scale))
    }

    /// Plain notation with exactly `scale` fractional digits, never an exponent.
    pub fn to_plain_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.magnitude().to_string();
        let scale = self.scale as usize;

        if self.is_negative() {
            write!(f, "-")?;
        }
        if scale == 0 {
            return write!(f, "{digits}");
        }
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            write!(f, "{int_part}.{frac_part}")
        } else {
            write!(f, "0.{digits:0>scale$}")
        }
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DecimalError::Parse(s.to_string());

        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));

        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let digits = format!("{int_part}{frac_part}");
        let magnitude = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        let sign = if negative { Sign::Minus } else { Sign::Plus };
        let scale = u32::try_from(frac_part.len()).map_err(|_| invalid())?;

        Ok(Decimal::new(BigInt::from_biguint(sign, magnitude), scale))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.scale == other.scale {
            return self.unscaled.cmp(&other.unscaled);
        }
        let (lhs, rhs, _) = self.aligned(other);
        lhs.cmp(&rhs)
    }
}

impl From<BigInt> for Decimal {
    fn from(value: BigInt) -> Self {
        Decimal::new(value, 0)
    }
}

impl From<BigUint> for Decimal {
    fn from(value: BigUint) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<u32> for Decimal {
    fn from(value: u32) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl From<u64> for Decimal {
    fn from(value: u64) -> Self {
        Decimal::new(BigInt::from(value), 0)
    }
}

impl<'a> Add<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn add(self, rhs: &'a Decimal) -> Decimal {
        if self.scale == rhs.scale {
            return Decimal::new(&self.unscaled + &rhs.unscaled, self.scale);
        }
        let (lhs, rhs, scale) = self.aligned(rhs);
        Decimal::new(lhs + rhs, scale)
    }
}

impl Add for Decimal {
    type Output = Decimal;

    fn add(self, rhs: Decimal) -> Decimal {
        &self + &rhs
    }
}

impl<'a> Sub<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn sub(self, rhs: &'a Decimal) -> Decimal {
        let (lhs, rhs, scale) = self.aligned(rhs);
        Decimal::new(lhs - rhs, scale)
    }
}

impl Sub for Decimal {
    type Output = Decimal;

    fn sub(self, rhs: Decimal) -> Decimal {
        &self - &rhs
    }
}

impl<'a> Mul<&'a Decimal> for &'a Decimal {
    type Output = Decimal;

    fn mul(self, rhs: &'a Decimal) -> Decimal {
        Decimal::new(&self.unscaled * &rhs.unscaled, self.scale + rhs.scale)
    }
}

impl Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal::new(self.unscaled * rhs.unscaled, self.scale + rhs.scale)
    }
}

impl Neg for Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-self.unscaled, self.scale)
    }
}

impl Neg for &Decimal {
    type Output = Decimal;

    fn neg(self) -> Decimal {
        Decimal::new(-&self.unscaled, self.scale)
    }
}

impl Zero for Decimal {
    fn zero() -> Self {
        Decimal::new(BigInt::zero(), 0)
    }

    fn is_zero(&self) -> bool {
        self.unscaled.is_zero()
    }
}

impl One for Decimal {
    fn one() -> Self {
        Decimal::new(BigInt::one(), 0)
    }
}

impl Sum for Decimal {
    fn sum<I: Iterator<Item = Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, term| &acc + &term)
    }
}

impl<'a> Sum<&'a Decimal> for Decimal {
    fn sum<I: Iterator<Item = &'a Decimal>>(iter: I) -> Self {
        iter.fold(Decimal::zero(), |acc, term| &acc + term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn parses_and_renders_plain_notation() {
        assert_eq!(dec("12.340").to_string(), "12.340");
        assert_eq!(dec("-0.05").to_string(), "-0.05");
        assert_eq!(dec(".5").to_string(), "0.5");
        assert_eq!(dec("+7").to_string(), "7");
        assert_eq!(dec("-0.05").scale(), 2);
        assert_eq!(Decimal::new(BigInt::from(5), 4).to_string(), "0.0005");
        assert_eq!(Decimal::new(BigInt::from(-5), 4).to_string(), "-0.0005");
    }

    #[test]
    fn rejects_malformed_literals() {
        for bad in ["", "-", ".", "1e5", "1.2.3", "abc", "--1", " 1"] {
            assert!(
                matches!(bad.parse::<Decimal>(), Err(DecimalError::Parse(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn equality_ignores_scale() {
        assert_eq!(dec("1.0"), dec("1.000"));
        assert!(dec("0.1") > dec("0.09999"));
        assert!(dec("-2") < dec("-1.5"));
    }

    #[test]
    fn arithmetic_is_exact() {
        assert_eq!(&dec("1.25") + &dec("0.005"), dec("1.255"));
        assert_eq!(&dec("1.25") - &dec("2"), dec("-0.75"));
        let product = &dec("1.5") * &dec("-0.25");
        assert_eq!(product, dec("-0.375"));
        assert_eq!(product.scale(), 3);
        assert_eq!(-dec("3.5"), dec("-3.5"));
    }

    #[test]
    fn division_rounds_half_to_even() {
        let two = Decimal::from(2u32);
        assert_eq!(dec("0.25").div_rounded(&Decimal::one(), 1).unwrap(), dec("0.2"));
        assert_eq!(dec("0.35").div_rounded(&Decimal::one(), 1).unwrap(), dec("0.4"));
        assert_eq!(dec("0.5").div_rounded(&two, 1).unwrap(), dec("0.2"));
        assert_eq!(dec("0.7").div_rounded(&two, 1).unwrap(), dec("0.4"));
        assert_eq!(dec("-0.25").div_rounded(&Decimal::one(), 1).unwrap(), dec("-0.2"));
        assert_eq!(dec("-0.26").div_rounded(&Decimal::one(), 1).unwrap(), dec("-0.3"));
        assert_eq!(
            Decimal::from(2u32).div_rounded(&Decimal::from(3u32), 4).unwrap().to_string(),
            "0.6667"
        );
    }

    #[test]
    fn division_result_has_requested_scale() {
        let q = Decimal::from(22u32).div_rounded(&Decimal::from(7u32), 12).unwrap();
        assert_eq!(q.scale(), 12);
        assert_eq!(q.to_string(), "3.142857142857");
        let exact = Decimal::from(1u32).div_rounded(&Decimal::from(4u32), 6).unwrap();
        assert_eq!(exact.to_string(), "0.250000");
    }

    #[test]
    fn division_by_zero_is_an_error() {
        assert_eq!(
            Decimal::one().div_rounded(&dec("0.000"), 3),
            Err(DecimalError::DivisionByZero)
        );
    }

    #[test]
    fn sums_owned_and_borrowed() {
        let values = vec![dec("0.1"), dec("0.02"), dec("-0.003")];
        let borrowed: Decimal = values.iter().sum();
        let owned: Decimal = values.into_iter().sum();
        assert_eq!(borrowed, dec("0.117"));
        assert_eq!(owned, borrowed);
    }

    #[test]
    fn sign_helpers() {
        assert_eq!(dec("-0.1").signum(), -1);
        assert_eq!(Decimal::zero().signum(), 0);
        assert_eq!(dec("0.1").signum(), 1);
        assert_eq!(dec("-4.2").abs(), dec("4.2"));
    }

    proptest! {
        #[test]
        fn division_then_multiplication_stays_within_half_ulp(
            a in -1_000_000i64..1_000_000,
            b in 1i64..10_000,
            scale in 0u32..12,
        ) {
            let a = Decimal::from(BigInt::from(a));
            let b = Decimal::from(BigInt::from(b));
            let q = a.div_rounded(&b, scale).unwrap();
            // |q*b - a| <= b * 0.5 * 10^-scale
            let error = (&(&q * &b) - &a).abs();
            let half_ulp = Decimal::new(BigInt::from(5), scale + 1);
            prop_assert!(error <= &b * &half_ulp);
        }

        #[test]
        fn parse_display_preserves_value(int in -1_000_000i64..1_000_000, frac in 0u32..1000) {
            let text = format!("{int}.{frac:03}");
            let parsed: Decimal = text.parse().unwrap();
            prop_assert_eq!(parsed.to_string(), text);
        }
    }
}
