// Exact decimal arithmetic behind every operator key

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use super::error::CalcError;
use super::input::Operator;

/// Fractional digits kept from power and root results.
/// Exact operations (add, subtract, multiply) are never rounded.
pub const DEFAULT_FRACTION_DIGITS: u32 = 20;

/// Apply `op` to `a` and `b` with the default precision cap.
pub fn apply(a: Decimal, op: Operator, b: Decimal) -> Result<Decimal, CalcError> {
    apply_with_precision(a, op, b, DEFAULT_FRACTION_DIGITS)
}

/// Apply `op` to `a` and `b`, rounding power and root results to
/// `max_fraction_digits` decimal places.
///
/// Power is `a ^ b`, root is the `b`-th root of `a`, percent is `a × b / 100`.
pub fn apply_with_precision(
    a: Decimal,
    op: Operator,
    b: Decimal,
    max_fraction_digits: u32,
) -> Result<Decimal, CalcError> {
    let result = match op {
        Operator::Add => a.checked_add(b),
        Operator::Subtract => a.checked_sub(b),
        Operator::Multiply => a.checked_mul(b),
        Operator::Divide => {
            if b.is_zero() {
                return Err(CalcError::DivisionByZero);
            }
            a.checked_div(b)
        }
        Operator::Percent => b
            .checked_div(Decimal::ONE_HUNDRED)
            .and_then(|fraction| a.checked_mul(fraction)),
        Operator::Power => return power(a, b, max_fraction_digits),
        Operator::Root => return root(a, b, max_fraction_digits),
    };

    result.ok_or(CalcError::Overflow)
}

fn power(base: Decimal, exponent: Decimal, max_fraction_digits: u32) -> Result<Decimal, CalcError> {
    if base.is_zero() {
        return match exponent {
            e if e < Decimal::ZERO => Err(CalcError::DivisionByZero),
            e if e.is_zero() => Ok(Decimal::ONE),
            _ => Ok(Decimal::ZERO),
        };
    }

    let value = if exponent.fract().is_zero() {
        // Integer exponents are exact up to the decimal's 28 digits
        exponent.to_i64().and_then(|e| base.checked_powi(e))
    } else {
        if base < Decimal::ZERO {
            return Err(CalcError::DomainError);
        }
        base.checked_powd(exponent)
    };

    match value {
        Some(v) => Ok(cap_precision(v, max_fraction_digits)),
        // Too small to represent rounds to zero like any other tiny result
        None if shrinks(base, exponent) => Ok(Decimal::ZERO),
        None => Err(CalcError::Overflow),
    }
}

/// Whether `|base ^ exponent|` lies below one
fn shrinks(base: Decimal, exponent: Decimal) -> bool {
    let magnitude = base.abs();
    magnitude != Decimal::ONE && (magnitude < Decimal::ONE) == (exponent > Decimal::ZERO)
}

fn root(radicand: Decimal, degree: Decimal, max_fraction_digits: u32) -> Result<Decimal, CalcError> {
    if degree.is_zero() {
        return Err(CalcError::DomainError);
    }

    if radicand.is_zero() {
        return if degree < Decimal::ZERO {
            Err(CalcError::DivisionByZero)
        } else {
            Ok(Decimal::ZERO)
        };
    }

    let integral = degree.fract().is_zero();
    let negative = radicand < Decimal::ZERO;

    // Only odd integer degrees have a real root of a negative number
    if negative && !(integral && !(degree % Decimal::TWO).is_zero()) {
        return Err(CalcError::DomainError);
    }

    let magnitude = radicand.abs();
    let value = if degree == Decimal::TWO {
        magnitude.sqrt()
    } else {
        Decimal::ONE
            .checked_div(degree)
            .and_then(|inverse| magnitude.checked_powd(inverse))
    }
    .ok_or(CalcError::Overflow)?;

    let value = if integral {
        snap_to_integer(value, magnitude, degree)
    } else {
        value
    };
    let value = cap_precision(value, max_fraction_digits);

    Ok(if negative { -value } else { value })
}

/// Replace an approximate root by the nearest integer when that integer
/// raised to `degree` gives back the radicand exactly.
fn snap_to_integer(value: Decimal, radicand: Decimal, degree: Decimal) -> Decimal {
    let candidate = value.round();

    match degree.to_i64().and_then(|d| candidate.checked_powi(d)) {
        Some(check) if check == radicand => candidate,
        _ => value,
    }
}

fn cap_precision(value: Decimal, max_fraction_digits: u32) -> Decimal {
    value.round_dp(max_fraction_digits).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    #[test]
    fn test_basic_operations() {
        assert_eq!(apply(dec!(2), Operator::Add, dec!(3)), Ok(dec!(5)));
        assert_eq!(apply(dec!(2), Operator::Subtract, dec!(3)), Ok(dec!(-1)));
        assert_eq!(apply(dec!(1.5), Operator::Multiply, dec!(4)), Ok(dec!(6)));
        assert_eq!(apply(dec!(10), Operator::Divide, dec!(4)), Ok(dec!(2.5)));
    }

    #[test]
    fn test_decimal_exactness() {
        // 0.1 + 0.2 must not drift the way binary floats do
        assert_eq!(apply(dec!(0.1), Operator::Add, dec!(0.2)), Ok(dec!(0.3)));
    }

    #[test]
    fn test_divide_by_zero() {
        assert_eq!(
            apply(dec!(5), Operator::Divide, Decimal::ZERO),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(
            apply(Decimal::ZERO, Operator::Divide, dec!(0.000)),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_percent() {
        assert_eq!(apply(dec!(200), Operator::Percent, dec!(10)), Ok(dec!(20)));
        assert_eq!(apply(dec!(50), Operator::Percent, dec!(0.5)), Ok(dec!(0.25)));
    }

    #[test]
    fn test_power() {
        assert_eq!(apply(dec!(2), Operator::Power, dec!(10)), Ok(dec!(1024)));
        assert_eq!(apply(dec!(2), Operator::Power, dec!(-2)), Ok(dec!(0.25)));
        assert_eq!(apply(dec!(-3), Operator::Power, dec!(3)), Ok(dec!(-27)));
        assert_eq!(apply(dec!(7), Operator::Power, Decimal::ZERO), Ok(Decimal::ONE));
        assert_eq!(apply(Decimal::ZERO, Operator::Power, dec!(3)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_power_domain() {
        assert_eq!(
            apply(dec!(-8), Operator::Power, dec!(0.5)),
            Err(CalcError::DomainError)
        );
        assert_eq!(
            apply(Decimal::ZERO, Operator::Power, dec!(-1)),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_power_overflow() {
        assert_eq!(
            apply(dec!(10), Operator::Power, dec!(40)),
            Err(CalcError::Overflow)
        );
    }

    #[test]
    fn test_power_underflow_rounds_to_zero() {
        assert_eq!(apply(dec!(10), Operator::Power, dec!(-40)), Ok(Decimal::ZERO));
        assert_eq!(apply(dec!(0.5), Operator::Power, dec!(200)), Ok(Decimal::ZERO));
        assert_eq!(
            apply(dec!(0.0000000000000000000000000001), Operator::Power, dec!(1.5)),
            Ok(Decimal::ZERO)
        );
        assert_eq!(
            apply(dec!(0.5), Operator::Power, dec!(-200)),
            Err(CalcError::Overflow)
        );
    }

    #[test]
    fn test_root() {
        assert_eq!(apply(dec!(9), Operator::Root, dec!(2)), Ok(dec!(3)));
        assert_eq!(apply(dec!(2.25), Operator::Root, dec!(2)), Ok(dec!(1.5)));
        assert_eq!(apply(dec!(27), Operator::Root, dec!(3)), Ok(dec!(3)));
        assert_eq!(apply(dec!(-8), Operator::Root, dec!(3)), Ok(dec!(-2)));
        assert_eq!(apply(Decimal::ZERO, Operator::Root, dec!(2)), Ok(Decimal::ZERO));
    }

    #[test]
    fn test_root_is_capped() {
        let root2 = apply(dec!(2), Operator::Root, dec!(2)).unwrap();
        assert!(root2.scale() <= DEFAULT_FRACTION_DIGITS);
        assert!(root2 > dec!(1.4142135623) && root2 < dec!(1.4142135624));
    }

    #[test]
    fn test_root_domain() {
        assert_eq!(
            apply(dec!(-4), Operator::Root, dec!(2)),
            Err(CalcError::DomainError)
        );
        assert_eq!(
            apply(dec!(9), Operator::Root, Decimal::ZERO),
            Err(CalcError::DomainError)
        );
        assert_eq!(
            apply(dec!(-9), Operator::Root, dec!(2.5)),
            Err(CalcError::DomainError)
        );
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            apply(Decimal::MAX, Operator::Add, Decimal::ONE),
            Err(CalcError::Overflow)
        );
        assert_eq!(
            apply(Decimal::MAX, Operator::Multiply, dec!(2)),
            Err(CalcError::Overflow)
        );
    }
}
