// Result text formatting

use core::fmt::Write;
use rust_decimal::{Decimal, RoundingStrategy};

/// Capacity of a rendered result line
pub const RESULT_CAPACITY: usize = 48;

/// Most significant digits the decimal type can carry
pub const MAX_SIGNIFICANT_DIGITS: u32 = 28;

/// Smallest decimal exponent still written in fixed-point notation
const MIN_FIXED_EXPONENT: i32 = -6;

pub type ResultText = heapless::String<RESULT_CAPACITY>;

/// Format a value for the result display.
///
/// Rounds to `max_digits` significant digits and trims trailing zeros.
/// Values too large or too small for fixed-point at that precision are
/// written in scientific notation, e.g. `1.23456789012e15`.
/// The value itself is never modified, only its presentation.
pub fn format_decimal(value: Decimal, max_digits: u32) -> ResultText {
    let mut text = ResultText::new();
    let max_digits = max_digits.clamp(1, MAX_SIGNIFICANT_DIGITS);

    if value.is_zero() {
        text.push('0').ok();
        return text;
    }

    let rounded = value
        .round_sf_with_strategy(max_digits, RoundingStrategy::MidpointAwayFromZero)
        .unwrap_or(value)
        .normalize();
    let exponent = decimal_exponent(rounded);

    if (MIN_FIXED_EXPONENT..max_digits as i32).contains(&exponent) {
        write!(&mut text, "{rounded}").ok();
    } else {
        write_scientific(&mut text, rounded, exponent);
    }

    text
}

/// Number of significant digits typed into an entry like `"-0.0120"`
pub fn significant_digits(entry: &str) -> u32 {
    entry
        .trim_start_matches(['-', '0', '.'])
        .chars()
        .filter(char::is_ascii_digit)
        .count() as u32
}

/// Power of ten of the most significant digit: 2 for 123.4, -3 for 0.001
fn decimal_exponent(value: Decimal) -> i32 {
    digit_count(value.mantissa().unsigned_abs()) as i32 - 1 - value.scale() as i32
}

fn digit_count(mut n: u128) -> u32 {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

fn write_scientific(text: &mut ResultText, value: Decimal, exponent: i32) {
    let mut digits = heapless::String::<40>::new();
    write!(&mut digits, "{}", value.mantissa().unsigned_abs()).ok();
    let digits = digits.trim_end_matches('0');

    if value.is_sign_negative() {
        text.push('-').ok();
    }

    let (lead, rest) = digits.split_at(1);
    text.push_str(lead).ok();
    if !rest.is_empty() {
        text.push('.').ok();
        text.push_str(rest).ok();
    }
    write!(text, "e{exponent}").ok();
}
