//! Display rendering rules of the simulated engine.

use rust_decimal::Decimal;
use shared::domain::Radix;

/// Groups `digits` from the right, `size` at a time.
pub(crate) fn group(digits: &str, size: usize, separator: char) -> String {
    let len = digits.chars().count();
    let mut out = String::with_capacity(len + len / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % size == 0 {
            out.push(separator);
        }
        out.push(c);
    }
    out
}

/// Splits a plain numeric string into sign, integer digits and the fraction
/// (including its point), then groups the integer digits by thousands.
pub(crate) fn decimal_text(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(at) => unsigned.split_at(at),
        None => (unsigned, ""),
    };
    format!("{sign}{}{fraction}", group(integer, 3, ','))
}

pub(crate) fn decimal(value: Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    decimal_text(&value.normalize().to_string())
}

/// Programmer rendering: signed and grouped by thousands in decimal, the
/// 64-bit two's complement pattern elsewhere.
pub(crate) fn integer(value: i64, radix: Radix) -> String {
    let pattern = value as u64;
    match radix {
        Radix::Decimal => decimal_text(&value.to_string()),
        Radix::Hexadecimal => group(&format!("{pattern:X}"), 4, ' '),
        Radix::Octal => group(&format!("{pattern:o}"), 3, ' '),
        Radix::Binary => group(&format!("{pattern:b}"), 4, ' '),
    }
}
