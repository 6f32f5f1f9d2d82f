//! Interpretation of engine display text as a 64-bit integer.
//!
//! Encoding in the other direction is left to the engine: a value is re-entered
//! by replaying decimal digit commands (see [`crate::bits`]), so grouping and
//! formatting rules stay the engine's.

use shared::domain::Radix;

const GROUPING_SEPARATORS: [char; 3] = [' ', ',', '_'];

/// Removes every grouping separator the engine may insert.
pub fn strip_grouping(text: &str) -> String {
    text.chars()
        .filter(|c| !GROUPING_SEPARATORS.contains(c))
        .collect()
}

/// Parses `text` as a signed integer in `radix`.
///
/// Returns `None` for anything that is not an integer (empty text, fractions,
/// engine error messages). In the non-decimal radices an unsigned digit string
/// up to 64 bits wide is read as a two's complement pattern, which is how the
/// engine renders negative values there.
pub fn decode(text: &str, radix: Radix) -> Option<i64> {
    let digits = strip_grouping(text.trim());
    if digits.is_empty() {
        return None;
    }

    let base = radix.base();
    if let Ok(value) = i64::from_str_radix(&digits, base) {
        return Some(value);
    }

    if radix == Radix::Decimal || digits.starts_with(['-', '+']) {
        return None;
    }

    u64::from_str_radix(&digits, base)
        .ok()
        .map(|pattern| pattern as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(value: i64, radix: Radix) -> String {
        match radix {
            Radix::Decimal => value.to_string(),
            Radix::Hexadecimal => format!("{:X}", value as u64),
            Radix::Octal => format!("{:o}", value as u64),
            Radix::Binary => format!("{:b}", value as u64),
        }
    }

    fn group(text: &str, size: usize, separator: char) -> String {
        let chars: Vec<char> = text.chars().collect();
        let mut out = String::new();
        for (i, c) in chars.iter().enumerate() {
            if i > 0 && (chars.len() - i) % size == 0 {
                out.push(separator);
            }
            out.push(*c);
        }
        out
    }

    #[test]
    fn strips_all_three_separators() {
        assert_eq!(strip_grouping("1 234,567_8"), "12345678");
        assert_eq!(decode("1,234", Radix::Decimal), Some(1234));
        assert_eq!(decode("FF FF", Radix::Hexadecimal), Some(0xFFFF));
        assert_eq!(decode("1010_1010", Radix::Binary), Some(0b1010_1010));
    }

    #[test]
    fn unparseable_text_is_absent() {
        assert_eq!(decode("", Radix::Decimal), None);
        assert_eq!(decode("   ", Radix::Hexadecimal), None);
        assert_eq!(decode("Cannot divide by zero", Radix::Decimal), None);
        assert_eq!(decode("1.5", Radix::Decimal), None);
        assert_eq!(decode("19", Radix::Octal), None);
        assert_eq!(decode("2", Radix::Binary), None);
    }

    #[test]
    fn decimal_beyond_i64_is_absent() {
        assert_eq!(decode("9223372036854775808", Radix::Decimal), None);
        assert_eq!(
            decode("-9,223,372,036,854,775,808", Radix::Decimal),
            Some(i64::MIN)
        );
    }

    #[test]
    fn reads_two_complement_patterns_in_non_decimal_radices() {
        assert_eq!(decode("FFFF FFFF FFFF FFFF", Radix::Hexadecimal), Some(-1));
        assert_eq!(
            decode("8000 0000 0000 0000", Radix::Hexadecimal),
            Some(i64::MIN)
        );
        assert_eq!(decode("1 777 777 777 777 777 777 777", Radix::Octal), Some(-1));
        assert_eq!(decode("-ff", Radix::Hexadecimal), Some(-255));
        assert_eq!(decode("1 0000 0000 0000 0000", Radix::Hexadecimal), None);
    }

    #[test]
    fn round_trips_boundary_values_in_every_radix() {
        let values = [
            0,
            1,
            -1,
            2,
            255,
            -255,
            4096,
            i64::from(i32::MAX),
            i64::from(i32::MIN),
            i64::MAX,
            i64::MIN,
            i64::MAX - 1,
            i64::MIN + 1,
            0x0123_4567_89AB_CDEF,
        ];
        for radix in Radix::ALL {
            for value in values {
                let text = render(value, radix);
                assert_eq!(decode(&text, radix), Some(value), "{radix} {text}");
                let grouped = group(&text, 4, ' ');
                assert_eq!(decode(&grouped, radix), Some(value), "{radix} {grouped}");
            }
        }
    }

    #[test]
    fn round_trips_a_spread_of_values() {
        let mut value: i64 = 1;
        for step in 0..200u32 {
            value = value
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407 ^ i64::from(step));
            for radix in Radix::ALL {
                assert_eq!(decode(&render(value, radix), radix), Some(value));
            }
        }
    }
}
