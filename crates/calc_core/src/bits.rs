//! Per-bit view of the displayed value.

use shared::{
    domain::{Radix, BIT_WIDTH},
    protocol::CommandCode,
};

use crate::radix;

/// Whole 64-bit pattern of `display`, or `None` when it is not an integer.
pub fn pattern(display: &str, radix: Radix) -> Option<u64> {
    radix::decode(display, radix).map(|value| value as u64)
}

/// Reads bit `index` of the displayed value. Unparseable text and indices past
/// the engine width read as unset.
pub fn is_set(display: &str, radix: Radix, index: u32) -> bool {
    if index >= BIT_WIDTH {
        return false;
    }
    radix::decode(display, radix)
        .map(|value| (value >> index) & 1 == 1)
        .unwrap_or(false)
}

/// Command sequence that flips bit `index` and leaves the engine in `radix`.
/// Returns an empty sequence for indices past the engine width.
pub fn toggle_commands(display: &str, radix: Radix, index: u32) -> Vec<CommandCode> {
    if index >= BIT_WIDTH {
        return Vec::new();
    }

    let value = radix::decode(display, radix).unwrap_or(0);
    value_commands(value ^ (1i64 << index), radix)
}

/// Command sequence that loads `value` into the engine and leaves it in `radix`.
///
/// The value is typed in decimal, magnitude first and sign last, because the
/// engine's negate toggles the sign of what was typed.
pub(crate) fn value_commands(value: i64, radix: Radix) -> Vec<CommandCode> {
    let mut commands = Vec::with_capacity(24);
    if radix != Radix::Decimal {
        commands.push(CommandCode::RADIX_DEC);
    }
    commands.push(CommandCode::CLEAR);
    commands.extend(decimal_digit_commands(value.unsigned_abs()));
    if value < 0 {
        commands.push(CommandCode::NEGATE);
    }
    if radix != Radix::Decimal {
        commands.push(CommandCode::radix_switch(radix));
    }
    commands
}

fn decimal_digit_commands(magnitude: u64) -> impl Iterator<Item = CommandCode> {
    magnitude
        .to_string()
        .into_bytes()
        .into_iter()
        .filter_map(|b| CommandCode::digit(u32::from(b - b'0')))
}

/// Bits of `pattern` most significant first, in rows of sixteen grouped by four.
pub fn panel_rows(pattern: u64) -> [[[bool; 4]; 4]; 4] {
    let mut rows = [[[false; 4]; 4]; 4];
    for (row, groups) in rows.iter_mut().enumerate() {
        for (group, nibble) in groups.iter_mut().enumerate() {
            for (col, bit) in nibble.iter_mut().enumerate() {
                let index = (3 - row) * 16 + (3 - group) * 4 + (3 - col);
                *bit = (pattern >> index) & 1 == 1;
            }
        }
    }
    rows
}
