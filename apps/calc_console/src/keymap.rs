//! Keyboard characters to engine command codes.

use shared::{
    domain::{Mode, Radix},
    protocol::CommandCode,
};

/// Command for one typed character in the given mode and radix, or `None`
/// when the key has no meaning there.
///
/// `c` doubles as Clear except while entering hex digits, and `%` is the
/// integer remainder in programmer mode and percent elsewhere.
pub fn command_for_key(key: char, mode: Mode, radix: Radix) -> Option<CommandCode> {
    let programmer = mode == Mode::Programmer;
    match key {
        '0'..='9' => key.to_digit(10).and_then(CommandCode::digit),
        'c' | 'C' if programmer && radix == Radix::Hexadecimal => CommandCode::digit(12),
        'c' | 'C' => Some(CommandCode::CLEAR),
        'a'..='f' | 'A'..='F' if programmer => key.to_digit(16).and_then(CommandCode::digit),
        '.' => Some(CommandCode::POINT),
        '+' => Some(CommandCode::ADD),
        '-' => Some(CommandCode::SUB),
        '*' => Some(CommandCode::MUL),
        '/' => Some(CommandCode::DIV),
        '=' => Some(CommandCode::EQUALS),
        '%' if programmer => Some(CommandCode::MOD),
        '%' => Some(CommandCode::PERCENT),
        '^' if programmer => Some(CommandCode::XOR),
        '^' => Some(CommandCode::POWER),
        '&' if programmer => Some(CommandCode::AND),
        '|' if programmer => Some(CommandCode::OR),
        '<' if programmer => Some(CommandCode::LSHIFT),
        '>' if programmer => Some(CommandCode::RSHIFT),
        _ => None,
    }
}

/// Characters skipped silently inside a typed line.
pub fn is_separator(key: char) -> bool {
    key.is_whitespace() || key == ',' || key == '_'
}
