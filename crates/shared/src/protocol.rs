use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Mode, Radix};

/// Identifier of one engine operation.
///
/// The set below is what the interaction layer interprets; any other value is
/// forwarded to the engine untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandCode(pub i32);

impl CommandCode {
    pub const NEGATE: Self = Self(80);
    pub const CLEAR: Self = Self(81);
    pub const CLEAR_ENTRY: Self = Self(82);
    pub const BACKSPACE: Self = Self(83);
    pub const POINT: Self = Self(84);
    pub const AND: Self = Self(86);
    pub const OR: Self = Self(87);
    pub const XOR: Self = Self(88);
    pub const LSHIFT: Self = Self(89);
    pub const RSHIFT: Self = Self(90);
    pub const DIV: Self = Self(91);
    pub const MUL: Self = Self(92);
    pub const ADD: Self = Self(93);
    pub const SUB: Self = Self(94);
    pub const MOD: Self = Self(95);
    pub const ROOT: Self = Self(96);
    pub const POWER: Self = Self(97);
    pub const RECIPROCAL: Self = Self(113);
    pub const PERCENT: Self = Self(118);
    pub const EQUALS: Self = Self(121);
    pub const DIGIT_0: Self = Self(130);
    pub const HEX_A: Self = Self(140);
    pub const RADIX_HEX: Self = Self(313);
    pub const RADIX_DEC: Self = Self(314);
    pub const RADIX_OCT: Self = Self(315);
    pub const RADIX_BIN: Self = Self(316);
    pub const MODE_STANDARD: Self = Self(4001);
    pub const MODE_SCIENTIFIC: Self = Self(4002);
    pub const MODE_PROGRAMMER: Self = Self(4003);

    /// Entry command for a digit value `0..=15`.
    pub fn digit(value: u32) -> Option<Self> {
        match value {
            0..=9 => Some(Self(Self::DIGIT_0.0 + value as i32)),
            10..=15 => Some(Self(Self::HEX_A.0 + (value as i32 - 10))),
            _ => None,
        }
    }

    pub fn radix_switch(radix: Radix) -> Self {
        match radix {
            Radix::Hexadecimal => Self::RADIX_HEX,
            Radix::Decimal => Self::RADIX_DEC,
            Radix::Octal => Self::RADIX_OCT,
            Radix::Binary => Self::RADIX_BIN,
        }
    }

    pub fn mode_switch(mode: Mode) -> Self {
        match mode {
            Mode::Standard => Self::MODE_STANDARD,
            Mode::Scientific => Self::MODE_SCIENTIFIC,
            Mode::Programmer => Self::MODE_PROGRAMMER,
        }
    }

    pub fn kind(self) -> CommandKind {
        match self {
            Self::NEGATE => CommandKind::Negate,
            Self::CLEAR => CommandKind::Clear,
            Self::CLEAR_ENTRY => CommandKind::ClearEntry,
            Self::BACKSPACE => CommandKind::Backspace,
            Self::POINT => CommandKind::Point,
            Self::AND => CommandKind::Binary(BinaryOperator::And),
            Self::OR => CommandKind::Binary(BinaryOperator::Or),
            Self::XOR => CommandKind::Binary(BinaryOperator::Xor),
            Self::LSHIFT => CommandKind::Binary(BinaryOperator::ShiftLeft),
            Self::RSHIFT => CommandKind::Binary(BinaryOperator::ShiftRight),
            Self::DIV => CommandKind::Binary(BinaryOperator::Divide),
            Self::MUL => CommandKind::Binary(BinaryOperator::Multiply),
            Self::ADD => CommandKind::Binary(BinaryOperator::Add),
            Self::SUB => CommandKind::Binary(BinaryOperator::Subtract),
            Self::MOD => CommandKind::Binary(BinaryOperator::Modulo),
            Self::POWER => CommandKind::Binary(BinaryOperator::Power),
            Self::ROOT => CommandKind::Unary(UnaryOperator::SquareRoot),
            Self::RECIPROCAL => CommandKind::Unary(UnaryOperator::Reciprocal),
            Self::PERCENT => CommandKind::Unary(UnaryOperator::Percent),
            Self::EQUALS => CommandKind::Equals,
            Self::RADIX_HEX => CommandKind::RadixSwitch(Radix::Hexadecimal),
            Self::RADIX_DEC => CommandKind::RadixSwitch(Radix::Decimal),
            Self::RADIX_OCT => CommandKind::RadixSwitch(Radix::Octal),
            Self::RADIX_BIN => CommandKind::RadixSwitch(Radix::Binary),
            Self::MODE_STANDARD => CommandKind::ModeSwitch(Mode::Standard),
            Self::MODE_SCIENTIFIC => CommandKind::ModeSwitch(Mode::Scientific),
            Self::MODE_PROGRAMMER => CommandKind::ModeSwitch(Mode::Programmer),
            Self(code @ 130..=145) => CommandKind::Digit((code - Self::DIGIT_0.0) as u32),
            _ => CommandKind::Other,
        }
    }
}

impl fmt::Display for CommandCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CommandCode {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Classification of a [`CommandCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Digit value `0..=15`; values above 9 are the hex letters.
    Digit(u32),
    Point,
    Negate,
    Backspace,
    Clear,
    ClearEntry,
    Binary(BinaryOperator),
    Unary(UnaryOperator),
    Equals,
    RadixSwitch(Radix),
    ModeSwitch(Mode),
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    And,
    Or,
    Xor,
    ShiftLeft,
    ShiftRight,
}

impl BinaryOperator {
    /// Text inserted between operands in the expression line.
    pub fn glyph(self) -> &'static str {
        match self {
            BinaryOperator::Add => " + ",
            BinaryOperator::Subtract => " − ",
            BinaryOperator::Multiply => " × ",
            BinaryOperator::Divide => " ÷ ",
            BinaryOperator::Modulo => " mod ",
            BinaryOperator::Power => " ^ ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
            BinaryOperator::Xor => " XOR ",
            BinaryOperator::ShiftLeft => " << ",
            BinaryOperator::ShiftRight => " >> ",
        }
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOperator::And
                | BinaryOperator::Or
                | BinaryOperator::Xor
                | BinaryOperator::ShiftLeft
                | BinaryOperator::ShiftRight
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOperator {
    SquareRoot,
    Reciprocal,
    Percent,
}
