//! Arithmetic state machine of the simulated engine.

use std::str::FromStr;

use rust_decimal::{prelude::ToPrimitive, Decimal, MathematicalOps};
use shared::{
    domain::{Mode, Radix},
    protocol::{BinaryOperator, CommandCode, CommandKind, UnaryOperator},
};

use crate::format;

pub const DIVIDE_BY_ZERO: &str = "Cannot divide by zero";
pub const INVALID_INPUT: &str = "Invalid input";
pub const OVERFLOW: &str = "Overflow";

const RESULT_SCALE: u32 = 16;
const MAX_DECIMAL_DIGITS: usize = 28;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Entry {
    digits: String,
    negative: bool,
}

impl Entry {
    fn zero() -> Self {
        Self {
            digits: "0".to_string(),
            negative: false,
        }
    }

    fn significant_digits(&self) -> usize {
        self.digits.chars().filter(char::is_ascii_alphanumeric).count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// Showing a result or a pending left operand; the next digit starts a
    /// new entry and the next operator replaces the pending one.
    Idle,
    Typing(Entry),
    /// `value` holds an operand produced by a unary command or a negate.
    Ready,
}

#[derive(Debug, Clone)]
pub(crate) struct EngineState {
    mode: Mode,
    radix: Radix,
    value: Decimal,
    input: Input,
    pending: Option<(BinaryOperator, Decimal)>,
    error: Option<&'static str>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            mode: Mode::Standard,
            radix: Radix::Decimal,
            value: Decimal::ZERO,
            input: Input::Idle,
            pending: None,
            error: None,
        }
    }
}

impl EngineState {
    pub(crate) fn mode(&self) -> Mode {
        self.mode
    }

    pub(crate) fn radix(&self) -> Radix {
        self.radix
    }

    pub(crate) fn apply(&mut self, code: CommandCode) {
        match code.kind() {
            CommandKind::Digit(digit) => self.digit(digit),
            CommandKind::Point => self.point(),
            CommandKind::Negate => self.negate(),
            CommandKind::Backspace => self.backspace(),
            CommandKind::Clear => *self = Self {
                mode: self.mode,
                radix: self.radix,
                ..Self::default()
            },
            CommandKind::ClearEntry => {
                self.error = None;
                self.input = Input::Typing(Entry::zero());
            }
            CommandKind::Binary(operator) => self.binary(operator),
            CommandKind::Unary(operator) => self.unary(operator),
            CommandKind::Equals => self.equals(),
            CommandKind::RadixSwitch(radix) => {
                self.commit_entry();
                self.radix = radix;
            }
            CommandKind::ModeSwitch(mode) => self.set_mode(mode),
            CommandKind::Other => {
                tracing::debug!(command = code.0, "simulated engine ignores command");
            }
        }
    }

    pub(crate) fn set_mode(&mut self, mode: Mode) {
        self.commit_entry();
        self.mode = mode;
        if mode == Mode::Programmer {
            self.value = Decimal::from(wrap(self.value));
            if let Some((_, lhs)) = self.pending.as_mut() {
                *lhs = Decimal::from(wrap(*lhs));
            }
        }
    }

    pub(crate) fn display(&self) -> String {
        if let Some(message) = self.error {
            return message.to_string();
        }
        match &self.input {
            Input::Typing(entry) => self.entry_display(entry),
            Input::Idle | Input::Ready => self.value_display(self.value),
        }
    }

    fn programmer(&self) -> bool {
        self.mode == Mode::Programmer
    }

    fn base(&self) -> u32 {
        if self.programmer() {
            self.radix.base()
        } else {
            10
        }
    }

    fn max_digits(&self) -> usize {
        if !self.programmer() {
            return MAX_DECIMAL_DIGITS;
        }
        match self.radix {
            Radix::Binary => 64,
            Radix::Octal => 22,
            Radix::Decimal => 19,
            Radix::Hexadecimal => 16,
        }
    }

    fn value_display(&self, value: Decimal) -> String {
        if self.programmer() {
            format::integer(wrap(value), self.radix)
        } else {
            format::decimal(value)
        }
    }

    fn entry_display(&self, entry: &Entry) -> String {
        if self.programmer() && self.radix != Radix::Decimal {
            if entry.negative {
                return format::integer(wrap(self.entry_value(entry)), self.radix);
            }
            let size = if self.radix == Radix::Octal { 3 } else { 4 };
            return format::group(&entry.digits, size, ' ');
        }
        let sign = if entry.negative { "-" } else { "" };
        format!("{sign}{}", format::decimal_text(&entry.digits))
    }

    fn entry_value(&self, entry: &Entry) -> Decimal {
        if self.programmer() {
            let magnitude = u128::from_str_radix(&entry.digits, self.radix.base()).unwrap_or(0);
            let signed = if entry.negative {
                (magnitude as i128).wrapping_neg()
            } else {
                magnitude as i128
            };
            return Decimal::from(signed as i64);
        }
        let digits = entry.digits.trim_end_matches('.');
        let magnitude = Decimal::from_str(digits).unwrap_or(Decimal::ZERO);
        if entry.negative {
            -magnitude
        } else {
            magnitude
        }
    }

    /// Current operand: what is being typed, or the value on display.
    fn operand(&self) -> Decimal {
        match &self.input {
            Input::Typing(entry) => self.entry_value(entry),
            Input::Idle | Input::Ready => self.value,
        }
    }

    fn commit_entry(&mut self) {
        if let Input::Typing(entry) = &self.input {
            self.value = self.entry_value(entry);
            self.input = Input::Ready;
        }
    }

    fn clear_error(&mut self) {
        if self.error.take().is_some() {
            self.value = Decimal::ZERO;
            self.pending = None;
            self.input = Input::Idle;
        }
    }

    fn digit(&mut self, digit: u32) {
        if digit >= self.base() {
            return;
        }
        self.clear_error();
        let max_digits = self.max_digits();
        let symbol = char::from_digit(digit, 16)
            .unwrap_or('0')
            .to_ascii_uppercase();
        match &mut self.input {
            Input::Typing(entry) => {
                if entry.digits == "0" {
                    entry.digits = symbol.to_string();
                } else if entry.significant_digits() < max_digits {
                    entry.digits.push(symbol);
                }
            }
            Input::Idle | Input::Ready => {
                self.input = Input::Typing(Entry {
                    digits: symbol.to_string(),
                    negative: false,
                });
            }
        }
    }

    fn point(&mut self) {
        if self.programmer() {
            return;
        }
        self.clear_error();
        match &mut self.input {
            Input::Typing(entry) => {
                if !entry.digits.contains('.') {
                    entry.digits.push('.');
                }
            }
            Input::Idle | Input::Ready => {
                self.input = Input::Typing(Entry {
                    digits: "0.".to_string(),
                    negative: false,
                });
            }
        }
    }

    fn negate(&mut self) {
        if self.error.is_some() {
            return;
        }
        let programmer = self.programmer();
        match &mut self.input {
            Input::Typing(entry) => entry.negative = !entry.negative,
            Input::Idle | Input::Ready => {
                self.value = if programmer {
                    Decimal::from(wrap(self.value).wrapping_neg())
                } else {
                    -self.value
                };
                self.input = Input::Ready;
            }
        }
    }

    fn backspace(&mut self) {
        if let Input::Typing(entry) = &mut self.input {
            entry.digits.pop();
            if entry.digits.is_empty() {
                *entry = Entry::zero();
            }
        }
    }

    fn binary(&mut self, operator: BinaryOperator) {
        if self.error.is_some() {
            return;
        }
        let allowed = if self.programmer() {
            operator != BinaryOperator::Power
        } else {
            !operator.is_bitwise()
        };
        if !allowed {
            return;
        }

        let operand_entered = self.input != Input::Idle;
        match (self.pending, operand_entered) {
            (Some((_, lhs)), false) => {
                self.pending = Some((operator, lhs));
            }
            (Some((pending, lhs)), true) => {
                let rhs = self.operand();
                match self.evaluate(pending, lhs, rhs) {
                    Ok(result) => {
                        self.value = result;
                        self.pending = Some((operator, result));
                    }
                    Err(message) => self.fail(message),
                }
                self.input = Input::Idle;
            }
            (None, _) => {
                self.value = self.operand();
                self.pending = Some((operator, self.value));
                self.input = Input::Idle;
            }
        }
    }

    fn unary(&mut self, operator: UnaryOperator) {
        if self.error.is_some() || self.programmer() {
            return;
        }
        let operand = self.operand();
        let result = match operator {
            UnaryOperator::SquareRoot => operand.sqrt().ok_or(INVALID_INPUT),
            UnaryOperator::Reciprocal => {
                if operand.is_zero() {
                    Err(DIVIDE_BY_ZERO)
                } else {
                    Decimal::ONE.checked_div(operand).ok_or(OVERFLOW)
                }
            }
            UnaryOperator::Percent => Ok(operand / Decimal::ONE_HUNDRED),
        };
        match result {
            Ok(value) => {
                self.value = round(value);
                self.input = Input::Ready;
            }
            Err(message) => self.fail(message),
        }
    }

    fn equals(&mut self) {
        if self.error.is_some() {
            return;
        }
        let Some((operator, lhs)) = self.pending.take() else {
            self.commit_entry();
            self.input = Input::Idle;
            return;
        };
        let rhs = self.operand();
        match self.evaluate(operator, lhs, rhs) {
            Ok(result) => self.value = result,
            Err(message) => self.fail(message),
        }
        self.input = Input::Idle;
    }

    fn fail(&mut self, message: &'static str) {
        tracing::debug!(message, "simulated engine entered error state");
        self.error = Some(message);
        self.pending = None;
        self.input = Input::Idle;
    }

    fn evaluate(
        &self,
        operator: BinaryOperator,
        lhs: Decimal,
        rhs: Decimal,
    ) -> Result<Decimal, &'static str> {
        if self.programmer() {
            integer_op(operator, wrap(lhs), wrap(rhs)).map(Decimal::from)
        } else {
            decimal_op(operator, lhs, rhs).map(round)
        }
    }
}

/// Truncates toward zero and wraps into the 64-bit two's complement range.
pub(crate) fn wrap(value: Decimal) -> i64 {
    value.trunc().to_i128().unwrap_or(0) as i64
}

fn round(value: Decimal) -> Decimal {
    value.round_dp(RESULT_SCALE).normalize()
}

fn decimal_op(operator: BinaryOperator, lhs: Decimal, rhs: Decimal) -> Result<Decimal, &'static str> {
    match operator {
        BinaryOperator::Add => lhs.checked_add(rhs).ok_or(OVERFLOW),
        BinaryOperator::Subtract => lhs.checked_sub(rhs).ok_or(OVERFLOW),
        BinaryOperator::Multiply => lhs.checked_mul(rhs).ok_or(OVERFLOW),
        BinaryOperator::Divide | BinaryOperator::Modulo if rhs.is_zero() => Err(DIVIDE_BY_ZERO),
        BinaryOperator::Divide => lhs.checked_div(rhs).ok_or(OVERFLOW),
        BinaryOperator::Modulo => lhs.checked_rem(rhs).ok_or(OVERFLOW),
        BinaryOperator::Power => {
            if rhs.fract().is_zero() {
                let exponent = rhs.to_i64().ok_or(OVERFLOW)?;
                lhs.checked_powi(exponent).ok_or(OVERFLOW)
            } else if lhs.is_sign_negative() {
                Err(INVALID_INPUT)
            } else {
                lhs.checked_powd(rhs).ok_or(OVERFLOW)
            }
        }
        BinaryOperator::And
        | BinaryOperator::Or
        | BinaryOperator::Xor
        | BinaryOperator::ShiftLeft
        | BinaryOperator::ShiftRight => Err(INVALID_INPUT),
    }
}

fn integer_op(operator: BinaryOperator, lhs: i64, rhs: i64) -> Result<i64, &'static str> {
    let shift = u32::try_from(rhs).ok();
    match operator {
        BinaryOperator::Add => Ok(lhs.wrapping_add(rhs)),
        BinaryOperator::Subtract => Ok(lhs.wrapping_sub(rhs)),
        BinaryOperator::Multiply => Ok(lhs.wrapping_mul(rhs)),
        BinaryOperator::Divide | BinaryOperator::Modulo if rhs == 0 => Err(DIVIDE_BY_ZERO),
        BinaryOperator::Divide => Ok(lhs.wrapping_div(rhs)),
        BinaryOperator::Modulo => Ok(lhs.wrapping_rem(rhs)),
        BinaryOperator::And => Ok(lhs & rhs),
        BinaryOperator::Or => Ok(lhs | rhs),
        BinaryOperator::Xor => Ok(lhs ^ rhs),
        BinaryOperator::ShiftLeft => Ok(shift.and_then(|s| lhs.checked_shl(s)).unwrap_or(0)),
        BinaryOperator::ShiftRight => Ok(shift
            .and_then(|s| lhs.checked_shr(s))
            .unwrap_or(if lhs < 0 { -1 } else { 0 })),
        BinaryOperator::Power => Err(INVALID_INPUT),
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
