//! Human-readable expression line assembled across operator entry.
//!
//! The line only ever holds what the engine has already consumed: the operand
//! captured at the last operator press and that operator's glyph. The operand
//! being typed is appended once, at evaluation.

use shared::protocol::BinaryOperator;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionState {
    pending_operator: Option<BinaryOperator>,
    first_operand: Option<String>,
    expression: String,
}

impl ExpressionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn pending_operator(&self) -> Option<BinaryOperator> {
        self.pending_operator
    }

    pub fn first_operand(&self) -> Option<&str> {
        self.first_operand.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.expression.is_empty()
    }

    /// Records `display` as the left operand of `operator`.
    ///
    /// A second operator without an evaluation in between overwrites the first,
    /// re-reading the current display.
    pub fn record_operator(&mut self, operator: BinaryOperator, display: &str) {
        let expression = format!("{display}{}", operator.glyph());
        self.first_operand = Some(display.to_string());
        self.pending_operator = Some(operator);
        self.expression = expression;
    }

    /// Completes the pending expression with the operand on display and resets.
    ///
    /// Returns `None`, still resetting, when nothing was pending.
    pub fn finish(&mut self, display: &str) -> Option<String> {
        let finished = if self.expression.is_empty() {
            None
        } else {
            Some(format!("{}{display}", self.expression))
        };
        self.reset();
        finished
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
