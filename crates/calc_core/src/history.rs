//! Log of completed computations, newest first.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::{
    domain::{HistoryId, Radix},
    protocol::CommandCode,
};

use crate::{bits, radix};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    id: HistoryId,
    expression: String,
    result: String,
    radix: Radix,
    recorded_at: DateTime<Utc>,
}

impl HistoryItem {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: HistoryId::new(),
            expression: expression.into(),
            result: result.into(),
            radix: Radix::Decimal,
            recorded_at: Utc::now(),
        }
    }

    /// Marks the result as rendered in `radix` rather than decimal.
    pub fn rendered_in(mut self, radix: Radix) -> Self {
        self.radix = radix;
        self
    }

    pub fn id(&self) -> HistoryId {
        self.id
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn result(&self) -> &str {
        &self.result
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }

    /// Commands that load this item's result back into an engine showing
    /// `current`.
    ///
    /// An integer result is read in the radix it was rendered in and typed in
    /// decimal, so the value survives a radix switch since the computation.
    /// Other numeric text (fractions, values wider than 64 bits) is replayed
    /// digit by digit with a leading minus as a trailing negate. Text that is
    /// not a number (an engine error message) replays only the clear.
    pub fn reentry_commands(&self, current: Radix) -> Vec<CommandCode> {
        if let Some(value) = radix::decode(&self.result, self.radix) {
            return bits::value_commands(value, current);
        }

        let mut commands = vec![CommandCode::CLEAR];
        let text = radix::strip_grouping(self.result.trim());
        let (negative, magnitude) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.as_str()),
        };

        let Some(entry) = entry_commands(magnitude, self.radix) else {
            return commands;
        };
        commands.extend(entry);
        if negative {
            commands.push(CommandCode::NEGATE);
        }
        commands
    }
}

fn entry_commands(magnitude: &str, radix: Radix) -> Option<Vec<CommandCode>> {
    if magnitude.is_empty() {
        return None;
    }

    let mut seen_point = false;
    let mut commands = Vec::with_capacity(magnitude.len());
    for c in magnitude.chars() {
        if c == '.' && !seen_point {
            seen_point = true;
            commands.push(CommandCode::POINT);
            continue;
        }
        let digit = match radix {
            Radix::Hexadecimal => c.to_digit(16).filter(|_| !c.is_ascii_lowercase()),
            _ => c.to_digit(10),
        }?;
        commands.push(CommandCode::digit(digit)?);
    }
    Some(commands)
}

/// History with head insertion and an optional capacity.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    items: VecDeque<HistoryItem>,
    limit: Option<usize>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that evicts its oldest entries past `limit`.
    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        if let Some(limit) = self.limit {
            self.items.truncate(limit);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn head(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    pub fn get(&self, id: HistoryId) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn nth(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryItem> {
        self.items.iter()
    }

    pub fn select_for_reentry(&self, id: HistoryId, radix: Radix) -> Option<Vec<CommandCode>> {
        self.get(id).map(|item| item.reentry_commands(radix))
    }
}
