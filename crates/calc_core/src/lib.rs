//! Interaction layer between calculator input and an opaque numeric engine.
//!
//! [`InteractionEngine`] is the single entry point for a front-end. It forwards
//! command codes to an [`EngineAdapter`], keeps the expression line and the
//! history in step with the engine's display, tracks the current radix, and
//! offers a per-bit view of the displayed value.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use serde::Serialize;
use shared::{
    domain::{HistoryId, Mode, Radix},
    error::EngineError,
    protocol::{CommandCode, CommandKind},
};
use tracing::{debug, info};

pub mod adapter;
pub mod bits;
pub mod events;
pub mod expression;
pub mod history;
pub mod radix;

pub use adapter::{DetachedEngine, DisplayChanged, EngineAdapter};
pub use events::InteractionEvent;
pub use expression::ExpressionState;
pub use history::{HistoryItem, HistoryStore};

use events::EventBus;

pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionOptions {
    /// Maximum number of history entries kept; `None` keeps everything.
    pub history_limit: Option<usize>,
    pub event_queue_capacity: usize,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self {
            history_limit: None,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionSnapshot {
    pub display: String,
    pub expression: String,
    pub mode: Mode,
    pub radix: Radix,
    pub history: Vec<HistoryItem>,
}

/// Owned interaction state driven by a shared engine handle.
///
/// Not thread-safe by contract: every method runs on the front-end's event
/// thread. Engine notifications posted from elsewhere wait in a queue until
/// [`InteractionEngine::pump_notifications`] or the next command drains them.
pub struct InteractionEngine<E: EngineAdapter + ?Sized> {
    engine: Arc<E>,
    notifications: Receiver<DisplayChanged>,
    display: String,
    mode: Mode,
    radix: Radix,
    expression: ExpressionState,
    history: HistoryStore,
    events: EventBus,
}

impl<E: EngineAdapter + ?Sized> InteractionEngine<E> {
    /// Attaches to `engine`, assumed to be in standard mode and decimal radix.
    pub fn new(engine: Arc<E>, options: InteractionOptions) -> Result<Self, EngineError> {
        let notifications = engine.subscribe_display_changes();
        let display = engine.display()?;
        Ok(Self {
            engine,
            notifications,
            display,
            mode: Mode::default(),
            radix: Radix::default(),
            expression: ExpressionState::new(),
            history: HistoryStore::with_limit(options.history_limit),
            events: EventBus::new(options.event_queue_capacity),
        })
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn expression(&self) -> &str {
        self.expression.expression()
    }

    pub fn expression_state(&self) -> &ExpressionState {
        &self.expression
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn radix(&self) -> Radix {
        self.radix
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn subscribe(&mut self) -> Receiver<InteractionEvent> {
        self.events.subscribe()
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        InteractionSnapshot {
            display: self.display.clone(),
            expression: self.expression().to_string(),
            mode: self.mode,
            radix: self.radix,
            history: self.history.iter().cloned().collect(),
        }
    }

    /// Handles one command from the front-end.
    pub fn send_command(&mut self, code: CommandCode) -> Result<(), EngineError> {
        self.pump_notifications()?;
        self.dispatch(code)
    }

    /// Switches the engine mode, keeping the displayed value.
    pub fn set_mode(&mut self, mode: Mode) -> Result<(), EngineError> {
        self.engine.set_mode(mode)?;
        if mode != self.mode {
            info!(from = %self.mode, to = %mode, "calculator mode changed");
            self.mode = mode;
            self.events.publish(InteractionEvent::ModeChanged(mode));
        }
        self.refresh_display()
    }

    /// Drains pending engine notifications and re-reads the display once if
    /// any were queued. Returns the number drained.
    pub fn pump_notifications(&mut self) -> Result<usize, EngineError> {
        let drained = self.notifications.try_iter().count();
        if drained > 0 {
            debug!(drained, "engine reported display changes");
            self.refresh_display()?;
        }
        Ok(drained)
    }

    /// Radix the display is interpreted in. Only programmer mode renders
    /// in a non-decimal radix.
    pub fn effective_radix(&self) -> Radix {
        match self.mode {
            Mode::Programmer => self.radix,
            Mode::Standard | Mode::Scientific => Radix::Decimal,
        }
    }

    pub fn is_bit_set(&self, index: u32) -> bool {
        bits::is_set(&self.display, self.effective_radix(), index)
    }

    pub fn bit_pattern(&self) -> Option<u64> {
        bits::pattern(&self.display, self.effective_radix())
    }

    /// Flips one bit of the displayed value by re-entering the new value
    /// through the engine. Indices past 63 are ignored.
    pub fn toggle_bit(&mut self, index: u32) -> Result<(), EngineError> {
        self.pump_notifications()?;
        let commands = bits::toggle_commands(&self.display, self.effective_radix(), index);
        if commands.is_empty() {
            debug!(index, "ignoring toggle of bit outside engine width");
            return Ok(());
        }
        debug!(index, commands = commands.len(), "replaying bit toggle");
        self.run_sequence(&commands)
    }

    pub fn clear_history(&mut self) {
        let removed = self.history.len();
        self.history.clear();
        info!(removed, "history cleared");
        self.events.publish(InteractionEvent::HistoryCleared);
    }

    /// Loads the result of history entry `id` back into the engine.
    /// Returns `false` when no such entry exists.
    pub fn reenter_history(&mut self, id: HistoryId) -> Result<bool, EngineError> {
        self.pump_notifications()?;
        let Some(commands) = self.history.select_for_reentry(id, self.effective_radix()) else {
            return Ok(false);
        };
        self.run_sequence(&commands)?;
        Ok(true)
    }

    fn run_sequence(&mut self, commands: &[CommandCode]) -> Result<(), EngineError> {
        for code in commands {
            self.dispatch(*code)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, code: CommandCode) -> Result<(), EngineError> {
        match code.kind() {
            CommandKind::Binary(operator) => {
                let operand = self.display.clone();
                self.forward(code)?;
                self.expression.record_operator(operator, &operand);
                self.publish_expression();
                Ok(())
            }
            CommandKind::Equals => self.evaluate(code),
            CommandKind::Clear | CommandKind::ClearEntry => {
                if !self.expression.is_empty() {
                    self.expression.reset();
                    self.publish_expression();
                }
                self.forward(code)
            }
            CommandKind::RadixSwitch(radix) => {
                self.forward(code)?;
                if radix != self.radix {
                    info!(from = %self.radix, to = %radix, "radix changed");
                    self.radix = radix;
                    self.events.publish(InteractionEvent::RadixChanged(radix));
                }
                Ok(())
            }
            CommandKind::ModeSwitch(mode) => self.set_mode(mode),
            CommandKind::Digit(_)
            | CommandKind::Point
            | CommandKind::Negate
            | CommandKind::Backspace
            | CommandKind::Unary(_)
            | CommandKind::Other => self.forward(code),
        }
    }

    fn evaluate(&mut self, code: CommandCode) -> Result<(), EngineError> {
        let Some(expression) = self.expression.finish(&self.display) else {
            debug!("equals without a pending expression");
            return Ok(());
        };
        self.publish_expression();

        self.forward(code)?;
        let item = HistoryItem::new(expression, self.display.clone())
            .rendered_in(self.effective_radix());
        info!(
            expression = item.expression(),
            result = item.result(),
            radix = %item.radix(),
            "computation recorded"
        );
        let id = item.id();
        self.history.push(item);
        self.events.publish(InteractionEvent::HistoryAdded(id));
        Ok(())
    }

    fn forward(&mut self, code: CommandCode) -> Result<(), EngineError> {
        debug!(command = code.0, "forwarding command to engine");
        self.engine.send_command(code)?;
        self.refresh_display()
    }

    fn refresh_display(&mut self) -> Result<(), EngineError> {
        let display = self.engine.display()?;
        if display != self.display {
            self.display = display;
            self.events
                .publish(InteractionEvent::DisplayChanged(self.display.clone()));
        }
        Ok(())
    }

    fn publish_expression(&mut self) {
        let expression = self.expression().to_string();
        self.events
            .publish(InteractionEvent::ExpressionChanged(expression));
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
