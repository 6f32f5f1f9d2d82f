//! Change notifications from the interaction engine to front-ends.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use shared::domain::{HistoryId, Mode, Radix};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionEvent {
    DisplayChanged(String),
    ExpressionChanged(String),
    RadixChanged(Radix),
    ModeChanged(Mode),
    HistoryAdded(HistoryId),
    HistoryCleared,
}

impl InteractionEvent {
    fn name(&self) -> &'static str {
        match self {
            InteractionEvent::DisplayChanged(_) => "display_changed",
            InteractionEvent::ExpressionChanged(_) => "expression_changed",
            InteractionEvent::RadixChanged(_) => "radix_changed",
            InteractionEvent::ModeChanged(_) => "mode_changed",
            InteractionEvent::HistoryAdded(_) => "history_added",
            InteractionEvent::HistoryCleared => "history_cleared",
        }
    }
}

/// Fan-out of [`InteractionEvent`]s to bounded subscriber queues.
pub(crate) struct EventBus {
    capacity: usize,
    subscribers: Vec<Sender<InteractionEvent>>,
}

impl EventBus {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            subscribers: Vec::new(),
        }
    }

    pub(crate) fn subscribe(&mut self) -> Receiver<InteractionEvent> {
        let (tx, rx) = bounded(self.capacity);
        self.subscribers.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, event: InteractionEvent) {
        let name = event.name();
        self.subscribers
            .retain(|tx| match tx.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    tracing::warn!(event = name, "subscriber queue is full; dropping event");
                    true
                }
                Err(TrySendError::Disconnected(_)) => {
                    tracing::debug!(event = name, "dropping disconnected subscriber");
                    false
                }
            });
    }
}
