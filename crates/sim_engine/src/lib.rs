//! In-process numeric engine behind the [`EngineAdapter`] boundary.
//!
//! Standard and scientific modes compute in 96-bit decimal; programmer mode
//! computes in wrapping 64-bit two's complement and renders in the selected
//! radix. Every display update is announced to subscribers.

use std::sync::{Mutex, MutexGuard, PoisonError};

use calc_core::{DisplayChanged, EngineAdapter};
use crossbeam_channel::{unbounded, Receiver, Sender};
use shared::{
    domain::{Mode, Radix},
    error::EngineError,
    protocol::CommandCode,
};

mod format;
mod state;

pub use state::{DIVIDE_BY_ZERO, INVALID_INPUT, OVERFLOW};

use state::EngineState;

#[derive(Default)]
pub struct SimulatedEngine {
    state: Mutex<EngineState>,
    listeners: Mutex<Vec<Sender<DisplayChanged>>>,
}

impl SimulatedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> Mode {
        self.state().mode()
    }

    pub fn radix(&self) -> Radix {
        self.state().radix()
    }

    /// Announces a display update without any input, as a background
    /// recompute would. Safe to call from any thread.
    pub fn refresh(&self) {
        self.notify();
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|tx| tx.send(DisplayChanged).is_ok());
    }
}

impl EngineAdapter for SimulatedEngine {
    fn send_command(&self, code: CommandCode) -> Result<(), EngineError> {
        let shown = {
            let mut state = self.state();
            state.apply(code);
            state.display()
        };
        tracing::trace!(command = code.0, display = %shown, "simulated engine applied command");
        self.notify();
        Ok(())
    }

    fn display(&self) -> Result<String, EngineError> {
        Ok(self.state().display())
    }

    fn set_mode(&self, mode: Mode) -> Result<(), EngineError> {
        self.state().set_mode(mode);
        self.notify();
        Ok(())
    }

    fn subscribe_display_changes(&self) -> Receiver<DisplayChanged> {
        let (tx, rx) = unbounded();
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }
}
