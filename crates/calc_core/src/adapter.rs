//! Boundary to the numeric engine.

use crossbeam_channel::Receiver;
use shared::{domain::Mode, error::EngineError, protocol::CommandCode};

/// Posted by the engine whenever its display text changes.
///
/// Carries no value: receivers re-read [`EngineAdapter::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayChanged;

/// Capabilities the interaction layer needs from a numeric engine.
///
/// Implementations are shared behind an `Arc` and may post notifications from
/// any thread; the interaction layer consumes them on its own thread.
pub trait EngineAdapter: Send + Sync {
    fn send_command(&self, code: CommandCode) -> Result<(), EngineError>;
    fn display(&self) -> Result<String, EngineError>;
    /// Switches mode while keeping the current value.
    fn set_mode(&self, mode: Mode) -> Result<(), EngineError>;
    fn subscribe_display_changes(&self) -> Receiver<DisplayChanged>;
}

/// Adapter for a front-end that has no engine attached yet.
pub struct DetachedEngine;

impl EngineAdapter for DetachedEngine {
    fn send_command(&self, code: CommandCode) -> Result<(), EngineError> {
        Err(EngineError::unavailable(format!(
            "no engine attached to receive command {code}"
        )))
    }

    fn display(&self) -> Result<String, EngineError> {
        Err(EngineError::unavailable("no engine attached to read display"))
    }

    fn set_mode(&self, mode: Mode) -> Result<(), EngineError> {
        Err(EngineError::unavailable(format!(
            "no engine attached to switch to {mode} mode"
        )))
    }

    fn subscribe_display_changes(&self) -> Receiver<DisplayChanged> {
        crossbeam_channel::never()
    }
}
