//! Line-oriented controller: typed keys and `:` commands against an
//! [`InteractionEngine`].

use std::io::Write;

use calc_core::{EngineAdapter, InteractionEngine, InteractionSnapshot};
use shared::{
    domain::{Mode, Radix},
    error::{EngineError, ParseModeError, ParseRadixError},
    protocol::CommandCode,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{keymap, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaCommand {
    Mode(Mode),
    Radix(Radix),
    Bits,
    Bit(u32),
    Toggle(u32),
    History,
    ClearHistory,
    /// 1-based position in the history listing.
    Reenter(usize),
    Engine(CommandCode),
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("unknown command ':{0}'")]
    Unknown(String),
    #[error("':{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid bit index '{0}'")]
    BitIndex(String),
    #[error("invalid history position '{0}' (the newest entry is 1)")]
    HistoryPosition(String),
    #[error(transparent)]
    Mode(#[from] ParseModeError),
    #[error(transparent)]
    Radix(#[from] ParseRadixError),
}

/// Parses the text after the leading `:`.
pub fn parse_meta(text: &str) -> Result<MetaCommand, MetaError> {
    let mut parts = text.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let mut argument =
        |command: &'static str| parts.next().ok_or(MetaError::MissingArgument(command));

    let command = match name {
        "mode" => MetaCommand::Mode(argument("mode")?.parse()?),
        "radix" => MetaCommand::Radix(argument("radix")?.parse()?),
        "bits" => MetaCommand::Bits,
        "bit" => MetaCommand::Bit(bit_index(argument("bit")?)?),
        "toggle" => MetaCommand::Toggle(bit_index(argument("toggle")?)?),
        "history" => MetaCommand::History,
        "clear-history" => MetaCommand::ClearHistory,
        "reenter" => {
            let raw = argument("reenter")?;
            let position = raw
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| MetaError::HistoryPosition(raw.to_string()))?;
            MetaCommand::Reenter(position)
        }
        "ce" => MetaCommand::Engine(CommandCode::CLEAR_ENTRY),
        "back" => MetaCommand::Engine(CommandCode::BACKSPACE),
        "neg" => MetaCommand::Engine(CommandCode::NEGATE),
        "sqrt" => MetaCommand::Engine(CommandCode::ROOT),
        "recip" => MetaCommand::Engine(CommandCode::RECIPROCAL),
        "quit" | "q" => MetaCommand::Quit,
        other => return Err(MetaError::Unknown(other.to_string())),
    };
    Ok(command)
}

fn bit_index(raw: &str) -> Result<u32, MetaError> {
    raw.parse()
        .map_err(|_| MetaError::BitIndex(raw.to_string()))
}

pub struct Session<E: EngineAdapter + ?Sized> {
    interaction: InteractionEngine<E>,
}

impl<E: EngineAdapter + ?Sized> Session<E> {
    pub fn new(interaction: InteractionEngine<E>) -> Self {
        Self { interaction }
    }

    pub fn interaction(&self) -> &InteractionEngine<E> {
        &self.interaction
    }

    pub fn snapshot(&self) -> InteractionSnapshot {
        self.interaction.snapshot()
    }

    pub fn write_status(&self, out: &mut impl Write) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}",
            render::status(self.interaction.expression(), self.interaction.display())
        )?;
        Ok(())
    }

    /// Runs one input line and writes what it produced.
    pub fn handle_line(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }
        if let Some(meta) = line.strip_prefix(':') {
            return match parse_meta(meta) {
                Ok(command) => self.run_meta(command, out),
                Err(err) => {
                    debug!(%err, "rejected console command");
                    writeln!(out, "error: {err}")?;
                    Ok(Flow::Continue)
                }
            };
        }

        self.type_keys(line, out)?;
        self.write_status(out)?;
        Ok(Flow::Continue)
    }

    fn type_keys(&mut self, line: &str, out: &mut impl Write) -> anyhow::Result<()> {
        let mut ignored = String::new();
        for key in line.chars() {
            if keymap::is_separator(key) {
                continue;
            }
            match keymap::command_for_key(key, self.interaction.mode(), self.interaction.radix()) {
                Some(code) => self.send(code)?,
                None => ignored.push(key),
            }
        }
        if !ignored.is_empty() {
            debug!(ignored = %ignored, "keys without a command");
            writeln!(out, "ignored: {ignored}")?;
        }
        Ok(())
    }

    fn run_meta(&mut self, command: MetaCommand, out: &mut impl Write) -> anyhow::Result<Flow> {
        match command {
            MetaCommand::Mode(mode) => {
                self.interaction.set_mode(mode).map_err(report)?;
                writeln!(
                    out,
                    "{}",
                    render::mode_line(self.interaction.mode(), self.interaction.radix())
                )?;
                self.write_status(out)?;
            }
            MetaCommand::Radix(radix) => {
                self.send(CommandCode::radix_switch(radix))?;
                writeln!(
                    out,
                    "{}",
                    render::mode_line(self.interaction.mode(), self.interaction.radix())
                )?;
                self.write_status(out)?;
            }
            MetaCommand::Bits => match self.interaction.bit_pattern() {
                Some(pattern) => writeln!(out, "{}", render::bit_panel(pattern))?,
                None => writeln!(out, "display is not an integer")?,
            },
            MetaCommand::Bit(index) => {
                let bit = u8::from(self.interaction.is_bit_set(index));
                writeln!(out, "bit {index} = {bit}")?;
            }
            MetaCommand::Toggle(index) => {
                self.interaction.toggle_bit(index).map_err(report)?;
                self.write_status(out)?;
            }
            MetaCommand::History => {
                writeln!(out, "{}", render::history_listing(self.interaction.history()))?;
            }
            MetaCommand::ClearHistory => {
                self.interaction.clear_history();
                writeln!(out, "history cleared")?;
            }
            MetaCommand::Reenter(position) => {
                let Some(id) = self
                    .interaction
                    .history()
                    .nth(position - 1)
                    .map(|item| item.id())
                else {
                    writeln!(out, "no history entry {position}")?;
                    return Ok(Flow::Continue);
                };
                self.interaction.reenter_history(id).map_err(report)?;
                self.write_status(out)?;
            }
            MetaCommand::Engine(code) => {
                self.send(code)?;
                self.write_status(out)?;
            }
            MetaCommand::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    fn send(&mut self, code: CommandCode) -> Result<(), EngineError> {
        self.interaction.send_command(code).map_err(report)
    }
}

fn report(err: EngineError) -> EngineError {
    warn!(%err, "engine call failed");
    err
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
