use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

mod config;
mod keymap;
mod render;
mod session;

use anyhow::{Context, Result};
use calc_core::InteractionEngine;
use clap::Parser;
use shared::{
    domain::{Mode, Radix},
    protocol::CommandCode,
};
use sim_engine::SimulatedEngine;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use session::{Flow, Session};

/// Line-oriented calculator. Type keys (`12+30=`) or `:` commands
/// (`:mode prog`, `:radix hex`, `:bits`, `:toggle 3`, `:history`, `:quit`).
#[derive(Parser, Debug)]
#[command(name = "calc-console")]
struct Args {
    /// Settings file; defaults to ./calculator.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Starting mode: standard, scientific or programmer.
    #[arg(long)]
    mode: Option<Mode>,
    /// Starting radix: bin, oct, dec or hex.
    #[arg(long)]
    radix: Option<Radix>,
    /// Print the final state and history as JSON on exit.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let loaded = config::load_settings(args.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&loaded.settings.log_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Some(source) = &loaded.source {
        info!(path = %source.display(), "loaded settings");
    }
    for issue in &loaded.issues {
        warn!(%issue, "ignoring configuration value");
    }
    let settings = loaded.settings;

    let engine = Arc::new(SimulatedEngine::new());
    let mut interaction = InteractionEngine::new(engine, settings.interaction_options())
        .context("failed to attach to the numeric engine")?;

    let mode = args.mode.unwrap_or(settings.initial_mode);
    let radix = args.radix.unwrap_or(settings.initial_radix);
    interaction
        .set_mode(mode)
        .context("failed to set the initial mode")?;
    if radix != interaction.radix() {
        interaction
            .send_command(CommandCode::radix_switch(radix))
            .context("failed to set the initial radix")?;
    }

    let mut session = Session::new(interaction);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{}", render::mode_line(mode, radix))?;
    session.write_status(&mut out)?;

    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read input")?;
        if session.handle_line(&line, &mut out)? == Flow::Quit {
            break;
        }
        out.flush()?;
    }

    info!(
        history = session.interaction().history().len(),
        "session finished"
    );
    if args.json {
        serde_json::to_writer_pretty(&mut out, &session.snapshot())
            .context("failed to write snapshot")?;
        writeln!(out)?;
    }
    Ok(())
}
