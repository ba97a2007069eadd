//! osk-replay: feeds a recorded touch trace through the touch engine.
//!
//! The tool builds the built-in QWERTY key set, lays it out for the given
//! surface size, and replays every sample of a JSON trace through the event
//! queue at its recorded pace, so long-press timers fire exactly as they
//! would on a device.  Afterwards it prints the key events the engine
//! emitted and the keyboard actions it executed.
//!
//! # Usage
//!
//! ```text
//! osk-replay --trace <FILE> [OPTIONS]
//!
//! Options:
//!   --config <FILE>   Keyboard configuration TOML [default: platform config file]
//!   --trace  <FILE>   JSON touch trace to replay
//!   --width  <PX>     Keyboard width  [default: 1080]
//!   --height <PX>     Keyboard height [default: 720]
//!   --mode   <MODE>   characters | symbols | numeric [default: characters]
//!   --text   <TEXT>   Initial editor content [default: ""]
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`); `RUST_LOG=debug` shows
//! every key transition.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use osk_core::{KeyboardLayout, KeyboardMode};
use osk_touch::application::{EditorCollaborator, TouchController};
use osk_touch::infrastructure::collaborators::InMemoryCollaborators;
use osk_touch::infrastructure::event_loop::{self, EngineClock, EngineEvent};
use osk_touch::infrastructure::layouts::rows_for;
use osk_touch::infrastructure::storage::config::load_config;
use osk_touch::infrastructure::trace::load_trace;

// ── CLI argument definitions ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Characters,
    Symbols,
    Numeric,
}

impl From<ModeArg> for KeyboardMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Characters => KeyboardMode::Characters,
            ModeArg::Symbols => KeyboardMode::Symbols,
            ModeArg::Numeric => KeyboardMode::Numeric,
        }
    }
}

/// Replays a recorded touch trace through the on-screen keyboard engine.
#[derive(Debug, Parser)]
#[command(name = "osk-replay", about = "Replay a touch trace through the keyboard touch engine", version)]
struct Cli {
    /// Keyboard configuration file.  Defaults to the platform config file.
    #[arg(long, env = "OSK_CONFIG")]
    config: Option<PathBuf>,

    /// JSON touch trace to replay.
    #[arg(long)]
    trace: PathBuf,

    /// Keyboard surface width in pixels.
    #[arg(long, default_value_t = 1080.0)]
    width: f64,

    /// Keyboard surface height in pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Key set to lay out.
    #[arg(long, value_enum, default_value_t = ModeArg::Characters)]
    mode: ModeArg,

    /// Initial editor content; the cursor starts at its end.
    #[arg(long, default_value = "")]
    text: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("failed to load keyboard configuration")?;
    let mut samples =
        load_trace(&cli.trace).with_context(|| format!("failed to load trace {}", cli.trace.display()))?;

    // Re-base timestamps so the first sample lands at clock time zero.
    let origin = samples.first().map_or(0, |s| s.time_ms);
    for sample in &mut samples {
        sample.time_ms -= origin;
    }

    let mode = KeyboardMode::from(cli.mode);
    let collab = InMemoryCollaborators::new(mode, &cli.text);
    let layout = KeyboardLayout::new(mode, rows_for(mode));
    let mut controller = TouchController::new(layout, config.to_settings(), collab.collaborators());
    controller
        .layout(cli.width, cli.height)
        .context("invalid keyboard size")?;

    info!(
        samples = samples.len(),
        width = cli.width,
        height = cli.height,
        ?mode,
        "replaying trace"
    );

    let clock = EngineClock::new();
    let (handle, rx) = event_loop::channel(config.engine.queue_capacity);
    let engine = tokio::spawn(event_loop::run(controller, rx, clock));

    for sample in samples {
        tokio::time::sleep_until(clock.instant_at(sample.time_ms)).await;
        handle.send(EngineEvent::Touch(sample)).await?;
    }
    handle.send(EngineEvent::Shutdown).await?;
    let controller = engine.await.context("touch engine task failed")?;

    // ── Report ────────────────────────────────────────────────────────────────

    println!("key events:");
    for event in collab.input.history() {
        println!("  {event:?}");
    }
    println!("keyboard actions:");
    for action in collab.keyboard.executed() {
        println!("  {action:?}");
    }
    let paths = collab.glide_decoder.paths();
    if !paths.is_empty() {
        println!("glide paths: {}", paths.len());
    }
    println!("editor: {:?} selection {:?}", collab.editor.text(), collab.editor.selection());
    println!("pointers still down: {}", controller.active_pointer_count());
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["osk-replay", "--trace", "t.json"]);

        assert_eq!(cli.width, 1080.0);
        assert_eq!(cli.height, 720.0);
        assert_eq!(cli.mode, ModeArg::Characters);
        assert!(cli.text.is_empty());
    }

    #[test]
    fn test_cli_mode_parses_symbols() {
        let cli = Cli::parse_from(["osk-replay", "--trace", "t.json", "--mode", "symbols"]);
        assert_eq!(KeyboardMode::from(cli.mode), KeyboardMode::Symbols);
    }

    #[test]
    fn test_cli_requires_trace() {
        assert!(Cli::try_parse_from(["osk-replay"]).is_err());
    }
}
