//! Command-line driver replaying a scripted interaction.
//!
//! Loads configuration, installs tracing, builds a [`Session`] and runs each
//! script step, printing the button's view model after every step. Waits jump
//! the virtual clock unless `--realtime` is given, in which case they take as
//! long as they say.
//!
//! ```text
//! $ holdsend --script "press; wait 2; wait 2; cooldown; wait 60"
//! $ holdsend --realtime --set hold_duration_secs=0.5 --script "press; wait 1.5"
//! ```
//!
//! Configuration comes from `--config`, else the platform config file
//! (`~/.config/holdsend/config.toml` on Linux) when it exists, else defaults.
//! `--set key=value` overrides individual keys on top of that.

use clap::Parser;
use holdsend::observability::init_tracing;
use holdsend::runtime::{parse_script, ScriptStep};
use holdsend::timing::{Scheduler, WallScheduler};
use holdsend::{infrastructure, Config, Result, SendButtonViewModel, Session};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

const DEMO_SCRIPT: &str = "press; wait 1; release; press; wait 2; wait 2; reset; cooldown; wait 60";

/// Replays a press-and-hold interaction against the hold-to-send controller.
#[derive(Parser, Debug)]
#[command(name = "holdsend", version, about)]
struct Args {
    /// Config file path override.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tracing filter override (trace, debug, info, warn, error).
    #[arg(long)]
    trace_level: Option<String>,

    /// Export spans as OTLP JSON to the data directory.
    #[arg(long)]
    trace_export: bool,

    /// Override one configuration key, e.g. `--set capacity=3` (repeatable).
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_override)]
    overrides: Vec<(String, String)>,

    /// Run waits on the wall clock instead of jumping virtual time.
    #[arg(long)]
    realtime: bool,

    /// Steps separated by `;`: press, release, send, reset, cooldown, teardown, wait <secs>.
    #[arg(short, long, default_value = DEMO_SCRIPT)]
    script: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "holdsend failed");
            eprintln!("holdsend: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let overrides: BTreeMap<String, String> = args.overrides.iter().cloned().collect();
    let mut config = load_config(args.config.as_ref())?.with_overrides(&overrides)?;
    if let Some(level) = &args.trace_level {
        config.trace_level = Some(level.clone());
    }
    config.trace_export |= args.trace_export;

    init_tracing(&config);

    let steps = parse_script(&args.script)?;
    if args.realtime {
        tracing::debug!(?config, "initializing real-time session");
        replay(Session::with_clock(&config, WallScheduler::new())?, &steps)
    } else {
        replay(holdsend::initialize(&config)?, &steps)
    }
}

fn replay<S: Scheduler>(mut session: Session<S>, steps: &[ScriptStep]) -> Result<()> {
    print_state(session.now(), "start", &session.view_model());
    for &step in steps {
        session.run_step(step)?;
        print_state(session.now(), &step.to_string(), &session.view_model());
    }
    Ok(())
}

fn parse_override(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

fn load_config(explicit: Option<&PathBuf>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::from_file(path);
    }

    match infrastructure::config_file() {
        Ok(path) if path.exists() => Config::from_file(path),
        _ => Ok(Config::default()),
    }
}

fn print_state(now: Duration, step: &str, vm: &SendButtonViewModel) {
    let cooldown = if vm.cooldown_running { "running" } else { "idle" };
    println!(
        "[{:>7.2}s] {step:<10} {:<10} progress {:>3.0}%  hearts {}/{}  cooldown {} ({cooldown})",
        now.as_secs_f64(),
        vm.status.label(),
        vm.progress * 100.0,
        vm.hearts_available,
        vm.hearts_capacity,
        vm.timer_text,
    );
}
