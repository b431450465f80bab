//! Coriolis Lab entry point
//!
//! Runs the cannon simulation headless and streams the current bullet's
//! readout to stdout as JSON lines.
//!
//! Usage: `coriolis-lab [settings.json] [seconds]`

use std::io::{self, BufWriter, Write};
use std::process::ExitCode;

use serde::Serialize;

use coriolis_lab::Settings;
use coriolis_lab::consts::SIM_DT;
use coriolis_lab::sim::{Readout, SimEvent, SimulationState, TickInput, tick};

/// Simulated time when none is given on the command line
const DEFAULT_RUN_SECONDS: f64 = 20.0;

/// One line of output
#[derive(Serialize)]
struct Record {
    tick: u64,
    time: f64,
    #[serde(flatten)]
    readout: Readout,
}

fn main() -> ExitCode {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Could not load settings from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => {
            log::info!("Using default settings");
            Settings::default()
        }
    };

    let seconds = match args.next() {
        None => DEFAULT_RUN_SECONDS,
        Some(arg) => match arg.parse::<f64>() {
            Ok(s) if s.is_finite() && s > 0.0 => s,
            _ => {
                log::error!("Run time must be a positive number of seconds, got {arg:?}");
                return ExitCode::FAILURE;
            }
        },
    };

    match run(settings, seconds) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Failed writing trajectory: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Fire once and record until every bullet has left (or time runs out)
fn run(settings: Settings, seconds: f64) -> io::Result<()> {
    let keep_firing = settings.auto_fire;
    let mut state = SimulationState::new(settings);
    let max_ticks = (seconds / SIM_DT).ceil() as u64;

    log::info!(
        "Coriolis Lab starting: omega = {} rad/s, speed = {}, {} ticks",
        state.settings.angular_velocity,
        state.settings.bullet_speed,
        max_ticks
    );

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut input = TickInput {
        fire: true,
        ..Default::default()
    };

    for _ in 0..max_ticks {
        tick(&mut state, &input, SIM_DT);
        input = TickInput::default();

        for event in state.drain_events() {
            match event {
                SimEvent::Fired { id } => log::debug!("Bullet {id} fired"),
                SimEvent::OutOfBounds { id, position } => {
                    log::info!("Bullet {id} left the arena at {position:?}");
                }
                SimEvent::ReachedPauseDistance { id, velocity, .. } => {
                    // No one to answer the activity here: carry on next tick
                    log::info!("Bullet {id} reached the pause distance moving at {velocity:?}");
                    input.pause = true;
                }
            }
        }

        let record = Record {
            tick: state.time_ticks,
            time: state.time_ticks as f64 * SIM_DT,
            readout: state.readout(),
        };
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;

        if state.bullets.is_empty() && !keep_firing {
            break;
        }
    }

    out.flush()?;
    log::info!("Coriolis Lab finished after {} ticks", state.time_ticks);
    Ok(())
}
