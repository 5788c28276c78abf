//! open-outcry - real-time agent-based market simulator.
//!
//! Binds the transport, waits for the controller's START handshake, then
//! runs the tick loop at 50 Hz until STOP:
//!
//! ```text
//! ┌────────────────┐   Frame    ┌────────────────┐
//! │  Engine loop   │ ─────────▶ │  Transport     │ ──▶ observers
//! │  (main thread) │ ◀───────── │  (tokio)       │ ◀── controller
//! └────────────────┘  Command   └────────────────┘
//! ```
//!
//! Exit codes: 0 after STOP, non-zero when the transport cannot bind.

mod config;

use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::TryRecvError;
use server::{EngineEndpoints, ServerConfig, ServerHandle};
use simulation::{Engine, EngineSignal, SimulationConfig};
use tracing::{error, info};
use types::{Command, PopulationCounts};

pub use config::AppConfig;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let app = AppConfig::from_env();
    let server_config = ServerConfig {
        publish_addr: app.publish_addr.clone(),
        command_addr: app.command_addr.clone(),
    };

    let server = match server::start(&server_config) {
        Ok(handle) => handle,
        Err(e) => {
            error!("transport startup failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(app, server) {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// Wait for START, build the engine, and drive the paced loop until STOP.
fn run(app: AppConfig, server: ServerHandle) -> Result<(), ()> {
    info!("waiting for controller START handshake");
    let counts = wait_for_start(&server.endpoints)?;
    info!(
        makers = counts.makers,
        fundamentals = counts.fundamentals,
        momentum = counts.momentum,
        noise = counts.noise,
        profile = ?app.profile,
        "engine started"
    );

    let mut sim_config = SimulationConfig::for_profile(app.profile);
    if let Some(seed) = app.seed {
        sim_config = sim_config.with_seed(seed);
    }
    let mut engine = Engine::new(sim_config, counts);

    let tick_interval = Duration::from_millis(app.tick_interval_ms);
    let pause_poll = Duration::from_millis(app.pause_poll_ms);

    loop {
        let tick_started = Instant::now();

        // Drain the control channel without blocking.
        loop {
            match server.endpoints.commands.try_recv() {
                Ok(command) => {
                    if engine.apply(command) == EngineSignal::Stop {
                        info!("STOP received, shutting down");
                        return Ok(());
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    error!("command channel closed unexpectedly");
                    return Err(());
                }
            }
        }

        // A paused clock keeps polling but never advances state.
        if engine.is_paused() {
            thread::sleep(pause_poll);
            continue;
        }

        for frame in engine.step() {
            server.endpoints.publish(frame);
        }

        pace(tick_started, tick_interval);
    }
}

/// Block until the START command arrives; everything before it is ignored.
fn wait_for_start(endpoints: &EngineEndpoints) -> Result<PopulationCounts, ()> {
    loop {
        match endpoints.commands.recv() {
            Ok(Command::Start(counts)) => return Ok(counts),
            Ok(_) => continue,
            Err(_) => {
                error!("command channel closed before START");
                return Err(());
            }
        }
    }
}

/// Sleep out the remainder of the tick budget, if any.
fn pace(tick_started: Instant, tick_interval: Duration) {
    let deadline = tick_started + tick_interval;
    if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
        thread::sleep(remaining);
    }
}
