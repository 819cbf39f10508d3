//! # Arm Relay
//!
//! Runs the relay on an in-process bus together with simulated producers:
//! high-rate tick and housekeeping schedulers, an actuator model and a
//! scripted ground station.
//!
//! The dispatch loop runs on the main thread. On Ctrl-C, after
//! `--duration-s`, or when the pipe closes, the producers are stopped and the
//! dispatch statistics are logged.

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use arm_common::config::ConfigError;
use arm_common::consts::{DEFAULT_CONFIG_PATH, VERSION};
use arm_common::msg::{HrTick, SendHkCmd};
use arm_relay::bus::{BusTransport, pipe};
use arm_relay::config::{RelayConfig, load_config};
use arm_relay::dispatch::RelayApp;
use arm_relay::runner::{Runner, rt_setup};
use arm_relay::sim::{SimActuator, spawn_actuator, spawn_ground, spawn_periodic};
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

/// Joint slew per actuator step [rad].
const SIM_MAX_STEP: f32 = 0.005;

/// Arm Relay: ground/actuator command relay with control loop
#[derive(Parser, Debug)]
#[command(name = "arm_relay")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Relays joint goals from the ground to the actuator subsystem")]
struct Args {
    /// Path to relay configuration TOML.
    #[arg(default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Pose ids the simulated ground station sends, one per second.
    #[arg(long, value_delimiter = ',', default_value = "0")]
    poses: Vec<u8>,

    /// Stop after this many seconds (runs until Ctrl-C when omitted).
    #[arg(long)]
    duration_s: Option<u64>,

    /// CPU core to pin the dispatch thread to (`rt` feature only).
    #[arg(long, default_value_t = 1)]
    cpu_core: usize,

    /// SCHED_FIFO priority (`rt` feature only).
    #[arg(long, default_value_t = 80)]
    rt_priority: i32,

    /// Enable verbose logging (DEBUG level).
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format.
    #[arg(long)]
    json: bool,
}

fn main() {
    let args = Args::parse();
    let config = match load_config(&args.config) {
        Ok(config) => Ok(config),
        Err(ConfigError::FileNotFound) => Err(None),
        Err(e) => Err(Some(e)),
    };

    let log_level = match &config {
        Ok(c) => c.shared.log_level.as_str(),
        Err(_) => "info",
    };
    setup_tracing(&args, log_level);

    info!("Arm Relay {VERSION} starting...");

    let config = match config {
        Ok(config) => config,
        Err(None) => {
            warn!(
                "Config '{}' not found, using built-in defaults",
                args.config.display()
            );
            RelayConfig::default()
        }
        Err(Some(e)) => {
            error!("FATAL: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&args, &config) {
        error!("FATAL: {e}");
        process::exit(1);
    }

    info!("Arm Relay shutdown complete");
}

fn run(args: &Args, config: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        service = %config.shared.service_name,
        "Config OK: strategy={:?}, tick={}Hz, hk={}Hz, poses={}, pipe_depth={}",
        config.control.strategy,
        config.control.tick_hz,
        config.control.hk_hz,
        config.poses.len(),
        config.bus.pipe_depth,
    );

    // Bus and app.
    let (tx, rx) = pipe(config.bus.pipe_depth);
    let (transport, links) = BusTransport::new(config.bus.pipe_depth);
    let events = config.event_sink();
    let mut app = RelayApp::from_config(config, transport, events);
    app.startup();

    // Signal handler for graceful shutdown.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    })?;

    // Producers.
    let tick_period = config.control.tick_period();
    let mut producers = vec![
        spawn_periodic("hr-tick", tx.clone(), HrTick, tick_period, running.clone())?,
        spawn_periodic(
            "hk-request",
            tx.clone(),
            SendHkCmd,
            config.control.hk_period(),
            running.clone(),
        )?,
        spawn_actuator(
            SimActuator::new(SIM_MAX_STEP),
            links.actuator,
            tx.clone(),
            tick_period * 10,
            running.clone(),
        )?,
        spawn_ground(
            args.poses.clone(),
            Duration::from_secs(1),
            tx,
            links.ground,
            running.clone(),
        )?,
    ];

    if let Some(secs) = args.duration_s {
        let r = running.clone();
        producers.push(
            thread::Builder::new()
                .name("deadline".into())
                .spawn(move || {
                    let deadline = std::time::Instant::now() + Duration::from_secs(secs);
                    while r.load(Ordering::SeqCst) && std::time::Instant::now() < deadline {
                        thread::sleep(Duration::from_millis(50));
                    }
                    r.store(false, Ordering::SeqCst);
                })?,
        );
    }

    // RT setup (mlockall, affinity, scheduler) for the dispatch thread.
    rt_setup(args.cpu_core, args.rt_priority)?;
    info!(
        "RT setup complete (cpu_core={}, priority={})",
        args.cpu_core, args.rt_priority
    );

    // Enter the dispatch loop.
    let mut runner = Runner::new(app, rx);
    let result = runner.run(&running);

    running.store(false, Ordering::SeqCst);
    for handle in producers {
        if handle.join().is_err() {
            warn!("producer thread panicked");
        }
    }

    runner.stats.log_summary();
    let counters = runner.app.state().counters();
    info!(
        command_counter = counters.command,
        error_counter = counters.error,
        dropped_outbound = runner.app.transport().dropped(),
        "final counters"
    );

    result?;
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and the config log level.
fn setup_tracing(args: &Args, config_level: &str) {
    let filter = if args.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    }
}
