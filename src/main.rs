//! ThermalBridge daemon
//!
//! Startup order is sensor first, then transport. Exit codes:
//!
//! | Code | Cause |
//! |------|-------|
//! | -1 | I²C bus open or sensor configuration failed |
//! | -2 | Broadcast socket could not be created |
//! | 0 | Stopped by Ctrl-C |
//! | 1 | Send failure, repeated bus errors, bad configuration |

use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thermal_bridge::bus::LinuxI2cBus;
use thermal_bridge::cli::Args;
use thermal_bridge::{AcquisitionLoop, Config, Error, Result, SensorSession, UdpBroadcaster};

fn init_logger(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn main() {
    let args = Args::from_env();

    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            init_logger(args.log_level.as_deref().unwrap_or("info"));
            log::error!("Failed to load config: {}", e);
            process::exit(e.exit_code());
        }
    };

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logger(&level);

    log::info!("ThermalBridge v{} starting...", env!("CARGO_PKG_VERSION"));
    match &args.config {
        Some(path) => log::info!("Using config: {}", path.display()),
        None => log::info!("No config file given, using defaults"),
    }

    args.apply_network_overrides(&mut config.network);

    if let Err(e) = run(&config) {
        log::error!("{}", e);
        process::exit(e.exit_code());
    }

    log::info!("ThermalBridge stopped");
}

fn run(config: &Config) -> Result<()> {
    let target = config.network.target()?;

    // Set up shutdown signal handler
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    let bus = LinuxI2cBus::open(&config.sensor.bus_path, config.sensor.address)?;
    let session = SensorSession::initialize(bus, &config.sensor.options())?;

    let broadcaster = match UdpBroadcaster::open(target) {
        Ok(broadcaster) => broadcaster,
        Err(e) => {
            session.close();
            return Err(e);
        }
    };

    log::info!("Broadcasting frames to {}. Press Ctrl-C to stop.", target);

    let mut acquisition = AcquisitionLoop::new(session, broadcaster, config.loop_options())
        .with_running_flag(running);
    let result = acquisition.run();

    let (session, broadcaster) = acquisition.into_parts();
    session.close();
    broadcaster.close();

    let summary = result?;
    log::info!(
        "Sent {} frames ({:.1} fps average, {} bus errors)",
        summary.frames_sent,
        summary.frames_per_second(),
        summary.bus_errors
    );
    Ok(())
}
