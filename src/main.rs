//! Hangar heater supervisor — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SimModem      TimedRelay    FixedSensors   LogDisplay         │
//! │  (ModemPort)   (RelayPort)   (SensorPort)   (DisplayPort)      │
//! │  HostPower     HostClock     JsonConfigFile Notifier           │
//! │  (PowerPort)   (ClockPort)   (ConfigPort)   (BroadcastSink)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Orchestrator (main loop)                  │    │
//! │  │  Gas monitor · Command pipeline · Message batch        │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  BackgroundScheduler: gas poll · health poll · display         │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use log::{info, warn};

use hangar_heater::adapters::config_file::JsonConfigFile;
use hangar_heater::adapters::log_display::LogDisplay;
use hangar_heater::adapters::power::HostPower;
use hangar_heater::adapters::relay::{SimPin, TimedRelay};
use hangar_heater::adapters::sensors::FixedSensors;
use hangar_heater::adapters::sim_modem::SimModem;
use hangar_heater::adapters::time::HostClock;
use hangar_heater::app::notify::Notifier;
use hangar_heater::app::ports::{BroadcastSink, ClockPort, ConfigPort, Devices, DisplayPort};
use hangar_heater::app::service::{Orchestrator, connect_with_retry};

const DEFAULT_CONFIG_PATH: &str = "hangar_heater.json";

fn main() -> Result<()> {
    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("╔══════════════════════════════════════╗");
    info!("║  Hangar heater v{}                ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = JsonConfigFile::new(&config_path)
        .load()
        .with_context(|| format!("loading configuration from {}", config_path))?;
    if config.test_mode {
        warn!("Test mode: outbound SMS and power actions are logged only");
    }

    let display = Arc::new(LogDisplay::new());
    if let Err(e) = display.write(0, 0, "Initializing...") {
        warn!("Display write failed: {}", e);
    }

    // ── 3. Modem ──────────────────────────────────────────────
    let modem = if config.test_mode {
        Some(Arc::new(SimModem::new()))
    } else {
        connect_with_retry(
            config.modem_connect_retries,
            Duration::from_secs(config.modem_retry_delay_secs),
            || {
                info!("Opening on {}", config.modem_serial_port);
                // Presence check only; no AT driver, so SMS still go through SimModem.
                std::fs::OpenOptions::new()
                    .read(true)
                    .write(true)
                    .open(&config.modem_serial_port)
                    .map(|_port| Arc::new(SimModem::new()))
            },
        )
    };
    let Some(modem) = modem else {
        bail!(
            "serial device {} not located; check the configured port",
            config.modem_serial_port
        );
    };

    // ── 4. Collaborators ──────────────────────────────────────
    let clock: Arc<dyn ClockPort> = Arc::new(HostClock::new());
    let devices = Devices {
        modem: modem.clone(),
        relay: Arc::new(TimedRelay::new(
            SimPin::default(),
            Arc::clone(&clock),
            config.max_heater_minutes,
        )),
        sensors: Arc::new(FixedSensors::new()),
        display,
        power: Arc::new(HostPower::new(config.test_mode)),
        clock,
    };
    let sink: Arc<dyn BroadcastSink> = Arc::new(Notifier::new(
        modem.clone(),
        &config.phone_whitelist(),
        config.test_mode,
    ));

    // ── 5. Orchestrator + background tasks ────────────────────
    let mut orchestrator = Orchestrator::new(config, devices, sink);
    info!("Starting SMS monitoring and heater service");
    orchestrator.startup();
    let scheduler = orchestrator.start_background();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Stopping due to CTRL+C");
            running.store(false, Ordering::Release);
        })
        .context("installing Ctrl-C handler")?;
    }

    // Console lines `<phone> <text>` stand in for received SMS.
    std::thread::Builder::new()
        .name("console-sms".into())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) if modem.inject_line(&line) => {}
                    Ok(line) => warn!("Ignored console line: {:?}", line),
                    Err(e) => {
                        warn!("Console read failed: {}", e);
                        break;
                    }
                }
            }
        })
        .context("spawning console reader")?;

    // ── 6. Main loop ──────────────────────────────────────────
    info!("Press Ctrl-C to quit.");
    orchestrator.run(&running);
    scheduler.stop();
    info!("Stopped after {} cycles", orchestrator.cycle_count());
    Ok(())
}
