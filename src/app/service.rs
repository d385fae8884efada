//! Orchestrator — the main loop's per-cycle work.
//!
//! [`Orchestrator`] owns the gas monitor, the gas event queue and the
//! command pipeline.  Background tasks built by [`Orchestrator::start_background`]
//! only ever publish into the queue or broadcast; every state mutation
//! happens on the thread that calls [`Orchestrator::run_cycle`].
//!
//! ```text
//!  GasEventQueue ──▶ ┌──────────────────────────────┐ ──▶ BroadcastSink
//!                    │         Orchestrator          │
//!  ModemPort ◀─────▶ │ GasMonitor · Pipeline · Batch │ ──▶ RelayPort
//!                    └──────────────────────────────┘
//! ```
//!
//! One cycle:
//!
//! 1. drain the gas queue through the hysteresis monitor
//! 2. tick the relay timer and broadcast any transition
//! 3. process the pending SMS batch
//! 4. modem housekeeping
//!
//! Steps 1 and 3 are isolated from each other: an error or panic in one
//! is logged and the rest of the cycle still runs.

use core::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::Result;
use crate::events::GasEventQueue;
use crate::safety::{GasFlag, GasHysteresisMonitor};
use crate::scheduler::{BackgroundScheduler, DisplayRotation, GasPoll, HealthPoll};

use super::auth::PhoneAuthorizer;
use super::batch::{BatchReport, MessageBatchProcessor};
use super::commands::CommandResponse;
use super::dispatch::CommandDispatchTable;
use super::executor::CommandExecutor;
use super::pipeline::CommandPipeline;
use super::ports::{BroadcastSink, Devices};
use super::status::{LightThresholds, StatusComposer};

// ───────────────────────────────────────────────────────────────
// Orchestrator
// ───────────────────────────────────────────────────────────────

pub struct Orchestrator {
    config: SystemConfig,
    devices: Devices,
    sink: Arc<dyn BroadcastSink>,
    queue: Arc<GasEventQueue>,
    monitor: GasHysteresisMonitor,
    status: Arc<StatusComposer>,
    pipeline: CommandPipeline,
    batch: MessageBatchProcessor,
    display_frozen: Arc<AtomicBool>,
    cycle_count: u64,
}

impl Orchestrator {
    /// Wire the core from configuration and collaborators.
    ///
    /// Sends nothing; call [`startup`](Self::startup) next.
    pub fn new(config: SystemConfig, devices: Devices, sink: Arc<dyn BroadcastSink>) -> Self {
        let queue = Arc::new(GasEventQueue::new());
        let monitor = GasHysteresisMonitor::new(Arc::clone(&devices.relay), Arc::clone(&sink));
        let display_frozen = Arc::new(AtomicBool::new(false));

        let status = Arc::new(StatusComposer::new(
            Arc::clone(&devices.relay),
            Arc::clone(&devices.modem),
            Arc::clone(&devices.sensors),
            Arc::clone(&devices.clock),
            LightThresholds::from_config(&config),
        ));

        let dispatch = CommandDispatchTable::new(
            Arc::clone(&devices.relay),
            monitor.flag(),
            Arc::clone(&status),
            config.max_heater_minutes,
        );
        let executor = CommandExecutor::new(
            Arc::clone(&devices.relay),
            Arc::clone(&devices.display),
            Arc::clone(&devices.power),
            Arc::clone(&sink),
            Arc::clone(&display_frozen),
        );
        let pipeline = CommandPipeline::new(
            PhoneAuthorizer::new(config.phone_whitelist()),
            dispatch,
            executor,
            Arc::clone(&sink),
        );
        let batch = MessageBatchProcessor::new(
            Arc::clone(&devices.modem),
            Arc::clone(&devices.clock),
            Arc::clone(&sink),
            config.oldest_message_minutes,
        );

        Self {
            config,
            devices,
            sink,
            queue,
            monitor,
            status,
            pipeline,
            batch,
            display_frozen,
            cycle_count: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Clear stale SIM messages and announce that monitoring has begun.
    pub fn startup(&self) {
        match self.devices.modem.delete_all_messages() {
            Ok(0) => {}
            Ok(count) => {
                self.sink
                    .broadcast("Old or unprocessed message(s) found on SIM Card. Deleting...");
                info!("{} old message(s) cleared from SIM Card", count);
            }
            Err(e) => warn!("Could not clear SIM messages: {}", e),
        }

        info!("Begin monitoring for SMS messages");
        self.sink
            .broadcast(&format!("Monitoring started.\n{}", self.status.help()));
        self.sink.broadcast(&self.status.full());

        let display = &self.devices.display;
        if let Err(e) = display.clear().and_then(|()| display.write(0, 0, "Ready")) {
            warn!("Display write failed: {}", e);
        }
    }

    /// Spawn the gas poll, health poll and display rotation threads.
    pub fn start_background(&self) -> BackgroundScheduler {
        BackgroundScheduler::start(
            &self.config,
            self.gas_poll(),
            self.health_poll(),
            self.display_rotation(),
        )
    }

    pub fn gas_poll(&self) -> GasPoll {
        GasPoll::new(Arc::clone(&self.devices.sensors), Arc::clone(&self.queue))
    }

    pub fn health_poll(&self) -> HealthPoll {
        HealthPoll::new(Arc::clone(&self.devices.modem), Arc::clone(&self.sink))
    }

    pub fn display_rotation(&self) -> DisplayRotation {
        DisplayRotation::new(
            Arc::clone(&self.devices.display),
            Arc::clone(&self.status),
            Arc::clone(&self.display_frozen),
        )
    }

    /// Run cycles until `running` is cleared, then force the relay off.
    pub fn run(&mut self, running: &AtomicBool) {
        let pause = Duration::from_millis(self.config.main_loop_interval_ms);
        while running.load(Ordering::Acquire) {
            self.run_cycle();
            std::thread::sleep(pause);
        }
        self.safe_stop();
    }

    /// Bring the relay to its safe (off) state.
    pub fn safe_stop(&self) {
        info!("Stopping: turning heater relay off");
        if let Err(e) = self.devices.relay.turn_off() {
            warn!("Relay off on stop failed: {}", e);
        }
    }

    // ── Per-cycle orchestration ───────────────────────────────

    pub fn run_cycle(&mut self) {
        self.cycle_count += 1;

        run_servicer("Gas sensor queue", || {
            self.service_gas_queue();
            Ok(())
        });

        if let Some(event) = self.devices.relay.tick() {
            info!("Relay event: {:?}", event);
            self.sink.broadcast(event.notice());
        }

        run_servicer("Incoming request queue", || {
            self.process_pending_messages().map(|_| ())
        });

        self.devices.modem.housekeeping_tick();
    }

    /// Drain the gas queue through the monitor.  Returns the flag afterwards.
    pub fn service_gas_queue(&self) -> bool {
        let events = self.queue.drain();
        if !events.is_empty() {
            info!("Gas queue: {:?}", events);
        }
        self.monitor.process(&events);
        self.monitor.is_detected()
    }

    pub fn process_pending_messages(&self) -> Result<BatchReport> {
        Ok(self.batch.run(&self.pipeline)?)
    }

    /// Run a command from a trusted local surface (bypasses sender checks).
    pub fn process_local_command(&self, text: &str) -> CommandResponse {
        self.pipeline.process_local(text)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn gas_queue(&self) -> Arc<GasEventQueue> {
        Arc::clone(&self.queue)
    }

    pub fn gas_flag(&self) -> GasFlag {
        self.monitor.flag()
    }

    pub fn status(&self) -> Arc<StatusComposer> {
        Arc::clone(&self.status)
    }

    pub fn is_display_frozen(&self) -> bool {
        self.display_frozen.load(Ordering::Acquire)
    }

    pub fn cycle_count(&self) -> u64 {
        self.cycle_count
    }

    pub fn config(&self) -> &SystemConfig {
        &self.config
    }
}

/// Run one servicer, logging (never propagating) an error or panic.
fn run_servicer(name: &str, servicer: impl FnOnce() -> Result<()>) {
    match catch_unwind(AssertUnwindSafe(servicer)) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Error while servicing {}: {}", name, e),
        Err(_) => warn!("Panic while servicing {}", name),
    }
}

// ───────────────────────────────────────────────────────────────
// Startup helpers
// ───────────────────────────────────────────────────────────────

/// Call `open` up to `retries` times, sleeping `delay` between attempts.
///
/// Returns `None` if every attempt failed.
pub fn connect_with_retry<T, E: fmt::Display>(
    retries: u32,
    delay: Duration,
    mut open: impl FnMut() -> core::result::Result<T, E>,
) -> Option<T> {
    for attempt in 1..=retries {
        match open() {
            Ok(connection) => return Some(connection),
            Err(e) => {
                warn!("Modem connect attempt {}/{} failed: {}", attempt, retries, e);
                if attempt < retries {
                    std::thread::sleep(delay);
                }
            }
        }
    }
    None
}
