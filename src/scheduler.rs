//! Background scheduler — periodic tasks running beside the main loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Background threads                        │
//! │                                                              │
//! │  ┌────────────┐      ┌──────────────┐      ┌──────────────┐  │
//! │  │ gas-poll   │      │ health-poll  │      │ display      │  │
//! │  │ (30 s)     │      │ (300 s)      │      │ (5 s)        │  │
//! │  └─────┬──────┘      └──────┬───────┘      └──────┬───────┘  │
//! │        │ GasSensorEvent     │ low battery         │ panel    │
//! │        ▼                    ▼                     ▼          │
//! │   GasEventQueue       BroadcastSink          DisplayPort     │
//! │        │                                                     │
//! │        ▼                                                     │
//! │   Orchestrator::run_cycle (main loop, sole consumer)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each task runs on its own thread.  A task that returns an error or
//! panics is logged and tried again on its next interval; it never
//! takes down the other tasks or the main loop.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{info, warn};

use crate::app::ports::{BroadcastSink, DisplayPort, ModemPort, SensorPort};
use crate::app::status::StatusComposer;
use crate::config::SystemConfig;
use crate::error::{Error, Result};
use crate::events::{GasEventQueue, GasSensorEvent};

/// Longest uninterrupted sleep, so `stop()` is honoured promptly.
const SLEEP_SLICE: Duration = Duration::from_millis(200);

const TASK_STACK_KB: usize = 64;

// ═══════════════════════════════════════════════════════════════
//  Tasks
// ═══════════════════════════════════════════════════════════════

/// Reads the gas sensor and queues a classified event.
pub struct GasPoll {
    sensors: Arc<dyn SensorPort>,
    queue: Arc<GasEventQueue>,
}

impl GasPoll {
    pub fn new(sensors: Arc<dyn SensorPort>, queue: Arc<GasEventQueue>) -> Self {
        Self { sensors, queue }
    }

    /// Returns the queued event, or `None` when no gas sensor is fitted.
    pub fn run_once(&self) -> Result<Option<GasSensorEvent>> {
        let Some(reading) = self.sensors.gas_reading()? else {
            return Ok(None);
        };
        info!("Detected: {}, Level={}", reading.detected, reading.value);
        let event = if reading.detected {
            GasSensorEvent::Detected(reading.value)
        } else {
            GasSensorEvent::Clear(reading.value)
        };
        self.queue.publish(event);
        Ok(Some(event))
    }
}

/// Checks the modem battery and warns the whitelist when it is low.
pub struct HealthPoll {
    modem: Arc<dyn ModemPort>,
    sink: Arc<dyn BroadcastSink>,
}

impl HealthPoll {
    pub fn new(modem: Arc<dyn ModemPort>, sink: Arc<dyn BroadcastSink>) -> Self {
        Self { modem, sink }
    }

    /// Returns `true` if a low-battery warning was broadcast.
    pub fn run_once(&self) -> Result<bool> {
        let battery = self.modem.battery_condition()?;
        info!(
            "Modem battery={}% voltage={}mV",
            battery.percent, battery.voltage_mv
        );
        if battery.is_ok {
            return Ok(false);
        }
        let warning = format!("WARNING: LOW BATTERY for modem. Currently {}%", battery.percent);
        warn!("{}", warning);
        self.sink.broadcast(&warning);
        Ok(true)
    }
}

/// Status panels shown in rotation, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Cell,
    Heater,
    Gas,
    Light,
    Temperature,
    Uptime,
}

impl Panel {
    pub const ROTATION: [Panel; 6] = [
        Panel::Cell,
        Panel::Heater,
        Panel::Gas,
        Panel::Light,
        Panel::Temperature,
        Panel::Uptime,
    ];
}

/// Rotates the display through the status panels.
pub struct DisplayRotation {
    display: Arc<dyn DisplayPort>,
    status: Arc<StatusComposer>,
    frozen: Arc<AtomicBool>,
    index: usize,
}

impl DisplayRotation {
    pub fn new(
        display: Arc<dyn DisplayPort>,
        status: Arc<StatusComposer>,
        frozen: Arc<AtomicBool>,
    ) -> Self {
        Self {
            display,
            status,
            frozen,
            index: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Draw the current panel and advance.  A failed panel is replaced by
    /// an `ERROR: PANEL=<n>` line; rotation continues either way.
    pub fn refresh(&mut self) {
        if self.frozen.load(Ordering::Acquire) {
            return;
        }

        if let Err(e) = self.display.clear() {
            warn!("Display clear failed: {}", e);
        }
        if let Err(e) = self.draw(Panel::ROTATION[self.index]) {
            warn!("Display panel {} failed: {}", self.index, e);
            let notice = format!("ERROR: PANEL={}", self.index);
            if let Err(e) = self.display.write(0, 0, &notice) {
                warn!("Display error panel failed: {}", e);
            }
        }
        self.index = (self.index + 1) % Panel::ROTATION.len();
    }

    fn draw(&self, panel: Panel) -> Result<()> {
        match panel {
            Panel::Cell => self.display.write_text(&self.status.cell()?)?,
            Panel::Heater => self.display.write_text(&self.status.heater())?,
            Panel::Gas => self.display.write_text(&self.status.gas()?)?,
            Panel::Light => self.display.write_text(&self.status.light()?)?,
            Panel::Temperature => self.display.write_text(&self.status.temperature()?)?,
            Panel::Uptime => {
                self.display.write(0, 0, "UPTIME:")?;
                self.display.write(1, 0, &self.status.uptime())?;
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler
// ═══════════════════════════════════════════════════════════════

/// Handles for the running background threads.
pub struct BackgroundScheduler {
    stop: Arc<AtomicBool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundScheduler {
    /// Spawn the gas poll, health poll and display rotation threads.
    pub fn start(
        config: &SystemConfig,
        gas: GasPoll,
        health: HealthPoll,
        mut rotation: DisplayRotation,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let handles = vec![
            spawn_periodic(
                "gas-poll",
                Duration::from_secs(config.gas_poll_interval_secs),
                Arc::clone(&stop),
                move || gas.run_once().map(|_| ()),
            ),
            spawn_periodic(
                "health-poll",
                Duration::from_secs(config.health_poll_interval_secs),
                Arc::clone(&stop),
                move || health.run_once().map(|_| ()),
            ),
            spawn_periodic(
                "display",
                Duration::from_secs(config.display_refresh_interval_secs),
                Arc::clone(&stop),
                move || {
                    rotation.refresh();
                    Ok(())
                },
            ),
        ];
        Self { stop, handles }
    }

    /// Signal every task to stop and wait for the threads to exit.
    pub fn stop(self) {
        self.stop.store(true, Ordering::Release);
        for handle in self.handles {
            if handle.join().is_err() {
                warn!("Background task thread panicked on exit");
            }
        }
    }
}

/// Run `task` every `interval` on a named thread until `stop` is set.
pub fn spawn_periodic(
    name: &'static str,
    interval: Duration,
    stop: Arc<AtomicBool>,
    mut task: impl FnMut() -> Result<()> + Send + 'static,
) -> JoinHandle<()> {
    info!("Spawning '{}' every {:?}", name, interval);
    std::thread::Builder::new()
        .name(name.into())
        .stack_size(TASK_STACK_KB * 1024)
        .spawn(move || {
            while sleep_unless_stopped(interval, &stop) {
                match catch_unwind(AssertUnwindSafe(&mut task)) {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => warn!("Task '{}' failed: {}", name, e),
                    Err(_) => warn!("Task '{}' panicked", name),
                }
            }
            info!("Task '{}' stopped", name);
        })
        .expect("spawn_periodic: thread creation failed")
}

/// Sleep for `interval`.  Returns `false` if `stop` was set meanwhile.
fn sleep_unless_stopped(interval: Duration, stop: &AtomicBool) -> bool {
    let mut remaining = interval;
    while !remaining.is_zero() {
        if stop.load(Ordering::Acquire) {
            return false;
        }
        let slice = remaining.min(SLEEP_SLICE);
        std::thread::sleep(slice);
        remaining -= slice;
    }
    !stop.load(Ordering::Acquire)
}
