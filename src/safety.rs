//! Gas safety supervisor.
//!
//! The monitor runs on the main loop, once per cycle, over whatever the
//! gas poll thread queued since the previous cycle.  It owns the
//! detection flag; everything else reads it through a [`GasFlag`].
//!
//! ## Transitions
//!
//! | event    | flag before | effect                                   |
//! |----------|-------------|------------------------------------------|
//! | Detected | clear       | broadcast warning, set flag, relay off   |
//! | Detected | set         | relay off                                |
//! | Clear    | set         | broadcast "cleared", clear flag          |
//! | Clear    | clear       | nothing                                  |
//!
//! Relay off is commanded on *every* Detected event so a heater switched
//! on between two readings is still shut down.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};

use crate::app::ports::{BroadcastSink, RelayPort};
use crate::events::GasSensorEvent;

/// Read-only view of the gas detection flag.
#[derive(Debug, Clone)]
pub struct GasFlag(Arc<AtomicBool>);

impl GasFlag {
    pub fn is_detected(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct GasHysteresisMonitor {
    detected: Arc<AtomicBool>,
    relay: Arc<dyn RelayPort>,
    sink: Arc<dyn BroadcastSink>,
}

impl GasHysteresisMonitor {
    pub fn new(relay: Arc<dyn RelayPort>, sink: Arc<dyn BroadcastSink>) -> Self {
        Self {
            detected: Arc::new(AtomicBool::new(false)),
            relay,
            sink,
        }
    }

    pub fn flag(&self) -> GasFlag {
        GasFlag(Arc::clone(&self.detected))
    }

    pub fn is_detected(&self) -> bool {
        self.detected.load(Ordering::Acquire)
    }

    /// Apply a drained batch in order.
    pub fn process(&self, events: &[GasSensorEvent]) {
        for event in events {
            self.handle(*event);
        }
    }

    pub fn handle(&self, event: GasSensorEvent) {
        match event {
            GasSensorEvent::Detected(level) => {
                if !self.is_detected() {
                    let mut warning = format!("WARNING! GAS DETECTED! Level={}", level);
                    if self.relay.is_on() {
                        warning.push_str(", shutting heater down.");
                    } else {
                        warning.push('.');
                    }
                    error!("Gas detected, level={}", level);
                    self.sink.broadcast(&warning);
                    self.detected.store(true, Ordering::Release);
                }
                if let Err(e) = self.relay.turn_off() {
                    error!("Gas detected but relay off failed: {}", e);
                }
            }
            GasSensorEvent::Clear(level) => {
                if self.is_detected() {
                    info!("Gas cleared, level={}", level);
                    self.sink.broadcast(&format!("Gas warning cleared. Level={}", level));
                    self.detected.store(false, Ordering::Release);
                }
            }
        }
    }
}
