//! Heater relay driver with a maximum-run timer.
//!
//! Drives any `embedded-hal` [`OutputPin`]: high closes the relay
//! (heater energised), low opens it.
//!
//! ## Safety contract
//!
//! `turn_off` always drives the pin low, even if the relay is believed
//! to be open already.  The run timer opens the relay once
//! `max_run_secs` has elapsed since it closed.
//!
//! Transitions are queued and handed out one per [`RelayPort::tick`].

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::digital::{ErrorType, OutputPin};
use log::{debug, info, warn};

use crate::app::events::RelayEvent;
use crate::app::ports::{ClockPort, RelayPort};
use crate::error::RelayError;

struct RelayState<P> {
    pin: P,
    /// Uptime second at which the relay closed.
    on_since: Option<u64>,
    pending: VecDeque<RelayEvent>,
}

pub struct TimedRelay<P> {
    state: Mutex<RelayState<P>>,
    clock: Arc<dyn ClockPort>,
    max_run_secs: u64,
}

impl<P: OutputPin + Send> TimedRelay<P> {
    pub fn new(pin: P, clock: Arc<dyn ClockPort>, max_heater_minutes: u32) -> Self {
        Self {
            state: Mutex::new(RelayState {
                pin,
                on_since: None,
                pending: VecDeque::new(),
            }),
            clock,
            max_run_secs: u64::from(max_heater_minutes) * 60,
        }
    }

    fn lock(&self) -> MutexGuard<'_, RelayState<P>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remaining_secs(&self, on_since: u64) -> u64 {
        let elapsed = self.clock.uptime_secs().saturating_sub(on_since);
        self.max_run_secs.saturating_sub(elapsed)
    }
}

impl<P: OutputPin + Send> RelayPort for TimedRelay<P> {
    fn turn_on(&self) -> Result<(), RelayError> {
        let mut state = self.lock();
        if state.on_since.is_some() {
            return Ok(());
        }
        state.pin.set_high().map_err(|_| RelayError::GpioWriteFailed)?;
        state.on_since = Some(self.clock.uptime_secs());
        state.pending.push_back(RelayEvent::TurnedOn);
        info!("Relay: ON for at most {}s", self.max_run_secs);
        Ok(())
    }

    fn turn_off(&self) -> Result<(), RelayError> {
        let mut state = self.lock();
        state.pin.set_low().map_err(|_| RelayError::GpioWriteFailed)?;
        if state.on_since.take().is_some() {
            state.pending.push_back(RelayEvent::TurnedOff);
            info!("Relay: OFF");
        }
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.lock().on_since.is_some()
    }

    fn time_remaining(&self) -> String {
        let on_since = self.lock().on_since;
        let minutes = on_since.map_or(0, |since| self.remaining_secs(since).div_ceil(60));
        format!("{} minutes remaining", minutes)
    }

    fn tick(&self) -> Option<RelayEvent> {
        let mut state = self.lock();
        if let Some(since) = state.on_since {
            if self.remaining_secs(since) == 0 {
                match state.pin.set_low() {
                    Ok(()) => {
                        state.on_since = None;
                        state.pending.push_back(RelayEvent::MaxTimeElapsed);
                        info!("Relay: OFF, maximum run time reached");
                    }
                    Err(_) => warn!("Relay: timer expired but pin write failed"),
                }
            }
        }
        state.pending.pop_front()
    }
}

// ───────────────────────────────────────────────────────────────
// Simulated output pin
// ───────────────────────────────────────────────────────────────

/// In-memory output pin for hosts without GPIO.  Level changes are
/// logged at debug level.
#[derive(Debug, Default)]
pub struct SimPin {
    high: bool,
}

impl SimPin {
    fn drive(&mut self, high: bool) {
        if self.high != high {
            debug!("SimPin: {}", if high { "HIGH" } else { "LOW" });
        }
        self.high = high;
    }
}

impl ErrorType for SimPin {
    type Error = core::convert::Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.drive(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.drive(true);
        Ok(())
    }
}
