//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Orchestrator (domain)
//! ```
//!
//! Collaborators are invoked both from the main loop and from the
//! background poll threads, so every port is `Send + Sync` and takes
//! `&self`.  Implementations own their internal synchronisation.

use std::sync::Arc;

use crate::config::SystemConfig;
use crate::error::{DisplayError, ModemError, PowerError, RelayError, SensorError};

use super::events::RelayEvent;
use super::messages::InboundMessage;

// ───────────────────────────────────────────────────────────────
// Modem port (cellular SMS transport)
// ───────────────────────────────────────────────────────────────

/// Signal quality as reported by the modem (`AT+CSQ`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalStrength {
    pub value: u8,
    pub classification: &'static str,
}

impl SignalStrength {
    pub fn from_csq(value: u8) -> Self {
        Self {
            value,
            classification: classify_csq(value),
        }
    }
}

/// Map a raw CSQ value onto the usual marginal/ok/good/excellent bands.
pub fn classify_csq(value: u8) -> &'static str {
    match value {
        0..=9 => "Marginal",
        10..=14 => "OK",
        15..=19 => "Good",
        20..=31 => "Excellent",
        _ => "Unknown",
    }
}

/// Modem battery report (`AT+CBC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryCondition {
    pub percent: u8,
    pub voltage_mv: u16,
    pub is_ok: bool,
}

pub trait ModemPort: Send + Sync {
    /// True if the ring indicator fired or a poll discovered stored messages.
    fn is_message_waiting(&self) -> bool;

    /// Every message currently stored on the SIM.
    fn get_messages(&self) -> Result<Vec<InboundMessage>, ModemError>;

    /// Delete one message from the SIM.
    fn delete_message(&self, message: &InboundMessage) -> Result<(), ModemError>;

    /// Delete every stored message.  Returns how many were removed.
    fn delete_all_messages(&self) -> Result<usize, ModemError>;

    /// Send one SMS.
    fn send_message(&self, phone_number: &str, text: &str) -> Result<(), ModemError>;

    fn signal_strength(&self) -> Result<SignalStrength, ModemError>;

    fn battery_condition(&self) -> Result<BatteryCondition, ModemError>;

    /// Called once per main-loop cycle (poll timers, power-status pin).
    fn housekeeping_tick(&self);
}

// ───────────────────────────────────────────────────────────────
// Relay port (heater power + max-run timer)
// ───────────────────────────────────────────────────────────────

pub trait RelayPort: Send + Sync {
    fn turn_on(&self) -> Result<(), RelayError>;

    fn turn_off(&self) -> Result<(), RelayError>;

    fn is_on(&self) -> bool;

    /// Human-readable remaining run time, e.g. "85 minutes remaining".
    fn time_remaining(&self) -> String;

    /// Advance the run timer.  Returns the transition observed since the
    /// previous tick, if any.  Called once per main-loop cycle.
    fn tick(&self) -> Option<RelayEvent>;
}

// ───────────────────────────────────────────────────────────────
// Sensor port (read-only)
// ───────────────────────────────────────────────────────────────

/// MQ-2 style combustible gas reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasReading {
    pub value: f32,
    pub detected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightReading {
    pub lux: f32,
}

/// `Ok(None)` means the sensor is not enabled on this installation.
pub trait SensorPort: Send + Sync {
    fn gas_reading(&self) -> Result<Option<GasReading>, SensorError>;

    fn light_reading(&self) -> Result<Option<LightReading>, SensorError>;

    /// Temperature in degrees Fahrenheit.
    fn temperature_reading(&self) -> Result<Option<f32>, SensorError>;
}

// ───────────────────────────────────────────────────────────────
// Display port (16x2 character panel)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort: Send + Sync {
    fn clear(&self) -> Result<(), DisplayError>;

    fn write(&self, row: u8, col: u8, text: &str) -> Result<(), DisplayError>;

    /// Clear and write multi-line text starting at the top-left corner.
    fn write_text(&self, text: &str) -> Result<(), DisplayError>;
}

// ───────────────────────────────────────────────────────────────
// Power port (host lifecycle)
// ───────────────────────────────────────────────────────────────

pub trait PowerPort: Send + Sync {
    fn shutdown(&self) -> Result<(), PowerError>;

    fn restart(&self) -> Result<(), PowerError>;

    /// Terminate the controller process.  Only returns on failure.
    fn quit(&self) -> Result<(), PowerError>;
}

// ───────────────────────────────────────────────────────────────
// Clock port
// ───────────────────────────────────────────────────────────────

pub trait ClockPort: Send + Sync {
    /// Wall-clock seconds since the unix epoch (message age).
    fn now_unix_secs(&self) -> u64;

    /// Monotonic seconds since the controller started.
    fn uptime_secs(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Broadcast sink
// ───────────────────────────────────────────────────────────────

/// Outbound SMS delivery used by every reply and broadcast path.
pub trait BroadcastSink: Send + Sync {
    /// Send `text` to a single number.  Returns `true` if it was handed off.
    fn send(&self, phone_number: &str, text: &str) -> bool;

    /// Send `text` to every whitelisted number.
    fn broadcast(&self, text: &str);
}

// ───────────────────────────────────────────────────────────────
// Configuration port
// ───────────────────────────────────────────────────────────────

/// Loads and persists system configuration.
///
/// Implementations MUST validate before persisting: a bad whitelist or a
/// zero heater time is rejected with [`ConfigError::ValidationFailed`].
pub trait ConfigPort {
    fn load(&self) -> Result<SystemConfig, ConfigError>;

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Collaborator bundle
// ───────────────────────────────────────────────────────────────

/// Every collaborator the orchestrator drives, shared with the
/// background tasks.
#[derive(Clone)]
pub struct Devices {
    pub modem: Arc<dyn ModemPort>,
    pub relay: Arc<dyn RelayPort>,
    pub sensors: Arc<dyn SensorPort>,
    pub display: Arc<dyn DisplayPort>,
    pub power: Arc<dyn PowerPort>,
    pub clock: Arc<dyn ClockPort>,
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config file found.
    NotFound,
    /// Stored config failed to parse.
    Corrupted,
    /// A config field failed range validation.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl std::error::Error for ConfigError {}
