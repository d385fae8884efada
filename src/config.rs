//! System configuration parameters
//!
//! All tunable parameters for the heater controller.  Values are loaded
//! from a JSON file through a [`ConfigPort`](crate::app::ports::ConfigPort)
//! and can be patched at runtime from a partial JSON object.

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Access ---
    /// Phone numbers allowed to issue commands; also the broadcast list.
    pub allowed_phone_numbers: Vec<String>,
    /// Messages older than this (minutes) are never executed.
    pub oldest_message_minutes: u32,

    // --- Heater ---
    /// Maximum run time for a single ON command (minutes).
    pub max_heater_minutes: u32,

    // --- Light classification (lux) ---
    pub hangar_dark_lux: f32,
    pub hangar_dim_lux: f32,
    pub hangar_lit_lux: f32,

    // --- Modem ---
    /// Serial device the modem is attached to.
    pub modem_serial_port: String,
    /// Connection attempts before giving up at startup.
    pub modem_connect_retries: u32,
    /// Delay between connection attempts (seconds).
    pub modem_retry_delay_secs: u64,

    // --- Timing ---
    /// Gas sensor poll interval (seconds).
    pub gas_poll_interval_secs: u64,
    /// Modem battery/health poll interval (seconds).
    pub health_poll_interval_secs: u64,
    /// Display panel rotation interval (seconds).
    pub display_refresh_interval_secs: u64,
    /// Pause between main-loop cycles (milliseconds).
    pub main_loop_interval_ms: u64,

    /// Log outbound SMS instead of sending; tolerate a missing modem.
    pub test_mode: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            allowed_phone_numbers: Vec::new(),
            oldest_message_minutes: 30,

            max_heater_minutes: 90,

            hangar_dark_lux: 20.0,
            hangar_dim_lux: 60.0,
            hangar_lit_lux: 90.0,

            modem_serial_port: "/dev/ttyUSB0".to_string(),
            modem_connect_retries: 4,
            modem_retry_delay_secs: 10,

            gas_poll_interval_secs: 30,
            health_poll_interval_secs: 60 * 5,
            display_refresh_interval_secs: 5,
            main_loop_interval_ms: 250,

            test_mode: false,
        }
    }
}

impl SystemConfig {
    /// Range-check every field.  Invalid values are rejected, not clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_phone_numbers.iter().all(|n| n.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "allowed_phone_numbers must contain at least one number",
            ));
        }
        if self.max_heater_minutes == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_heater_minutes must be > 0",
            ));
        }
        let thresholds = [self.hangar_dark_lux, self.hangar_dim_lux, self.hangar_lit_lux];
        if !thresholds.iter().all(|lux| lux.is_finite()) {
            return Err(ConfigError::ValidationFailed(
                "light thresholds must be finite",
            ));
        }
        if !(self.hangar_dark_lux <= self.hangar_dim_lux
            && self.hangar_dim_lux <= self.hangar_lit_lux)
        {
            return Err(ConfigError::ValidationFailed(
                "light thresholds must satisfy dark <= dim <= lit",
            ));
        }
        if self.gas_poll_interval_secs == 0
            || self.health_poll_interval_secs == 0
            || self.display_refresh_interval_secs == 0
        {
            return Err(ConfigError::ValidationFailed(
                "background task intervals must be > 0",
            ));
        }
        if self.modem_connect_retries == 0 {
            return Err(ConfigError::ValidationFailed(
                "modem_connect_retries must be >= 1",
            ));
        }
        Ok(())
    }

    /// Return a copy with the keys of `patch` applied on top.
    ///
    /// Unknown keys are ignored; a key with the wrong type rejects the
    /// whole patch.  The result is validated before it is returned.
    pub fn with_patch(&self, patch: &serde_json::Value) -> Result<Self, ConfigError> {
        let serde_json::Value::Object(changes) = patch else {
            return Err(ConfigError::Corrupted);
        };
        let mut merged = serde_json::to_value(self).map_err(|_| ConfigError::Corrupted)?;
        if let serde_json::Value::Object(fields) = &mut merged {
            for (key, value) in changes {
                if fields.contains_key(key) {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        let updated: Self = serde_json::from_value(merged).map_err(|_| ConfigError::Corrupted)?;
        updated.validate()?;
        Ok(updated)
    }

    /// Whitelist entries with surrounding whitespace removed and blanks dropped.
    pub fn phone_whitelist(&self) -> Vec<String> {
        self.allowed_phone_numbers
            .iter()
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect()
    }
}
