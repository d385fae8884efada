//! Human-readable status text for SMS replies and the display.
//!
//! Every section is rendered on demand from the collaborators; nothing
//! is cached.  A sensor that is not fitted renders a fixed "not enabled"
//! line.  A collaborator that *fails* yields a [`StatusError`], which the
//! full status replaces with a "<section> unavailable." line.

use std::sync::Arc;

use log::warn;

use crate::config::SystemConfig;
use crate::error::StatusError;

use super::dispatch::REQUEST_COMMANDS;
use super::ports::{ClockPort, ModemPort, RelayPort, SensorPort};

/// Lux boundaries used to describe the hangar lighting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightThresholds {
    pub dark: f32,
    pub dim: f32,
    pub lit: f32,
}

impl LightThresholds {
    pub fn from_config(config: &SystemConfig) -> Self {
        Self {
            dark: config.hangar_dark_lux,
            dim: config.hangar_dim_lux,
            lit: config.hangar_lit_lux,
        }
    }

    pub fn classify(&self, lux: f32) -> &'static str {
        if lux <= self.dark {
            "dark."
        } else if lux <= self.dim {
            "dim."
        } else if lux <= self.lit {
            "lit."
        } else {
            "Bright. Lights on?"
        }
    }
}

/// Read-only status renderer shared by the dispatcher and the display task.
pub struct StatusComposer {
    relay: Arc<dyn RelayPort>,
    modem: Arc<dyn ModemPort>,
    sensors: Arc<dyn SensorPort>,
    clock: Arc<dyn ClockPort>,
    lights: LightThresholds,
}

impl StatusComposer {
    pub fn new(
        relay: Arc<dyn RelayPort>,
        modem: Arc<dyn ModemPort>,
        sensors: Arc<dyn SensorPort>,
        clock: Arc<dyn ClockPort>,
        lights: LightThresholds,
    ) -> Self {
        Self {
            relay,
            modem,
            sensors,
            clock,
            lights,
        }
    }

    pub fn heater(&self) -> String {
        if self.relay.is_on() {
            format!("Heater is ON\n{}.", self.relay.time_remaining())
        } else {
            "Heater is OFF.".to_string()
        }
    }

    pub fn gas(&self) -> Result<String, StatusError> {
        let Some(reading) = self.sensors.gas_reading()? else {
            return Ok("Gas sensor NOT enabled.".to_string());
        };
        let mut status = format!("Gas reading={}", reading.value);
        if reading.detected {
            status.push_str("\nDANGER! GAS DETECTED!");
        }
        Ok(status)
    }

    pub fn light(&self) -> Result<String, StatusError> {
        let Some(reading) = self.sensors.light_reading()? else {
            return Ok("Light sensor not enabled.".to_string());
        };
        Ok(format!(
            "{} LUX of light.\nHangar is {}",
            reading.lux as i64,
            self.lights.classify(reading.lux)
        ))
    }

    pub fn temperature(&self) -> Result<String, StatusError> {
        match self.sensors.temperature_reading()? {
            Some(fahrenheit) => Ok(format!("TEMP: {}F", fahrenheit)),
            None => Ok("Temp probe not enabled.".to_string()),
        }
    }

    /// Signal strength and modem battery, laid out for a 16x2 panel.
    pub fn cell(&self) -> Result<String, StatusError> {
        let signal = self.modem.signal_strength()?;
        let battery = self.modem.battery_condition()?;

        let mut status = format!("CSQ:{} {}", signal.value, signal.classification);
        if !battery.is_ok {
            status.push_str(" LOW BATTERY.");
        }
        status.push_str(&format!(
            "\nBAT:{}% V:{}",
            battery.percent,
            f32::from(battery.voltage_mv) / 1000.0
        ));
        Ok(status)
    }

    pub fn uptime(&self) -> String {
        uptime_text(self.clock.uptime_secs())
    }

    /// Every section, one per line.  A section whose collaborator fails
    /// is replaced by a fixed "unavailable" line.
    pub fn full(&self) -> String {
        let sections = [
            self.heater(),
            section_or_unavailable("Gas sensor", self.gas()),
            section_or_unavailable("Light sensor", self.light()),
            section_or_unavailable("Temp probe", self.temperature()),
            section_or_unavailable("Cell status", self.cell()),
            self.uptime(),
        ];
        sections.join("\n")
    }

    pub fn help(&self) -> String {
        help_text()
    }
}

fn section_or_unavailable(name: &str, section: Result<String, StatusError>) -> String {
    section.unwrap_or_else(|e| {
        warn!("{} status failed: {}", name, e);
        format!("{} unavailable.", name)
    })
}

/// `Commands:` followed by every request token, one per line.
pub fn help_text() -> String {
    let mut text = String::from("Commands:");
    for command in REQUEST_COMMANDS {
        text.push('\n');
        text.push_str(command.token());
    }
    text
}

/// Compact uptime that fits one display row, e.g. `2d 03h 04m 05s`.
pub fn uptime_text(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    format!("{}d {:02}h {:02}m {:02}s", days, hours, minutes, seconds)
}
