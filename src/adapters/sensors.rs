//! Fixed-value sensor adapter.
//!
//! Holds the most recent reading for each sensor, set by whatever feeds
//! it (a driver thread or a test).  A sensor that was never set reports
//! `None` ("not enabled").

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::app::ports::{GasReading, LightReading, SensorPort};
use crate::error::SensorError;

#[derive(Debug, Default, Clone, Copy)]
struct Readings {
    gas: Option<GasReading>,
    light: Option<LightReading>,
    temperature_f: Option<f32>,
}

#[derive(Default)]
pub struct FixedSensors {
    readings: Mutex<Readings>,
}

impl FixedSensors {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Readings> {
        self.readings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_gas(&self, reading: Option<GasReading>) {
        self.lock().gas = reading;
    }

    pub fn set_light(&self, reading: Option<LightReading>) {
        self.lock().light = reading;
    }

    pub fn set_temperature(&self, fahrenheit: Option<f32>) {
        self.lock().temperature_f = fahrenheit;
    }
}

impl SensorPort for FixedSensors {
    fn gas_reading(&self) -> Result<Option<GasReading>, SensorError> {
        Ok(self.lock().gas)
    }

    fn light_reading(&self) -> Result<Option<LightReading>, SensorError> {
        Ok(self.lock().light)
    }

    fn temperature_reading(&self) -> Result<Option<f32>, SensorError> {
        match self.lock().temperature_f {
            Some(f) if !f.is_finite() => Err(SensorError::OutOfRange),
            other => Ok(other),
        }
    }
}
