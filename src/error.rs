//! Unified error types for the heater controller.
//!
//! One enum per collaborator concern, all convertible into the top-level
//! [`Error`] so the background tasks and the main loop handle failures
//! uniformly.  All variants are `Copy`; collaborator errors never carry
//! heap data across the thread boundary.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level controller error
// ---------------------------------------------------------------------------

/// Every fallible collaborator call in the controller funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The cellular modem failed or is unreachable.
    Modem(ModemError),
    /// The heater relay could not be driven.
    Relay(RelayError),
    /// A sensor read failed.
    Sensor(SensorError),
    /// The display rejected a write.
    Display(DisplayError),
    /// A power-control action (shutdown, restart, quit) failed.
    Power(PowerError),
    /// A status string could not be composed.
    Status(StatusError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modem(e) => write!(f, "modem: {e}"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Display(e) => write!(f, "display: {e}"),
            Self::Power(e) => write!(f, "power: {e}"),
            Self::Status(e) => write!(f, "status: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Modem errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModemError {
    /// Serial device missing or not answering.
    NotConnected,
    /// The modem did not answer within its timeout.
    Timeout,
    /// The modem answered with something unparseable.
    BadResponse,
    /// Sending an SMS was refused by the network.
    SendFailed,
    /// The message slot could not be deleted from the SIM.
    DeleteFailed,
}

impl fmt::Display for ModemError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "not connected"),
            Self::Timeout => write!(f, "timed out"),
            Self::BadResponse => write!(f, "bad response"),
            Self::SendFailed => write!(f, "send failed"),
            Self::DeleteFailed => write!(f, "delete failed"),
        }
    }
}

impl std::error::Error for ModemError {}

impl From<ModemError> for Error {
    fn from(e: ModemError) -> Self {
        Self::Modem(e)
    }
}

// ---------------------------------------------------------------------------
// Relay errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// GPIO set failed.
    GpioWriteFailed,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GpioWriteFailed => write!(f, "GPIO write failed"),
        }
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// ADC or bus read returned an error or timed out.
    ReadFailed,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "read failed"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Display errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayError {
    /// The display controller did not acknowledge the write.
    WriteFailed,
    /// Row/column outside the panel.
    OutOfBounds,
}

impl fmt::Display for DisplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFailed => write!(f, "write failed"),
            Self::OutOfBounds => write!(f, "position out of bounds"),
        }
    }
}

impl From<DisplayError> for Error {
    fn from(e: DisplayError) -> Self {
        Self::Display(e)
    }
}

// ---------------------------------------------------------------------------
// Power-control errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerError {
    /// The host refused the shutdown/restart command.
    CommandFailed,
    /// Insufficient privileges to power the host off.
    PermissionDenied,
}

impl fmt::Display for PowerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CommandFailed => write!(f, "command failed"),
            Self::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl From<PowerError> for Error {
    fn from(e: PowerError) -> Self {
        Self::Power(e)
    }
}

// ---------------------------------------------------------------------------
// Status composition errors
// ---------------------------------------------------------------------------

/// A status section could not be rendered because its source failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusError {
    Modem(ModemError),
    Sensor(SensorError),
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modem(e) => write!(f, "modem {e}"),
            Self::Sensor(e) => write!(f, "sensor {e}"),
        }
    }
}

impl From<ModemError> for StatusError {
    fn from(e: ModemError) -> Self {
        Self::Modem(e)
    }
}

impl From<SensorError> for StatusError {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

impl From<StatusError> for Error {
    fn from(e: StatusError) -> Self {
        Self::Status(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Controller-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
