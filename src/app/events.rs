//! Outbound events reported by collaborators to the orchestrator.

/// A transition observed by the relay timer during one
/// [`RelayPort::tick`](super::ports::RelayPort::tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    /// The relay closed (heater energised).
    TurnedOn,
    /// The relay opened on request.
    TurnedOff,
    /// The relay opened because the maximum run time elapsed.
    MaxTimeElapsed,
}

impl RelayEvent {
    /// Notice broadcast to the whitelist when this event is observed.
    pub fn notice(self) -> &'static str {
        match self {
            Self::TurnedOn => "Heater turned ON.",
            Self::TurnedOff => "Heater turned OFF.",
            Self::MaxTimeElapsed => "Heater turned OFF due to timer.",
        }
    }
}
