//! Gas event hand-off between the poll thread and the main loop.
//!
//! ```text
//! ┌──────────────┐  GasSensorEvent  ┌────────────────┐
//! │ Gas poll     │─────────────────▶│  Main loop     │
//! │ (thread)     │   bounded queue  │  (consumer)    │
//! └──────────────┘                  └────────────────┘
//! ```
//!
//! Producers never block.  Only the main loop drains, and it processes a
//! drain in FIFO order.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::warn;

/// Pending gas events the queue holds before the overflow policy kicks in.
pub const GAS_QUEUE_DEPTH: usize = 16;

/// A classified gas sensor reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GasSensorEvent {
    /// Reading above the detection threshold.
    Detected(f32),
    /// Reading at or below the threshold.
    Clear(f32),
}

impl GasSensorEvent {
    pub fn level(self) -> f32 {
        match self {
            Self::Detected(level) | Self::Clear(level) => level,
        }
    }
}

/// Bounded multi-producer, single-consumer gas event queue.
pub struct GasEventQueue {
    channel: Channel<CriticalSectionRawMutex, GasSensorEvent, GAS_QUEUE_DEPTH>,
}

impl Default for GasEventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl GasEventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue without blocking.
    ///
    /// When full, a `Detected` event evicts the oldest pending event and a
    /// `Clear` event is dropped.  Returns `false` if the event was dropped.
    pub fn publish(&self, event: GasSensorEvent) -> bool {
        match self.channel.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(GasSensorEvent::Detected(level))) => {
                if let Ok(evicted) = self.channel.try_receive() {
                    warn!("Gas queue full, evicted {:?}", evicted);
                }
                match self.channel.try_send(GasSensorEvent::Detected(level)) {
                    Ok(()) => true,
                    Err(_) => {
                        warn!("Gas queue full, dropped Detected({})", level);
                        false
                    }
                }
            }
            Err(TrySendError::Full(event)) => {
                warn!("Gas queue full, dropped {:?}", event);
                false
            }
        }
    }

    /// Take every pending event, oldest first.
    pub fn drain(&self) -> Vec<GasSensorEvent> {
        let mut events = Vec::with_capacity(self.channel.len());
        while let Ok(event) = self.channel.try_receive() {
            events.push(event);
        }
        events
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
