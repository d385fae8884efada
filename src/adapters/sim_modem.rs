//! Simulated SMS modem for hosts without cellular hardware.
//!
//! Inbound messages are injected (the binary feeds them from stdin as
//! `<phone> <text>` lines); outbound messages are logged and the most
//! recent [`OUTBOX_LIMIT`] are kept in an outbox.  Signal and battery are
//! reported as healthy.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;

use crate::app::messages::InboundMessage;
use crate::app::notify::escape;
use crate::app::ports::{BatteryCondition, ModemPort, SignalStrength};
use crate::error::ModemError;

/// Sent messages retained for inspection; older ones are discarded.
pub const OUTBOX_LIMIT: usize = 32;

#[derive(Default)]
struct SimStore {
    inbox: Vec<InboundMessage>,
    outbox: VecDeque<(String, String)>,
    next_slot: u32,
}

#[derive(Default)]
pub struct SimModem {
    store: Mutex<SimStore>,
}

impl SimModem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, SimStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store an inbound message stamped with the current time.
    pub fn inject(&self, sender: &str, text: &str) {
        let sent_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let mut store = self.lock();
        let slot = store.next_slot;
        store.next_slot = store.next_slot.wrapping_add(1);
        store
            .inbox
            .push(InboundMessage::new(slot, sender, text, sent_at));
    }

    /// Parse a `<phone> <text>` console line and inject it.
    pub fn inject_line(&self, line: &str) -> bool {
        match line.trim().split_once(char::is_whitespace) {
            Some((sender, text)) if !text.trim().is_empty() => {
                self.inject(sender, text.trim());
                true
            }
            _ => false,
        }
    }

    /// The most recent sent messages, oldest first.
    pub fn outbox(&self) -> Vec<(String, String)> {
        self.lock().outbox.iter().cloned().collect()
    }
}

impl ModemPort for SimModem {
    fn is_message_waiting(&self) -> bool {
        !self.lock().inbox.is_empty()
    }

    fn get_messages(&self) -> Result<Vec<InboundMessage>, ModemError> {
        Ok(self.lock().inbox.clone())
    }

    fn delete_message(&self, message: &InboundMessage) -> Result<(), ModemError> {
        let mut store = self.lock();
        let before = store.inbox.len();
        store.inbox.retain(|m| m.slot != message.slot);
        if store.inbox.len() == before {
            return Err(ModemError::DeleteFailed);
        }
        Ok(())
    }

    fn delete_all_messages(&self) -> Result<usize, ModemError> {
        let mut store = self.lock();
        let count = store.inbox.len();
        store.inbox.clear();
        Ok(count)
    }

    fn send_message(&self, phone_number: &str, text: &str) -> Result<(), ModemError> {
        info!("SIM SMS -> {} : {}", phone_number, escape(text));
        let mut store = self.lock();
        if store.outbox.len() == OUTBOX_LIMIT {
            store.outbox.pop_front();
        }
        store
            .outbox
            .push_back((phone_number.to_string(), text.to_string()));
        Ok(())
    }

    fn signal_strength(&self) -> Result<SignalStrength, ModemError> {
        Ok(SignalStrength::from_csq(20))
    }

    fn battery_condition(&self) -> Result<BatteryCondition, ModemError> {
        Ok(BatteryCondition {
            percent: 100,
            voltage_mv: 4200,
            is_ok: true,
        })
    }

    fn housekeeping_tick(&self) {}
}
