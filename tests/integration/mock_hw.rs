//! Recording mock collaborators for integration tests.
//!
//! Every mock records the calls made on it so tests can assert on the
//! full history without a modem, relay or display attached.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hangar_heater::app::events::RelayEvent;
use hangar_heater::app::messages::InboundMessage;
use hangar_heater::app::ports::{
    BatteryCondition, BroadcastSink, ClockPort, Devices, DisplayPort, GasReading, LightReading,
    ModemPort, PowerPort, RelayPort, SensorPort, SignalStrength,
};
use hangar_heater::app::service::Orchestrator;
use hangar_heater::config::SystemConfig;
use hangar_heater::error::{DisplayError, ModemError, PowerError, RelayError, SensorError};

pub const OWNER: &str = "2065551234";
pub const NOW: u64 = 1_700_000_000;

// ── Modem ─────────────────────────────────────────────────────

pub struct MockModem {
    pub inbox: Mutex<Vec<InboundMessage>>,
    pub deleted: Mutex<Vec<u32>>,
    pub battery: Mutex<BatteryCondition>,
    pub fail_fetch: AtomicBool,
    pub fail_delete: AtomicBool,
    pub housekeeping: AtomicUsize,
}

impl Default for MockModem {
    fn default() -> Self {
        Self {
            inbox: Mutex::new(Vec::new()),
            deleted: Mutex::new(Vec::new()),
            battery: Mutex::new(BatteryCondition {
                percent: 87,
                voltage_mv: 4100,
                is_ok: true,
            }),
            fail_fetch: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            housekeeping: AtomicUsize::new(0),
        }
    }
}

#[allow(dead_code)]
impl MockModem {
    pub fn push(&self, slot: u32, sender: &str, text: &str, sent_at: u64) {
        self.inbox
            .lock()
            .unwrap()
            .push(InboundMessage::new(slot, sender, text, sent_at));
    }

    pub fn deleted(&self) -> Vec<u32> {
        self.deleted.lock().unwrap().clone()
    }
}

impl ModemPort for MockModem {
    fn is_message_waiting(&self) -> bool {
        self.fail_fetch.load(Ordering::SeqCst) || !self.inbox.lock().unwrap().is_empty()
    }

    fn get_messages(&self) -> Result<Vec<InboundMessage>, ModemError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ModemError::Timeout);
        }
        Ok(self.inbox.lock().unwrap().clone())
    }

    fn delete_message(&self, message: &InboundMessage) -> Result<(), ModemError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(ModemError::DeleteFailed);
        }
        self.inbox.lock().unwrap().retain(|m| m.slot != message.slot);
        self.deleted.lock().unwrap().push(message.slot);
        Ok(())
    }

    fn delete_all_messages(&self) -> Result<usize, ModemError> {
        let mut inbox = self.inbox.lock().unwrap();
        let count = inbox.len();
        inbox.clear();
        Ok(count)
    }

    fn send_message(&self, _phone_number: &str, _text: &str) -> Result<(), ModemError> {
        Ok(())
    }

    fn signal_strength(&self) -> Result<SignalStrength, ModemError> {
        Ok(SignalStrength::from_csq(17))
    }

    fn battery_condition(&self) -> Result<BatteryCondition, ModemError> {
        Ok(*self.battery.lock().unwrap())
    }

    fn housekeeping_tick(&self) {
        self.housekeeping.fetch_add(1, Ordering::SeqCst);
    }
}

// ── Relay ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRelay {
    pub on: AtomicBool,
    pub ons: AtomicUsize,
    pub offs: AtomicUsize,
    pub events: Mutex<VecDeque<RelayEvent>>,
}

#[allow(dead_code)]
impl MockRelay {
    pub fn ons(&self) -> usize {
        self.ons.load(Ordering::SeqCst)
    }

    pub fn offs(&self) -> usize {
        self.offs.load(Ordering::SeqCst)
    }
}

impl RelayPort for MockRelay {
    fn turn_on(&self) -> Result<(), RelayError> {
        self.on.store(true, Ordering::SeqCst);
        self.ons.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn turn_off(&self) -> Result<(), RelayError> {
        self.on.store(false, Ordering::SeqCst);
        self.offs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on.load(Ordering::SeqCst)
    }

    fn time_remaining(&self) -> String {
        "42 minutes remaining".to_string()
    }

    fn tick(&self) -> Option<RelayEvent> {
        self.events.lock().unwrap().pop_front()
    }
}

// ── Sensors ───────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSensors {
    pub gas: Mutex<Option<GasReading>>,
    pub light: Mutex<Option<LightReading>>,
    pub temperature: Mutex<Option<f32>>,
    pub fail_light: AtomicBool,
}

impl SensorPort for MockSensors {
    fn gas_reading(&self) -> Result<Option<GasReading>, SensorError> {
        Ok(*self.gas.lock().unwrap())
    }

    fn light_reading(&self) -> Result<Option<LightReading>, SensorError> {
        if self.fail_light.load(Ordering::SeqCst) {
            return Err(SensorError::ReadFailed);
        }
        Ok(*self.light.lock().unwrap())
    }

    fn temperature_reading(&self) -> Result<Option<f32>, SensorError> {
        Ok(*self.temperature.lock().unwrap())
    }
}

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Clear,
    Write { row: u8, col: u8, text: String },
    Text(String),
}

#[derive(Default)]
pub struct MockDisplay {
    pub calls: Mutex<Vec<DisplayCall>>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl MockDisplay {
    pub fn calls(&self) -> Vec<DisplayCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<DisplayCall> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

impl DisplayPort for MockDisplay {
    fn clear(&self) -> Result<(), DisplayError> {
        self.calls.lock().unwrap().push(DisplayCall::Clear);
        Ok(())
    }

    fn write(&self, row: u8, col: u8, text: &str) -> Result<(), DisplayError> {
        self.calls.lock().unwrap().push(DisplayCall::Write {
            row,
            col,
            text: text.to_string(),
        });
        Ok(())
    }

    fn write_text(&self, text: &str) -> Result<(), DisplayError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(DisplayError::WriteFailed);
        }
        self.calls
            .lock()
            .unwrap()
            .push(DisplayCall::Text(text.to_string()));
        Ok(())
    }
}

// ── Power ─────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPower {
    pub calls: Mutex<Vec<&'static str>>,
    pub fail: AtomicBool,
}

#[allow(dead_code)]
impl MockPower {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) -> Result<(), PowerError> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            Err(PowerError::PermissionDenied)
        } else {
            Ok(())
        }
    }
}

impl PowerPort for MockPower {
    fn shutdown(&self) -> Result<(), PowerError> {
        self.record("shutdown")
    }

    fn restart(&self) -> Result<(), PowerError> {
        self.record("restart")
    }

    fn quit(&self) -> Result<(), PowerError> {
        self.record("quit")
    }
}

// ── Clock ─────────────────────────────────────────────────────

pub struct MockClock {
    pub now: AtomicU64,
    pub uptime: AtomicU64,
}

impl Default for MockClock {
    fn default() -> Self {
        Self {
            now: AtomicU64::new(NOW),
            uptime: AtomicU64::new(3_725),
        }
    }
}

impl ClockPort for MockClock {
    fn now_unix_secs(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }

    fn uptime_secs(&self) -> u64 {
        self.uptime.load(Ordering::SeqCst)
    }
}

// ── Broadcast sink ────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub broadcasts: Mutex<Vec<String>>,
    pub replies: Mutex<Vec<(String, String)>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }

    pub fn reply_texts(&self) -> Vec<String> {
        self.replies().into_iter().map(|(_, text)| text).collect()
    }

    pub fn clear(&self) {
        self.broadcasts.lock().unwrap().clear();
        self.replies.lock().unwrap().clear();
    }
}

impl BroadcastSink for RecordingSink {
    fn send(&self, phone_number: &str, text: &str) -> bool {
        self.replies
            .lock()
            .unwrap()
            .push((phone_number.to_string(), text.to_string()));
        true
    }

    fn broadcast(&self, text: &str) {
        self.broadcasts.lock().unwrap().push(text.to_string());
    }
}

// ── Test rig ──────────────────────────────────────────────────

/// An orchestrator wired to fresh mocks.
pub struct Rig {
    pub modem: Arc<MockModem>,
    pub relay: Arc<MockRelay>,
    pub sensors: Arc<MockSensors>,
    pub display: Arc<MockDisplay>,
    pub power: Arc<MockPower>,
    pub clock: Arc<MockClock>,
    pub sink: Arc<RecordingSink>,
    pub orchestrator: Orchestrator,
}

#[allow(dead_code)]
impl Rig {
    pub fn config() -> SystemConfig {
        SystemConfig {
            allowed_phone_numbers: vec![OWNER.to_string()],
            test_mode: true,
            ..SystemConfig::default()
        }
    }

    pub fn new() -> Self {
        Self::with_config(Self::config())
    }

    pub fn with_config(config: SystemConfig) -> Self {
        let modem = Arc::new(MockModem::default());
        let relay = Arc::new(MockRelay::default());
        let sensors = Arc::new(MockSensors::default());
        let display = Arc::new(MockDisplay::default());
        let power = Arc::new(MockPower::default());
        let clock = Arc::new(MockClock::default());
        let sink = Arc::new(RecordingSink::default());

        let devices = Devices {
            modem: modem.clone(),
            relay: relay.clone(),
            sensors: sensors.clone(),
            display: display.clone(),
            power: power.clone(),
            clock: clock.clone(),
        };
        let orchestrator = Orchestrator::new(config, devices, sink.clone());

        Self {
            modem,
            relay,
            sensors,
            display,
            power,
            clock,
            sink,
            orchestrator,
        }
    }

    /// Queue an SMS from the whitelisted owner sent `minutes_ago`.
    pub fn sms(&self, slot: u32, text: &str, minutes_ago: u64) {
        self.modem.push(slot, OWNER, text, NOW - minutes_ago * 60);
    }
}
