//! Command execution — the only place a request changes relay or host state.
//!
//! | command    | effect                                      | state changed     |
//! |------------|---------------------------------------------|-------------------|
//! | HEATER_ON  | relay on                                    | if the relay closed |
//! | HEATER_OFF | relay off                                   | if it was on      |
//! | SHUTDOWN   | display, broadcast, relay off, power off    | yes               |
//! | RESTART    | display, broadcast, relay off, restart      | yes               |
//! | QUIT       | display, relay off, terminate               | yes               |
//! | others     | none                                        | no                |
//!
//! A failed power action is logged and the controller keeps running.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, warn};

use super::commands::{Command, CommandResponse};
use super::ports::{BroadcastSink, DisplayPort, PowerPort, RelayPort};

pub struct CommandExecutor {
    relay: Arc<dyn RelayPort>,
    display: Arc<dyn DisplayPort>,
    power: Arc<dyn PowerPort>,
    sink: Arc<dyn BroadcastSink>,
    display_frozen: Arc<AtomicBool>,
}

impl CommandExecutor {
    pub fn new(
        relay: Arc<dyn RelayPort>,
        display: Arc<dyn DisplayPort>,
        power: Arc<dyn PowerPort>,
        sink: Arc<dyn BroadcastSink>,
        display_frozen: Arc<AtomicBool>,
    ) -> Self {
        Self {
            relay,
            display,
            power,
            sink,
            display_frozen,
        }
    }

    /// Carry out `response`.  Returns `true` if relay or host state changed.
    pub fn execute(&self, response: &CommandResponse) -> bool {
        match response.command() {
            Command::HeaterOn => {
                info!("CR: Turning heater ON");
                match self.relay.turn_on() {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("CR: heater ON failed: {}", e);
                        false
                    }
                }
            }
            Command::HeaterOff => {
                let was_on = self.relay.is_on();
                info!("CR: Turning heater OFF");
                if let Err(e) = self.relay.turn_off() {
                    warn!("CR: heater OFF failed: {}", e);
                    return false;
                }
                was_on
            }
            Command::Shutdown => {
                self.show_final("Shutting down...");
                self.sink.broadcast("Shutting down.");
                self.safe_relay();
                if let Err(e) = self.power.shutdown() {
                    warn!("CR: Issue shutting down: {}", e);
                }
                true
            }
            Command::Restart => {
                self.show_final("Restarting...");
                self.sink.broadcast("Attempting restart");
                self.safe_relay();
                if let Err(e) = self.power.restart() {
                    warn!("CR: Issue restarting: {}", e);
                }
                true
            }
            Command::Quit => {
                self.show_final("Quitting");
                self.safe_relay();
                if let Err(e) = self.power.quit() {
                    warn!("CR: Issue quitting: {}", e);
                }
                true
            }
            Command::Status
            | Command::Help
            | Command::Gas
            | Command::Temperature
            | Command::CellStatus
            | Command::Lights
            | Command::Uptime
            | Command::Noop
            | Command::Error => false,
        }
    }

    /// Write the terminal message and stop the display rotation.
    fn show_final(&self, text: &str) {
        self.display_frozen.store(true, Ordering::Release);
        if let Err(e) = self.display.write_text(text) {
            warn!("Display write failed: {}", e);
        }
    }

    fn safe_relay(&self) {
        info!("Turning off relay before power action");
        if let Err(e) = self.relay.turn_off() {
            warn!("Relay off failed: {}", e);
        }
    }
}
