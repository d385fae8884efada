//! Command dispatch table — message text in, [`CommandResponse`] out.
//!
//! ## Match precedence
//!
//! A message may contain more than one command token ("status, then
//! off").  Resolution is deterministic:
//!
//! 1. The first entry of [`REQUEST_COMMANDS`] that appears as a whole
//!    word wins.
//! 2. Failing that, the first entry that appears anywhere as a substring
//!    wins ("turnoff").
//!
//! The table lists `OFF` first and `ON` last, so a message naming both
//! resolves to OFF, and `ON` (short enough to hide inside other words)
//! is only ever picked when nothing else matched.
//!
//! Response formation is read-only.  Nothing here touches the relay; the
//! executor acts on the returned command afterwards.

use std::sync::Arc;

use log::{info, warn};

use crate::error::StatusError;
use crate::safety::GasFlag;

use super::commands::{Command, CommandResponse};
use super::ports::RelayPort;
use super::status::StatusComposer;

/// Commands accepted from a requester, in match-precedence order.
pub const REQUEST_COMMANDS: [Command; 12] = [
    Command::HeaterOff,
    Command::Shutdown,
    Command::Restart,
    Command::Quit,
    Command::Status,
    Command::Help,
    Command::Lights,
    Command::CellStatus,
    Command::Temperature,
    Command::Uptime,
    Command::Gas,
    Command::HeaterOn,
];

/// Find the command named in `message`, if any.  Case-insensitive.
pub fn match_command(message: &str) -> Option<Command> {
    let lowered = message.to_ascii_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    REQUEST_COMMANDS
        .into_iter()
        .find(|c| words.iter().any(|w| w.eq_ignore_ascii_case(c.token())))
        .or_else(|| {
            REQUEST_COMMANDS
                .into_iter()
                .find(|c| lowered.contains(&c.token().to_ascii_lowercase()))
        })
}

/// Builds the response for a request, checking relay and gas preconditions.
pub struct CommandDispatchTable {
    relay: Arc<dyn RelayPort>,
    gas: GasFlag,
    status: Arc<StatusComposer>,
    max_heater_minutes: u32,
}

impl CommandDispatchTable {
    pub fn new(
        relay: Arc<dyn RelayPort>,
        gas: GasFlag,
        status: Arc<StatusComposer>,
        max_heater_minutes: u32,
    ) -> Self {
        Self {
            relay,
            gas,
            status,
            max_heater_minutes,
        }
    }

    /// Resolve `message` and form the response for `requester`.
    ///
    /// Unrecognised text yields HELP with an "INVALID COMMAND" prefix.
    pub fn respond(&self, message: &str, requester: &str) -> CommandResponse {
        match match_command(message) {
            Some(command) => self.handle(command, requester),
            None => CommandResponse::new(
                Command::Help,
                format!("INVALID COMMAND\n{}", self.status.help()),
            ),
        }
    }

    /// Form the response for a known command.
    pub fn handle(&self, command: Command, requester: &str) -> CommandResponse {
        info!("Received {} request from {}", command, requester);
        match command {
            Command::HeaterOn => self.heater_on(),
            Command::HeaterOff => self.heater_off(),
            Command::Status => CommandResponse::new(Command::Status, self.status.full()),
            Command::Help => CommandResponse::new(Command::Help, self.status.help()),
            Command::Uptime => CommandResponse::new(Command::Uptime, self.status.uptime()),
            Command::Gas => section(Command::Gas, "Gas sensor", self.status.gas()),
            Command::Temperature => {
                section(Command::Temperature, "Temp probe", self.status.temperature())
            }
            Command::CellStatus => section(Command::CellStatus, "Cell status", self.status.cell()),
            Command::Lights => section(Command::Lights, "Light sensor", self.status.light()),
            Command::Shutdown => CommandResponse::new(
                Command::Shutdown,
                format!("Received SHUTDOWN request from {}", requester),
            ),
            Command::Restart => CommandResponse::new(
                Command::Restart,
                format!("Restart request from {}", requester),
            ),
            Command::Quit => CommandResponse::new(Command::Quit, Command::Quit.token()),
            Command::Noop => CommandResponse::new(Command::Noop, ""),
            Command::Error => CommandResponse::new(Command::Error, "Request failed."),
        }
    }

    fn heater_on(&self) -> CommandResponse {
        if self.relay.is_on() {
            return CommandResponse::new(
                Command::Noop,
                format!("Heater is already ON, {}", self.relay.time_remaining()),
            );
        }
        if self.gas.is_detected() {
            return CommandResponse::new(Command::HeaterOff, "Gas warning. Not turning heater on");
        }
        CommandResponse::new(
            Command::HeaterOn,
            format!("Heater turning on for {} minutes.", self.max_heater_minutes),
        )
    }

    fn heater_off(&self) -> CommandResponse {
        if self.relay.is_on() {
            CommandResponse::new(
                Command::HeaterOff,
                format!("Turning heater off with {}", self.relay.time_remaining()),
            )
        } else {
            CommandResponse::new(Command::Noop, "Heater is already OFF")
        }
    }
}

fn section(
    command: Command,
    name: &str,
    text: Result<String, StatusError>,
) -> CommandResponse {
    match text {
        Ok(text) => CommandResponse::new(command, text),
        Err(e) => {
            warn!("{} status failed: {}", name, e);
            CommandResponse::new(Command::Error, format!("{} unavailable.", name))
        }
    }
}
