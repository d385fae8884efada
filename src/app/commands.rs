//! Commands understood by the controller and the response built for each.
//!
//! The set is closed: a [`Command`] is one of the variants below and
//! nothing else.  Text arriving from outside is only ever turned into a
//! command through [`CommandResponse::from_token`] or the dispatch table,
//! both of which degrade unknown input to [`Command::Help`].

use core::fmt;

/// Every command the controller can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    HeaterOn,
    HeaterOff,
    Status,
    Help,
    Shutdown,
    Restart,
    Quit,
    Gas,
    Temperature,
    CellStatus,
    Lights,
    Uptime,
    /// Internal: a handler could not complete.
    Error,
    /// Internal: nothing to do (e.g. heater already in the requested state).
    Noop,
}

impl Command {
    /// Every command, including the internal `Error` and `Noop`.
    pub const ALL: [Command; 14] = [
        Command::HeaterOn,
        Command::HeaterOff,
        Command::Status,
        Command::Help,
        Command::Shutdown,
        Command::Restart,
        Command::Quit,
        Command::Gas,
        Command::Temperature,
        Command::CellStatus,
        Command::Lights,
        Command::Uptime,
        Command::Error,
        Command::Noop,
    ];

    /// The upper-case token used in SMS bodies and in help text.
    pub fn token(self) -> &'static str {
        match self {
            Self::HeaterOn => "ON",
            Self::HeaterOff => "OFF",
            Self::Status => "STATUS",
            Self::Help => "HELP",
            Self::Shutdown => "SHUTDOWN",
            Self::Restart => "RESTART",
            Self::Quit => "QUIT",
            Self::Gas => "GAS",
            Self::Temperature => "TEMP",
            Self::CellStatus => "CELL",
            Self::Lights => "LIGHTS",
            Self::Uptime => "UPTIME",
            Self::Error => "ERROR",
            Self::Noop => "NOOP",
        }
    }

    /// Exact, case-insensitive token lookup.
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.token().eq_ignore_ascii_case(token.trim()))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// A command paired with the text that goes back to the requester.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResponse {
    command: Command,
    message: String,
}

impl CommandResponse {
    pub fn new(command: Command, message: impl Into<String>) -> Self {
        Self {
            command,
            message: message.into(),
        }
    }

    /// Build from a raw token.  Unrecognised tokens become [`Command::Help`];
    /// the message is kept verbatim either way (`None` becomes empty).
    pub fn from_token(token: &str, message: Option<&str>) -> Self {
        Self {
            command: Command::from_token(token).unwrap_or(Command::Help),
            message: message.unwrap_or_default().to_string(),
        }
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
