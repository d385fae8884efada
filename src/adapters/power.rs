//! Host power control (shutdown / restart / quit).
//!
//! In test mode shutdown and restart are logged only.

use std::io::ErrorKind;
use std::process::Command;

use log::{info, warn};

use crate::app::ports::PowerPort;
use crate::error::PowerError;

pub struct HostPower {
    test_mode: bool,
}

impl HostPower {
    pub fn new(test_mode: bool) -> Self {
        Self { test_mode }
    }

    fn run(&self, program: &str, args: &[&str]) -> Result<(), PowerError> {
        if self.test_mode {
            info!("Test mode: skipping `{} {}`", program, args.join(" "));
            return Ok(());
        }
        let status = Command::new(program).args(args).status().map_err(|e| {
            warn!("Could not run {}: {}", program, e);
            match e.kind() {
                ErrorKind::PermissionDenied => PowerError::PermissionDenied,
                _ => PowerError::CommandFailed,
            }
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(PowerError::CommandFailed)
        }
    }
}

impl PowerPort for HostPower {
    fn shutdown(&self) -> Result<(), PowerError> {
        info!("SHUTDOWN: powering host off");
        self.run("shutdown", &["-h", "now"])
    }

    fn restart(&self) -> Result<(), PowerError> {
        info!("RESTART: rebooting host");
        self.run("shutdown", &["-r", "now"])
    }

    fn quit(&self) -> Result<(), PowerError> {
        info!("QUIT: exiting controller");
        std::process::exit(0)
    }
}
