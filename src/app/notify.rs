//! SMS reply and broadcast delivery over the modem port.

use std::sync::Arc;

use log::{info, warn};

use super::ports::{BroadcastSink, ModemPort};

/// Delivers replies and whitelist broadcasts.
///
/// Every outbound message is logged.  In test mode nothing is handed to
/// the modem.
#[derive(Clone)]
pub struct Notifier {
    modem: Arc<dyn ModemPort>,
    recipients: Arc<[String]>,
    test_mode: bool,
}

impl Notifier {
    pub fn new(modem: Arc<dyn ModemPort>, recipients: &[String], test_mode: bool) -> Self {
        Self {
            modem,
            recipients: recipients.into(),
            test_mode,
        }
    }
}

impl BroadcastSink for Notifier {
    fn send(&self, phone_number: &str, text: &str) -> bool {
        if phone_number.is_empty() {
            return false;
        }
        info!("MSG - {} : {}", phone_number, escape(text));
        if self.test_mode {
            return true;
        }
        match self.modem.send_message(phone_number, text) {
            Ok(()) => true,
            Err(e) => {
                warn!("SMS to {} failed: {}", phone_number, e);
                false
            }
        }
    }

    fn broadcast(&self, text: &str) {
        for number in self.recipients.iter() {
            self.send(number, text);
        }
    }
}

/// Make a message printable on one log line.
pub fn escape(text: &str) -> String {
    text.replace('\r', "\\r").replace('\n', "\\n")
}
