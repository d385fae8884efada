//! Sender authorisation against the configured phone whitelist.
//!
//! Matching is substring-either-direction so that `12065551234` and
//! `2065551234` are the same number (leading country-code digit present
//! on one side only).  The flip side is that a short candidate matches
//! any entry containing it; the pipeline rejects candidates with fewer
//! than [`MIN_PHONE_DIGITS`] digits after this check.

use std::sync::Arc;

use log::info;

/// Shortest sender number the pipeline will act on.
pub const MIN_PHONE_DIGITS: usize = 7;

/// Whitelist predicate.  Cheap to clone; the list is shared.
#[derive(Debug, Clone)]
pub struct PhoneAuthorizer {
    allowed: Arc<[String]>,
}

impl PhoneAuthorizer {
    pub fn new(allowed: Vec<String>) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    pub fn is_allowed(&self, candidate: &str) -> bool {
        for allowed in self.allowed.iter() {
            if allowed.contains(candidate) || candidate.contains(allowed.as_str()) {
                info!("Auth: {} is allowed", candidate);
                return true;
            }
        }
        info!("Auth: {} is denied", candidate);
        false
    }
}

/// Strip formatting (`+`, spaces, dashes, parentheses) from a sender number.
pub fn clean_phone_number(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}
