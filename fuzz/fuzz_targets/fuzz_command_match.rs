//! Fuzz target: SMS body to command resolution.
//!
//! Invariants checked:
//! - No panics under any UTF-8 input
//! - A match is always one of the requestable commands
//! - A match names a token that actually occurs in the text
//! - The sender cleaner only ever yields ASCII digits
//!
//! cargo fuzz run fuzz_command_match

#![no_main]

use hangar_heater::app::auth::clean_phone_number;
use hangar_heater::app::commands::CommandResponse;
use hangar_heater::app::dispatch::{REQUEST_COMMANDS, match_command};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Some(command) = match_command(text) {
        assert!(REQUEST_COMMANDS.contains(&command));
        assert!(
            text.to_ascii_lowercase()
                .contains(&command.token().to_ascii_lowercase()),
            "matched {command} without its token present"
        );
    }

    let response = CommandResponse::from_token(text, Some(text));
    assert_eq!(response.message(), text);

    assert!(clean_phone_number(text).bytes().all(|b| b.is_ascii_digit()));
});
