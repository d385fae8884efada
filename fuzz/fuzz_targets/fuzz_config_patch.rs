//! Fuzz target: JSON patches applied to the default configuration.
//!
//! Invariants checked:
//! - No panics for any JSON document
//! - A patch that is accepted and validates round-trips through serde
//!
//! cargo fuzz run fuzz_config_patch

#![no_main]

use hangar_heater::config::SystemConfig;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(patch) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // `with_patch` validates, so anything it returns must be storable.
    let Ok(config) = SystemConfig::default().with_patch(&patch) else {
        return;
    };

    let encoded = serde_json::to_vec(&config).expect("valid config serialises");
    let decoded: SystemConfig = serde_json::from_slice(&encoded).expect("round-trip parses");
    assert_eq!(decoded, config);
});
