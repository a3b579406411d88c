//! Fuzz target: `RelayConfig::from_json`
//!
//! Arbitrary bytes must either be rejected with a typed error or yield a
//! configuration that passes validation.
//!
//! cargo fuzz run fuzz_config_json

#![no_main]

use libfuzzer_sys::fuzz_target;
use voicerelay::config::RelayConfig;

fuzz_target!(|data: &[u8]| {
    if let Ok(config) = RelayConfig::from_json(data) {
        assert!(config.validate().is_ok());
        assert_ne!(config.light_pin, config.motor_pin);
        assert!(!config.commands.is_empty());
    }
});
