//! System configuration parameters
//!
//! All tunable parameters for the relay controller.  Defaults match the
//! shipped board; a JSON document can be embedded at build time through
//! `VOICERELAY_CONFIG_JSON` to override them.

use log::warn;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::commands::{
    MAX_COMMAND_LEN, MAX_PHRASES, PhraseBinding, Vocabulary, default_bindings,
};
use crate::error::ConfigError;
use crate::pins;

/// Longest device name that fits the 31-byte advertising payload untruncated:
/// 3 bytes of flags and a 2-byte name header leave 26.
pub const MAX_DEVICE_NAME_LEN: usize = 26;

/// Default primary service UUID.
pub const DEFAULT_SERVICE_UUID: Uuid =
    Uuid::from_u128(0x4faf_c201_1fb5_459e_8fcc_c5c9_c331_914b);
/// Default control characteristic UUID.
pub const DEFAULT_CONTROL_UUID: Uuid =
    Uuid::from_u128(0xbeb5_483e_36e1_4688_b7f5_ea07_361b_26a8);

/// Whether the controller gets a text confirmation after each write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// No replies; the characteristic is a pure command sink.
    #[default]
    Silent,
    /// Notify `"<Actuator> turned <ON|OFF>"` or `"invalid command"`.
    Confirm,
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    // --- Radio ---
    /// GAP device name shown to scanning controllers.
    pub device_name: heapless::String<MAX_DEVICE_NAME_LEN>,
    /// Primary service UUID (hyphenated text in JSON).
    pub service_uuid: Uuid,
    /// Control characteristic UUID (hyphenated text in JSON).
    pub control_uuid: Uuid,

    // --- Outputs ---
    /// Light relay GPIO.
    pub light_pin: i32,
    /// Motor relay GPIO.
    pub motor_pin: i32,

    // --- Commands ---
    /// Phrase table.
    pub commands: heapless::Vec<PhraseBinding, MAX_PHRASES>,
    pub reply_mode: ReplyMode,

    // --- Timing ---
    /// Main loop delay between queue drains (milliseconds).
    pub poll_interval_ms: u32,
    /// Polls between advertising retries after a refused start.
    pub advertising_retry_polls: u32,
}

impl Default for RelayConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        let _ = device_name.push_str("ESP32Voice");
        Self {
            // Radio
            device_name,
            service_uuid: DEFAULT_SERVICE_UUID,
            control_uuid: DEFAULT_CONTROL_UUID,

            // Outputs
            light_pin: pins::LIGHT_RELAY_GPIO,
            motor_pin: pins::MOTOR_RELAY_GPIO,

            // Commands
            commands: default_bindings(),
            reply_mode: ReplyMode::Silent,

            // Timing
            poll_interval_ms: 20,        // 50 Hz
            advertising_retry_polls: 50, // ~1 s at 20 ms
        }
    }
}

impl RelayConfig {
    /// Parse a JSON document and validate it.  Missing fields take their
    /// defaults.
    pub fn from_json(bytes: &[u8]) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_slice(bytes).map_err(|_| ConfigError::Malformed)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Use `json` if present and valid, otherwise the defaults.
    pub fn from_override(json: Option<&str>) -> Self {
        let Some(text) = json else {
            return Self::default();
        };
        match Self::from_json(text.as_bytes()) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("Config override rejected ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Range-check every field.  Rejects rather than clamps.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg| Err(ConfigError::ValidationFailed(msg));

        if self.device_name.is_empty() {
            return fail("device_name must not be empty");
        }
        if !self.device_name.bytes().all(is_printable_ascii) {
            return fail("device_name must be printable ASCII");
        }
        if self.service_uuid == self.control_uuid {
            return fail("service_uuid and control_uuid must differ");
        }

        if !pins::is_output_capable(self.light_pin) {
            return fail("light_pin is not an output-capable GPIO");
        }
        if !pins::is_output_capable(self.motor_pin) {
            return fail("motor_pin is not an output-capable GPIO");
        }
        if self.light_pin == self.motor_pin {
            return fail("light_pin and motor_pin must differ");
        }

        if self.commands.is_empty() {
            return fail("commands must not be empty");
        }
        for (idx, binding) in self.commands.iter().enumerate() {
            let phrase = binding.phrase.as_str();
            if phrase.is_empty() || phrase.len() > MAX_COMMAND_LEN {
                return fail("command phrase length out of range");
            }
            if !phrase.bytes().all(is_printable_ascii) {
                return fail("command phrase must be printable ASCII");
            }
            if phrase.bytes().any(|b| b.is_ascii_uppercase()) {
                return fail("command phrase must be lowercase");
            }
            if phrase.trim_ascii() != phrase {
                return fail("command phrase has surrounding whitespace");
            }
            if self.commands[..idx].iter().any(|b| b.phrase == binding.phrase) {
                return fail("duplicate command phrase");
            }
        }

        if self.poll_interval_ms == 0 {
            return fail("poll_interval_ms must be > 0");
        }
        if self.advertising_retry_polls == 0 {
            return fail("advertising_retry_polls must be > 0");
        }
        Ok(())
    }

    /// The configured phrase table.
    pub fn vocabulary(&self) -> Vocabulary {
        Vocabulary::new(self.commands.clone())
    }
}

fn is_printable_ascii(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' '
}
