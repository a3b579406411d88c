//! Unified error types for the VoiceRelay firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! boot path's error handling uniform.  All variants are `Copy` so they can
//! be carried inside [`AppEvent`](crate::app::events::AppEvent)s and radio
//! events without allocation.
//!
//! Nothing on the control channel is fatal: command-level problems are
//! classified by [`RejectReason`](crate::app::commands::RejectReason) and
//! absorbed by the dispatcher.  The types here cover the radio port,
//! configuration and one-shot initialisation only.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible boot or port operation funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The radio stack rejected a request.
    Radio(RadioError),
    /// Configuration is invalid or could not be parsed.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Radio(e) => write!(f, "radio: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Radio errors
// ---------------------------------------------------------------------------

/// Failures reported by a [`RadioPort`](crate::app::ports::RadioPort).
///
/// The `i32` payloads carry the raw `esp_err_t` / GATT status code so the
/// log line is actionable on real hardware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RadioError {
    /// Controller / host stack bring-up failed.
    StackInitFailed(i32),
    /// The stack refused to (re)start advertising.
    AdvertisingFailed(i32),
    /// A notification could not be queued.
    NotifyFailed(i32),
    /// No controller is connected (nothing to notify).
    NotConnected,
    /// Payload exceeds the attribute value limit.
    PayloadTooLong,
}

impl fmt::Display for RadioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StackInitFailed(rc) => write!(f, "BLE stack init failed (rc={rc})"),
            Self::AdvertisingFailed(rc) => write!(f, "advertising start failed (rc={rc})"),
            Self::NotifyFailed(rc) => write!(f, "notify failed (rc={rc})"),
            Self::NotConnected => write!(f, "no controller connected"),
            Self::PayloadTooLong => write!(f, "payload exceeds attribute length"),
        }
    }
}

impl From<RadioError> for Error {
    fn from(e: RadioError) -> Self {
        Self::Radio(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid JSON for [`RelayConfig`](crate::config::RelayConfig).
    Malformed,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed config document"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
