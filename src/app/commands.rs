//! Control-channel command vocabulary.
//!
//! A controller writes short text phrases (`"light on"`, `"MOTOR OFF"`, …) to
//! the control characteristic.  [`Vocabulary::parse`] normalises the raw bytes
//! and resolves them to a [`Command`]: one actuator, one target level.
//!
//! ```text
//!  raw bytes ─▶ trim ─▶ bounded copy ─▶ ASCII lowercase ─▶ UTF-8 ─▶ table lookup
//!                 │           │                                │          │
//!               Blank      TooLong                          NotUtf8  UnknownPhrase
//! ```
//!
//! Parsing never allocates: the scratch buffer is a stack `heapless::Vec`
//! of [`MAX_COMMAND_LEN`] bytes, dropped on every return path.

use core::fmt;

use embedded_hal::digital::PinState;
use serde::{Deserialize, Serialize};

/// Longest phrase (after trimming) the dispatcher will copy.
pub const MAX_COMMAND_LEN: usize = 32;

/// Maximum number of phrase bindings in a vocabulary.
pub const MAX_PHRASES: usize = 8;

/// Fixed-capacity phrase text.
pub type Phrase = heapless::String<MAX_COMMAND_LEN>;

// ───────────────────────────────────────────────────────────────
// Actuator identity and level
// ───────────────────────────────────────────────────────────────

/// The two relay-driven outputs on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ActuatorId {
    Light = 0,
    Motor = 1,
}

impl ActuatorId {
    pub const COUNT: usize = 2;
    pub const ALL: [Self; Self::COUNT] = [Self::Light, Self::Motor];

    /// Human-readable name used in logs and confirmation replies.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Motor => "Motor",
        }
    }
}

/// Binary output level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Off,
    On,
}

impl Level {
    pub const fn is_on(self) -> bool {
        matches!(self, Self::On)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl From<bool> for Level {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

impl From<Level> for PinState {
    fn from(level: Level) -> Self {
        match level {
            Level::On => PinState::High,
            Level::Off => PinState::Low,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Commands and rejections
// ───────────────────────────────────────────────────────────────

/// A resolved command: drive `actuator` to `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    pub actuator: ActuatorId,
    pub level: Level,
}

/// Why a non-empty payload did not resolve to a [`Command`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Payload contained only whitespace.
    Blank,
    /// Trimmed payload (length carried) exceeds [`MAX_COMMAND_LEN`].
    TooLong(usize),
    /// Payload is not valid UTF-8.
    NotUtf8,
    /// Well-formed text that matches no phrase.
    UnknownPhrase,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => write!(f, "blank payload"),
            Self::TooLong(len) => write!(f, "payload too long ({len} > {MAX_COMMAND_LEN})"),
            Self::NotUtf8 => write!(f, "payload is not UTF-8"),
            Self::UnknownPhrase => write!(f, "unrecognized phrase"),
        }
    }
}

/// Result of [`Vocabulary::parse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Zero-length write. A no-op, not an error.
    Empty,
    Command(Command),
    Rejected(RejectReason),
}

// ───────────────────────────────────────────────────────────────
// Vocabulary
// ───────────────────────────────────────────────────────────────

/// One row of the phrase table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseBinding {
    /// Normalised phrase: lowercase, trimmed, printable ASCII.
    pub phrase: Phrase,
    pub actuator: ActuatorId,
    pub level: Level,
}

impl PhraseBinding {
    /// Returns `None` if `phrase` does not fit in [`MAX_COMMAND_LEN`].
    pub fn new(phrase: &str, actuator: ActuatorId, level: Level) -> Option<Self> {
        let mut text = Phrase::new();
        text.push_str(phrase).ok()?;
        Some(Self {
            phrase: text,
            actuator,
            level,
        })
    }

    pub fn command(&self) -> Command {
        Command {
            actuator: self.actuator,
            level: self.level,
        }
    }
}

/// The factory phrase table: `light on|off`, `motor on|off`.
pub fn default_bindings() -> heapless::Vec<PhraseBinding, MAX_PHRASES> {
    let mut table = heapless::Vec::new();
    for (phrase, actuator, level) in [
        ("light on", ActuatorId::Light, Level::On),
        ("light off", ActuatorId::Light, Level::Off),
        ("motor on", ActuatorId::Motor, Level::On),
        ("motor off", ActuatorId::Motor, Level::Off),
    ] {
        if let Some(binding) = PhraseBinding::new(phrase, actuator, level) {
            let pushed = table.push(binding).is_ok();
            debug_assert!(pushed, "default phrase table exceeds MAX_PHRASES");
        }
    }
    table
}

/// Exact-match phrase table.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    bindings: heapless::Vec<PhraseBinding, MAX_PHRASES>,
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::new(default_bindings())
    }
}

impl Vocabulary {
    pub fn new(bindings: heapless::Vec<PhraseBinding, MAX_PHRASES>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[PhraseBinding] {
        &self.bindings
    }

    /// Resolve an already-normalised phrase.
    pub fn lookup(&self, phrase: &str) -> Option<Command> {
        self.bindings
            .iter()
            .find(|b| b.phrase.as_str() == phrase)
            .map(PhraseBinding::command)
    }

    /// Normalise `raw` and resolve it against the table.
    ///
    /// Never reads past `raw.len()` and never copies more than
    /// [`MAX_COMMAND_LEN`] bytes.
    pub fn parse(&self, raw: &[u8]) -> ParseOutcome {
        if raw.is_empty() {
            return ParseOutcome::Empty;
        }

        let trimmed = raw.trim_ascii();
        if trimmed.is_empty() {
            return ParseOutcome::Rejected(RejectReason::Blank);
        }

        let mut scratch: heapless::Vec<u8, MAX_COMMAND_LEN> = heapless::Vec::new();
        if scratch.extend_from_slice(trimmed).is_err() {
            return ParseOutcome::Rejected(RejectReason::TooLong(trimmed.len()));
        }
        scratch.make_ascii_lowercase();

        let Ok(text) = core::str::from_utf8(&scratch) else {
            return ParseOutcome::Rejected(RejectReason::NotUtf8);
        };

        match self.lookup(text) {
            Some(cmd) => ParseOutcome::Command(cmd),
            None => ParseOutcome::Rejected(RejectReason::UnknownPhrase),
        }
    }
}
