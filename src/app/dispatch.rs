//! Command dispatcher.
//!
//! Turns one control-channel payload into at most one actuator transition.
//! Nothing here is fatal: every malformed payload is classified, reported
//! through the [`EventSink`] and absorbed.

use super::actuators::Actuators;
use super::commands::{Command, ParseOutcome, RejectReason, Vocabulary};
use super::events::AppEvent;
use super::ports::{EventSink, OutputPort};

/// What a single dispatch did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Zero-length payload; nothing happened.
    Empty,
    /// The command was applied to its actuator.
    Applied(Command),
    /// The payload was rejected; no actuator changed.
    Rejected(RejectReason),
}

pub struct Dispatcher {
    vocabulary: Vocabulary,
}

impl Dispatcher {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn dispatch(
        &self,
        raw: &[u8],
        actuators: &mut Actuators,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> DispatchOutcome {
        match self.vocabulary.parse(raw) {
            ParseOutcome::Empty => {
                sink.emit(&AppEvent::EmptyWrite);
                DispatchOutcome::Empty
            }
            ParseOutcome::Command(cmd) => {
                actuators.set_level(cmd.actuator, cmd.level, out);
                sink.emit(&AppEvent::ActuatorSet {
                    id: cmd.actuator,
                    level: cmd.level,
                });
                DispatchOutcome::Applied(cmd)
            }
            ParseOutcome::Rejected(reason) => {
                sink.emit(&AppEvent::CommandRejected(reason));
                DispatchOutcome::Rejected(reason)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}
