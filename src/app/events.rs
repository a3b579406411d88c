//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them.

use super::commands::{ActuatorId, Level, RejectReason};
use crate::error::RadioError;
use crate::fsm::LinkState;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// The service has started (carries initial link state).
    Started(LinkState),

    /// The link state machine transitioned.
    LinkChanged { from: LinkState, to: LinkState },

    /// The radio accepted an advertising start.
    AdvertisingStarted,

    /// The radio refused to advertise; a retry is scheduled.
    AdvertisingFailed(RadioError),

    /// An actuator was driven to a level.
    ActuatorSet { id: ActuatorId, level: Level },

    /// A zero-length write arrived (no-op).
    EmptyWrite,

    /// A write did not resolve to a command.
    CommandRejected(RejectReason),

    /// A write arrived with no controller connected and was dropped.
    WriteWhileDisconnected,

    /// A confirmation reply could not be delivered.
    ReplyFailed(RadioError),
}
