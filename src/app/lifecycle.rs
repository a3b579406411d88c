//! Connection lifecycle manager.
//!
//! Owns the link state machine and the advertising status, and is the only
//! caller of [`RadioPort::start_advertising`] / [`RadioPort::stop_advertising`].
//!
//! ```text
//!  RadioEvent ──▶ Fsm::handle ──▶ ctx.commands.advertise ──▶ RadioPort
//!  poll()     ──▶ Fsm::tick   ──┘
//! ```
//!
//! A refused advertising start leaves `advertising == false`; the
//! DISCONNECTED handler re-requests it every `retry_every` polls until the
//! radio accepts.

use log::warn;

use super::events::AppEvent;
use super::ports::{EventSink, RadioPort};
use crate::error::RadioError;
use crate::fsm::context::{AdvertiseRequest, LinkContext, LinkEvent};
use crate::fsm::{Fsm, LinkState, states};

/// Externally visible link status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    pub connected: bool,
    pub advertising: bool,
}

pub struct LifecycleManager {
    fsm: Fsm,
    ctx: LinkContext,
}

impl LifecycleManager {
    pub fn new(advertising_retry_polls: u32) -> Self {
        Self {
            fsm: Fsm::new(states::build_state_table(), LinkState::Disconnected),
            ctx: LinkContext::new(advertising_retry_polls),
        }
    }

    /// Enter DISCONNECTED and begin advertising.
    pub fn start(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.fsm.start(&mut self.ctx);
        self.apply(radio, sink);
    }

    pub fn on_connect(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.step(LinkEvent::Connect, radio, sink);
    }

    /// Mark disconnected and resume advertising before returning.
    pub fn on_disconnect(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.step(LinkEvent::Disconnect, radio, sink);
    }

    /// The stack reported that an advertising start did not take effect.
    pub fn on_advertising_failed(&mut self, code: i32, sink: &mut impl EventSink) {
        if self.fsm.current_state() == LinkState::Connected {
            warn!("Lifecycle: advertising failure (rc={code}) reported while connected, ignored");
            return;
        }
        self.ctx.advertising = false;
        self.ctx.polls_since_attempt = 0;
        sink.emit(&AppEvent::AdvertisingFailed(RadioError::AdvertisingFailed(code)));
    }

    /// One main-loop poll: advance retry bookkeeping and step the FSM.
    pub fn poll(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.ctx.polls_since_attempt = self.ctx.polls_since_attempt.saturating_add(1);
        self.fsm.tick(&mut self.ctx);
        self.apply(radio, sink);
    }

    pub fn connection(&self) -> ConnectionState {
        ConnectionState {
            connected: self.is_connected(),
            advertising: self.ctx.advertising,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.fsm.current_state() == LinkState::Connected
    }

    pub fn link_state(&self) -> LinkState {
        self.fsm.current_state()
    }

    /// Connections accepted since boot.
    pub fn sessions(&self) -> u32 {
        self.ctx.sessions
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    fn step(&mut self, event: LinkEvent, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        let from = self.fsm.current_state();
        self.fsm.handle(event, &mut self.ctx);
        let to = self.fsm.current_state();
        if from != to {
            sink.emit(&AppEvent::LinkChanged { from, to });
        }
        self.apply(radio, sink);
    }

    fn apply(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        match self.ctx.take_request() {
            Some(AdvertiseRequest::Start) => {
                self.ctx.polls_since_attempt = 0;
                match radio.start_advertising() {
                    Ok(()) => {
                        self.ctx.advertising = true;
                        sink.emit(&AppEvent::AdvertisingStarted);
                    }
                    Err(e) => {
                        self.ctx.advertising = false;
                        sink.emit(&AppEvent::AdvertisingFailed(e));
                    }
                }
            }
            Some(AdvertiseRequest::Stop) => {
                radio.stop_advertising();
                self.ctx.advertising = false;
            }
            None => {}
        }
    }
}
