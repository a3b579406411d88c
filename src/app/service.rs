//! Application service, the hexagonal core.
//!
//! [`AppService`] owns the lifecycle manager, dispatcher and actuator
//! state.  It exposes a clean, hardware-agnostic API.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  RadioEvent ──▶ ┌─────────────────────────────┐ ──▶ EventSink
//!                 │         AppService          │
//!  RadioPort  ◀── │ Lifecycle · Dispatch · Acts │ ──▶ OutputPort
//!                 └─────────────────────────────┘
//! ```

use core::fmt::Write as _;

use log::{info, warn};

use crate::config::{RelayConfig, ReplyMode};
use crate::events::{EventQueue, RadioEvent};
use crate::fsm::LinkState;

use super::actuators::Actuators;
use super::commands::{ActuatorId, Level};
use super::dispatch::{DispatchOutcome, Dispatcher};
use super::events::AppEvent;
use super::lifecycle::{ConnectionState, LifecycleManager};
use super::ports::{EventSink, OutputPort, RadioPort};

/// Reply sent in confirm mode when a write is rejected.
pub const INVALID_REPLY: &str = "invalid command";

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all domain logic.
pub struct AppService {
    lifecycle: LifecycleManager,
    dispatcher: Dispatcher,
    actuators: Actuators,
    reply_mode: ReplyMode,
}

impl AppService {
    /// Construct the service from configuration.
    ///
    /// Touches no hardware. Call [`start`](Self::start) next.
    pub fn new(config: &RelayConfig) -> Self {
        Self {
            lifecycle: LifecycleManager::new(config.advertising_retry_polls),
            dispatcher: Dispatcher::new(config.vocabulary()),
            actuators: Actuators::new(config.light_pin, config.motor_pin),
            reply_mode: config.reply_mode,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Drive all outputs LOW, then enter DISCONNECTED and advertise.
    pub fn start(
        &mut self,
        radio: &mut impl RadioPort,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        self.actuators.init(out);
        self.lifecycle.start(radio, sink);
        sink.emit(&AppEvent::Started(self.lifecycle.link_state()));
        info!("AppService started in {:?}", self.lifecycle.link_state());
    }

    // ── Event handling ────────────────────────────────────────

    /// Handle one radio event to completion.
    pub fn handle_event(
        &mut self,
        event: &RadioEvent,
        radio: &mut impl RadioPort,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        match event {
            RadioEvent::Connected => self.lifecycle.on_connect(radio, sink),
            RadioEvent::Disconnected => self.lifecycle.on_disconnect(radio, sink),
            RadioEvent::ControlWrite(bytes) => {
                self.on_control_write(bytes, radio, out, sink);
            }
            RadioEvent::AdvertisingFailed(code) => {
                self.lifecycle.on_advertising_failed(*code, sink);
            }
        }
    }

    /// Handle every queued event in FIFO order, then apply the latest link
    /// level if a connect or disconnect did not fit in the queue.
    pub fn run_queue(
        &mut self,
        queue: &EventQueue,
        radio: &mut impl RadioPort,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) {
        queue.drain(|event| self.handle_event(&event, radio, out, sink));
        if let Some(up) = queue.take_link() {
            self.reconcile_link(up, radio, sink);
        }
    }

    /// Bring the lifecycle in line with the radio's reported link level.
    pub fn reconcile_link(
        &mut self,
        connected: bool,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) {
        if connected == self.lifecycle.is_connected() {
            return;
        }
        warn!("Link event lost in queue, reconciling to connected={connected}");
        if connected {
            self.lifecycle.on_connect(radio, sink);
        } else {
            self.lifecycle.on_disconnect(radio, sink);
        }
    }

    /// Dispatch a control-channel payload.  Writes with no controller
    /// connected are dropped without touching any actuator.
    pub fn on_control_write(
        &mut self,
        bytes: &[u8],
        radio: &mut impl RadioPort,
        out: &mut impl OutputPort,
        sink: &mut impl EventSink,
    ) -> Option<DispatchOutcome> {
        if !self.lifecycle.is_connected() {
            warn!("Control write ({} bytes) with no controller connected, dropped", bytes.len());
            sink.emit(&AppEvent::WriteWhileDisconnected);
            return None;
        }

        let outcome = self
            .dispatcher
            .dispatch(bytes, &mut self.actuators, out, sink);
        if self.reply_mode == ReplyMode::Confirm {
            self.reply(outcome, radio, sink);
        }
        Some(outcome)
    }

    /// One main-loop poll.  Drives advertising retries.
    pub fn poll(&mut self, radio: &mut impl RadioPort, sink: &mut impl EventSink) {
        self.lifecycle.poll(radio, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn connection(&self) -> ConnectionState {
        self.lifecycle.connection()
    }

    pub fn link_state(&self) -> LinkState {
        self.lifecycle.link_state()
    }

    pub fn level(&self, id: ActuatorId) -> Level {
        self.actuators.level(id)
    }

    pub fn sessions(&self) -> u32 {
        self.lifecycle.sessions()
    }

    // ── Internal ──────────────────────────────────────────────

    fn reply(
        &self,
        outcome: DispatchOutcome,
        radio: &mut impl RadioPort,
        sink: &mut impl EventSink,
    ) {
        let mut text: heapless::String<32> = heapless::String::new();
        match outcome {
            DispatchOutcome::Empty => return,
            DispatchOutcome::Applied(cmd) => {
                let _ = write!(text, "{} turned {}", cmd.actuator.label(), cmd.level.label());
            }
            DispatchOutcome::Rejected(_) => {
                let _ = text.push_str(INVALID_REPLY);
            }
        }
        if let Err(e) = radio.notify(text.as_bytes()) {
            sink.emit(&AppEvent::ReplyFailed(e));
        }
    }
}
