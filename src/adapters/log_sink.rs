//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (UART in production) as `TAG | key=value` lines.

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(state) => {
                info!("START | initial_state={:?}", state);
            }
            AppEvent::LinkChanged { from, to } => {
                info!("LINK | {:?} -> {:?}", from, to);
            }
            AppEvent::AdvertisingStarted => {
                info!("ADV | started");
            }
            AppEvent::AdvertisingFailed(e) => {
                warn!("ADV | failed, retry scheduled | {}", e);
            }
            AppEvent::ActuatorSet { id, level } => {
                info!("ACT | {} turned {}", id.label(), level.label());
            }
            AppEvent::EmptyWrite => {
                info!("CMD | empty write ignored");
            }
            AppEvent::CommandRejected(reason) => {
                warn!("CMD | unrecognized command | reason={}", reason);
            }
            AppEvent::WriteWhileDisconnected => {
                warn!("CMD | write with no controller connected, dropped");
            }
            AppEvent::ReplyFailed(e) => {
                warn!("REPLY | not delivered | {}", e);
            }
        }
    }
}
