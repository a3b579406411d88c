//! Radio event queue.
//!
//! Bluedroid delivers GAP/GATTS callbacks on the Bluetooth task, not on the
//! main loop.  Callbacks only copy what they need into a [`RadioEvent`] and
//! push it here; the main loop drains the queue in FIFO order and is the
//! sole owner of connection and actuator state.
//!
//! Link changes are also latched in a [`Signal`] holding the most recent
//! connect/disconnect, so a burst of writes that fills the channel can never
//! hide a disconnect from the main loop.
//!
//! ```text
//! ┌──────────────┐  RadioEvent  ┌──────────────┐
//! │  BT task     │────────────▶│  Main Loop    │
//! │  (callbacks) │   bounded    │  (consumer)   │
//! └──────────────┘   channel    └──────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use heapless::Vec;

/// ATT maximum attribute value length.  Longer writes are truncated by the
/// stack before they reach the callback.
pub const MAX_WRITE_LEN: usize = 512;

/// Maximum number of pending radio events.
pub const EVENT_QUEUE_CAP: usize = 8;

/// Events delivered by the radio stack to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RadioEvent {
    /// A controller connected.
    Connected,
    /// The controller disconnected (or the link dropped).
    Disconnected,
    /// Bytes written to the control characteristic.
    ControlWrite(Vec<u8, MAX_WRITE_LEN>),
    /// The stack reported an advertising start failure (status code).
    AdvertisingFailed(i32),
}

impl RadioEvent {
    /// Build a `ControlWrite`, truncating to [`MAX_WRITE_LEN`].
    pub fn control_write(bytes: &[u8]) -> Self {
        let len = bytes.len().min(MAX_WRITE_LEN);
        let mut payload = Vec::new();
        // Cannot fail: length clamped to capacity above.
        let _ = payload.extend_from_slice(&bytes[..len]);
        Self::ControlWrite(payload)
    }
}

impl RadioEvent {
    /// Link level carried by `Connected` / `Disconnected`.
    pub fn link_level(&self) -> Option<bool> {
        match self {
            Self::Connected => Some(true),
            Self::Disconnected => Some(false),
            Self::ControlWrite(_) | Self::AdvertisingFailed(_) => None,
        }
    }
}

/// Bounded multi-producer queue of [`RadioEvent`]s, safe to share between
/// the Bluetooth task and the main loop.
pub struct EventQueue {
    channel: Channel<CriticalSectionRawMutex, RadioEvent, EVENT_QUEUE_CAP>,
    /// Latest link level pushed since the last [`take_link`](Self::take_link).
    link: Signal<CriticalSectionRawMutex, bool>,
}

impl EventQueue {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            link: Signal::new(),
        }
    }

    /// Push an event without blocking.
    /// Returns `false` if the queue is full (event dropped).  A dropped
    /// `Connected` / `Disconnected` is still visible through
    /// [`take_link`](Self::take_link).
    pub fn push(&self, event: RadioEvent) -> bool {
        if let Some(up) = event.link_level() {
            self.link.signal(up);
        }
        self.channel.try_send(event).is_ok()
    }

    /// Latest link level pushed since the previous call, if any.  Read it
    /// after [`drain`](Self::drain) so it is never older than the events
    /// already handled.
    pub fn take_link(&self) -> Option<bool> {
        self.link.try_take()
    }

    /// Pop the next event, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<RadioEvent> {
        self.channel.try_receive().ok()
    }

    /// Drain all pending events into `handler` in FIFO order.
    pub fn drain(&self, mut handler: impl FnMut(RadioEvent)) {
        while let Some(event) = self.pop() {
            handler(event);
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue fed by the Bluedroid callbacks in [`crate::adapters::ble`].
pub static RADIO_EVENTS: EventQueue = EventQueue::new();
