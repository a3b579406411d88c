//! Relay output adapter.
//!
//! Implements [`OutputPort`] over any set of `embedded_hal` output pins
//! keyed by GPIO number.  On the device the pins are
//! `esp_idf_hal::gpio::PinDriver<AnyOutputPin, Output>`; tests plug in
//! fakes.  A driver error is logged with its [`ErrorKind`] and swallowed:
//! the domain treats pin writes as infallible.
//!
//! [`ErrorKind`]: embedded_hal::digital::ErrorKind

use embedded_hal::digital::{Error as _, OutputPin, PinState};
use log::{error, warn};

use crate::app::ports::OutputPort;

/// Maximum number of relay outputs a bank can hold.
pub const MAX_RELAYS: usize = 4;

/// Fixed-capacity map from GPIO number to output pin.
pub struct RelayBank<P: OutputPin> {
    pins: heapless::Vec<(i32, P), MAX_RELAYS>,
}

impl<P: OutputPin> RelayBank<P> {
    pub fn new() -> Self {
        Self {
            pins: heapless::Vec::new(),
        }
    }

    /// Bind `pin` to `gpio`.  Fails if the GPIO is already bound or the
    /// bank is full.
    pub fn attach(&mut self, gpio: i32, pin: P) -> crate::error::Result<()> {
        if self.pins.iter().any(|(g, _)| *g == gpio) {
            return Err(crate::error::Error::Init("relay GPIO bound twice"));
        }
        self.pins
            .push((gpio, pin))
            .map_err(|_| crate::error::Error::Init("relay bank full"))
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }
}

impl<P: OutputPin> Default for RelayBank<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: OutputPin> OutputPort for RelayBank<P> {
    fn write_digital(&mut self, gpio: i32, state: PinState) {
        let Some((_, pin)) = self.pins.iter_mut().find(|(g, _)| *g == gpio) else {
            warn!("Relay: write to unbound GPIO {}", gpio);
            return;
        };
        if let Err(e) = pin.set_state(state) {
            error!("Relay: GPIO {} write failed ({:?})", gpio, e.kind());
        }
    }
}
