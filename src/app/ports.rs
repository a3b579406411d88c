//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppService (domain)
//! ```
//!
//! Driven adapters (radio, relay outputs, event sinks) implement these
//! traits.  The [`AppService`](super::service::AppService) consumes them via
//! generics, so the domain core never touches hardware directly.

use embedded_hal::digital::PinState;

use crate::error::RadioError;

// ───────────────────────────────────────────────────────────────
// Radio port (driven adapter: domain → BLE stack)
// ───────────────────────────────────────────────────────────────

/// Advertising control and notifications on the control characteristic.
pub trait RadioPort {
    /// (Re)start connectable advertising.
    fn start_advertising(&mut self) -> Result<(), RadioError>;

    /// Stop advertising.  Best-effort; a stack that already stopped on
    /// connect treats this as a no-op.
    fn stop_advertising(&mut self);

    /// Notify the connected controller with `payload`.
    fn notify(&mut self, payload: &[u8]) -> Result<(), RadioError>;
}

// ───────────────────────────────────────────────────────────────
// Output port (driven adapter: domain → GPIO)
// ───────────────────────────────────────────────────────────────

/// Digital output capability.  Infallible from the domain's point of view:
/// a driver failure is the adapter's to log.
pub trait OutputPort {
    fn write_digital(&mut self, gpio: i32, state: PinState);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Best-effort: sinks must not fail the caller.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
