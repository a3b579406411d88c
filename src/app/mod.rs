//! Application core: pure domain logic, zero I/O.
//!
//! Link lifecycle, command parsing and dispatch, and actuator state for the
//! relay controller.  All interaction with hardware happens through **port
//! traits** defined in [`ports`], keeping this layer fully testable without
//! real peripherals.

pub mod actuators;
pub mod commands;
pub mod dispatch;
pub mod events;
pub mod lifecycle;
pub mod ports;
pub mod service;
