//! Actuator abstraction: the only component that writes relay pins.
//!
//! Each [`ActuatorState`] binds an [`ActuatorId`] to a fixed GPIO and the
//! last level applied.  Writes are unconditional: setting the current level
//! again still issues a physical write, so a relay that was glitched by
//! noise is re-asserted by the next command.

use super::commands::{ActuatorId, Level};
use super::ports::OutputPort;

/// One relay output.  The pin is fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActuatorState {
    pub id: ActuatorId,
    pin: i32,
    pub level: Level,
}

impl ActuatorState {
    pub const fn new(id: ActuatorId, pin: i32) -> Self {
        Self {
            id,
            pin,
            level: Level::Off,
        }
    }

    pub const fn pin(&self) -> i32 {
        self.pin
    }
}

/// The light and motor outputs, indexed by `ActuatorId as usize`.
#[derive(Debug, Clone)]
pub struct Actuators {
    outputs: [ActuatorState; ActuatorId::COUNT],
}

impl Actuators {
    pub const fn new(light_pin: i32, motor_pin: i32) -> Self {
        Self {
            outputs: [
                ActuatorState::new(ActuatorId::Light, light_pin),
                ActuatorState::new(ActuatorId::Motor, motor_pin),
            ],
        }
    }

    /// Drive every output LOW so hardware and model agree at boot.
    pub fn init(&mut self, out: &mut impl OutputPort) {
        for state in &mut self.outputs {
            state.level = Level::Off;
            out.write_digital(state.pin, Level::Off.into());
        }
    }

    /// Record `level` for `id`, then write the pin.
    pub fn set_level(&mut self, id: ActuatorId, level: Level, out: &mut impl OutputPort) {
        let state = &mut self.outputs[id as usize];
        state.level = level;
        out.write_digital(state.pin, level.into());
    }

    pub fn level(&self, id: ActuatorId) -> Level {
        self.outputs[id as usize].level
    }

    pub fn state(&self, id: ActuatorId) -> &ActuatorState {
        &self.outputs[id as usize]
    }
}
