//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                      |
//! |------------|--------------|----------------------------------|
//! | `ble`      | RadioPort    | Bluedroid GATT server            |
//! | `relays`   | OutputPort   | embedded-hal output pins (GPIO)  |
//! | `log_sink` | EventSink    | Serial log output                |

pub mod ble;
pub mod log_sink;
pub mod relays;
