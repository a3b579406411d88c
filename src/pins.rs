//! GPIO assignments for the relay board.
//!
//! Single source of truth for the default pin map.  [`RelayConfig`] copies
//! these at construction; the rest of the firmware only sees the configured
//! values.
//!
//! [`RelayConfig`]: crate::config::RelayConfig

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, driven LOW at boot)
// ---------------------------------------------------------------------------

/// Light relay (D5 on the DevKit silkscreen).
pub const LIGHT_RELAY_GPIO: i32 = 5;
/// Motor relay (D23 on the DevKit silkscreen).
pub const MOTOR_RELAY_GPIO: i32 = 23;

// ---------------------------------------------------------------------------
// Output-capable range
// ---------------------------------------------------------------------------

/// Highest ESP32 GPIO that can drive an output.  GPIO 34–39 are input-only.
pub const MAX_OUTPUT_GPIO: i32 = 33;

/// GPIO 6–11 are wired to the SPI flash on WROOM/WROVER modules.
pub const FLASH_GPIO_RANGE: core::ops::RangeInclusive<i32> = 6..=11;

/// Returns `true` if `gpio` may be configured as a relay output.
pub fn is_output_capable(gpio: i32) -> bool {
    (0..=MAX_OUTPUT_GPIO).contains(&gpio) && !FLASH_GPIO_RANGE.contains(&gpio)
}
