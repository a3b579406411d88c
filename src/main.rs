//! VoiceRelay Firmware: Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │   BleAdapter        RelayBank             LogEventSink         │
//! │   (RadioPort)       (OutputPort)          (EventSink)          │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Lifecycle FSM · Dispatcher · Actuators                │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Bluedroid task ──▶ RADIO_EVENTS ──▶ main loop (this file)     │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use log::info;

use voicerelay::adapters::ble::BleAdapter;
use voicerelay::adapters::log_sink::LogEventSink;
use voicerelay::adapters::relays::RelayBank;
use voicerelay::app::service::AppService;
use voicerelay::config::RelayConfig;
use voicerelay::events::RADIO_EVENTS;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VoiceRelay v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (build-time override or defaults) ────
    let config = RelayConfig::from_override(option_env!("VOICERELAY_CONFIG_JSON"));
    info!(
        "Config: name='{}' service={} light=GPIO{} motor=GPIO{} reply={:?} phrases={}",
        config.device_name,
        config.service_uuid.hyphenated(),
        config.light_pin,
        config.motor_pin,
        config.reply_mode,
        config.commands.len()
    );

    // ── 3. Relay outputs ──────────────────────────────────────
    let mut relays = RelayBank::new();
    for gpio in [config.light_pin, config.motor_pin] {
        // SAFETY: both GPIOs were validated as distinct, output-capable pins
        // and nothing else in the firmware claims them.
        let pin = PinDriver::output(unsafe { AnyOutputPin::new(gpio) })?;
        relays.attach(gpio, pin)?;
    }

    // ── 4. Radio ──────────────────────────────────────────────
    let mut radio = BleAdapter::new(&config);
    radio.init()?;

    // ── 5. Application core ───────────────────────────────────
    let mut sink = LogEventSink::new();
    let mut app = AppService::new(&config);
    app.start(&mut radio, &mut relays, &mut sink);

    // ── 6. Event loop ─────────────────────────────────────────
    loop {
        app.run_queue(&RADIO_EVENTS, &mut radio, &mut relays, &mut sink);
        app.poll(&mut radio, &mut sink);
        FreeRtos::delay_ms(config.poll_interval_ms);
    }
}
