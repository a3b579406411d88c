//! Fuzz target: `AppService::handle_event` / `poll`
//!
//! Decodes the input into a stream of radio events and polls, runs them
//! through the service with no-op ports, and checks that a connected link
//! is never left advertising.
//!
//! cargo fuzz run fuzz_event_stream

#![no_main]

use embedded_hal::digital::PinState;
use libfuzzer_sys::fuzz_target;
use voicerelay::app::events::AppEvent;
use voicerelay::app::ports::{EventSink, OutputPort, RadioPort};
use voicerelay::app::service::AppService;
use voicerelay::config::RelayConfig;
use voicerelay::error::RadioError;
use voicerelay::events::RadioEvent;

struct Radio(u8);

impl RadioPort for Radio {
    fn start_advertising(&mut self) -> Result<(), RadioError> {
        // Refuse every fourth start.
        self.0 = self.0.wrapping_add(1);
        if self.0 % 4 == 0 {
            return Err(RadioError::AdvertisingFailed(-1));
        }
        Ok(())
    }
    fn stop_advertising(&mut self) {}
    fn notify(&mut self, _payload: &[u8]) -> Result<(), RadioError> {
        Ok(())
    }
}

struct Pins;

impl OutputPort for Pins {
    fn write_digital(&mut self, _gpio: i32, _state: PinState) {}
}

struct Discard;

impl EventSink for Discard {
    fn emit(&mut self, _event: &AppEvent) {}
}

fuzz_target!(|data: &[u8]| {
    let mut app = AppService::new(&RelayConfig::default());
    let mut radio = Radio(0);
    app.start(&mut radio, &mut Pins, &mut Discard);

    // Each op is one tag byte; writes take a length byte and a payload.
    let mut rest = data;
    while let Some((&tag, tail)) = rest.split_first() {
        rest = tail;
        let event = match tag % 5 {
            0 => RadioEvent::Connected,
            1 => RadioEvent::Disconnected,
            2 => RadioEvent::AdvertisingFailed(i32::from(tag)),
            3 => {
                let Some((&len, tail)) = rest.split_first() else { break };
                let n = usize::from(len).min(tail.len());
                let (payload, tail) = tail.split_at(n);
                rest = tail;
                RadioEvent::control_write(payload)
            }
            _ => {
                app.poll(&mut radio, &mut Discard);
                continue;
            }
        };
        app.handle_event(&event, &mut radio, &mut Pins, &mut Discard);

        let link = app.connection();
        assert!(!(link.connected && link.advertising));
    }
});
