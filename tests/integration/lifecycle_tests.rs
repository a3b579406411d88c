//! Integration tests for the connection lifecycle: advertising, connect,
//! disconnect and advertising-failure recovery through `AppService`.

use super::mock_hw::{MockOutputs, MockRadio, RadioCall, RecordingSink};

use voicerelay::app::events::AppEvent;
use voicerelay::app::lifecycle::ConnectionState;
use voicerelay::app::service::AppService;
use voicerelay::config::RelayConfig;
use voicerelay::error::RadioError;
use voicerelay::events::RadioEvent;
use voicerelay::fsm::LinkState;

struct Rig {
    app: AppService,
    radio: MockRadio,
    out: MockOutputs,
    sink: RecordingSink,
}

impl Rig {
    fn with(config: &RelayConfig, radio: MockRadio) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            radio,
            out: MockOutputs::new(),
            sink: RecordingSink::new(),
        };
        rig.app.start(&mut rig.radio, &mut rig.out, &mut rig.sink);
        rig
    }

    fn new() -> Self {
        Self::with(&RelayConfig::default(), MockRadio::new())
    }

    fn event(&mut self, event: RadioEvent) {
        self.app
            .handle_event(&event, &mut self.radio, &mut self.out, &mut self.sink);
    }

    fn poll(&mut self, n: u32) {
        for _ in 0..n {
            self.app.poll(&mut self.radio, &mut self.sink);
        }
    }
}

const ADVERTISING: ConnectionState = ConnectionState {
    connected: false,
    advertising: true,
};
const CONNECTED: ConnectionState = ConnectionState {
    connected: true,
    advertising: false,
};

#[test]
fn boots_disconnected_and_advertising() {
    let rig = Rig::new();
    assert_eq!(rig.app.link_state(), LinkState::Disconnected);
    assert_eq!(rig.app.connection(), ADVERTISING);
    assert_eq!(rig.radio.calls, vec![RadioCall::StartAdvertising]);
    assert!(rig.sink.contains(&AppEvent::Started(LinkState::Disconnected)));
    assert!(rig.sink.contains(&AppEvent::AdvertisingStarted));
}

#[test]
fn connect_stops_advertising() {
    let mut rig = Rig::new();
    rig.radio.clear();
    rig.event(RadioEvent::Connected);

    assert_eq!(rig.app.connection(), CONNECTED);
    assert_eq!(rig.radio.calls, vec![RadioCall::StopAdvertising]);
    assert!(rig.sink.contains(&AppEvent::LinkChanged {
        from: LinkState::Disconnected,
        to: LinkState::Connected,
    }));
    assert_eq!(rig.app.sessions(), 1);
}

#[test]
fn disconnect_resumes_advertising_before_returning() {
    let mut rig = Rig::new();
    rig.event(RadioEvent::Connected);
    rig.radio.clear();

    rig.event(RadioEvent::Disconnected);

    assert_eq!(rig.app.connection(), ADVERTISING);
    assert_eq!(rig.radio.calls, vec![RadioCall::StartAdvertising]);
}

#[test]
fn reconnect_without_power_cycle() {
    let mut rig = Rig::new();
    for _ in 0..3 {
        rig.event(RadioEvent::Connected);
        assert_eq!(rig.app.connection(), CONNECTED);
        rig.event(RadioEvent::Disconnected);
        assert_eq!(rig.app.connection(), ADVERTISING);
    }
    assert_eq!(rig.app.sessions(), 3);
    assert_eq!(rig.radio.advertising_starts(), 4);
}

#[test]
fn spurious_events_are_ignored() {
    let mut rig = Rig::new();
    rig.radio.clear();

    rig.event(RadioEvent::Disconnected);
    assert_eq!(rig.app.connection(), ADVERTISING);
    assert!(rig.radio.calls.is_empty());

    rig.event(RadioEvent::Connected);
    rig.event(RadioEvent::Connected);
    assert_eq!(rig.app.connection(), CONNECTED);
    assert_eq!(rig.app.sessions(), 1);
}

#[test]
fn refused_advertising_is_retried_from_poll() {
    let config = RelayConfig {
        advertising_retry_polls: 5,
        ..RelayConfig::default()
    };
    let radio = MockRadio {
        fail_starts: 2,
        ..MockRadio::new()
    };
    let mut rig = Rig::with(&config, radio);

    assert_eq!(
        rig.app.connection(),
        ConnectionState {
            connected: false,
            advertising: false
        }
    );
    assert!(rig
        .sink
        .contains(&AppEvent::AdvertisingFailed(RadioError::AdvertisingFailed(-1))));

    rig.poll(4);
    assert_eq!(rig.radio.advertising_starts(), 1);
    rig.poll(1);
    assert_eq!(rig.radio.advertising_starts(), 2);
    assert!(!rig.app.connection().advertising);

    rig.poll(5);
    assert_eq!(rig.radio.advertising_starts(), 3);
    assert_eq!(rig.app.connection(), ADVERTISING);

    // Once advertising, polls stop retrying.
    rig.poll(20);
    assert_eq!(rig.radio.advertising_starts(), 3);
}

#[test]
fn async_advertising_failure_is_retried() {
    let config = RelayConfig {
        advertising_retry_polls: 3,
        ..RelayConfig::default()
    };
    let mut rig = Rig::with(&config, MockRadio::new());
    rig.event(RadioEvent::AdvertisingFailed(0x13));
    assert!(!rig.app.connection().advertising);

    rig.poll(3);
    assert_eq!(rig.radio.advertising_starts(), 2);
    assert_eq!(rig.app.connection(), ADVERTISING);
}

#[test]
fn failed_restart_after_disconnect_is_retried() {
    let config = RelayConfig {
        advertising_retry_polls: 2,
        ..RelayConfig::default()
    };
    let mut rig = Rig::with(&config, MockRadio::new());
    rig.event(RadioEvent::Connected);
    rig.radio.fail_starts = 1;
    rig.event(RadioEvent::Disconnected);
    assert!(!rig.app.connection().connected);
    assert!(!rig.app.connection().advertising);

    rig.poll(2);
    assert_eq!(rig.app.connection(), ADVERTISING);
}

#[test]
fn no_retries_while_connected() {
    let config = RelayConfig {
        advertising_retry_polls: 1,
        ..RelayConfig::default()
    };
    let mut rig = Rig::with(&config, MockRadio::new());
    rig.event(RadioEvent::Connected);
    rig.radio.clear();
    rig.poll(10);
    assert!(rig.radio.calls.is_empty());
}
