//! End-to-end scenarios driven the way the firmware main loop drives the
//! core: radio events pushed into an `EventQueue`, drained in FIFO order,
//! followed by a poll.

use embedded_hal::digital::PinState;

use super::mock_hw::{MockOutputs, MockRadio, RadioCall, RecordingSink};

use voicerelay::app::commands::{ActuatorId, Level};
use voicerelay::app::events::AppEvent;
use voicerelay::app::lifecycle::ConnectionState;
use voicerelay::app::service::AppService;
use voicerelay::config::RelayConfig;
use voicerelay::events::{EVENT_QUEUE_CAP, EventQueue, RadioEvent};
use voicerelay::fsm::LinkState;
use voicerelay::pins::{LIGHT_RELAY_GPIO, MOTOR_RELAY_GPIO};

struct Firmware {
    queue: EventQueue,
    app: AppService,
    radio: MockRadio,
    out: MockOutputs,
    sink: RecordingSink,
}

impl Firmware {
    fn boot(config: &RelayConfig) -> Self {
        let mut fw = Self {
            queue: EventQueue::new(),
            app: AppService::new(config),
            radio: MockRadio::new(),
            out: MockOutputs::new(),
            sink: RecordingSink::new(),
        };
        fw.app.start(&mut fw.radio, &mut fw.out, &mut fw.sink);
        fw
    }

    fn push(&self, event: RadioEvent) {
        assert!(self.queue.push(event), "event queue full");
    }

    fn write(&self, payload: &[u8]) {
        self.push(RadioEvent::control_write(payload));
    }

    /// One main-loop iteration.
    fn run_once(&mut self) {
        self.app
            .run_queue(&self.queue, &mut self.radio, &mut self.out, &mut self.sink);
        self.app.poll(&mut self.radio, &mut self.sink);
    }

    /// Fill every free queue slot with a control write.
    fn flood(&self, payload: &[u8]) {
        while self.queue.push(RadioEvent::control_write(payload)) {}
    }

    fn levels(&self) -> (Level, Level) {
        (
            self.app.level(ActuatorId::Light),
            self.app.level(ActuatorId::Motor),
        )
    }
}

#[test]
fn boot_drives_relays_low() {
    let fw = Firmware::boot(&RelayConfig::default());
    assert_eq!(
        fw.out.writes,
        vec![
            (LIGHT_RELAY_GPIO, PinState::Low),
            (MOTOR_RELAY_GPIO, PinState::Low)
        ]
    );
    assert_eq!(fw.levels(), (Level::Off, Level::Off));
}

#[test]
fn full_session_scenario() {
    let mut fw = Firmware::boot(&RelayConfig::default());
    assert_eq!(fw.app.link_state(), LinkState::Disconnected);
    assert!(fw.app.connection().advertising);

    fw.push(RadioEvent::Connected);
    fw.write(b"light on");
    fw.run_once();
    assert_eq!(fw.levels(), (Level::On, Level::Off));
    assert_eq!(fw.out.last(LIGHT_RELAY_GPIO), Some(PinState::High));

    fw.write(b"light off");
    fw.run_once();
    assert_eq!(fw.levels(), (Level::Off, Level::Off));
    assert_eq!(fw.out.last(LIGHT_RELAY_GPIO), Some(PinState::Low));

    fw.push(RadioEvent::Disconnected);
    fw.run_once();
    assert!(!fw.app.connection().connected);
    assert!(fw.app.connection().advertising);
    assert_eq!(fw.radio.calls.last(), Some(&RadioCall::StartAdvertising));

    fw.push(RadioEvent::Connected);
    fw.write(b"motor on");
    fw.run_once();
    assert_eq!(fw.levels(), (Level::Off, Level::On));
    assert_eq!(fw.out.last(MOTOR_RELAY_GPIO), Some(PinState::High));
    assert_eq!(fw.app.sessions(), 2);
}

#[test]
fn events_are_handled_in_arrival_order() {
    let mut fw = Firmware::boot(&RelayConfig::default());

    // Write lands before the connect is processed, so it is dropped.
    fw.write(b"light on");
    fw.push(RadioEvent::Connected);
    fw.write(b"motor on");
    fw.run_once();

    assert_eq!(fw.levels(), (Level::Off, Level::On));
    let dropped = fw
        .sink
        .events
        .iter()
        .position(|e| *e == AppEvent::WriteWhileDisconnected);
    let linked = fw.sink.events.iter().position(|e| {
        *e == AppEvent::LinkChanged {
            from: LinkState::Disconnected,
            to: LinkState::Connected,
        }
    });
    assert!(dropped.is_some() && linked.is_some());
    assert!(dropped < linked);
}

#[test]
fn state_survives_link_drop() {
    let mut fw = Firmware::boot(&RelayConfig::default());
    fw.push(RadioEvent::Connected);
    fw.write(b"MOTOR ON");
    fw.write(b"Light On");
    fw.push(RadioEvent::Disconnected);
    fw.run_once();

    // Disconnect does not reset outputs.
    assert_eq!(fw.levels(), (Level::On, Level::On));
    assert!(fw.app.connection().advertising);
}

#[test]
fn disconnect_survives_write_burst() {
    let mut fw = Firmware::boot(&RelayConfig::default());
    fw.push(RadioEvent::Connected);
    fw.run_once();
    fw.radio.clear();

    fw.flood(b"light on");
    assert_eq!(fw.queue.len(), EVENT_QUEUE_CAP);
    assert!(!fw.queue.push(RadioEvent::Disconnected));
    fw.run_once();

    assert_eq!(
        fw.app.connection(),
        ConnectionState {
            connected: false,
            advertising: true
        }
    );
    assert_eq!(fw.radio.advertising_starts(), 1);
    // Writes queued ahead of the disconnect were still applied.
    assert_eq!(fw.levels(), (Level::On, Level::Off));

    for _ in 0..1000 {
        fw.run_once();
    }
    assert!(fw.app.connection().advertising);
    assert_eq!(fw.radio.advertising_starts(), 1);
}

#[test]
fn connect_survives_full_queue() {
    let mut fw = Firmware::boot(&RelayConfig::default());
    fw.flood(b"light on");
    assert!(!fw.queue.push(RadioEvent::Connected));
    fw.run_once();

    assert!(fw.app.connection().connected);
    assert!(!fw.app.connection().advertising);
    // The flooded writes arrived before the link was up.
    assert_eq!(fw.levels(), (Level::Off, Level::Off));

    fw.write(b"motor on");
    fw.run_once();
    assert_eq!(fw.levels(), (Level::Off, Level::On));

    fw.push(RadioEvent::Disconnected);
    fw.run_once();
    assert!(fw.app.connection().advertising);
    assert_eq!(fw.app.sessions(), 1);
}

#[test]
fn link_flap_inside_one_window_settles_on_latest() {
    let mut fw = Firmware::boot(&RelayConfig::default());
    fw.flood(b"light on");
    assert!(!fw.queue.push(RadioEvent::Connected));
    assert!(!fw.queue.push(RadioEvent::Disconnected));
    fw.run_once();

    assert!(!fw.app.connection().connected);
    assert!(fw.app.connection().advertising);
    assert_eq!(fw.app.sessions(), 0);
}
