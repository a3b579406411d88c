//! Integration tests for the control-write path: RadioEvent::ControlWrite →
//! dispatcher → actuators → pins, plus confirmation replies.

use embedded_hal::digital::PinState;

use super::mock_hw::{MockOutputs, MockRadio, RecordingSink};

use voicerelay::app::commands::{ActuatorId, Level, PhraseBinding, RejectReason};
use voicerelay::app::events::AppEvent;
use voicerelay::app::service::AppService;
use voicerelay::config::{RelayConfig, ReplyMode};
use voicerelay::events::RadioEvent;
use voicerelay::pins::{LIGHT_RELAY_GPIO, MOTOR_RELAY_GPIO};

fn connected(config: &RelayConfig) -> (AppService, MockRadio, MockOutputs, RecordingSink) {
    let mut app = AppService::new(config);
    let (mut radio, mut out, mut sink) = (MockRadio::new(), MockOutputs::new(), RecordingSink::new());
    app.start(&mut radio, &mut out, &mut sink);
    app.handle_event(&RadioEvent::Connected, &mut radio, &mut out, &mut sink);
    out.writes.clear();
    sink.clear();
    radio.clear();
    (app, radio, out, sink)
}

fn write(
    app: &mut AppService,
    radio: &mut MockRadio,
    out: &mut MockOutputs,
    sink: &mut RecordingSink,
    payload: &[u8],
) {
    app.handle_event(&RadioEvent::control_write(payload), radio, out, sink);
}

#[test]
fn case_variants_yield_same_transition() {
    for phrase in [&b"LIGHT ON"[..], b"Light On", b"light on", b"  light on\n"] {
        let (mut app, mut radio, mut out, mut sink) = connected(&RelayConfig::default());
        write(&mut app, &mut radio, &mut out, &mut sink, phrase);
        assert_eq!(app.level(ActuatorId::Light), Level::On);
        assert_eq!(out.writes, vec![(LIGHT_RELAY_GPIO, PinState::High)]);
    }
}

#[test]
fn repeated_command_rewrites_pin() {
    let (mut app, mut radio, mut out, mut sink) = connected(&RelayConfig::default());
    for _ in 0..3 {
        write(&mut app, &mut radio, &mut out, &mut sink, b"motor on");
    }
    assert_eq!(app.level(ActuatorId::Motor), Level::On);
    assert_eq!(out.count(MOTOR_RELAY_GPIO), 3);
}

#[test]
fn empty_payload_mutates_and_raises_nothing() {
    let (mut app, mut radio, mut out, mut sink) = connected(&RelayConfig::default());
    write(&mut app, &mut radio, &mut out, &mut sink, b"");
    assert!(out.writes.is_empty());
    assert_eq!(sink.events, vec![AppEvent::EmptyWrite]);
    assert_eq!(app.level(ActuatorId::Light), Level::Off);
    assert_eq!(app.level(ActuatorId::Motor), Level::Off);
}

#[test]
fn unrecognised_command_mutates_nothing() {
    let (mut app, mut radio, mut out, mut sink) = connected(&RelayConfig::default());
    write(&mut app, &mut radio, &mut out, &mut sink, b"open garage");
    assert!(out.writes.is_empty());
    assert_eq!(
        sink.events,
        vec![AppEvent::CommandRejected(RejectReason::UnknownPhrase)]
    );
    assert!(app.connection().connected);
}

#[test]
fn oversize_and_binary_payloads_are_absorbed() {
    let (mut app, mut radio, mut out, mut sink) = connected(&RelayConfig::default());
    write(&mut app, &mut radio, &mut out, &mut sink, &[b'x'; 200]);
    write(&mut app, &mut radio, &mut out, &mut sink, &[0xC3, 0x28]);
    write(&mut app, &mut radio, &mut out, &mut sink, b"   ");
    assert!(out.writes.is_empty());
    assert_eq!(
        sink.events,
        vec![
            AppEvent::CommandRejected(RejectReason::TooLong(200)),
            AppEvent::CommandRejected(RejectReason::NotUtf8),
            AppEvent::CommandRejected(RejectReason::Blank),
        ]
    );
}

#[test]
fn writes_while_disconnected_never_mutate() {
    let mut app = AppService::new(&RelayConfig::default());
    let (mut radio, mut out, mut sink) = (MockRadio::new(), MockOutputs::new(), RecordingSink::new());
    app.start(&mut radio, &mut out, &mut sink);
    out.writes.clear();

    write(&mut app, &mut radio, &mut out, &mut sink, b"light on");
    assert!(out.writes.is_empty());
    assert_eq!(app.level(ActuatorId::Light), Level::Off);
    assert!(sink.contains(&AppEvent::WriteWhileDisconnected));

    app.handle_event(&RadioEvent::Connected, &mut radio, &mut out, &mut sink);
    app.handle_event(&RadioEvent::Disconnected, &mut radio, &mut out, &mut sink);
    write(&mut app, &mut radio, &mut out, &mut sink, b"motor on");
    assert_eq!(app.level(ActuatorId::Motor), Level::Off);
}

#[test]
fn confirm_mode_notifies_controller() {
    let config = RelayConfig {
        reply_mode: ReplyMode::Confirm,
        ..RelayConfig::default()
    };
    let (mut app, mut radio, mut out, mut sink) = connected(&config);
    write(&mut app, &mut radio, &mut out, &mut sink, b"Light On");
    write(&mut app, &mut radio, &mut out, &mut sink, b"motor off");
    write(&mut app, &mut radio, &mut out, &mut sink, b"open garage");
    write(&mut app, &mut radio, &mut out, &mut sink, b"");
    assert_eq!(
        radio.notifications(),
        vec!["Light turned ON", "Motor turned OFF", "invalid command"]
    );
}

#[test]
fn reply_failure_is_swallowed() {
    let config = RelayConfig {
        reply_mode: ReplyMode::Confirm,
        ..RelayConfig::default()
    };
    let (mut app, mut radio, mut out, mut sink) = connected(&config);
    radio.fail_notify = true;
    write(&mut app, &mut radio, &mut out, &mut sink, b"light on");
    assert_eq!(app.level(ActuatorId::Light), Level::On);
    assert!(
        sink.events
            .iter()
            .any(|e| matches!(e, AppEvent::ReplyFailed(_)))
    );
}

#[test]
fn configured_vocabulary_replaces_defaults() {
    let mut config = RelayConfig::default();
    config.commands.clear();
    config
        .commands
        .push(PhraseBinding::new("fan please", ActuatorId::Motor, Level::On).unwrap())
        .unwrap();
    config.validate().unwrap();

    let (mut app, mut radio, mut out, mut sink) = connected(&config);
    write(&mut app, &mut radio, &mut out, &mut sink, b"motor on");
    assert_eq!(app.level(ActuatorId::Motor), Level::Off);
    write(&mut app, &mut radio, &mut out, &mut sink, b"FAN PLEASE");
    assert_eq!(app.level(ActuatorId::Motor), Level::On);
}

#[test]
fn custom_pins_are_driven() {
    let config = RelayConfig {
        light_pin: 4,
        motor_pin: 18,
        ..RelayConfig::default()
    };
    let (mut app, mut radio, mut out, mut sink) = connected(&config);
    write(&mut app, &mut radio, &mut out, &mut sink, b"light on");
    write(&mut app, &mut radio, &mut out, &mut sink, b"motor on");
    assert_eq!(out.writes, vec![(4, PinState::High), (18, PinState::High)]);
}
