//! Integration test: startup sequence.
//!
//! Config loading from a TOML file → app construction → startup event →
//! first commands handled with zeroed state.

use std::io::Write;

use core::f32::consts::PI;

use arm_common::joint::JointVector;
use arm_common::msg::{HrTick, MoveCmd, NoopCmd, SendHkCmd};
use arm_relay::config::{RelayConfig, load_config, load_config_from_str};
use arm_relay::dispatch::RelayApp;
use arm_relay::events::{EventId, EventType, RecordingEvents};
use arm_relay::pose::HOME_POSE;
use arm_relay::transport::RecordingTransport;
use tempfile::NamedTempFile;

use super::common::frame;

const RELAY_TOML: &str = r#"
[shared]
log_level = "debug"
service_name = "relay-it"

[control]
tick_hz = 100
hk_hz = 1
"#;

#[test]
fn startup_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(RELAY_TOML.as_bytes()).unwrap();
    file.flush().unwrap();

    let cfg = load_config(file.path()).unwrap();
    assert_eq!(cfg.shared.service_name, "relay-it");

    let mut app = RelayApp::from_config(&cfg, RecordingTransport::new(), RecordingEvents::new());
    app.startup();

    let ev = &app.events().events[0];
    assert_eq!(ev.id, EventId::Startup);
    assert_eq!(ev.kind, EventType::Information);
    assert!(ev.text.contains("ARM RELAY DEVELOPMENT BUILD"));

    let counters = app.state().counters();
    assert_eq!((counters.command, counters.error), (0, 0));
    assert_eq!(cfg.event_sink().inner().app(), "relay-it");
}

#[test]
fn custom_pose_table_keeps_home_pose() {
    let cfg = load_config_from_str(
        r#"
[[poses]]
id = 3
name = "stow"
joints = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]
"#,
    )
    .unwrap();
    let mut app = RelayApp::from_config(&cfg, RecordingTransport::new(), RecordingEvents::new());

    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();
    app.process(&frame(&MoveCmd { pose_id: 3 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();

    let goals: Vec<JointVector> = app.transport().actuator_commands().map(|c| c.goal).collect();
    assert_eq!(goals[0], HOME_POSE);
    assert_eq!(goals[1], cfg.poses[0].joints);
    assert!(app.events().events[0].text.contains("(home)"));
}

#[test]
fn default_config_runs_pose_zero() {
    let cfg = RelayConfig::default();
    let mut app = RelayApp::from_config(&cfg, RecordingTransport::new(), RecordingEvents::new());
    app.startup();

    app.process(&frame(&NoopCmd)).unwrap();
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();
    app.process(&frame(&SendHkCmd)).unwrap();

    let goal = app.transport().actuator_commands().next().unwrap().goal;
    assert_eq!(goal, JointVector::new([0.0, 0.0, 0.0, -PI, 0.0, 0.0, 0.0]));
    assert_eq!(app.events().count(EventId::CommandNop), 1);
    assert_eq!(app.events().count(EventId::CommandMode), 1);
    assert_eq!(app.transport().housekeeping().count(), 1);
}

#[test]
fn unknown_pose_uses_zero_vector() {
    let mut app = RelayApp::from_config(
        &RelayConfig::default(),
        RecordingTransport::new(),
        RecordingEvents::new(),
    );
    app.process(&frame(&MoveCmd { pose_id: 42 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();

    let goal = app.transport().actuator_commands().next().unwrap().goal;
    assert_eq!(goal, JointVector::ZERO);
    let ev = app.events().last().unwrap();
    assert_eq!(ev.id, EventId::CommandMode);
    assert_eq!(ev.kind, EventType::Information);
}
