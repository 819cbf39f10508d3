//! Integration test: telemetry refresh strategies.

use core::f32::consts::PI;

use arm_common::consts::JOINT_COUNT;
use arm_common::joint::JointVector;
use arm_common::msg::{ActuatorReport, HrTick, MoveCmd, SendHkCmd};
use arm_relay::config::load_config_from_str;
use arm_relay::control::ControlStrategy;
use arm_relay::dispatch::RelayApp;
use arm_relay::events::{EventId, RecordingEvents};
use arm_relay::transport::RecordingTransport;

use super::common::{app, app_with, frame};

#[test]
fn passthrough_ignores_goal() {
    let mut app = app();
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    for _ in 0..10 {
        app.process(&frame(&HrTick)).unwrap();
    }
    // No actuator report yet: zero state.
    assert_eq!(app.state().telemetry().joints, JointVector::ZERO);
    assert!(!app.state().telemetry().is_moving);
}

#[test]
fn proportional_correction_approaches_home_pose() {
    let mut app = app_with(ControlStrategy::ProportionalCorrection { gain: 0.01 });
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&ActuatorReport {
        joints: JointVector::ZERO,
        is_moving: true,
    }))
    .unwrap();

    app.process(&frame(&HrTick)).unwrap();
    let wrist = app.state().telemetry().joints[3];
    assert!((wrist - (-PI * 0.01)).abs() < 1e-5);
    assert!(app.state().telemetry().is_moving);

    for _ in 0..1500 {
        app.process(&frame(&HrTick)).unwrap();
    }
    let target = JointVector::new([0.0, 0.0, 0.0, -PI, 0.0, 0.0, 0.0]);
    assert!(app.state().telemetry().joints.max_abs_diff(&target) < 1e-3);

    app.process(&frame(&SendHkCmd)).unwrap();
    let hk = app.transport().housekeeping().last().copied().unwrap();
    assert_eq!(hk.joints, app.state().telemetry().joints);
}

#[test]
fn proportional_correction_applies_to_every_joint() {
    let mut app = app_with(ControlStrategy::ProportionalCorrection { gain: 0.5 });
    let goal = JointVector::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    app.process(&frame(&arm_common::msg::SetJointsCmd { joints: goal }))
        .unwrap();
    app.process(&frame(&HrTick)).unwrap();
    for i in 0..JOINT_COUNT {
        assert!((app.state().telemetry().joints[i] - goal[i] * 0.5).abs() < 1e-6);
    }
}

#[test]
fn strategy_and_poses_from_config() {
    let cfg = load_config_from_str(
        r#"
[control]
strategy = "proportional_correction"
gain = 1.0

[[poses]]
id = 7
name = "reach"
joints = [0.5, 0.5, 0.5, 0.5, 0.5, 0.5, 0.5]

[[events.filters]]
event = "command_mode"
mask = 0xFFFF
"#,
    )
    .unwrap();

    let events = cfg.events.apply(RecordingEvents::new());
    let mut app = RelayApp::from_config(&cfg, RecordingTransport::new(), events);
    app.process(&frame(&MoveCmd { pose_id: 7 })).unwrap();
    app.process(&frame(&MoveCmd { pose_id: 7 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();

    // Gain 1.0 lands on the goal in one tick.
    assert_eq!(
        app.state().telemetry().joints,
        JointVector::new([0.5; JOINT_COUNT])
    );
    // Mask 0xFFFF lets only the first CommandMode event through.
    assert_eq!(app.events().inner().count(EventId::CommandMode), 1);
}
