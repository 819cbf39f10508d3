//! Integration test: inbound validation and rejection accounting.
//!
//! A rejected frame changes nothing but the error counter (for length
//! mismatches and unknown command codes) and the event log.

use arm_common::consts::JOINT_COUNT;
use arm_common::joint::JointVector;
use arm_common::msg::{ACTUATOR_REPORT_LEN, ActuatorReport, HrTick, MoveCmd, NoopCmd, SendHkCmd};
use arm_relay::error::RelayError;
use arm_relay::events::{EventId, EventType};

use super::common::{TestApp, app, frame};

fn snapshot(app: &TestApp) -> (JointVector, bool, JointVector, bool) {
    let s = app.state();
    (*s.goal(), s.pending().is_pending(), s.actuator().joints, s.actuator().is_moving)
}

#[test]
fn short_actuator_report_only_bumps_error_counter() {
    let mut app = app();
    app.process(&frame(&ActuatorReport {
        joints: JointVector::new([0.4; JOINT_COUNT]),
        is_moving: true,
    }))
    .unwrap();
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    let before = snapshot(&app);
    let counters_before = app.state().counters();

    let mut bad = frame(&ActuatorReport {
        joints: JointVector::new([9.0; JOINT_COUNT]),
        is_moving: false,
    });
    bad.pop();
    let err = app.process(&bad).unwrap_err();

    assert_eq!(
        err,
        RelayError::LengthMismatch {
            msg_id: 0x1839,
            fcn_code: 0,
            actual: ACTUATOR_REPORT_LEN - 1,
            expected: ACTUATOR_REPORT_LEN,
        }
    );
    assert_eq!(snapshot(&app), before);
    assert_eq!(app.state().counters().error, counters_before.error + 1);
    assert_eq!(app.state().counters().command, counters_before.command);
    assert!(app.transport().sent.is_empty());

    let ev = app.events().last().unwrap();
    assert_eq!(ev.id, EventId::LenErr);
    assert_eq!(ev.kind, EventType::Error);
    assert!(ev.text.contains("Len = 36"));
    assert!(ev.text.contains("Expected = 37"));
}

#[test]
fn every_length_mismatch_counts_once() {
    let mut app = app();
    let mut long_noop = frame(&NoopCmd);
    long_noop.push(0);
    let mut long_tick = frame(&HrTick);
    long_tick.extend_from_slice(&[0; 4]);
    let mut short_move = frame(&MoveCmd { pose_id: 1 });
    short_move.pop();
    let mut long_hk = frame(&SendHkCmd);
    long_hk.push(1);

    for f in [long_noop, long_tick, short_move, long_hk] {
        assert!(matches!(
            app.process(&f),
            Err(RelayError::LengthMismatch { .. })
        ));
    }
    assert_eq!(app.state().counters().error, 4);
    assert_eq!(app.events().count(EventId::LenErr), 4);
    assert!(app.transport().sent.is_empty());
}

#[test]
fn malformed_move_leaves_goal_untouched() {
    let mut app = app();
    let mut bad = frame(&MoveCmd { pose_id: 0 });
    bad.push(0);
    app.process(&bad).unwrap_err();
    assert_eq!(*app.state().goal(), JointVector::ZERO);
    assert!(!app.state().pending().is_pending());

    app.process(&frame(&HrTick)).unwrap();
    assert_eq!(app.transport().actuator_commands().count(), 0);
}

#[test]
fn unknown_command_code_counts() {
    let mut app = app();
    let mut f = frame(&NoopCmd);
    f[4] = 17;
    assert_eq!(
        app.process(&f),
        Err(RelayError::UnknownCommandCode { fcn_code: 17 })
    );
    assert_eq!(app.state().counters().error, 1);
    assert_eq!(app.events().count(EventId::CommandErr), 1);
    assert!(!app.state().pending().is_pending());
}

#[test]
fn unknown_message_kind_is_not_counted() {
    let mut app = app();
    let mut f = frame(&HrTick);
    f[0..2].copy_from_slice(&0x1FFFu16.to_le_bytes());
    assert_eq!(
        app.process(&f),
        Err(RelayError::InvalidMessageKind { msg_id: 0x1FFF })
    );
    assert_eq!(app.state().counters().error, 0);
    let ev = app.events().last().unwrap();
    assert_eq!(ev.id, EventId::InvalidMsgId);
    assert!(ev.text.contains("0x1FFF"));
}

#[test]
fn truncated_header_counts_as_length_mismatch() {
    let mut app = app();
    assert!(matches!(
        app.process(&[0x39, 0x18, 0x00]),
        Err(RelayError::LengthMismatch { msg_id: 0x1839, .. })
    ));
    assert_eq!(app.state().counters().error, 1);
}

#[test]
fn actuator_report_is_idempotent() {
    let mut app = app();
    let report = ActuatorReport {
        joints: JointVector::new([0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7]),
        is_moving: true,
    };
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&report)).unwrap();
    let once = *app.state().actuator();
    let pending = *app.state().pending();
    let counters = app.state().counters();

    app.process(&frame(&report)).unwrap();
    assert_eq!(*app.state().actuator(), once);
    assert_eq!(*app.state().pending(), pending);
    assert_eq!(app.state().counters(), counters);
    assert_eq!(once.joints, report.joints);
    assert!(once.is_moving);
    assert!(pending.is_pending());
    assert_eq!(counters.error, 0);
}
