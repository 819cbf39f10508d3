//! Integration test: goal coalescing between ticks.
//!
//! Any sequence of goal commands between two ticks yields exactly one actuator
//! command at the next tick, carrying the last goal.

use core::f32::consts::PI;

use arm_common::consts::JOINT_COUNT;
use arm_common::joint::JointVector;
use arm_common::msg::{ActuatorCommand, HrTick, MoveCmd, SetJointsCmd};
use arm_relay::dispatch::Handled;

use super::common::{app, frame};

#[test]
fn many_moves_one_forward() {
    let mut app = app();
    for pose_id in [5u8, 9, 0] {
        app.process(&frame(&MoveCmd { pose_id })).unwrap();
    }
    assert!(app.transport().sent.is_empty());

    app.process(&frame(&HrTick)).unwrap();
    let sent: Vec<_> = app.transport().actuator_commands().copied().collect();
    assert_eq!(
        sent,
        vec![ActuatorCommand {
            goal: JointVector::new([0.0, 0.0, 0.0, -PI, 0.0, 0.0, 0.0])
        }]
    );
}

#[test]
fn last_goal_wins_across_variants() {
    let mut app = app();
    let explicit = JointVector::new([0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7]);
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&SetJointsCmd { joints: explicit })).unwrap();

    let out = app.process(&frame(&HrTick)).unwrap();
    assert_eq!(
        out,
        Handled::Tick {
            forwarded: Some(ActuatorCommand { goal: explicit })
        }
    );
}

#[test]
fn no_goal_no_forward() {
    let mut app = app();
    for _ in 0..10 {
        app.process(&frame(&HrTick)).unwrap();
    }
    assert_eq!(app.transport().actuator_commands().count(), 0);
}

#[test]
fn each_tick_window_forwards_once() {
    let mut app = app();
    let mut expected = Vec::new();
    for k in 0..5 {
        let goal = JointVector::new([k as f32; JOINT_COUNT]);
        app.process(&frame(&SetJointsCmd {
            joints: JointVector::new([-1.0; JOINT_COUNT]),
        }))
        .unwrap();
        app.process(&frame(&SetJointsCmd { joints: goal })).unwrap();
        app.process(&frame(&HrTick)).unwrap();
        app.process(&frame(&HrTick)).unwrap();
        expected.push(ActuatorCommand { goal });
    }
    let sent: Vec<_> = app.transport().actuator_commands().copied().collect();
    assert_eq!(sent, expected);
}

#[test]
fn forward_carries_goal_at_tick_time_not_arrival_time() {
    let mut app = app();
    app.process(&frame(&MoveCmd { pose_id: 0 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();
    app.process(&frame(&MoveCmd { pose_id: 200 })).unwrap();
    app.process(&frame(&HrTick)).unwrap();

    let goals: Vec<_> = app.transport().actuator_commands().map(|c| c.goal).collect();
    assert_eq!(goals.len(), 2);
    assert_eq!(goals[1], JointVector::ZERO);
    assert_eq!(*app.state().goal(), JointVector::ZERO);
}
