//! Integration test: full relay on the in-process bus.
//!
//! Frames go through the bounded pipe into the runner; outbound messages come
//! back encoded and time-stamped on the downlinks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use arm_common::joint::JointVector;
use arm_common::msg::{
    ActuatorCommand, ActuatorReport, HousekeepingTlm, HrTick, MoveCmd, SendHkCmd, decode_telemetry,
};
use arm_relay::bus::{BusError, BusTransport, pipe};
use arm_relay::config::RelayConfig;
use arm_relay::dispatch::RelayApp;
use arm_relay::events::{EventId, RecordingEvents};
use arm_relay::runner::{RunError, Runner};
use arm_relay::sim::{SimActuator, spawn_actuator, spawn_periodic};

#[test]
fn scripted_session_over_bus() {
    let (mut tx, rx) = pipe(32);
    let (transport, links) = BusTransport::new(32);
    let app = RelayApp::from_config(&RelayConfig::default(), transport, RecordingEvents::new());
    let mut runner = Runner::new(app, rx);

    tx.send(&MoveCmd { pose_id: 0 }).unwrap();
    tx.send(&HrTick).unwrap();
    tx.send(&ActuatorReport {
        joints: JointVector::new([0.0, 0.0, 0.0, -1.0, 0.0, 0.0, 0.0]),
        is_moving: true,
    })
    .unwrap();
    tx.send(&HrTick).unwrap();
    tx.send(&SendHkCmd).unwrap();
    assert_eq!(runner.drain(), 5);

    let frame = links.actuator.try_recv().unwrap();
    let (hdr, cmd) = decode_telemetry::<ActuatorCommand>(&frame).unwrap();
    assert_eq!(hdr.sequence, 0);
    assert!(hdr.timestamp_us > 0);
    assert!((cmd.goal[3] + core::f32::consts::PI).abs() < 1e-6);
    assert!(links.actuator.try_recv().is_err());

    let (_, hk) = decode_telemetry::<HousekeepingTlm>(&links.ground.try_recv().unwrap()).unwrap();
    assert_eq!(hk.command_counter, 0);
    assert_eq!(hk.joints[3], -1.0);
    assert!(hk.is_moving);
    assert_eq!(runner.stats.count, 5);
}

#[test]
fn pipe_closure_ends_run_with_pipe_error() {
    let (tx, rx) = pipe(4);
    let (transport, _links) = BusTransport::new(4);
    let app = RelayApp::from_config(&RelayConfig::default(), transport, RecordingEvents::new());
    let mut runner = Runner::new(app, rx);

    let producer = thread::spawn(move || {
        let mut tx = tx;
        tx.send(&HrTick).unwrap();
    });
    producer.join().unwrap();

    let running = Arc::new(AtomicBool::new(true));
    assert_eq!(
        runner.run(&running),
        Err(RunError::PipeClosed(BusError::PipeClosed))
    );
    assert_eq!(runner.app.events().count(EventId::PipeErr), 1);
}

#[test]
fn closed_loop_with_simulated_actuator() {
    let (tx, rx) = pipe(32);
    let (transport, links) = BusTransport::new(32);
    let app = RelayApp::from_config(&RelayConfig::default(), transport, RecordingEvents::new());
    let mut runner = Runner::new(app, rx);
    let running = Arc::new(AtomicBool::new(true));

    let mut ground = tx.clone();
    let ticker = spawn_periodic(
        "it-tick",
        tx.clone(),
        HrTick,
        Duration::from_millis(1),
        running.clone(),
    )
    .unwrap();
    let actuator = spawn_actuator(
        SimActuator::new(0.5),
        links.actuator,
        tx,
        Duration::from_millis(1),
        running.clone(),
    )
    .unwrap();
    ground.send(&MoveCmd { pose_id: 0 }).unwrap();
    drop(ground);

    let stop = running.clone();
    let deadline = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        stop.store(false, Ordering::SeqCst);
    });

    assert_eq!(runner.run(&running), Ok(()));
    deadline.join().unwrap();
    ticker.join().unwrap();
    actuator.join().unwrap();

    // The actuator reached the home pose and the relay saw it.
    let reported = runner.app.state().actuator().joints;
    assert!((reported[3] + core::f32::consts::PI).abs() < 1e-3);
    assert_eq!(runner.app.state().counters().error, 0);
}
