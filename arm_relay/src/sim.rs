//! Host-side producers for running the relay without real hardware.
//!
//! - periodic schedulers for the high-rate tick and housekeeping request
//! - a simulated actuator subsystem that slews toward the last commanded goal
//!   and reports its joint state
//! - a scripted ground station that sends pose moves and logs housekeeping
//!
//! Every producer only sends frames into the inbound pipe and stops when the
//! shared `running` flag clears or the pipe goes away.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use arm_common::joint::JointVector;
use arm_common::msg::{
    ActuatorCommand, ActuatorReport, HousekeepingTlm, MoveCmd, NoopCmd, WireMessage,
    decode_telemetry,
};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use tracing::{debug, info, warn};

use crate::bus::{BusError, Frame, PipeSender};

/// Returns `false` once the producer should stop.
fn deliver<M: WireMessage>(name: &str, tx: &mut PipeSender, msg: &M) -> bool {
    match tx.send(msg) {
        Ok(()) => true,
        Err(BusError::PipeFull { depth }) => {
            debug!(producer = name, depth, "pipe full, frame dropped");
            true
        }
        Err(e) => {
            debug!(producer = name, "stopping: {e}");
            false
        }
    }
}

// ─── Periodic Scheduler ─────────────────────────────────────────────

/// Send `msg` every `period` until `running` clears.
///
/// Pacing uses absolute deadlines so the rate does not drift with send time.
pub fn spawn_periodic<M>(
    name: &'static str,
    mut tx: PipeSender,
    msg: M,
    period: Duration,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>>
where
    M: WireMessage + Send + 'static,
{
    thread::Builder::new().name(name.to_string()).spawn(move || {
        let mut next = Instant::now();
        while running.load(Ordering::Relaxed) {
            if !deliver(name, &mut tx, &msg) {
                break;
            }
            next += period;
            let now = Instant::now();
            if next > now {
                thread::sleep(next - now);
            } else {
                next = now;
            }
        }
    })
}

// ─── Simulated Actuator ─────────────────────────────────────────────

/// Actuator model: each step moves every joint at most `max_step` toward the
/// goal. Moving while any joint is further than `max_step` away.
#[derive(Debug, Clone, PartialEq)]
pub struct SimActuator {
    joints: JointVector,
    goal: JointVector,
    max_step: f32,
}

impl SimActuator {
    pub fn new(max_step: f32) -> Self {
        Self {
            joints: JointVector::ZERO,
            goal: JointVector::ZERO,
            max_step,
        }
    }

    /// Apply a goal received from the relay.
    pub fn command(&mut self, cmd: &ActuatorCommand) {
        self.goal = cmd.goal;
    }

    /// Advance one step and return the resulting report.
    pub fn step(&mut self) -> ActuatorReport {
        let mut is_moving = false;
        for i in 0..self.joints.0.len() {
            let err = self.goal[i] - self.joints[i];
            if err.abs() > self.max_step {
                self.joints[i] += self.max_step.copysign(err);
                is_moving = true;
            } else {
                self.joints[i] = self.goal[i];
            }
        }
        ActuatorReport {
            joints: self.joints,
            is_moving,
        }
    }

    #[inline]
    pub fn joints(&self) -> &JointVector {
        &self.joints
    }
}

/// Run the actuator model: apply goals from `commands`, report every `period`.
pub fn spawn_actuator(
    mut actuator: SimActuator,
    commands: Receiver<Frame>,
    mut tx: PipeSender,
    period: Duration,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("sim-actuator".into()).spawn(move || {
        while running.load(Ordering::Relaxed) {
            match commands.recv_timeout(period) {
                Ok(frame) => match decode_telemetry::<ActuatorCommand>(&frame) {
                    Ok((_, cmd)) => {
                        debug!(goal = ?cmd.goal.as_array(), "actuator goal received");
                        actuator.command(&cmd);
                    }
                    Err(e) => warn!("actuator: bad command frame: {e}"),
                },
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            let report = actuator.step();
            if !deliver("sim-actuator", &mut tx, &report) {
                break;
            }
        }
    })
}

// ─── Ground Station ─────────────────────────────────────────────────

/// Scripted ground station.
///
/// Sends a No-Op, then one Move per entry of `poses` spaced by `interval`,
/// and logs every housekeeping report received meanwhile.
pub fn spawn_ground(
    poses: Vec<u8>,
    interval: Duration,
    mut tx: PipeSender,
    telemetry: Receiver<Frame>,
    running: Arc<AtomicBool>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new().name("sim-ground".into()).spawn(move || {
        let mut script = poses.into_iter();
        let mut next_cmd = Instant::now() + interval;
        if !deliver("sim-ground", &mut tx, &NoopCmd) {
            return;
        }

        while running.load(Ordering::Relaxed) {
            let wait = next_cmd.saturating_duration_since(Instant::now());
            match telemetry.recv_timeout(wait) {
                Ok(frame) => log_housekeeping(&frame),
                Err(RecvTimeoutError::Timeout) => {
                    next_cmd += interval;
                    if let Some(pose_id) = script.next() {
                        info!(pose_id, "ground: sending move");
                        if !deliver("sim-ground", &mut tx, &MoveCmd { pose_id }) {
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}

fn log_housekeeping(frame: &[u8]) {
    match decode_telemetry::<HousekeepingTlm>(frame) {
        Ok((header, hk)) => info!(
            seq = header.sequence,
            ts_us = header.timestamp_us,
            cmd_count = hk.command_counter,
            err_count = hk.error_counter,
            moving = hk.is_moving,
            joints = ?hk.joints.as_array(),
            "HK"
        ),
        Err(e) => warn!("ground: bad housekeeping frame: {e}"),
    }
}
