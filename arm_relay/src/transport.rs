//! Outbound side of the relay.
//!
//! The relay hands finished messages to a [`Transport`] and never waits for
//! delivery. Time-stamping happens in the transport at send time.

use arm_common::msg::{ActuatorCommand, HousekeepingTlm};

/// A message leaving the relay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outbound {
    /// Joint goal for the actuator subsystem.
    ActuatorCommand(ActuatorCommand),
    /// Housekeeping report for the ground.
    Housekeeping(HousekeepingTlm),
}

/// Fire-and-forget message sink.
pub trait Transport {
    fn transmit(&mut self, msg: Outbound);
}

/// Keeps every transmitted message in memory. Used by tests and benchmarks.
#[derive(Debug, Default, Clone)]
pub struct RecordingTransport {
    pub sent: Vec<Outbound>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actuator_commands(&self) -> impl Iterator<Item = &ActuatorCommand> {
        self.sent.iter().filter_map(|m| match m {
            Outbound::ActuatorCommand(c) => Some(c),
            Outbound::Housekeeping(_) => None,
        })
    }

    pub fn housekeeping(&self) -> impl Iterator<Item = &HousekeepingTlm> {
        self.sent.iter().filter_map(|m| match m {
            Outbound::Housekeeping(h) => Some(h),
            Outbound::ActuatorCommand(_) => None,
        })
    }

    pub fn clear(&mut self) {
        self.sent.clear();
    }
}

impl Transport for RecordingTransport {
    fn transmit(&mut self, msg: Outbound) {
        self.sent.push(msg);
    }
}
