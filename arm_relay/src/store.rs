//! Shared state store: the single source of truth for goal, actuator state,
//! pending forward, telemetry-facing state and housekeeping counters.
//!
//! Owned by [`RelayApp`](crate::dispatch::RelayApp) and borrowed mutably by one
//! handler at a time. Every field is private; the mutators below are the only
//! write paths, which keeps the pending-forward invariant structural:
//! [`SharedState::accept_goal`] is the only way to arm it and
//! [`SharedState::take_pending`] the only way to clear it.

use arm_common::joint::JointVector;
use arm_common::msg::ActuatorReport;

// ─── Pending Forward ────────────────────────────────────────────────

/// Goal waiting to be forwarded on the next tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PendingGoal {
    #[default]
    None,
    Pending(JointVector),
}

impl PendingGoal {
    #[inline]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Consume the pending goal, leaving `None` behind.
    #[inline]
    pub fn take(&mut self) -> Option<JointVector> {
        match core::mem::take(self) {
            Self::Pending(goal) => Some(goal),
            Self::None => None,
        }
    }
}

// ─── Actuator / Telemetry State ─────────────────────────────────────

/// Last report received from the actuator subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActuatorState {
    pub joints: JointVector,
    pub is_moving: bool,
}

impl From<ActuatorReport> for ActuatorState {
    fn from(report: ActuatorReport) -> Self {
        Self {
            joints: report.joints,
            is_moving: report.is_moving,
        }
    }
}

/// Joint state exposed through housekeeping, refreshed on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TelemetryState {
    pub joints: JointVector,
    pub is_moving: bool,
}

// ─── Counters ───────────────────────────────────────────────────────

/// Housekeeping counters. Both wrap at 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Housekeeping reports sent.
    pub command: u8,
    /// Rejected inbound messages.
    pub error: u8,
}

// ─── Store ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct SharedState {
    goal: JointVector,
    pending: PendingGoal,
    actuator: ActuatorState,
    telemetry: TelemetryState,
    counters: Counters,
}

impl SharedState {
    /// Zeroed state, as at startup.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn goal(&self) -> &JointVector {
        &self.goal
    }

    #[inline]
    pub fn pending(&self) -> &PendingGoal {
        &self.pending
    }

    #[inline]
    pub fn actuator(&self) -> &ActuatorState {
        &self.actuator
    }

    #[inline]
    pub fn telemetry(&self) -> &TelemetryState {
        &self.telemetry
    }

    #[inline]
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Record a new goal and arm it for the next tick. Replaces any goal still
    /// pending from earlier in the same tick window.
    pub fn accept_goal(&mut self, goal: JointVector) {
        self.goal = goal;
        self.pending = PendingGoal::Pending(goal);
    }

    /// Consume the pending goal, if any.
    #[inline]
    pub fn take_pending(&mut self) -> Option<JointVector> {
        self.pending.take()
    }

    /// Overwrite the actuator state wholesale.
    #[inline]
    pub fn record_actuator(&mut self, state: ActuatorState) {
        self.actuator = state;
    }

    #[inline]
    pub fn set_telemetry(&mut self, telemetry: TelemetryState) {
        self.telemetry = telemetry;
    }

    #[inline]
    pub fn bump_error_counter(&mut self) {
        self.counters.error = self.counters.error.wrapping_add(1);
    }

    /// Advance the command counter and return the value it held before.
    #[inline]
    pub fn bump_command_counter(&mut self) -> u8 {
        let prev = self.counters.command;
        self.counters.command = prev.wrapping_add(1);
        prev
    }
}
