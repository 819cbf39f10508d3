//! Control-loop engine, run once per high-rate tick.
//!
//! Each tick, in order:
//! 1. Forward the pending goal to the actuator subsystem, if one is armed.
//!    Exactly one transmission per tick however many goals were coalesced.
//! 2. Refresh the telemetry-facing joint state through the configured
//!    [`ControlStrategy`].
//!
//! There is no failure path. Before the first actuator report the actuator
//! state is the zero state.

use arm_common::msg::ActuatorCommand;

use crate::store::{SharedState, TelemetryState};
use crate::transport::{Outbound, Transport};

/// How the telemetry-facing state follows the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ControlStrategy {
    /// Copy the latest actuator report verbatim.
    #[default]
    Passthrough,
    /// Move each joint a fraction `gain` of the way toward the goal:
    /// `next_i = current_i + gain * (goal_i - current_i)`.
    ProportionalCorrection { gain: f32 },
}

impl ControlStrategy {
    /// Compute the next telemetry-facing state from the store.
    #[inline]
    pub fn refresh(&self, state: &SharedState) -> TelemetryState {
        let actuator = state.actuator();
        match *self {
            Self::Passthrough => TelemetryState {
                joints: actuator.joints,
                is_moving: actuator.is_moving,
            },
            Self::ProportionalCorrection { gain } => TelemetryState {
                joints: state.telemetry().joints.step_toward(state.goal(), gain),
                is_moving: actuator.is_moving,
            },
        }
    }
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TickOutcome {
    /// Goal forwarded during this tick, if any.
    pub forwarded: Option<ActuatorCommand>,
}

/// Run one control-loop tick.
pub fn run_tick<T: Transport>(
    state: &mut SharedState,
    strategy: &ControlStrategy,
    transport: &mut T,
) -> TickOutcome {
    // ═══ FORWARD PHASE ═══
    let forwarded = state.take_pending().map(|goal| {
        let cmd = ActuatorCommand { goal };
        transport.transmit(Outbound::ActuatorCommand(cmd));
        cmd
    });

    // ═══ REFRESH PHASE ═══
    let next = strategy.refresh(state);
    state.set_telemetry(next);

    TickOutcome { forwarded }
}
