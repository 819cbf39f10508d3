//! Command classifier: routes each validated inbound message to its handler.
//!
//! [`RelayApp`] owns the shared state, the pose table, the control strategy and
//! both outbound seams (transport and event sink). [`RelayApp::process`] runs
//! one frame to completion; the caller feeds frames in arrival order.
//!
//! Rejections are accounted for here, before `process` returns:
//!
//! | Rejection             | Event          | ErrorCounter |
//! |-----------------------|----------------|--------------|
//! | `LengthMismatch`      | `LenErr`       | +1           |
//! | `UnknownCommandCode`  | `CommandErr`   | +1           |
//! | `InvalidMessageKind`  | `InvalidMsgId` | unchanged    |

use arm_common::consts::VERSION_STRING;
use arm_common::msg::{ActuatorCommand, HousekeepingTlm};
use tracing::trace;

use crate::codec::{self, Inbound};
use crate::config::RelayConfig;
use crate::control::{ControlStrategy, run_tick};
use crate::error::RelayError;
use crate::events::{EventId, EventSink, EventType};
use crate::pose::{PoseLookup, PoseTable};
use crate::store::{ActuatorState, SharedState};
use crate::telemetry::report_housekeeping;
use crate::transport::Transport;

/// What `process` did with an accepted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Handled {
    Noop,
    /// A new goal was stored and armed for the next tick.
    GoalAccepted,
    ActuatorUpdated,
    Housekeeping(HousekeepingTlm),
    Tick { forwarded: Option<ActuatorCommand> },
}

/// The relay application.
pub struct RelayApp<T: Transport, E: EventSink> {
    state: SharedState,
    poses: PoseTable,
    strategy: ControlStrategy,
    transport: T,
    events: E,
}

impl<T: Transport, E: EventSink> RelayApp<T, E> {
    /// Assemble an app with zeroed state.
    pub fn new(poses: PoseTable, strategy: ControlStrategy, transport: T, events: E) -> Self {
        Self {
            state: SharedState::new(),
            poses,
            strategy,
            transport,
            events,
        }
    }

    /// Assemble an app from a validated configuration.
    pub fn from_config(config: &RelayConfig, transport: T, events: E) -> Self {
        Self::new(config.pose_table(), config.strategy(), transport, events)
    }

    /// Report the startup event. Call once after construction.
    pub fn startup(&mut self) {
        self.events.send_event(
            EventId::Startup,
            EventType::Information,
            format_args!("ARM RELAY Initialized.{VERSION_STRING}"),
        );
    }

    /// Process one inbound frame to completion.
    ///
    /// On `Err` the rejection has already been counted and reported.
    pub fn process(&mut self, frame: &[u8]) -> Result<Handled, RelayError> {
        match codec::decode(frame) {
            Ok(msg) => Ok(self.handle(msg)),
            Err(err) => {
                self.reject(&err);
                Err(err)
            }
        }
    }

    fn handle(&mut self, msg: Inbound) -> Handled {
        match msg {
            Inbound::Noop => {
                self.events.send_event(
                    EventId::CommandNop,
                    EventType::Information,
                    format_args!("ARM RELAY: NOOP command{VERSION_STRING}"),
                );
                Handled::Noop
            }
            Inbound::Move(cmd) => {
                let lookup = self.poses.resolve(cmd.pose_id);
                let goal = lookup.joints();
                match lookup {
                    PoseLookup::Preset(p) => self.events.send_event(
                        EventId::CommandMode,
                        EventType::Information,
                        format_args!("ARM RELAY: Move to pose {} ({})", cmd.pose_id, p.name),
                    ),
                    PoseLookup::Default => self.events.send_event(
                        EventId::CommandMode,
                        EventType::Information,
                        format_args!(
                            "ARM RELAY: Move to pose {}, unknown id, using default pose",
                            cmd.pose_id
                        ),
                    ),
                }
                self.state.accept_goal(goal);
                Handled::GoalAccepted
            }
            Inbound::SetJoints(cmd) => {
                self.events.send_event(
                    EventId::CommandMode,
                    EventType::Information,
                    format_args!("ARM RELAY: Move to joints {:?}", cmd.joints.as_array()),
                );
                self.state.accept_goal(cmd.joints);
                Handled::GoalAccepted
            }
            Inbound::ActuatorReport(report) => {
                self.state.record_actuator(ActuatorState::from(report));
                Handled::ActuatorUpdated
            }
            Inbound::HousekeepingRequest => {
                let tlm = report_housekeeping(&mut self.state, &mut self.transport);
                trace!(command_counter = tlm.command_counter, "housekeeping sent");
                Handled::Housekeeping(tlm)
            }
            Inbound::Tick => {
                let outcome = run_tick(&mut self.state, &self.strategy, &mut self.transport);
                Handled::Tick {
                    forwarded: outcome.forwarded,
                }
            }
        }
    }

    fn reject(&mut self, err: &RelayError) {
        if err.counts_as_error() {
            self.state.bump_error_counter();
        }
        self.events
            .send_event(err.event_id(), EventType::Error, format_args!("{err}"));
    }

    /// Report that the inbound pipe failed. The caller stops after this.
    pub fn report_pipe_error(&mut self, detail: &dyn core::fmt::Display) {
        self.events.send_event(
            EventId::PipeErr,
            EventType::Error,
            format_args!("ARM RELAY: SB Pipe Read Error, App Will Exit: {detail}"),
        );
    }

    // ─── Accessors ──────────────────────────────────────────────────

    #[inline]
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    #[inline]
    pub fn strategy(&self) -> &ControlStrategy {
        &self.strategy
    }

    #[inline]
    pub fn poses(&self) -> &PoseTable {
        &self.poses
    }

    #[inline]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[inline]
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    #[inline]
    pub fn events(&self) -> &E {
        &self.events
    }

    #[inline]
    pub fn events_mut(&mut self) -> &mut E {
        &mut self.events
    }
}
