//! # Arm Relay Library
//!
//! Message-driven relay between a ground commander, a robotic-arm actuator
//! subsystem and a high-rate timer. Ground commands select a joint goal; the
//! goal is forwarded to the actuator on the next control tick; housekeeping
//! requests return counters and the telemetry-facing joint state.
//!
//! ## Data Flow
//!
//! ```text
//! pipe ──▶ codec::decode ──▶ RelayApp::process ──▶ handler
//!                                                   ├─ Move/SetJoints ─▶ SharedState (goal, pending)
//!                                                   ├─ ActuatorReport ─▶ SharedState (actuator)
//!                                                   ├─ Tick ───────────▶ control::run_tick ─▶ Transport
//!                                                   └─ SendHk ─────────▶ telemetry::report_housekeeping ─▶ Transport
//! ```
//!
//! ## Single Owner
//!
//! [`dispatch::RelayApp`] owns all mutable state and processes one message at
//! a time to completion. There is no internal locking. Producers on other
//! threads only send frames into the bounded [`bus::Pipe`].

pub mod bus;
pub mod codec;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod pose;
pub mod runner;
pub mod sim;
pub mod store;
pub mod telemetry;
pub mod transport;
