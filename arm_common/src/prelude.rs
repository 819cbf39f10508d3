//! Prelude module for common re-exports.
//!
//! ```rust
//! use arm_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};

// ─── Joints ─────────────────────────────────────────────────────────
pub use crate::consts::JOINT_COUNT;
pub use crate::joint::JointVector;

// ─── Messages ───────────────────────────────────────────────────────
pub use crate::msg::{
    ActuatorCommand, ActuatorReport, CmdHeader, HousekeepingTlm, HrTick, MoveCmd, NoopCmd,
    SendHkCmd, SetJointsCmd, TlmHeader, WireError, WireMessage, decode_command,
    decode_telemetry, encode_command, encode_telemetry,
};
