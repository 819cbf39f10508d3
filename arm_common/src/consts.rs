//! System-wide constants for the arm relay workspace.
//!
//! Single source of truth for joint count, message identifiers, command codes,
//! default rates and version strings. Imported by all crates.

// ─── Joint Layout ───────────────────────────────────────────────────

/// Number of joints carried by every joint vector.
pub const JOINT_COUNT: usize = 7;

// ─── Message Identifiers ────────────────────────────────────────────

/// Base of the command message id range.
pub const CMD_MID_BASE: u16 = 0x1800;

/// Base of the telemetry message id range.
pub const TLM_MID_BASE: u16 = 0x0800;

/// Ground commands (No-Op, Move, SetJoints).
pub const RELAY_CMD_MID: u16 = CMD_MID_BASE + 0x37;

/// Housekeeping report request.
pub const RELAY_SEND_HK_MID: u16 = CMD_MID_BASE + 0x38;

/// Joint state report from the actuator subsystem.
pub const RELAY_ACTUATOR_STATE_MID: u16 = CMD_MID_BASE + 0x39;

/// Outbound housekeeping telemetry.
pub const RELAY_HK_TLM_MID: u16 = TLM_MID_BASE + 0x36;

/// Outbound joint goal for the actuator subsystem.
pub const RELAY_ACTUATOR_CMD_MID: u16 = TLM_MID_BASE + 0x37;

/// High-rate control wakeup.
pub const RELAY_HR_TICK_MID: u16 = TLM_MID_BASE + 0x38;

// ─── Command Codes ──────────────────────────────────────────────────

/// No-operation ground command.
pub const NOOP_CC: u8 = 0;

/// Move to a preset pose selected by `pose_id`.
pub const MOVE_CC: u8 = 1;

/// Move to an explicit joint vector.
pub const SET_JOINTS_CC: u8 = 2;

// ─── Runtime Defaults ───────────────────────────────────────────────

/// Depth of the inbound command pipe.
pub const PIPE_DEPTH: usize = 32;

/// Default high-rate tick frequency [Hz].
pub const TICK_HZ_DEFAULT: u32 = 1000;

/// Default housekeeping request frequency [Hz].
pub const HK_HZ_DEFAULT: u32 = 1;

/// Default proportional gain for the correction strategy.
pub const KP_DEFAULT: f32 = 0.01;

/// Maximum number of entries in the pose preset table.
pub const MAX_POSES: usize = 16;

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "config/relay.toml";

// ─── Version ────────────────────────────────────────────────────────

/// Development build version: baseline tag plus build number.
pub const VERSION: &str = "v1.2.0-rc1+dev2";

/// Version banner reported by the startup event.
pub const VERSION_STRING: &str =
    " ARM RELAY DEVELOPMENT BUILD v1.2.0-rc1+dev2, Last Official Release: v1.1.0";
