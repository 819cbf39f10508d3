//! Relay configuration: TOML loading and validation.
//!
//! Every section and field is optional; an empty file yields the built-in
//! defaults (pipe depth 32, passthrough strategy, 1 kHz tick, 1 Hz
//! housekeeping, home pose only, no event filtering). A `[[poses]]` table
//! replaces the presets, but pose 0 stays the home pose unless listed.
//!
//! ```toml
//! [shared]
//! log_level = "info"
//!
//! [bus]
//! pipe_depth = 32
//!
//! [control]
//! strategy = "proportional_correction"
//! gain = 0.01
//! tick_hz = 1000
//! hk_hz = 1
//!
//! [[poses]]
//! id = 0
//! name = "home"
//! joints = [0.0, 0.0, 0.0, -3.1415927, 0.0, 0.0, 0.0]
//!
//! [[events.filters]]
//! event = "command_mode"
//! mask = 0xFFFF
//! ```

use std::path::Path;
use std::time::Duration;

use arm_common::config::{ConfigError, ConfigLoader, SharedConfig};
use arm_common::consts::{HK_HZ_DEFAULT, KP_DEFAULT, MAX_POSES, PIPE_DEPTH, TICK_HZ_DEFAULT};
use serde::{Deserialize, Serialize};

use crate::control::ControlStrategy;
use crate::events::{EventId, EventSink, FilteredEvents, TracingEvents};
use crate::pose::{PosePreset, PoseTable, builtin_presets};

// ─── Sections ───────────────────────────────────────────────────────

/// `[bus]`: inbound pipe parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// Maximum number of frames queued on the inbound pipe.
    #[serde(default = "default_pipe_depth")]
    pub pipe_depth: usize,
}

fn default_pipe_depth() -> usize {
    PIPE_DEPTH
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            pipe_depth: default_pipe_depth(),
        }
    }
}

/// Strategy selector as written in TOML.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    #[default]
    Passthrough,
    ProportionalCorrection,
}

/// `[control]`: control-loop parameters and scheduler rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Proportional gain, used by `proportional_correction` only.
    #[serde(default = "default_gain")]
    pub gain: f32,

    /// High-rate tick frequency [Hz].
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Housekeeping request frequency [Hz].
    #[serde(default = "default_hk_hz")]
    pub hk_hz: u32,
}

fn default_gain() -> f32 {
    KP_DEFAULT
}
fn default_tick_hz() -> u32 {
    TICK_HZ_DEFAULT
}
fn default_hk_hz() -> u32 {
    HK_HZ_DEFAULT
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            gain: default_gain(),
            tick_hz: default_tick_hz(),
            hk_hz: default_hk_hz(),
        }
    }
}

impl ControlConfig {
    #[inline]
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(1) / self.tick_hz.max(1)
    }

    #[inline]
    pub fn hk_period(&self) -> Duration {
        Duration::from_secs(1) / self.hk_hz.max(1)
    }
}

impl From<&ControlConfig> for ControlStrategy {
    fn from(cfg: &ControlConfig) -> Self {
        match cfg.strategy {
            StrategyKind::Passthrough => Self::Passthrough,
            StrategyKind::ProportionalCorrection => Self::ProportionalCorrection { gain: cfg.gain },
        }
    }
}

/// One `[[events.filters]]` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilterConfig {
    pub event: EventId,
    #[serde(default)]
    pub mask: u16,
}

/// `[events]`: binary filter masks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub filters: Vec<EventFilterConfig>,
}

impl EventsConfig {
    /// Wrap `sink` with the configured masks.
    pub fn apply<E: EventSink>(&self, sink: E) -> FilteredEvents<E> {
        self.filters
            .iter()
            .fold(FilteredEvents::new(sink), |f, entry| f.with_mask(entry.event, entry.mask))
    }
}

// ─── Top Level ──────────────────────────────────────────────────────

/// Complete relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayConfig {
    #[serde(default)]
    pub shared: SharedConfig,
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default = "builtin_presets")]
    pub poses: heapless::Vec<PosePreset, MAX_POSES>,
    #[serde(default)]
    pub events: EventsConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            bus: BusConfig::default(),
            control: ControlConfig::default(),
            poses: builtin_presets(),
            events: EventsConfig::default(),
        }
    }
}

impl RelayConfig {
    /// Validate parameter bounds and table consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        if self.bus.pipe_depth == 0 {
            return Err(invalid("bus.pipe_depth must be > 0"));
        }

        let c = &self.control;
        if !(c.gain > 0.0 && c.gain <= 1.0) {
            return Err(invalid(format!("control.gain {} out of range (0, 1]", c.gain)));
        }
        if c.tick_hz == 0 || c.hk_hz == 0 {
            return Err(invalid(format!(
                "control rates must be > 0 (tick_hz={}, hk_hz={})",
                c.tick_hz, c.hk_hz
            )));
        }
        if c.tick_hz < c.hk_hz {
            return Err(invalid(format!(
                "control.tick_hz {} must be >= hk_hz {}",
                c.tick_hz, c.hk_hz
            )));
        }

        for (i, pose) in self.poses.iter().enumerate() {
            if self.poses[..i].iter().any(|p| p.id == pose.id) {
                return Err(invalid(format!("duplicate pose id {}", pose.id)));
            }
            if pose.joints.iter().any(|j| !j.is_finite()) {
                return Err(invalid(format!("pose {} has non-finite joints", pose.id)));
            }
        }

        Ok(())
    }

    /// Runtime control strategy selected by `[control]`.
    #[inline]
    pub fn strategy(&self) -> ControlStrategy {
        ControlStrategy::from(&self.control)
    }

    /// Preset table built from `[[poses]]`. Pose 0 falls back to the
    /// built-in home pose when the table does not define it.
    pub fn pose_table(&self) -> PoseTable {
        PoseTable::new(self.poses.clone())
    }

    /// Production event sink: tagged with `shared.service_name`, filtered
    /// by `[events]`.
    pub fn event_sink(&self) -> FilteredEvents<TracingEvents> {
        self.events.apply(TracingEvents::new(self.shared.service_name.as_str()))
    }
}

fn invalid(msg: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(msg.into())
}

// ─── Loading ────────────────────────────────────────────────────────

/// Load and validate the relay configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let config = RelayConfig::load(path)?;
    config.validate()?;
    Ok(config)
}

/// Load config from a TOML string (for testing).
pub fn load_config_from_str(content: &str) -> Result<RelayConfig, ConfigError> {
    let config = RelayConfig::from_toml(content)?;
    config.validate()?;
    Ok(config)
}
