//! Pose preset table: `pose_id` → joint vector.
//!
//! A finite table with an explicit default branch. Pose 0 always resolves:
//! to the configured entry when one exists, otherwise to [`HOME_POSE`]. Any
//! other id that is not in the table resolves to the all-zero vector.

use core::f32::consts::PI;

use arm_common::consts::MAX_POSES;
use arm_common::joint::JointVector;
use serde::{Deserialize, Serialize};

/// Id of the built-in home pose.
pub const HOME_POSE_ID: u8 = 0;

/// Built-in pose 0: wrist 1 rotated by -π, everything else at zero.
pub const HOME_POSE: JointVector = JointVector::new([0.0, 0.0, 0.0, -PI, 0.0, 0.0, 0.0]);

/// One entry in the preset table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosePreset {
    pub id: u8,
    #[serde(default)]
    pub name: String,
    pub joints: JointVector,
}

impl PosePreset {
    /// The built-in home preset.
    pub fn home() -> Self {
        Self {
            id: HOME_POSE_ID,
            name: "home".to_string(),
            joints: HOME_POSE,
        }
    }
}

/// Outcome of a table lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PoseLookup<'a> {
    /// The id is in the table, or is the built-in home pose.
    Preset(&'a PosePreset),
    /// The id is unknown; the all-zero vector applies.
    Default,
}

impl PoseLookup<'_> {
    #[inline]
    pub fn joints(&self) -> JointVector {
        match self {
            Self::Preset(p) => p.joints,
            Self::Default => JointVector::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoseTable {
    entries: heapless::Vec<PosePreset, MAX_POSES>,
    home: PosePreset,
}

impl PoseTable {
    /// Table from configured entries. An entry with id 0 overrides the
    /// built-in home pose.
    pub fn new(entries: heapless::Vec<PosePreset, MAX_POSES>) -> Self {
        Self {
            entries,
            home: PosePreset::home(),
        }
    }

    /// Table containing only the built-in home pose.
    pub fn builtin() -> Self {
        Self::new(builtin_presets())
    }

    pub fn resolve(&self, pose_id: u8) -> PoseLookup<'_> {
        match self.entries.iter().find(|p| p.id == pose_id) {
            Some(preset) => PoseLookup::Preset(preset),
            None if pose_id == HOME_POSE_ID => PoseLookup::Preset(&self.home),
            None => PoseLookup::Default,
        }
    }

    /// Number of configured entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PoseTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in preset list, also the config default for `[[poses]]`.
pub fn builtin_presets() -> heapless::Vec<PosePreset, MAX_POSES> {
    core::iter::once(PosePreset::home()).collect()
}
