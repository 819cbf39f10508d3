//! Joint vector type shared by commands, actuator reports and telemetry.

use core::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

use crate::consts::JOINT_COUNT;

/// Fixed-size ordered tuple of joint angles [rad].
///
/// Every joint is always present. The all-zero vector is the initial value of
/// every goal, actuator state and telemetry buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JointVector(pub [f32; JOINT_COUNT]);

impl JointVector {
    /// All joints at zero.
    pub const ZERO: Self = Self([0.0; JOINT_COUNT]);

    #[inline]
    pub const fn new(joints: [f32; JOINT_COUNT]) -> Self {
        Self(joints)
    }

    #[inline]
    pub const fn as_array(&self) -> &[f32; JOINT_COUNT] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.0.iter()
    }

    /// One proportional step toward `goal`: `self + gain * (goal - self)` per joint.
    #[inline]
    pub fn step_toward(&self, goal: &JointVector, gain: f32) -> JointVector {
        let mut next = *self;
        for (cur, target) in next.0.iter_mut().zip(goal.0.iter()) {
            *cur += gain * (target - *cur);
        }
        next
    }

    /// Largest absolute per-joint difference to `other`.
    pub fn max_abs_diff(&self, other: &JointVector) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f32::max)
    }
}

impl From<[f32; JOINT_COUNT]> for JointVector {
    fn from(joints: [f32; JOINT_COUNT]) -> Self {
        Self(joints)
    }
}

impl Index<usize> for JointVector {
    type Output = f32;

    #[inline]
    fn index(&self, idx: usize) -> &f32 {
        &self.0[idx]
    }
}

impl IndexMut<usize> for JointVector {
    #[inline]
    fn index_mut(&mut self, idx: usize) -> &mut f32 {
        &mut self.0[idx]
    }
}
