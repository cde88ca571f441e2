//! Actuator abstraction for the shoulder and knee joints.
//!
//! The gait controller only ever writes a target angle. Limits and
//! stiffness belong to the joint and are read-only from the controller's
//! point of view; driving the joint toward its target is the job of
//! whatever physics or servo layer sits behind the [`Joint`] trait.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::drive::{Side, LEG_COUNT};

/// Angular range of a joint (radians).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointLimits {
    pub min: f64,
    pub max: f64,
}

impl JointLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Range of `[-half_span, half_span]`.
    pub fn symmetric(half_span: f64) -> Self {
        Self::new(-half_span, half_span)
    }

    pub fn contains(&self, angle: f64) -> bool {
        (self.min..=self.max).contains(&angle)
    }

    /// Clamp `angle` into the range. Never panics, even on invalid limits.
    pub fn clamp(&self, angle: f64) -> f64 {
        angle.max(self.min).min(self.max)
    }

    /// Finite and not inverted.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }
}

/// A position-controlled joint (supports dependency injection for testing).
pub trait Joint {
    fn limits(&self) -> JointLimits;
    fn stiffness(&self) -> f64;
    fn set_target(&mut self, angle: f64);
}

/// Which joint of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    Shoulder,
    Knee,
}

impl fmt::Display for JointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JointKind::Shoulder => f.write_str("shoulder"),
            JointKind::Knee => f.write_str("knee"),
        }
    }
}

/// Human readable joint name, e.g. `left_2_knee` for leg 4.
pub fn joint_name(leg: usize, kind: JointKind) -> String {
    let side = match Side::of(leg) {
        Side::Left => "left",
        Side::Right => "right",
    };
    format!("{}_{}_{}", side, leg / 2, kind)
}

/// Configured properties of one joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    pub limits: JointLimits,
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
}

fn default_stiffness() -> f64 {
    10.0
}

impl JointSpec {
    pub fn new(limits: JointLimits, stiffness: f64) -> Self {
        Self { limits, stiffness }
    }
}

/// In-process joint that just records the last commanded target.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualJoint {
    spec: JointSpec,
    target: f64,
}

impl VirtualJoint {
    pub fn new(spec: JointSpec) -> Self {
        Self { spec, target: 0.0 }
    }

    pub fn target(&self) -> f64 {
        self.target
    }
}

impl Joint for VirtualJoint {
    fn limits(&self) -> JointLimits {
        self.spec.limits
    }

    fn stiffness(&self) -> f64 {
        self.spec.stiffness
    }

    fn set_target(&mut self, angle: f64) {
        self.target = angle;
    }
}

/// The shoulder and knee joints of every leg.
#[derive(Debug, Clone)]
pub struct LegJoints<J> {
    pub shoulders: [J; LEG_COUNT],
    pub knees: [J; LEG_COUNT],
}

impl LegJoints<VirtualJoint> {
    pub fn from_specs(shoulders: &[JointSpec; LEG_COUNT], knees: &[JointSpec; LEG_COUNT]) -> Self {
        Self {
            shoulders: shoulders.map(VirtualJoint::new),
            knees: knees.map(VirtualJoint::new),
        }
    }
}

impl<J: Joint> LegJoints<J> {
    pub fn shoulder_limits(&self) -> [JointLimits; LEG_COUNT] {
        std::array::from_fn(|leg| self.shoulders[leg].limits())
    }

    pub fn knee_limits(&self) -> [JointLimits; LEG_COUNT] {
        std::array::from_fn(|leg| self.knees[leg].limits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_names() {
        assert_eq!(joint_name(0, JointKind::Shoulder), "left_0_shoulder");
        assert_eq!(joint_name(5, JointKind::Knee), "right_2_knee");
    }

    #[test]
    fn test_limits_validity() {
        assert!(JointLimits::new(-0.2, 0.4).is_valid());
        assert!(!JointLimits::new(0.4, -0.2).is_valid());
        assert!(!JointLimits::new(f64::NAN, 0.4).is_valid());
        assert_eq!(JointLimits::symmetric(0.5).clamp(0.9), 0.5);
    }

    #[test]
    fn test_clamp_tolerates_invalid_limits() {
        let inverted = JointLimits::new(0.5, -0.5);
        assert_eq!(inverted.clamp(0.0), -0.5);
        let nan = JointLimits::new(f64::NAN, 0.4);
        assert_eq!(nan.clamp(0.9), 0.4);
    }

    #[test]
    fn test_virtual_joint_keeps_stiffness() {
        let spec = JointSpec::new(JointLimits::symmetric(1.0), 42.0);
        let mut joint = VirtualJoint::new(spec);
        joint.set_target(0.25);
        assert_eq!(joint.target(), 0.25);
        assert_eq!(joint.stiffness(), 42.0);
        assert_eq!(joint.limits(), spec.limits);
    }

    #[test]
    fn test_leg_joints_from_specs() {
        let shoulder = JointSpec::new(JointLimits::symmetric(0.5), 10.0);
        let knee = JointSpec::new(JointLimits::new(-0.2, 0.9), 8.0);
        let joints = LegJoints::from_specs(&[shoulder; LEG_COUNT], &[knee; LEG_COUNT]);
        assert_eq!(joints.shoulder_limits(), [shoulder.limits; LEG_COUNT]);
        assert_eq!(joints.knee_limits(), [knee.limits; LEG_COUNT]);
    }
}
