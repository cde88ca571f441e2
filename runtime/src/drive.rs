//! Skid-steer drive commands and their per-leg gait targets.
//!
//! Legs alternate sides by index parity: even legs sit on the left track,
//! odd legs on the right. Every leg on a side follows that side's command.

use serde::{Deserialize, Serialize};

/// Number of legs on the robot.
pub const LEG_COUNT: usize = 6;

/// Which track a leg belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Side of the leg at `leg` (even = left, odd = right).
    #[inline]
    pub fn of(leg: usize) -> Self {
        if leg % 2 == 0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

/// Left/right track commands, each in [-1, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveInput {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub right: f64,
}

impl DriveInput {
    /// Build a drive command, clamping both tracks into [-1, 1].
    /// Non-finite values become 0 (stand still).
    pub fn new(left: f64, right: f64) -> Self {
        Self {
            left: sanitize(left),
            right: sanitize(right),
        }
    }

    /// Both tracks at zero.
    pub fn stopped() -> Self {
        Self::default()
    }

    /// Re-apply the [-1, 1] bound, e.g. after deserializing.
    pub fn clamped(self) -> Self {
        Self::new(self.left, self.right)
    }

    /// Command for the track that drives `side`.
    #[inline]
    pub fn track(&self, side: Side) -> f64 {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Larger of the two track magnitudes, clamped to [0, 1].
    pub fn magnitude(&self) -> f64 {
        self.left.abs().max(self.right.abs()).clamp(0.0, 1.0)
    }

    /// Same command with the tracks exchanged.
    pub fn swapped(self) -> Self {
        Self {
            left: self.right,
            right: self.left,
        }
    }

    /// Instantaneous knee phase-offset and shoulder amplitude targets for every leg.
    pub fn leg_targets(&self) -> LegTargets {
        LegTargets {
            phase_offset: std::array::from_fn(|leg| self.phase_offset_target(leg)),
            amplitude: std::array::from_fn(|leg| self.amplitude_target(leg)),
        }
    }

    /// Signed track command: the sign carries the stepping direction.
    #[inline]
    pub fn phase_offset_target(&self, leg: usize) -> f64 {
        self.track(Side::of(leg))
    }

    #[inline]
    pub fn amplitude_target(&self, leg: usize) -> f64 {
        self.track(Side::of(leg)).abs()
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Per-leg targets the smoothing filters chase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegTargets {
    /// Knee phase offset, in [-1, 1].
    pub phase_offset: [f64; LEG_COUNT],
    /// Shoulder stride amplitude, in [0, 1].
    pub amplitude: [f64; LEG_COUNT],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_follow_leg_parity() {
        let targets = DriveInput::new(0.4, -0.7).leg_targets();

        for leg in 0..LEG_COUNT {
            if leg % 2 == 0 {
                assert_eq!(targets.phase_offset[leg], 0.4);
                assert_eq!(targets.amplitude[leg], 0.4);
            } else {
                assert_eq!(targets.phase_offset[leg], -0.7);
                assert_eq!(targets.amplitude[leg], 0.7);
            }
        }
    }

    #[test]
    fn test_swapping_tracks_mirrors_legs() {
        let drive = DriveInput::new(0.9, -0.25);
        let direct = drive.leg_targets();
        let mirrored = drive.swapped().leg_targets();

        // Leg i on one side maps to its neighbour of opposite parity.
        for leg in 0..LEG_COUNT {
            let partner = leg ^ 1;
            assert_eq!(direct.phase_offset[leg], mirrored.phase_offset[partner]);
            assert_eq!(direct.amplitude[leg], mirrored.amplitude[partner]);
        }
    }

    #[test]
    fn test_out_of_range_inputs_are_clamped() {
        let drive = DriveInput::new(3.0, -12.5);
        assert_eq!(drive.left, 1.0);
        assert_eq!(drive.right, -1.0);

        let targets = drive.leg_targets();
        assert!(targets.amplitude.iter().all(|&a| (0.0..=1.0).contains(&a)));
    }

    #[test]
    fn test_non_finite_inputs_stop_the_track() {
        let drive = DriveInput::new(f64::NAN, f64::INFINITY);
        assert_eq!(drive, DriveInput::stopped());
    }

    #[test]
    fn test_magnitude_uses_larger_track() {
        assert_eq!(DriveInput::new(-0.8, 0.3).magnitude(), 0.8);
        assert_eq!(DriveInput::stopped().magnitude(), 0.0);
    }

    #[test]
    fn test_deserialized_drive_can_be_reclamped() {
        let drive: DriveInput = serde_json::from_str(r#"{"left": 2.0}"#).unwrap();
        assert_eq!(drive.right, 0.0);
        assert_eq!(drive.clamped().left, 1.0);
    }
}
