//! Oscillator-to-joint-angle shaping.
//!
//! A raw sine of the oscillator phase is squashed through a logistic curve
//! (`sig` sets its steepness) and mapped onto the joint's angular range.
//! Shoulders are scaled by the leg's smoothed amplitude and use the fixed
//! tripod offsets; knees are phase-shifted by the smoothed per-leg phase
//! offset and scaled by a gain shared by all legs.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::drive::{DriveInput, LEG_COUNT};
use crate::joints::JointLimits;

/// Shoulder phase offsets for the tripod gait: neighbouring legs swing in antiphase.
pub const BASE_PHASE_OFFSET: [f64; LEG_COUNT] = [0.0, PI, 0.0, PI, 0.0, PI];

/// Logistic reshaping of `osc` (in [-1, 1]) back onto (-1, 1).
///
/// `sig -> 0` flattens the output toward 0, large `sig` approaches a square wave.
#[inline]
pub fn sigmoid_reshape(osc: f64, sig: f64) -> f64 {
    (1.0 / (1.0 + (-sig * osc).exp()) - 0.5) * 2.0
}

/// Linear interpolation with `t` clamped to [0, 1].
#[inline]
pub fn lerp(min: f64, max: f64, t: f64) -> f64 {
    min + (max - min) * t.clamp(0.0, 1.0)
}

/// Map a shaped oscillation in [-1, 1] onto the joint range.
#[inline]
fn to_range(limits: JointLimits, osc: f64) -> f64 {
    lerp(limits.min, limits.max, 0.5 * (osc + 1.0))
}

/// Shoulder target for `leg` before range clamping.
pub fn shoulder_target(leg: usize, phase: f64, amplitude: f64, sig: f64, limits: JointLimits) -> f64 {
    let osc = sigmoid_reshape((phase + BASE_PHASE_OFFSET[leg]).sin(), sig);
    to_range(limits, osc) * amplitude
}

/// Knee target before range clamping. `phase_offset` of ±1 shifts the knee by a quarter cycle.
pub fn knee_target(phase: f64, phase_offset: f64, gain: f64, sig: f64, limits: JointLimits) -> f64 {
    let osc = sigmoid_reshape((phase + phase_offset * FRAC_PI_2).sin(), sig);
    to_range(limits, osc) * gain
}

/// Shared knee gain: 0 when both tracks are idle, saturating toward 1.
pub fn knee_gain(drive: &DriveInput) -> f64 {
    1.0 - (-4.0 * drive.magnitude()).exp()
}
