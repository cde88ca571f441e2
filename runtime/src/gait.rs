//! Skid-steer gait controller.
//!
//! Owns the smoothed per-leg gait parameters and turns oscillator phases
//! plus drive commands into joint targets once per tick. The two halves
//! are kept as pure functions ([`GaitState::advance`] and
//! [`shape_targets`]) so they can be tested without any joints.

use thiserror::Error;

use crate::drive::{DriveInput, LegTargets, LEG_COUNT};
use crate::joints::{Joint, JointKind, JointLimits, LegJoints};
use crate::shaping::{knee_gain, knee_target, shoulder_target};
use crate::spring::CriticalSpring;

/// Tunables shared by every leg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaitParams {
    /// Sigmoid steepness. 0 is flat, large values give a square wave.
    pub sig: f64,
    /// Spring gain of the parameter filters. 0 freezes them.
    pub smoothing: f64,
    /// Longest step the integrator is allowed to take (seconds).
    pub max_dt: f64,
}

impl Default for GaitParams {
    fn default() -> Self {
        Self {
            sig: 1.0,
            smoothing: 1.0,
            max_dt: 0.05,
        }
    }
}

/// Smoothed per-leg gait parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaitState {
    /// Knee phase offset per leg.
    pub phase_offset: [CriticalSpring; LEG_COUNT],
    /// Shoulder stride amplitude per leg.
    pub amplitude: [CriticalSpring; LEG_COUNT],
}

impl GaitState {
    /// State already settled on the targets of `drive`, so enabling causes no transient.
    pub fn settled(drive: &DriveInput) -> Self {
        let targets = drive.leg_targets();
        Self {
            phase_offset: targets.phase_offset.map(CriticalSpring::at_rest),
            amplitude: targets.amplitude.map(CriticalSpring::at_rest),
        }
    }

    /// One filter step of every leg toward `targets`.
    pub fn advance(self, dt: f64, targets: &LegTargets, smoothing: f64) -> Self {
        Self {
            phase_offset: std::array::from_fn(|leg| {
                self.phase_offset[leg].step(targets.phase_offset[leg], smoothing, dt)
            }),
            amplitude: std::array::from_fn(|leg| {
                self.amplitude[leg].step(targets.amplitude[leg], smoothing, dt)
            }),
        }
    }

    /// Every value and velocity is finite.
    pub fn is_finite(&self) -> bool {
        self.phase_offset
            .iter()
            .chain(self.amplitude.iter())
            .all(|s| s.value.is_finite() && s.velocity.is_finite())
    }

    pub fn phase_offsets(&self) -> [f64; LEG_COUNT] {
        self.phase_offset.map(|s| s.value)
    }

    pub fn amplitudes(&self) -> [f64; LEG_COUNT] {
        self.amplitude.map(|s| s.value)
    }
}

/// Joint targets computed for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTargets {
    pub shoulder: [f64; LEG_COUNT],
    pub knee: [f64; LEG_COUNT],
    /// Knee gain shared by all legs this tick.
    pub knee_gain: f64,
}

/// Shape joint targets from phases and the smoothed state.
///
/// Values are clamped into each joint's range; for ranges that contain
/// zero and settled parameters this never bites.
pub fn shape_targets(
    state: &GaitState,
    phases: &[f64; LEG_COUNT],
    drive: &DriveInput,
    sig: f64,
    shoulder_limits: &[JointLimits; LEG_COUNT],
    knee_limits: &[JointLimits; LEG_COUNT],
) -> JointTargets {
    let gain = knee_gain(drive);
    let shoulder = std::array::from_fn(|leg| {
        let limits = shoulder_limits[leg];
        limits.clamp(shoulder_target(leg, phases[leg], state.amplitude[leg].value, sig, limits))
    });
    let knee = std::array::from_fn(|leg| {
        let limits = knee_limits[leg];
        limits.clamp(knee_target(phases[leg], state.phase_offset[leg].value, gain, sig, limits))
    });
    JointTargets {
        shoulder,
        knee,
        knee_gain: gain,
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Why a tick left the state and the joints untouched.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TickSkipped {
    #[error("gait controller is disabled")]
    Disabled,

    #[error("oscillator has no phase yet")]
    OscillatorNotReady,

    #[error("invalid dt: {0}")]
    InvalidDt(f64),

    #[error("non-finite phase on leg {leg}")]
    NonFinitePhase { leg: usize },

    #[error("invalid limits on leg {leg} {joint}")]
    InvalidLimits { leg: usize, joint: JointKind },

    #[error("gait state diverged")]
    Diverged,
}

/// Gait controller with an enable/disable lifecycle.
#[derive(Debug, Clone)]
pub struct GaitController {
    params: GaitParams,
    state: Option<GaitState>,
}

impl GaitController {
    /// Create a disabled controller.
    ///
    /// Negative or non-finite `sig`/`smoothing` become 0. A `max_dt` that is
    /// not a positive finite number falls back to the default.
    pub fn new(params: GaitParams) -> Self {
        let max_dt = if params.max_dt.is_finite() && params.max_dt > 0.0 {
            params.max_dt
        } else {
            let fallback = GaitParams::default().max_dt;
            tracing::warn!("max_dt = {} is unusable, using {}", params.max_dt, fallback);
            fallback
        };
        Self {
            params: GaitParams {
                sig: non_negative(params.sig),
                smoothing: non_negative(params.smoothing),
                max_dt,
            },
            state: None,
        }
    }

    pub fn params(&self) -> &GaitParams {
        &self.params
    }

    /// Start tracking from `drive` with a settled state.
    pub fn enable(&mut self, drive: DriveInput) {
        self.state = Some(GaitState::settled(&drive));
        tracing::info!(left = drive.left, right = drive.right, "Gait controller enabled");
    }

    /// Drop the smoothed state.
    pub fn disable(&mut self) {
        if self.state.take().is_some() {
            tracing::info!("Gait controller disabled");
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&GaitState> {
        self.state.as_ref()
    }

    /// Advance the smoothed state by `dt` and write new targets to `joints`.
    ///
    /// `phases` is `None` while the oscillator is not ready. A skipped tick
    /// changes neither the state nor the joints.
    pub fn tick<J: Joint>(
        &mut self,
        dt: f64,
        phases: Option<&[f64; LEG_COUNT]>,
        drive: DriveInput,
        joints: &mut LegJoints<J>,
    ) -> Result<JointTargets, TickSkipped> {
        let state = self.state.ok_or(TickSkipped::Disabled)?;
        let phases = phases.ok_or(TickSkipped::OscillatorNotReady)?;
        if !dt.is_finite() || dt < 0.0 {
            return Err(TickSkipped::InvalidDt(dt));
        }
        if let Some(leg) = phases.iter().position(|p| !p.is_finite()) {
            return Err(TickSkipped::NonFinitePhase { leg });
        }
        let shoulder_limits = joints.shoulder_limits();
        let knee_limits = joints.knee_limits();
        for leg in 0..LEG_COUNT {
            if !shoulder_limits[leg].is_valid() {
                return Err(TickSkipped::InvalidLimits { leg, joint: JointKind::Shoulder });
            }
            if !knee_limits[leg].is_valid() {
                return Err(TickSkipped::InvalidLimits { leg, joint: JointKind::Knee });
            }
        }

        let dt = if dt > self.params.max_dt {
            tracing::debug!(dt, max_dt = self.params.max_dt, "Clamping dt");
            self.params.max_dt
        } else {
            dt
        };

        let drive = drive.clamped();
        let state = state.advance(dt, &drive.leg_targets(), self.params.smoothing);
        if !state.is_finite() {
            tracing::warn!(dt, smoothing = self.params.smoothing, "Gait state diverged, tick dropped");
            return Err(TickSkipped::Diverged);
        }
        let targets = shape_targets(
            &state,
            phases,
            &drive,
            self.params.sig,
            &shoulder_limits,
            &knee_limits,
        );

        for (joint, &angle) in joints.shoulders.iter_mut().zip(targets.shoulder.iter()) {
            joint.set_target(angle);
        }
        for (joint, &angle) in joints.knees.iter_mut().zip(targets.knee.iter()) {
            joint.set_target(angle);
        }

        self.state = Some(state);
        Ok(targets)
    }
}
