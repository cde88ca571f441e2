//! Per-leg phase sources.
//!
//! The gait controller does not generate rhythm itself; it reads one phase
//! angle per leg from an [`OscillatorSource`] every tick. [`PhaseOscillator`]
//! is a fixed-frequency source good enough to drive the runtime.

use std::f64::consts::TAU;

use crate::drive::LEG_COUNT;

/// Anything that can report a phase (radians) for every leg.
pub trait OscillatorSource {
    /// Current phases, or `None` while the source is not ready.
    fn phases(&self) -> Option<[f64; LEG_COUNT]>;
}

/// Uncoupled oscillators sharing one frequency.
pub struct PhaseOscillator {
    /// Cycles per second.
    pub frequency_hz: f64,

    /// Multiplier on the base frequency (1.0 = normal, >1.0 = faster gait).
    pub frequency_factor: f64,

    initial_phases: [f64; LEG_COUNT],
    phases: [f64; LEG_COUNT],
    started: bool,
}

impl PhaseOscillator {
    pub fn new(frequency_hz: f64, initial_phases: [f64; LEG_COUNT]) -> Self {
        Self {
            frequency_hz,
            frequency_factor: 1.0,
            initial_phases,
            phases: initial_phases,
            started: false,
        }
    }

    /// Advance every leg by `dt` seconds. Phases are wrapped to [0, 2π).
    pub fn step(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            tracing::debug!(dt, "Ignoring oscillator step");
            return;
        }
        let delta = TAU * self.frequency_hz * self.frequency_factor * dt;
        for phase in self.phases.iter_mut() {
            *phase = (*phase + delta).rem_euclid(TAU);
        }
        self.started = true;
    }

    /// Return to the initial phases. The source is not ready until the next step.
    pub fn reset(&mut self) {
        self.phases = self.initial_phases;
        self.started = false;
    }

    /// Set the sprint mode (higher frequency factor).
    pub fn set_sprint(&mut self, sprint: bool) {
        self.frequency_factor = if sprint { 1.3 } else { 1.0 };
    }
}

impl OscillatorSource for PhaseOscillator {
    fn phases(&self) -> Option<[f64; LEG_COUNT]> {
        self.started.then_some(self.phases)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_not_ready_until_first_step() {
        let mut osc = PhaseOscillator::new(1.0, [0.0; LEG_COUNT]);
        assert!(osc.phases().is_none());
        osc.step(0.01);
        assert!(osc.phases().is_some());
        osc.reset();
        assert!(osc.phases().is_none());
    }

    #[test]
    fn test_phase_advances_with_frequency() {
        let mut osc = PhaseOscillator::new(0.5, [0.0, 1.0, 0.0, 1.0, 0.0, 1.0]);
        osc.step(0.25);
        let phases = osc.phases().unwrap();
        assert_relative_eq!(phases[0], TAU * 0.125, epsilon = 1e-12);
        assert_relative_eq!(phases[1], 1.0 + TAU * 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_phase_wraps() {
        let mut osc = PhaseOscillator::new(1.0, [0.0; LEG_COUNT]);
        for _ in 0..1000 {
            osc.step(0.0137);
        }
        assert!(osc.phases().unwrap().iter().all(|p| (0.0..TAU).contains(p)));
    }

    #[test]
    fn test_sprint_speeds_up() {
        let mut normal = PhaseOscillator::new(1.0, [0.0; LEG_COUNT]);
        let mut sprint = PhaseOscillator::new(1.0, [0.0; LEG_COUNT]);
        sprint.set_sprint(true);
        normal.step(0.1);
        sprint.step(0.1);
        assert!(sprint.phases().unwrap()[0] > normal.phases().unwrap()[0]);
    }

    #[test]
    fn test_invalid_step_is_ignored() {
        let mut osc = PhaseOscillator::new(1.0, [0.5; LEG_COUNT]);
        osc.step(f64::NAN);
        assert!(osc.phases().is_none());
    }
}
