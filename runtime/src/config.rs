//! Robot configuration loader — reads a JSON file with gait tuning and joint ranges.

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::camera::{CameraRig, MAX_DISTANCE};
use crate::drive::{DriveInput, LEG_COUNT};
use crate::gait::GaitParams;
use crate::joints::{joint_name, JointKind, JointLimits, JointSpec};

/// Editor ranges of the tunables.
const SIG_RANGE: (f64, f64) = (0.0, 10.0);
const SMOOTHING_RANGE: (f64, f64) = (0.0, 2.0);

/// Top-level hexapod configuration, loaded from JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct HexapodConfig {
    #[serde(default)]
    pub start_paused: bool,

    #[serde(default = "default_sig")]
    pub sig: f64,

    #[serde(default = "default_smoothing")]
    pub smoothing: f64,

    #[serde(default = "default_max_dt")]
    pub max_dt: f64,

    /// Drive command used when no gamepad or CLI override is given.
    #[serde(default)]
    pub drive: DriveInput,

    #[serde(default)]
    pub oscillator: OscillatorConfig,

    #[serde(default = "default_shoulders")]
    pub shoulders: [JointSpec; LEG_COUNT],

    #[serde(default = "default_knees")]
    pub knees: [JointSpec; LEG_COUNT],

    #[serde(default)]
    pub camera: CameraRig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OscillatorConfig {
    #[serde(default = "default_frequency")]
    pub frequency_hz: f64,
    #[serde(default)]
    pub initial_phases: [f64; LEG_COUNT],
}

impl Default for OscillatorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: default_frequency(),
            initial_phases: [0.0; LEG_COUNT],
        }
    }
}

fn default_sig() -> f64 {
    1.0
}

fn default_smoothing() -> f64 {
    1.0
}

fn default_max_dt() -> f64 {
    0.05
}

fn default_frequency() -> f64 {
    1.0
}

fn default_shoulders() -> [JointSpec; LEG_COUNT] {
    [JointSpec::new(JointLimits::symmetric(0.5), 10.0); LEG_COUNT]
}

fn default_knees() -> [JointSpec; LEG_COUNT] {
    [JointSpec::new(JointLimits::new(-0.35, 0.7), 10.0); LEG_COUNT]
}

impl HexapodConfig {
    /// Load configuration from a JSON file. Falls back to defaults if the file is missing.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents =
            std::fs::read_to_string(path).context("Failed to read hexapod config file")?;

        let mut config: HexapodConfig =
            serde_json::from_str(&contents).context("Failed to parse hexapod config JSON")?;
        config.validate()?;

        Ok(config)
    }

    /// Clamp tunables into their ranges and reject unusable joint limits.
    pub fn validate(&mut self) -> Result<()> {
        self.sig = clamp_tunable("sig", self.sig, SIG_RANGE);
        self.smoothing = clamp_tunable("smoothing", self.smoothing, SMOOTHING_RANGE);
        self.camera.distance = clamp_tunable("camera.distance", self.camera.distance, (0.0, MAX_DISTANCE));
        self.drive = self.drive.clamped();

        ensure!(
            self.max_dt.is_finite() && self.max_dt > 0.0,
            "max_dt must be positive, got {}",
            self.max_dt
        );
        ensure!(
            self.oscillator.frequency_hz.is_finite() && self.oscillator.frequency_hz >= 0.0,
            "oscillator frequency must be non-negative, got {}",
            self.oscillator.frequency_hz
        );

        for leg in 0..LEG_COUNT {
            for (kind, spec) in [
                (JointKind::Shoulder, &self.shoulders[leg]),
                (JointKind::Knee, &self.knees[leg]),
            ] {
                ensure!(
                    spec.limits.is_valid(),
                    "invalid limits for {}: [{}, {}]",
                    joint_name(leg, kind),
                    spec.limits.min,
                    spec.limits.max
                );
            }
        }

        Ok(())
    }

    pub fn gait_params(&self) -> GaitParams {
        GaitParams {
            sig: self.sig,
            smoothing: self.smoothing,
            max_dt: self.max_dt,
        }
    }
}

fn clamp_tunable(name: &str, value: f64, (min, max): (f64, f64)) -> f64 {
    if !value.is_finite() {
        tracing::warn!("{} is not finite, using {}", name, min);
        return min;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!("{} = {} out of [{}, {}], clamped to {}", name, value, min, max, clamped);
    }
    clamped
}

impl Default for HexapodConfig {
    fn default() -> Self {
        Self {
            start_paused: false,
            sig: default_sig(),
            smoothing: default_smoothing(),
            max_dt: default_max_dt(),
            drive: DriveInput::default(),
            oscillator: OscillatorConfig::default(),
            shoulders: default_shoulders(),
            knees: default_knees(),
            camera: CameraRig::default(),
        }
    }
}
