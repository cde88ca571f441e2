//! Skid-steer gait control for a six-legged walker.
//!
//! A phase source drives every leg's rhythm; two track commands shape
//! stride amplitude and knee phasing through critically damped filters,
//! and the result is written to shoulder and knee joints each tick.

pub mod camera;
pub mod config;
pub mod drive;
pub mod gait;
pub mod gamepad;
pub mod joints;
pub mod oscillator;
pub mod shaping;
pub mod spring;

pub use drive::{DriveInput, LegTargets, Side, LEG_COUNT};
pub use gait::{GaitController, GaitParams, GaitState, JointTargets, TickSkipped};
pub use joints::{Joint, JointLimits, JointSpec, LegJoints, VirtualJoint};
pub use oscillator::{OscillatorSource, PhaseOscillator};
