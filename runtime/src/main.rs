//! Hexapod gait runtime — fixed-rate skid-steer walking loop.
//!
//! Steps a phase oscillator, reads the drive command (gamepad, CLI or
//! config), runs the gait controller and writes shoulder/knee targets to
//! the joints at the control frequency.
//!
//! Usage:
//!   hexapod-gait-runtime --config ~/hexapod_config.json --left 0.5 --right 0.5

use anyhow::{Context, Result};
use clap::Parser;
use nalgebra::Point3;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use hexapod_gait::config::HexapodConfig;
use hexapod_gait::{DriveInput, GaitController, LegJoints, OscillatorSource, PhaseOscillator};

#[cfg(feature = "gamepad")]
use hexapod_gait::gamepad::Gamepad;

/// Hexapod gait runtime.
#[derive(Parser, Debug)]
#[command(name = "hexapod-gait-runtime")]
#[command(about = "Skid-steer gait controller for a six-legged walker")]
struct Args {
    /// Path to the hexapod configuration JSON file.
    #[arg(long, default_value = "~/hexapod_config.json")]
    config: PathBuf,

    /// Control loop frequency in Hz.
    #[arg(short = 'c', long, default_value_t = 60)]
    control_freq: u32,

    /// Left track command in [-1, 1]. Overrides the config.
    #[arg(long, allow_hyphen_values = true)]
    left: Option<f64>,

    /// Right track command in [-1, 1]. Overrides the config.
    #[arg(long, allow_hyphen_values = true)]
    right: Option<f64>,

    /// Stop after this many seconds. Runs forever if not set.
    #[arg(long)]
    duration_secs: Option<f64>,

    /// Log a status line every N ticks (0 disables it).
    #[arg(long, default_value_t = 60)]
    status_every: u64,

    /// Read the drive command from a gamepad.
    #[cfg(feature = "gamepad")]
    #[arg(long, default_value_t = false)]
    gamepad: bool,
}

fn main() -> Result<()> {
    // Initialize structured JSON logging
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    anyhow::ensure!(args.control_freq > 0, "control frequency must be positive");
    let run_for = run_duration(args.duration_secs)?;

    let config_path = expand_home(&args.config);

    tracing::info!("Hexapod gait runtime starting");
    tracing::info!("Config: {}", config_path.display());
    tracing::info!("Control frequency: {} Hz", args.control_freq);

    let config = HexapodConfig::load(&config_path).context("Failed to load hexapod config")?;

    let fixed_drive = DriveInput::new(
        args.left.unwrap_or(config.drive.left),
        args.right.unwrap_or(config.drive.right),
    );

    let mut joints = LegJoints::from_specs(&config.shoulders, &config.knees);
    let mut oscillator =
        PhaseOscillator::new(config.oscillator.frequency_hz, config.oscillator.initial_phases);
    let mut controller = GaitController::new(config.gait_params());

    #[cfg(feature = "gamepad")]
    let mut gamepad = if args.gamepad {
        Some(Gamepad::new(50))
    } else {
        None
    };

    #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
    let mut paused = config.start_paused;
    #[cfg_attr(not(feature = "gamepad"), allow(unused_mut))]
    let mut drive = fixed_drive;
    if paused {
        tracing::info!("Starting paused");
    } else {
        controller.enable(drive);
    }

    let control_period = Duration::from_secs_f64(1.0 / args.control_freq as f64);
    let start_time = Instant::now();
    let mut last_tick = Instant::now();
    let mut ticks: u64 = 0;

    tracing::info!("Entering control loop at {} Hz", args.control_freq);

    loop {
        let tick_start = Instant::now();
        let dt = tick_start.duration_since(last_tick).as_secs_f64();
        last_tick = tick_start;

        if run_for.is_some_and(|limit| start_time.elapsed() >= limit) {
            tracing::info!("Run duration reached after {} ticks", ticks);
            break;
        }

        // ── Drive input ──

        #[cfg(feature = "gamepad")]
        if let Some(ref mut pad) = gamepad {
            let output = *pad.latest();
            drive = output.drive;
            oscillator.set_sprint(output.sprint.is_pressed);

            if output.pause.triggered {
                paused = !paused;
                if paused {
                    tracing::info!("PAUSED");
                    controller.disable();
                } else {
                    tracing::info!("UNPAUSED");
                    oscillator.reset();
                    controller.enable(drive);
                }
            }
        }

        if paused {
            std::thread::sleep(Duration::from_millis(100));
            continue;
        }

        // ── Gait ──

        oscillator.step(dt);
        let phases = oscillator.phases();

        match controller.tick(dt, phases.as_ref(), drive, &mut joints) {
            Ok(targets) => {
                ticks += 1;
                if args.status_every > 0 && ticks % args.status_every == 0 {
                    log_status(&controller, &config, &targets);
                }
            }
            Err(skip) => tracing::debug!("Tick skipped: {}", skip),
        }

        // ── Timing ──

        let took = tick_start.elapsed();
        if took > control_period {
            let overshoot = took - control_period;
            tracing::warn!(
                "Control budget exceeded by {:.1}ms",
                overshoot.as_secs_f64() * 1000.0
            );
        } else {
            spin_sleep::sleep(control_period - took);
        }
    }

    controller.disable();
    Ok(())
}

fn log_status(
    controller: &GaitController,
    config: &HexapodConfig,
    targets: &hexapod_gait::JointTargets,
) {
    let Some(state) = controller.state() else {
        return;
    };
    tracing::info!(
        amplitude = ?state.amplitudes(),
        phase_offset = ?state.phase_offsets(),
        shoulder = ?targets.shoulder,
        knee = ?targets.knee,
        knee_gain = targets.knee_gain,
        "Gait status"
    );
    if let Some(pose) = config.camera.frame(Some(Point3::origin())) {
        tracing::debug!(position = ?pose.position, "Camera pose");
    }
}

/// Validate `--duration-secs` and turn it into a run limit.
fn run_duration(secs: Option<f64>) -> Result<Option<Duration>> {
    let Some(secs) = secs else {
        return Ok(None);
    };
    anyhow::ensure!(
        secs.is_finite() && secs >= 0.0,
        "duration must be a non-negative number of seconds, got {}",
        secs
    );
    Ok(Some(Duration::from_secs_f64(secs)))
}

/// Expand `~` at the start of a path to the user's home directory.
fn expand_home(path: &Path) -> PathBuf {
    if let Some(s) = path.to_str() {
        if let Some(rest) = s.strip_prefix("~/") {
            if let Ok(home) = std::env::var("HOME") {
                return PathBuf::from(home).join(rest);
            }
        }
    }
    path.to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_duration_rejects_bad_values() {
        assert!(run_duration(Some(-1.0)).is_err());
        assert!(run_duration(Some(f64::NAN)).is_err());
        assert!(run_duration(Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_run_duration_accepts_valid_values() {
        assert_eq!(run_duration(None).unwrap(), None);
        assert_eq!(run_duration(Some(1.5)).unwrap(), Some(Duration::from_millis(1500)));
    }
}
