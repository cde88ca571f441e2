//! Gamepad tank-drive input.
//!
//! The left stick's vertical axis commands the left track, the right
//! stick's vertical axis the right track. Polling runs in a background
//! thread (behind the `gamepad` feature) and hands the latest state to the
//! control loop through a single-slot channel.

use crate::drive::DriveInput;

/// Stick deflection below which a track reads as zero.
pub const DEAD_ZONE: f64 = 0.08;

/// Button state with debounce/trigger detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonState {
    pub is_pressed: bool,
    pub triggered: bool,
    released: bool,
    last_pressed_time: f64,
}

impl ButtonState {
    const TIMEOUT: f64 = 0.2;

    pub fn new() -> Self {
        Self {
            released: true,
            ..Default::default()
        }
    }

    /// Feed the raw pressed flag at time `now` (seconds).
    pub fn update(&mut self, value: bool, now: f64) {
        if self.is_pressed && !value {
            self.released = true;
        }
        self.is_pressed = value;

        if self.released && self.is_pressed && (now - self.last_pressed_time > Self::TIMEOUT) {
            self.triggered = true;
            self.last_pressed_time = now;
        } else {
            self.triggered = false;
        }

        if self.is_pressed {
            self.released = false;
        }
    }
}

/// Latest gamepad state.
#[derive(Debug, Clone, Copy)]
pub struct GamepadOutput {
    pub drive: DriveInput,
    /// Toggles pause (A / South).
    pub pause: ButtonState,
    /// Held for a faster gait (left bumper).
    pub sprint: ButtonState,
}

impl Default for GamepadOutput {
    fn default() -> Self {
        Self {
            drive: DriveInput::stopped(),
            pause: ButtonState::new(),
            sprint: ButtonState::new(),
        }
    }
}

/// Map raw stick axes (up = positive) to a tank-drive command.
pub fn tank_drive(left_y: f64, right_y: f64) -> DriveInput {
    DriveInput::new(apply_dead_zone(left_y), apply_dead_zone(right_y))
}

fn apply_dead_zone(axis: f64) -> f64 {
    if axis.abs() < DEAD_ZONE {
        0.0
    } else {
        axis
    }
}

#[cfg(feature = "gamepad")]
mod hw {
    use super::{tank_drive, ButtonState, GamepadOutput};
    use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Gamepad reader running in a background thread.
    pub struct Gamepad {
        receiver: Receiver<GamepadOutput>,
        stop_tx: Sender<()>,
        last_output: GamepadOutput,
    }

    impl Gamepad {
        /// Start polling at `poll_freq` Hz.
        pub fn new(poll_freq: u32) -> Self {
            let (data_tx, data_rx) = bounded::<GamepadOutput>(1);
            let (stop_tx, stop_rx) = bounded::<()>(1);

            let period = Duration::from_secs_f64(1.0 / poll_freq as f64);

            thread::spawn(move || {
                gamepad_worker(data_tx, stop_rx, period);
            });

            Self {
                receiver: data_rx,
                stop_tx,
                last_output: GamepadOutput::default(),
            }
        }

        /// Latest state (non-blocking).
        pub fn latest(&mut self) -> &GamepadOutput {
            if let Ok(output) = self.receiver.try_recv() {
                self.last_output = output;
            }
            &self.last_output
        }

        /// Signal the background thread to stop.
        pub fn stop(&self) {
            let _ = self.stop_tx.try_send(());
        }
    }

    impl Drop for Gamepad {
        fn drop(&mut self) {
            self.stop();
        }
    }

    fn gamepad_worker(data_tx: Sender<GamepadOutput>, stop_rx: Receiver<()>, period: Duration) {
        use gilrs::{Axis, Button, EventType, Gilrs};

        let mut gilrs = match Gilrs::new() {
            Ok(g) => g,
            Err(e) => {
                tracing::error!("Failed to initialize gamepad library: {}", e);
                return;
            }
        };

        tracing::info!("Gamepad input thread started");

        let mut left_y: f64 = 0.0;
        let mut right_y: f64 = 0.0;
        let mut a_pressed = false;
        let mut lb_pressed = false;

        let mut pause = ButtonState::new();
        let mut sprint = ButtonState::new();
        let start_time = Instant::now();

        loop {
            let tick_start = Instant::now();

            if stop_rx.try_recv().is_ok() {
                break;
            }

            while let Some(event) = gilrs.next_event() {
                match event.event {
                    EventType::AxisChanged(Axis::LeftStickY, value, _) => left_y = value as f64,
                    EventType::AxisChanged(Axis::RightStickY, value, _) => right_y = value as f64,
                    EventType::ButtonPressed(Button::South, _) => a_pressed = true,
                    EventType::ButtonReleased(Button::South, _) => a_pressed = false,
                    EventType::ButtonPressed(Button::LeftTrigger, _) => lb_pressed = true,
                    EventType::ButtonReleased(Button::LeftTrigger, _) => lb_pressed = false,
                    _ => {}
                }
            }

            let now = start_time.elapsed().as_secs_f64();
            pause.update(a_pressed, now);
            sprint.update(lb_pressed, now);

            let output = GamepadOutput {
                drive: tank_drive(left_y, right_y),
                pause,
                sprint,
            };

            match data_tx.try_send(output) {
                Ok(()) => {}
                // Receiver hasn't consumed the last one yet; next tick sends fresh data.
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Disconnected(_)) => break,
            }

            let elapsed = tick_start.elapsed();
            if elapsed < period {
                spin_sleep::sleep(period - elapsed);
            }
        }

        tracing::info!("Gamepad worker thread exiting");
    }
}

#[cfg(feature = "gamepad")]
pub use hw::Gamepad;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_triggers_once_per_press() {
        let mut button = ButtonState::new();
        button.update(true, 1.0);
        assert!(button.triggered);
        button.update(true, 1.5);
        assert!(!button.triggered);
        button.update(false, 1.6);
        button.update(true, 1.9);
        assert!(button.triggered);
    }

    #[test]
    fn test_button_debounces_fast_repeats() {
        let mut button = ButtonState::new();
        button.update(true, 1.0);
        button.update(false, 1.05);
        button.update(true, 1.1);
        assert!(!button.triggered);
    }

    #[test]
    fn test_tank_drive_dead_zone() {
        assert_eq!(tank_drive(0.05, -0.02), DriveInput::stopped());
        assert_eq!(tank_drive(0.5, -1.3), DriveInput::new(0.5, -1.0));
    }
}
