//! Critically damped spring smoothing.
//!
//! Each gait parameter chases its target through a second-order system
//! with damping ratio 1, integrated with one explicit Euler step per tick:
//!
//! ```text
//! a  = k * ((k / 4) * (target - x) - v)
//! v' = v + dt * a
//! x' = x + dt * v'
//! ```
//!
//! Step changes in the target therefore produce continuous, non-oscillating
//! trajectories. The scheme is only an approximation: `k * dt` must stay
//! small, which the gait controller enforces by bounding `dt`.

/// Value and first derivative of one smoothed quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CriticalSpring {
    pub value: f64,
    pub velocity: f64,
}

impl CriticalSpring {
    /// A spring sitting still at `value`.
    pub fn at_rest(value: f64) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Advance one step toward `target`.
    ///
    /// `smoothing` is the gain `k`. Zero freezes the spring; negative or NaN
    /// gains are treated as zero since they would make the system diverge.
    #[inline]
    pub fn step(self, target: f64, smoothing: f64, dt: f64) -> Self {
        let k = smoothing.max(0.0);
        let accel = k * ((k / 4.0) * (target - self.value) - self.velocity);
        let velocity = self.velocity + dt * accel;
        Self {
            value: self.value + dt * velocity,
            velocity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DT: f64 = 0.016;

    fn settle(mut spring: CriticalSpring, target: f64, smoothing: f64, seconds: f64) -> CriticalSpring {
        let steps = (seconds / DT) as usize;
        for _ in 0..steps {
            spring = spring.step(target, smoothing, DT);
        }
        spring
    }

    #[test]
    fn test_single_step_matches_equations() {
        let spring = CriticalSpring {
            value: 0.2,
            velocity: -0.1,
        };
        let next = spring.step(1.0, 2.0, 0.1);

        let accel = 2.0 * ((2.0 / 4.0) * (1.0 - 0.2) - -0.1);
        let velocity = -0.1 + 0.1 * accel;
        assert_relative_eq!(next.velocity, velocity, epsilon = 1e-12);
        assert_relative_eq!(next.value, 0.2 + 0.1 * velocity, epsilon = 1e-12);
    }

    #[test]
    fn test_converges_for_positive_gains() {
        for &smoothing in &[0.25, 1.0, 2.0, 8.0] {
            // Many characteristic times (4 / k).
            let seconds = 40.0 * 4.0 / smoothing;
            let spring = settle(CriticalSpring::at_rest(-1.0), 0.75, smoothing, seconds);
            assert_relative_eq!(spring.value, 0.75, epsilon = 1e-6);
            assert!(spring.velocity.abs() < 1e-6, "k={smoothing}: v={}", spring.velocity);
        }
    }

    #[test]
    fn test_step_response_crosses_target_at_most_once() {
        for &smoothing in &[0.5, 1.0, 2.0, 10.0] {
            let target = 1.0;
            let mut spring = CriticalSpring::at_rest(0.0);
            let mut crossings = 0;
            let mut last_error = target - spring.value;
            let mut peak: f64 = 0.0;

            for _ in 0..20_000 {
                spring = spring.step(target, smoothing, DT);
                let error = target - spring.value;
                if error.signum() != last_error.signum() && error != 0.0 {
                    crossings += 1;
                }
                last_error = error;
                peak = peak.max(spring.value);
            }

            assert!(crossings <= 1, "k={smoothing}: {crossings} crossings");
            assert!(peak <= target + 1e-3, "k={smoothing}: overshoot to {peak}");
        }
    }

    #[test]
    fn test_zero_gain_freezes() {
        let spring = CriticalSpring {
            value: 0.3,
            velocity: 0.0,
        };
        assert_eq!(spring.step(1.0, 0.0, DT), spring);
    }

    #[test]
    fn test_negative_and_nan_gains_do_not_diverge() {
        let spring = CriticalSpring {
            value: 0.3,
            velocity: 0.5,
        };
        for &gain in &[-1.0, f64::NAN] {
            let after = settle(spring, 1.0, gain, 10.0);
            // Frozen acceleration: constant velocity drift only.
            assert_relative_eq!(after.velocity, 0.5);
            assert!(after.value.is_finite());
        }
    }

    #[test]
    fn test_rest_at_target_stays_put() {
        let spring = CriticalSpring::at_rest(0.6);
        assert_eq!(spring.step(0.6, 1.5, DT), spring);
    }
}
