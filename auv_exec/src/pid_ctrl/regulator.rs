//! # PID regulator
//!
//! A discrete PID regulator stepped once per tick. The integral is a plain
//! running sum of the error and the derivative a plain difference, so the
//! gains absorb the tick length.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
use super::Gains;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller for a single axis
#[derive(Debug, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// Previous error, zero before the first update
    prev_error: f64,

    /// The integral accumulation
    integral: f64,

    /// Cap on the magnitude of the integral accumulation
    integral_limit: Option<f64>
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {

    /// Create a new controller with the given gains.
    pub fn new(gains: Gains, integral_limit: Option<f64>) -> Self {
        Self {
            k_p: gains.k_p,
            k_i: gains.k_i,
            k_d: gains.k_d,
            prev_error: 0f64,
            integral: 0f64,
            integral_limit
        }
    }

    /// Get the value of the controller for the given error.
    pub fn get(&mut self, error: f64) -> f64 {
        // Accumulate the integral term, holding it inside the cap
        self.integral += error;
        if let Some(limit) = self.integral_limit {
            self.integral = util::maths::clamp_sym(self.integral, limit);
        }

        let deriv = error - self.prev_error;

        // Calculate the output
        let out =
            self.k_p * error
            + self.k_i * self.integral
            + self.k_d * deriv;

        self.prev_error = error;

        out
    }

    /// Change the gains without disturbing the accumulated state.
    pub fn set_gains(&mut self, gains: Gains) {
        self.k_p = gains.k_p;
        self.k_i = gains.k_i;
        self.k_d = gains.k_d;
    }

    pub fn gains(&self) -> Gains {
        Gains::new(self.k_p, self.k_i, self.k_d)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    /// Clear the integral and previous error.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = 0f64;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_proportional_only() {
        let mut pid = PidController::new(Gains::new(1.0, 0.0, 0.0), None);

        for i in 0..1000 {
            let e = ((i as f64) * 0.37).sin() * 50.0;
            assert_eq!(pid.get(e), e);
        }
    }

    #[test]
    fn test_integral_and_derivative() {
        let mut pid = PidController::new(Gains::new(0.0, 1.0, 0.0), None);
        assert_eq!(pid.get(2.0), 2.0);
        assert_eq!(pid.get(3.0), 5.0);
        assert_eq!(pid.get(-1.0), 4.0);

        // The first derivative is taken against a previous error of zero
        let mut pid = PidController::new(Gains::new(0.0, 0.0, 1.0), None);
        assert_eq!(pid.get(2.0), 2.0);
        assert_eq!(pid.get(3.0), 1.0);
        assert_eq!(pid.get(3.0), 0.0);
    }

    #[test]
    fn test_integral_cap() {
        let mut pid = PidController::new(Gains::new(0.0, 1.0, 0.0), Some(1000.0));
        for _ in 0..100 {
            pid.get(50.0);
        }
        assert_eq!(pid.integral(), 1000.0);
        assert_eq!(pid.get(-10.0), 990.0);

        // Without a cap the accumulator runs away
        let mut pid = PidController::new(Gains::new(0.0, 1.0, 0.0), None);
        for _ in 0..100 {
            pid.get(50.0);
        }
        assert_eq!(pid.integral(), 5000.0);
    }

    #[test]
    fn test_set_gains_keeps_state() {
        let mut pid = PidController::new(Gains::new(0.0, 1.0, 0.0), None);
        pid.get(4.0);
        pid.set_gains(Gains::new(0.0, 2.0, 0.0));
        assert_eq!(pid.gains(), Gains::new(0.0, 2.0, 0.0));
        assert_eq!(pid.get(0.0), 8.0);

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
    }
}
