//! Discrete PID controller node.
//!
//! The controller pulls an error signal (normally a [`crate::Sum`] of
//! reference minus measurement) and advances its running state once per
//! pull:
//!
//! ```text
//! integral   += e * T
//! derivative  = (e - e_prev) / T
//! u           = kp * e + ki * integral + kd * derivative
//! ```
//!
//! There is no output clamp and no anti-windup. Saturation, if needed, is
//! composed downstream by the embedding subsystem.

use std::cell::Cell;

use cs_core::ensure_positive;

use crate::config::PidGains;
use crate::error::NodeResult;
use crate::node::{Node, NodeRef};

/// PID controller driven by an error node at a fixed period.
pub struct Pid {
    gains: Cell<PidGains>,
    period: f64,
    error_node: NodeRef,
    integral: Cell<f64>,
    prev_error: Cell<f64>,
    last_error: Cell<Option<f64>>,
}

impl Pid {
    /// Create a new PID node.
    ///
    /// # Arguments
    ///
    /// * `kp`, `ki`, `kd` - Proportional, integral and derivative gains
    /// * `error_node` - Node producing the control error
    /// * `period` - Tick period in seconds used for integration and
    ///   differentiation (must be positive)
    pub fn new(kp: f64, ki: f64, kd: f64, error_node: NodeRef, period: f64) -> NodeResult<Self> {
        Self::with_gains(PidGains::new(kp, ki, kd), error_node, period)
    }

    pub fn with_gains(gains: PidGains, error_node: NodeRef, period: f64) -> NodeResult<Self> {
        let period = ensure_positive(period, "pid period must be positive")?;
        gains.validate()?;
        Ok(Self {
            gains: Cell::new(gains),
            period,
            error_node,
            integral: Cell::new(0.0),
            prev_error: Cell::new(0.0),
            last_error: Cell::new(None),
        })
    }

    pub fn gains(&self) -> PidGains {
        self.gains.get()
    }

    /// Retune in place. Accumulated integral and previous error are kept.
    ///
    /// Non-finite gains are rejected and the previous gains stay in effect.
    pub fn set_gains(&self, kp: f64, ki: f64, kd: f64) -> NodeResult<()> {
        let gains = PidGains::new(kp, ki, kd);
        gains.validate()?;
        self.gains.set(gains);
        Ok(())
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn integral(&self) -> f64 {
        self.integral.get()
    }

    /// Error seen by the most recent evaluation, `None` before the first.
    pub fn last_error(&self) -> Option<f64> {
        self.last_error.get()
    }

    /// Whether the most recently evaluated error is within `tolerance`.
    ///
    /// Always `false` until the controller has been evaluated at least once.
    pub fn at_reference(&self, tolerance: f64) -> bool {
        self.last_error
            .get()
            .is_some_and(|e| e.abs() <= tolerance.abs())
    }

    /// Zero the integral and the derivative history.
    pub fn reset(&self) {
        self.integral.set(0.0);
        self.prev_error.set(0.0);
        self.last_error.set(None);
    }
}

impl Node for Pid {
    fn get(&self) -> f64 {
        let gains = self.gains.get();
        let error = self.error_node.get();

        let integral = self.integral.get() + error * self.period;
        self.integral.set(integral);

        let derivative = (error - self.prev_error.get()) / self.period;
        self.prev_error.set(error);
        self.last_error.set(Some(error));

        gains.kp * error + gains.ki * integral + gains.kd * derivative
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NodeError;
    use crate::node::ConstantRef;

    #[test]
    fn proportional_only_tracks_error() {
        let error = ConstantRef::shared(0.5);
        let pid = Pid::new(2.0, 0.0, 0.0, error.clone(), 0.01).unwrap();

        assert_eq!(pid.get(), 1.0);
        error.set(-4.0);
        assert_eq!(pid.get(), -8.0);
    }

    #[test]
    fn integral_accumulates_error_times_period() {
        let error = ConstantRef::shared(1.0);
        let pid = Pid::new(0.0, 1.0, 0.0, error, 0.1).unwrap();

        for _ in 0..10 {
            pid.get();
        }
        assert!((pid.integral() - 1.0).abs() < 1e-12);
        assert!((pid.get() - 1.1).abs() < 1e-12);
    }

    #[test]
    fn derivative_uses_previous_error() {
        let error = ConstantRef::shared(1.0);
        let pid = Pid::new(0.0, 0.0, 1.0, error.clone(), 0.5).unwrap();

        // previous error starts at zero
        assert_eq!(pid.get(), 2.0);
        assert_eq!(pid.get(), 0.0);
        error.set(0.0);
        assert_eq!(pid.get(), -2.0);
    }

    #[test]
    fn reset_clears_running_state() {
        let error = ConstantRef::shared(2.0);
        let pid = Pid::new(1.0, 1.0, 1.0, error, 1.0).unwrap();
        pid.get();
        assert_eq!(pid.integral(), 2.0);
        assert!(pid.at_reference(5.0));

        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), None);
        assert!(!pid.at_reference(5.0));
    }

    #[test]
    fn set_gains_keeps_integral() {
        let error = ConstantRef::shared(1.0);
        let pid = Pid::new(0.0, 1.0, 0.0, error, 1.0).unwrap();
        pid.get();
        pid.set_gains(0.0, 2.0, 0.0).unwrap();
        assert_eq!(pid.integral(), 1.0);
        assert_eq!(pid.get(), 4.0);
        assert_eq!(pid.gains(), PidGains::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn set_gains_rejects_non_finite_and_keeps_previous() {
        let error = ConstantRef::shared(1.0);
        let pid = Pid::new(2.0, 0.0, 0.0, error, 0.01).unwrap();

        assert!(matches!(
            pid.set_gains(f64::NAN, 0.0, 0.0),
            Err(NodeError::NonFinite { what: "kp", .. })
        ));
        assert!(pid.set_gains(1.0, 0.0, f64::INFINITY).is_err());
        assert_eq!(pid.gains(), PidGains::new(2.0, 0.0, 0.0));
        assert_eq!(pid.get(), 2.0);
    }

    #[test]
    fn at_reference_uses_tolerance_band() {
        let error = ConstantRef::shared(0.3);
        let pid = Pid::new(1.0, 0.0, 0.0, error.clone(), 0.01).unwrap();
        assert!(!pid.at_reference(1.0));
        pid.get();
        assert!(pid.at_reference(0.5));
        assert!(!pid.at_reference(0.1));
        error.set(-0.05);
        pid.get();
        assert!(pid.at_reference(0.1));
    }

    #[test]
    fn invalid_period_rejected() {
        let error = ConstantRef::shared(0.0);
        assert!(matches!(
            Pid::new(1.0, 0.0, 0.0, error.clone(), 0.0),
            Err(NodeError::InvalidArgument { .. })
        ));
        assert!(Pid::new(1.0, 0.0, 0.0, error.clone(), -0.01).is_err());
        assert!(matches!(
            Pid::new(f64::NAN, 0.0, 0.0, error, 0.01),
            Err(NodeError::NonFinite { .. })
        ));
    }
}
