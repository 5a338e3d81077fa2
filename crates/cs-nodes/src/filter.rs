//! Linear FIR/IIR difference-equation filter node.
//!
//! ```text
//! y[n] = Σ ff[i] * x[n-i]  -  Σ fb[i] * y[n-1-i]
//! ```
//!
//! The input history holds one slot per feed-forward gain and the output
//! history one slot per feed-back gain. Both lengths are fixed at
//! construction.
//!
//! # Factories
//!
//! - [`Filter::single_pole_iir`]: `y[n] = (1 - g) x[n] + g y[n-1]`
//! - [`Filter::high_pass`]: `y[n] = g x[n] - g x[n-1] + g y[n-1]`
//! - [`Filter::moving_average`]: mean of the last `taps` samples
//!
//! with `g = exp(-period / time_constant)`. The two exponential forms are
//! stable for any positive time constant; the moving average is always
//! stable.

use std::cell::RefCell;

use cs_core::{ensure_all_finite, ensure_positive};

use crate::circular_buffer::CircularBuffer;
use crate::error::{NodeError, NodeResult};
use crate::node::{Node, NodeRef};

/// Largest tap count accepted by [`Filter::moving_average`].
pub const MAX_MOVING_AVERAGE_TAPS: i64 = 1 << 16;

#[derive(Debug, Clone)]
struct History {
    inputs: CircularBuffer,
    outputs: CircularBuffer,
}

/// Filter over samples pulled from one upstream node.
pub struct Filter {
    input: NodeRef,
    ff_gains: Vec<f64>,
    fb_gains: Vec<f64>,
    history: RefCell<History>,
}

impl Filter {
    /// Create a filter from explicit feed-forward and feed-back gains.
    ///
    /// Either list may be empty. All gains must be finite.
    pub fn new(input: NodeRef, ff_gains: Vec<f64>, fb_gains: Vec<f64>) -> NodeResult<Self> {
        ensure_all_finite(&ff_gains, "feed-forward gain")?;
        ensure_all_finite(&fb_gains, "feed-back gain")?;
        let history = History {
            inputs: CircularBuffer::new(ff_gains.len()),
            outputs: CircularBuffer::new(fb_gains.len()),
        };
        Ok(Self {
            input,
            ff_gains,
            fb_gains,
            history: RefCell::new(history),
        })
    }

    /// One-pole IIR low-pass.
    ///
    /// # Arguments
    ///
    /// * `time_constant` - Discrete-time time constant in seconds
    /// * `period` - Seconds between samples
    pub fn single_pole_iir(input: NodeRef, time_constant: f64, period: f64) -> NodeResult<Self> {
        let gain = pole_gain(time_constant, period)?;
        Self::new(input, vec![1.0 - gain], vec![-gain])
    }

    /// First-order high-pass.
    pub fn high_pass(input: NodeRef, time_constant: f64, period: f64) -> NodeResult<Self> {
        let gain = pole_gain(time_constant, period)?;
        Self::new(input, vec![gain, -gain], vec![-gain])
    }

    /// K-tap FIR moving average. Higher `taps` is smoother but slower.
    ///
    /// `taps` must lie in `1..=MAX_MOVING_AVERAGE_TAPS`.
    pub fn moving_average(input: NodeRef, taps: i64) -> NodeResult<Self> {
        if taps <= 0 {
            return Err(NodeError::InvalidArgument {
                what: "moving average taps must be positive",
            });
        }
        if taps > MAX_MOVING_AVERAGE_TAPS {
            return Err(NodeError::InvalidArgument {
                what: "moving average taps exceed the supported history length",
            });
        }
        let taps = usize::try_from(taps).map_err(|_| NodeError::InvalidArgument {
            what: "moving average taps out of range",
        })?;
        Self::new(input, vec![1.0 / taps as f64; taps], Vec::new())
    }

    pub fn ff_gains(&self) -> &[f64] {
        &self.ff_gains
    }

    pub fn fb_gains(&self) -> &[f64] {
        &self.fb_gains
    }

    /// Zero both histories in place.
    pub fn reset(&self) {
        let mut history = self.history.borrow_mut();
        history.inputs.reset();
        history.outputs.reset();
    }
}

fn pole_gain(time_constant: f64, period: f64) -> NodeResult<f64> {
    let time_constant = ensure_positive(time_constant, "filter time constant must be positive")?;
    let period = ensure_positive(period, "filter period must be positive")?;
    Ok((-period / time_constant).exp())
}

impl Node for Filter {
    fn get(&self) -> f64 {
        // Pull before borrowing so an upstream that reads this filter's
        // siblings never observes a held borrow.
        let sample = self.input.get();

        let mut history = self.history.borrow_mut();
        history.inputs.push_front(sample);

        let mut out = 0.0;
        for (i, g) in self.ff_gains.iter().enumerate() {
            out += history.inputs[i] * g;
        }
        for (i, g) in self.fb_gains.iter().enumerate() {
            out -= history.outputs[i] * g;
        }

        history.outputs.push_front(out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::ConstantRef;

    #[test]
    fn moving_average_of_one_is_identity() {
        let input = ConstantRef::shared(0.0);
        let filter = Filter::moving_average(input.clone(), 1).unwrap();
        for v in [3.0, -1.0, 7.5, 0.25] {
            input.set(v);
            assert_eq!(filter.get(), v);
        }
    }

    #[test]
    fn moving_average_warms_up_from_zero() {
        let input = ConstantRef::shared(4.0);
        let filter = Filter::moving_average(input, 4).unwrap();
        assert_eq!(filter.get(), 1.0);
        assert_eq!(filter.get(), 2.0);
        assert_eq!(filter.get(), 3.0);
        assert_eq!(filter.get(), 4.0);
        assert_eq!(filter.get(), 4.0);
    }

    #[test]
    fn moving_average_rejects_non_positive_taps() {
        let input = ConstantRef::shared(0.0);
        assert!(matches!(
            Filter::moving_average(input.clone(), 0),
            Err(NodeError::InvalidArgument { .. })
        ));
        assert!(Filter::moving_average(input, -3).is_err());
    }

    #[test]
    fn moving_average_rejects_oversized_history() {
        let input = ConstantRef::shared(0.0);
        for taps in [MAX_MOVING_AVERAGE_TAPS + 1, i64::MAX] {
            assert!(matches!(
                Filter::moving_average(input.clone(), taps),
                Err(NodeError::InvalidArgument { .. })
            ));
        }
        let widest = Filter::moving_average(input, MAX_MOVING_AVERAGE_TAPS).unwrap();
        assert_eq!(widest.ff_gains().len(), 1 << 16);
    }

    #[test]
    fn single_pole_coefficients() {
        let input = ConstantRef::shared(0.0);
        let filter = Filter::single_pole_iir(input, 0.35, 0.005).unwrap();
        let g = (-0.005_f64 / 0.35).exp();
        assert_eq!(filter.ff_gains(), &[1.0 - g]);
        assert_eq!(filter.fb_gains(), &[-g]);
    }

    #[test]
    fn single_pole_step_converges_without_overshoot() {
        let input = ConstantRef::shared(1.0);
        let filter = Filter::single_pole_iir(input, 0.1, 0.01).unwrap();
        let mut prev = 0.0;
        for _ in 0..500 {
            let y = filter.get();
            assert!(y >= prev - 1e-12);
            assert!(y <= 1.0 + 1e-12);
            prev = y;
        }
        assert!((1.0 - prev).abs() < 1e-6);
    }

    #[test]
    fn high_pass_rejects_constant_input() {
        let input = ConstantRef::shared(2.0);
        let filter = Filter::high_pass(input, 0.05, 0.01).unwrap();
        let g = (-0.01_f64 / 0.05).exp();
        assert!((filter.get() - 2.0 * g).abs() < 1e-12);
        let mut last = 0.0;
        for _ in 0..200 {
            last = filter.get();
        }
        assert!(last.abs() < 1e-6);
    }

    #[test]
    fn reset_restores_initial_response() {
        let input = ConstantRef::shared(1.0);
        let filter = Filter::single_pole_iir(input, 0.2, 0.01).unwrap();
        let first = filter.get();
        filter.get();
        filter.get();
        filter.reset();
        assert_eq!(filter.get(), first);
        assert_eq!(filter.ff_gains().len(), 1);
        assert_eq!(filter.fb_gains().len(), 1);
    }

    #[test]
    fn custom_gains_with_empty_lists() {
        let input = ConstantRef::shared(5.0);
        let silent = Filter::new(input.clone(), Vec::new(), Vec::new()).unwrap();
        assert_eq!(silent.get(), 0.0);

        // y[n] = x[n] - x[n-1]
        let diff = Filter::new(input.clone(), vec![1.0, -1.0], Vec::new()).unwrap();
        assert_eq!(diff.get(), 5.0);
        assert_eq!(diff.get(), 0.0);
        input.set(8.0);
        assert_eq!(diff.get(), 3.0);
    }

    #[test]
    fn invalid_factory_parameters() {
        let input = ConstantRef::shared(0.0);
        assert!(Filter::single_pole_iir(input.clone(), 0.0, 0.01).is_err());
        assert!(Filter::high_pass(input.clone(), 0.1, -0.01).is_err());
        assert!(matches!(
            Filter::new(input, vec![f64::INFINITY], Vec::new()),
            Err(NodeError::NonFinite { .. })
        ));
    }
}
