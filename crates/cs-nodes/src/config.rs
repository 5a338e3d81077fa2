//! Serializable node configuration.
//!
//! These types describe tunable parameters of a graph so an embedding
//! subsystem can keep gains and filter choices in a config file. Loading
//! that file is the embedder's job.

use serde::{Deserialize, Serialize};

use cs_core::ensure_finite;

use crate::error::NodeResult;
use crate::filter::Filter;
use crate::node::NodeRef;
use crate::pid::Pid;

/// PID gain set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain.
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain.
    #[serde(default)]
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    pub fn validate(&self) -> NodeResult<()> {
        ensure_finite(self.kp, "kp")?;
        ensure_finite(self.ki, "ki")?;
        ensure_finite(self.kd, "kd")?;
        Ok(())
    }

    pub fn build(&self, error_node: NodeRef, period: f64) -> NodeResult<Pid> {
        Pid::with_gains(*self, error_node, period)
    }
}

/// Filter kind and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FilterSpec {
    /// One-pole low-pass.
    SinglePoleIir {
        /// Time constant in seconds.
        time_constant: f64,
    },

    /// First-order high-pass.
    HighPass {
        /// Time constant in seconds.
        time_constant: f64,
    },

    /// FIR moving average.
    MovingAverage {
        /// Number of samples averaged.
        taps: i64,
    },

    /// Explicit difference-equation gains.
    Custom {
        #[serde(default)]
        ff_gains: Vec<f64>,
        #[serde(default)]
        fb_gains: Vec<f64>,
    },
}

impl FilterSpec {
    /// Build the filter over `input`, sampled every `period` seconds.
    pub fn build(&self, input: NodeRef, period: f64) -> NodeResult<Filter> {
        match self {
            Self::SinglePoleIir { time_constant } => {
                Filter::single_pole_iir(input, *time_constant, period)
            }
            Self::HighPass { time_constant } => Filter::high_pass(input, *time_constant, period),
            Self::MovingAverage { taps } => Filter::moving_average(input, *taps),
            Self::Custom { ff_gains, fb_gains } => {
                Filter::new(input, ff_gains.clone(), fb_gains.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ConstantRef, Node};

    #[test]
    fn pid_gains_from_yaml_default_missing_terms() {
        let gains: PidGains = serde_yaml::from_str("kp: 0.08\n").unwrap();
        assert_eq!(gains, PidGains::new(0.08, 0.0, 0.0));
    }

    #[test]
    fn filter_spec_tagged_yaml() {
        let spec: FilterSpec =
            serde_yaml::from_str("type: SinglePoleIir\ntime_constant: 0.35\n").unwrap();
        assert_eq!(spec, FilterSpec::SinglePoleIir { time_constant: 0.35 });

        let spec: FilterSpec = serde_yaml::from_str("type: MovingAverage\ntaps: 3\n").unwrap();
        let input = ConstantRef::shared(3.0);
        let filter = spec.build(input, 0.01).unwrap();
        assert_eq!(filter.get(), 1.0);
    }

    #[test]
    fn custom_spec_builds_requested_taps() {
        let spec = FilterSpec::Custom {
            ff_gains: vec![0.5, 0.5],
            fb_gains: vec![],
        };
        let filter = spec.build(ConstantRef::shared(2.0), 0.01).unwrap();
        assert_eq!(filter.ff_gains().len(), 2);
        assert!(filter.fb_gains().is_empty());
    }

    #[test]
    fn invalid_specs_fail_at_build() {
        let input = ConstantRef::shared(0.0);
        assert!(
            FilterSpec::MovingAverage { taps: 0 }
                .build(input.clone(), 0.01)
                .is_err()
        );
        let huge: FilterSpec =
            serde_yaml::from_str("type: MovingAverage\ntaps: 9223372036854775807\n").unwrap();
        assert!(matches!(
            huge.build(input.clone(), 0.01),
            Err(crate::error::NodeError::InvalidArgument { .. })
        ));
        assert!(
            FilterSpec::HighPass { time_constant: -1.0 }
                .build(input.clone(), 0.01)
                .is_err()
        );
        assert!(PidGains::new(1.0, f64::NAN, 0.0).build(input, 0.01).is_err());
    }
}
