//! Actuator outputs.
//!
//! An [`Output`] is the terminal stage of a control graph. Once per tick the
//! scheduler calls [`Output::write`], which pulls the source node and hands
//! the command to an [`Actuator`] collaborator (motor controller, solenoid
//! driver, simulation plant). Valid command range and saturation are the
//! actuator's concern.

use std::fmt;

use tracing::{info, warn};

use crate::error::{ActuatorError, NodeError, NodeResult};
use crate::node::NodeRef;

/// Command sink for an [`Output`].
///
/// Closures `FnMut(f64)` are actuators that never fail.
pub trait Actuator {
    /// Apply a normalized command.
    fn apply(&mut self, command: f64) -> Result<(), ActuatorError>;
}

impl<F> Actuator for F
where
    F: FnMut(f64),
{
    fn apply(&mut self, command: f64) -> Result<(), ActuatorError> {
        self(command);
        Ok(())
    }
}

/// Pulls a node and forwards its value to an actuator.
///
/// Outputs start enabled. [`Output::disable`] sends a single zero command
/// and suppresses further writes until [`Output::enable`].
pub struct Output {
    source: NodeRef,
    actuator: Box<dyn Actuator>,
    period: f64,
    enabled: bool,
}

impl Output {
    /// Create a new output.
    ///
    /// # Arguments
    ///
    /// * `source` - Node whose value is commanded
    /// * `actuator` - Collaborator receiving the command
    /// * `period` - Intended seconds between writes (not enforced)
    pub fn new(source: NodeRef, actuator: impl Actuator + 'static, period: f64) -> Self {
        Self {
            source,
            actuator: Box::new(actuator),
            period,
            enabled: true,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Pull the source and forward it. No-op while disabled.
    ///
    /// Returns the command that was sent, or `None` when disabled.
    pub fn write(&mut self) -> NodeResult<Option<f64>> {
        if !self.enabled {
            return Ok(None);
        }
        let command = self.source.get();
        self.send(command)?;
        Ok(Some(command))
    }

    pub fn enable(&mut self) {
        if !self.enabled {
            info!("output enabled");
        }
        self.enabled = true;
    }

    /// Command zero once and stop forwarding.
    pub fn disable(&mut self) -> NodeResult<()> {
        let was_enabled = self.enabled;
        self.enabled = false;
        if was_enabled {
            info!("output disabled");
            self.send(0.0)?;
        }
        Ok(())
    }

    fn send(&mut self, command: f64) -> NodeResult<()> {
        self.actuator.apply(command).map_err(|source| {
            warn!(command, error = %source, "actuator rejected command");
            NodeError::Actuator { source }
        })
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output")
            .field("period", &self.period)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
