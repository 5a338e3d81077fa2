//! Drivetrain demo configuration.

use std::path::Path;

use cs_nodes::{FilterSpec, PidGains};
use serde::{Deserialize, Serialize};

use crate::error::{CliError, CliResult};

/// Everything needed to compose the drivetrain and run the routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Tick period in seconds.
    pub period: f64,
    pub loops: LoopConfig,
    pub plant: PlantConfig,
    pub sequence: SequenceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoopConfig {
    pub position: PidGains,
    pub velocity: PidGains,
    pub angle: PidGains,
    pub rotate_rate: PidGains,
    /// Velocity reference scale (in/s per unit of position loop output).
    pub drive_max_speed: f64,
    /// Rotation-rate reference scale (deg/s per unit of angle loop output).
    pub rotate_max_speed: f64,
    /// Filter on the gyro rate before the rotation-rate loop.
    pub rotate_filter: FilterSpec,
    /// Position error band (in) that counts as "at reference".
    pub position_tolerance: f64,
    /// Angle error band (deg) that counts as "at reference".
    pub angle_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantConfig {
    /// Forward speed (in/s) at full command on both sides.
    pub max_speed: f64,
    /// Turn rate (deg/s) at full differential command.
    pub max_turn_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceConfig {
    /// First straight leg (in).
    pub initial_forward: f64,
    /// Rotation at the turn (deg).
    pub rotate_angle: f64,
    /// Final straight leg (in).
    pub final_forward: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            period: 0.005,
            loops: LoopConfig {
                position: PidGains::new(0.02, 0.0, 0.0),
                velocity: PidGains::new(0.002, 0.0, 0.0),
                angle: PidGains::new(1.0 / 30.0, 0.0, 0.0),
                rotate_rate: PidGains::new(0.001, 0.0, 0.0),
                drive_max_speed: 100.0,
                rotate_max_speed: 90.0,
                rotate_filter: FilterSpec::SinglePoleIir {
                    time_constant: 0.35,
                },
                position_tolerance: 1.0,
                angle_tolerance: 1.0,
            },
            plant: PlantConfig {
                max_speed: 100.0,
                max_turn_rate: 90.0,
            },
            sequence: SequenceConfig {
                // airship peg distance minus robot length
                initial_forward: 114.3 - 39.0,
                rotate_angle: 45.0,
                final_forward: 114.3 - 39.0,
            },
        }
    }
}

impl DriveConfig {
    pub fn validate(&self) -> CliResult<()> {
        let positive = [
            ("period", self.period),
            ("loops.drive_max_speed", self.loops.drive_max_speed),
            ("loops.rotate_max_speed", self.loops.rotate_max_speed),
            ("loops.position_tolerance", self.loops.position_tolerance),
            ("loops.angle_tolerance", self.loops.angle_tolerance),
            ("plant.max_speed", self.plant.max_speed),
            ("plant.max_turn_rate", self.plant.max_turn_rate),
        ];
        for (what, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(CliError::Config {
                    what: format!("{what} must be positive, got {value}"),
                });
            }
        }
        let distances = [
            ("sequence.initial_forward", self.sequence.initial_forward),
            ("sequence.rotate_angle", self.sequence.rotate_angle),
            ("sequence.final_forward", self.sequence.final_forward),
        ];
        for (what, value) in distances {
            if !value.is_finite() {
                return Err(CliError::Config {
                    what: format!("{what} must be finite"),
                });
            }
        }
        for gains in [
            &self.loops.position,
            &self.loops.velocity,
            &self.loops.angle,
            &self.loops.rotate_rate,
        ] {
            gains.validate()?;
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> CliResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

pub fn load_config(path: &Path) -> CliResult<DriveConfig> {
    let content = std::fs::read_to_string(path)?;
    let config: DriveConfig = serde_yaml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}
