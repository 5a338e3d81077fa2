//! cs-cli: drivetrain demo for the ctrlsys engine.
//!
//! Composes a differential drivetrain control graph (position and angle
//! cascades) against a simulated plant and sequences an autonomous routine
//! with a state machine, one fixed-period tick at a time.

pub mod autonomous;
pub mod config;
pub mod drivetrain;
pub mod error;
pub mod plant;

pub use autonomous::{LEFT_GEAR_TERMINAL, RunSummary, START_EVENT, left_gear, run_left_gear};
pub use config::{DriveConfig, load_config};
pub use drivetrain::DriveTrain;
pub use error::{CliError, CliResult};
pub use plant::SimDrive;
