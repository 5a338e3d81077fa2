//! Left-gear autonomous routine.
//!
//! Drive forward to the airship, turn towards the peg and drive onto it:
//!
//! ```text
//! Idle ──"start"──▶ Initial-Forward ──at ref──▶ Rotate ──at ref──▶ Final-Forward ──at ref──▶ Idle
//! ```
//!
//! The loop is closed on leaving `Idle` and stopped once the routine is back
//! in `Idle`.

use std::cell::RefCell;
use std::rc::Rc;

use cs_statemachine::{MachineEvent, MachineResult, State, StateMachine, Transition};
use tracing::{debug, info};

use crate::config::{DriveConfig, SequenceConfig};
use crate::drivetrain::DriveTrain;
use crate::error::{CliError, CliResult};
use crate::plant::SimDrive;

/// Stack trace reported once the routine has returned to rest.
pub const LEFT_GEAR_TERMINAL: &str = "LeftGear > Idle";

/// Event that leaves `Idle`.
pub const START_EVENT: &str = "start";

/// Outcome of a simulated run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks executed after the start event.
    pub ticks: u32,
    /// Final stack trace.
    pub trace: String,
    /// States entered, in order.
    pub visited: Vec<String>,
    /// Total distance driven (in).
    pub distance: f64,
    /// Net heading change (deg).
    pub heading: f64,
}

/// Build the routine's machine against a composed drivetrain.
pub fn left_gear(drive: &Rc<DriveTrain>, sequence: &SequenceConfig) -> MachineResult<StateMachine> {
    let mut machine = StateMachine::new("LeftGear");

    let idle = {
        let enter = Rc::clone(drive);
        let leave = Rc::clone(drive);
        State::new("Idle")
            .on_entry(move || {
                enter.reset_gyro();
                enter.reset_encoders();
            })
            .with_transition(|event| {
                if event == START_EVENT {
                    Transition::to("Initial-Forward")
                } else {
                    Transition::Stay
                }
            })
            .on_exit(move || leave.start_closed_loop())
    };

    let initial_forward = {
        let enter = Rc::clone(drive);
        let check = Rc::clone(drive);
        let distance = sequence.initial_forward;
        State::new("Initial-Forward")
            .on_entry(move || enter.set_position_reference(distance))
            .with_transition(move |_| check.pos_at_reference().then_some("Rotate").into())
    };

    let rotate = {
        let enter = Rc::clone(drive);
        let check = Rc::clone(drive);
        let angle = sequence.rotate_angle;
        State::new("Rotate")
            .on_entry(move || enter.set_angle_reference(angle))
            .with_transition(move |_| {
                check
                    .angle_at_reference()
                    .then_some("Final-Forward")
                    .into()
            })
    };

    let final_forward = {
        let enter = Rc::clone(drive);
        let check = Rc::clone(drive);
        let distance = sequence.final_forward;
        State::new("Final-Forward")
            .on_entry(move || {
                enter.reset_encoders();
                enter.set_position_reference(distance);
            })
            .with_transition(move |_| check.pos_at_reference().then_some("Idle").into())
    };

    machine.add_state(idle)?;
    machine.add_state(initial_forward)?;
    machine.add_state(rotate)?;
    machine.add_state(final_forward)?;
    Ok(machine)
}

/// Run the routine against the simulated plant.
///
/// Each tick writes the drivetrain outputs, advances the plant one period and
/// runs the machine. The closed loop is always stopped before returning.
///
/// # Arguments
/// * `config` - Validated drivetrain configuration
/// * `max_ticks` - Tick budget after the start event
///
/// # Errors
/// `CliError::Timeout` if the routine has not returned to `Idle` within
/// `max_ticks`; node and machine errors are propagated as they occur.
pub fn run_left_gear(config: &DriveConfig, max_ticks: u32) -> CliResult<RunSummary> {
    config.validate()?;

    let plant = Rc::new(RefCell::new(SimDrive::new(&config.plant)));
    let drive = Rc::new(DriveTrain::new(config, Rc::clone(&plant))?);
    let mut machine = left_gear(&drive, &config.sequence)?;

    let visited = Rc::new(RefCell::new(Vec::new()));
    {
        let visited = Rc::clone(&visited);
        machine.set_hook(move |event| match *event {
            MachineEvent::Entered { state, path, .. } => {
                info!(path, "entered");
                visited.borrow_mut().push(state.to_string());
            }
            MachineEvent::Exited { path, .. } => debug!(path, "exited"),
        });
    }

    machine.run()?;
    machine.handle_event(START_EVENT);

    let outcome = drive_until_idle(&mut machine, &drive, &plant, config.period, max_ticks);
    let stopped = drive.stop_closed_loop();
    let finished = outcome?;
    stopped?;

    let trace = machine.stack_trace();
    let Some(ticks) = finished else {
        return Err(CliError::Timeout {
            ticks: max_ticks,
            trace,
        });
    };

    let plant = plant.borrow();
    let summary = RunSummary {
        ticks,
        trace,
        visited: visited.borrow().clone(),
        distance: plant.odometer(),
        heading: plant.heading(),
    };
    info!(
        ticks = summary.ticks,
        distance = summary.distance,
        heading = summary.heading,
        "routine complete"
    );
    Ok(summary)
}

/// Tick until the machine is back at rest. Returns the tick count, or `None`
/// when the budget runs out.
fn drive_until_idle(
    machine: &mut StateMachine,
    drive: &DriveTrain,
    plant: &RefCell<SimDrive>,
    period: f64,
    max_ticks: u32,
) -> CliResult<Option<u32>> {
    for tick in 1..=max_ticks {
        drive.write_outputs()?;
        plant.borrow_mut().step(period);
        machine.run()?;
        if machine.stack_trace() == LEFT_GEAR_TERMINAL {
            return Ok(Some(tick));
        }
    }
    Ok(None)
}
