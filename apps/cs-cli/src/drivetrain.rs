//! Drivetrain control graph.
//!
//! ```text
//! angle_ref ─(+)─ angle_error ─ angle_pid ─ angle_gain ──────────────┬─ ff_turn
//! gyro ─────(−)┘                                  │                  │
//!                      gyro_rate ─ rate_filter ─(−)─ rotate_error ─ rotate_pid
//! pos_ref ─(+)─ pos_error ─ pos_pid ─ pos_gain ─┬─ ff_drive
//! encoder ─(−)┘                                 │
//!                            velocity ──────(−)─ vel_error ─ vel_pid
//!
//! left  = vel_pid + ff_drive + rotate_pid + ff_turn
//! right = vel_pid + ff_drive − rotate_pid − ff_turn
//! ```
//!
//! Shared upstream nodes are pulled once per consumer, so stages feeding more
//! than one sum should keep their integral and derivative gains at zero or
//! accept the extra state advance per tick. The same holds for `rate_filter`:
//! it is reached through both motor sums and so advances twice per tick,
//! which halves its effective time constant.

use std::cell::RefCell;
use std::rc::Rc;

use cs_nodes::{ConstantRef, Gain, Node, NodeResult, Output, Pid, Source, Sum};

use crate::config::DriveConfig;
use crate::plant::SimDrive;

pub struct DriveTrain {
    plant: Rc<RefCell<SimDrive>>,
    pos_ref: Rc<ConstantRef>,
    angle_ref: Rc<ConstantRef>,
    pos_pid: Rc<Pid>,
    angle_pid: Rc<Pid>,
    left_output: RefCell<Output>,
    right_output: RefCell<Output>,
    position_tolerance: f64,
    angle_tolerance: f64,
}

impl DriveTrain {
    /// Compose the graph. Outputs start disabled (closed loop stopped).
    pub fn new(config: &DriveConfig, plant: Rc<RefCell<SimDrive>>) -> NodeResult<Self> {
        let period = config.period;
        let loops = &config.loops;

        // Angle cascade
        let angle_ref = ConstantRef::shared(0.0);
        let gyro_angle = {
            let plant = Rc::clone(&plant);
            Source::shared(move || plant.borrow().angle())
        };
        let angle_error = Rc::new(Sum::new().plus(angle_ref.clone()).minus(gyro_angle));
        let angle_pid = Rc::new(loops.angle.build(angle_error, period)?);
        let angle_gain = Rc::new(Gain::new(loops.rotate_max_speed, angle_pid.clone()));

        let gyro_rate = {
            let plant = Rc::clone(&plant);
            Source::shared(move || plant.borrow().angular_rate())
        };
        let rate_filter = Rc::new(loops.rotate_filter.build(gyro_rate, period)?);
        let rotate_error = Rc::new(Sum::new().plus(angle_gain.clone()).minus(rate_filter));
        let rotate_pid = Rc::new(loops.rotate_rate.build(rotate_error, period)?);

        // Position cascade
        let pos_ref = ConstantRef::shared(0.0);
        let encoder = {
            let plant = Rc::clone(&plant);
            Source::shared(move || plant.borrow().position())
        };
        let pos_error = Rc::new(Sum::new().plus(pos_ref.clone()).minus(encoder));
        let pos_pid = Rc::new(loops.position.build(pos_error, period)?);
        let pos_gain = Rc::new(Gain::new(loops.drive_max_speed, pos_pid.clone()));

        let velocity = {
            let plant = Rc::clone(&plant);
            Source::shared(move || plant.borrow().velocity())
        };
        let vel_error = Rc::new(Sum::new().plus(pos_gain.clone()).minus(velocity));
        let vel_pid = Rc::new(loops.velocity.build(vel_error, period)?);

        // Motor mixing
        let ff_drive = Rc::new(Gain::new(1.0 / loops.drive_max_speed, pos_gain));
        let ff_turn = Rc::new(Gain::new(1.0 / loops.rotate_max_speed, angle_gain));
        let left = Sum::new()
            .plus(vel_pid.clone())
            .plus(ff_drive.clone())
            .plus(rotate_pid.clone())
            .plus(ff_turn.clone());
        let right = Sum::new()
            .plus(vel_pid)
            .plus(ff_drive)
            .minus(rotate_pid)
            .minus(ff_turn);

        let left_plant = Rc::clone(&plant);
        let right_plant = Rc::clone(&plant);
        let mut left_output = Output::new(
            Rc::new(left),
            move |command: f64| left_plant.borrow_mut().set_left(command),
            period,
        );
        let mut right_output = Output::new(
            Rc::new(right),
            move |command: f64| right_plant.borrow_mut().set_right(command),
            period,
        );
        left_output.disable()?;
        right_output.disable()?;

        Ok(Self {
            plant,
            pos_ref,
            angle_ref,
            pos_pid,
            angle_pid,
            left_output: RefCell::new(left_output),
            right_output: RefCell::new(right_output),
            position_tolerance: loops.position_tolerance,
            angle_tolerance: loops.angle_tolerance,
        })
    }

    /// Pull both motor sums and forward them to the plant.
    pub fn write_outputs(&self) -> NodeResult<()> {
        self.left_output.borrow_mut().write()?;
        self.right_output.borrow_mut().write()?;
        Ok(())
    }

    pub fn start_closed_loop(&self) {
        self.left_output.borrow_mut().enable();
        self.right_output.borrow_mut().enable();
    }

    /// Disable both outputs, commanding zero once.
    pub fn stop_closed_loop(&self) -> NodeResult<()> {
        self.left_output.borrow_mut().disable()?;
        self.right_output.borrow_mut().disable()?;
        Ok(())
    }

    pub fn is_closed_loop(&self) -> bool {
        self.left_output.borrow().is_enabled()
    }

    pub fn set_position_reference(&self, position: f64) {
        self.pos_ref.set(position);
    }

    pub fn set_angle_reference(&self, angle: f64) {
        self.angle_ref.set(angle);
    }

    pub fn position_reference(&self) -> f64 {
        self.pos_ref.get()
    }

    pub fn angle_reference(&self) -> f64 {
        self.angle_ref.get()
    }

    pub fn pos_at_reference(&self) -> bool {
        self.pos_pid.at_reference(self.position_tolerance)
    }

    pub fn angle_at_reference(&self) -> bool {
        self.angle_pid.at_reference(self.angle_tolerance)
    }

    /// Zero the encoders and forget the position loop's running state.
    pub fn reset_encoders(&self) {
        self.plant.borrow_mut().reset_encoders();
        self.pos_pid.reset();
    }

    pub fn reset_gyro(&self) {
        self.plant.borrow_mut().reset_gyro();
        self.angle_pid.reset();
    }

    pub fn position(&self) -> f64 {
        self.plant.borrow().position()
    }

    pub fn angle(&self) -> f64 {
        self.plant.borrow().angle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rig() -> (Rc<RefCell<SimDrive>>, DriveTrain) {
        let config = DriveConfig::default();
        let plant = Rc::new(RefCell::new(SimDrive::new(&config.plant)));
        let drive = DriveTrain::new(&config, Rc::clone(&plant)).unwrap();
        (plant, drive)
    }

    #[test]
    fn outputs_start_disabled() {
        let (plant, drive) = rig();
        drive.set_position_reference(10.0);
        drive.write_outputs().unwrap();
        assert!(!drive.is_closed_loop());
        assert_eq!(plant.borrow().commands(), (0.0, 0.0));
    }

    #[test]
    fn position_reference_drives_both_sides_equally() {
        let (plant, drive) = rig();
        drive.start_closed_loop();
        drive.set_position_reference(10.0);
        drive.write_outputs().unwrap();
        let (l, r) = plant.borrow().commands();
        assert!(l > 0.0);
        assert!((l - r).abs() < 1e-12);
    }

    #[test]
    fn angle_reference_drives_sides_apart() {
        let (plant, drive) = rig();
        drive.start_closed_loop();
        drive.set_angle_reference(30.0);
        drive.write_outputs().unwrap();
        let (l, r) = plant.borrow().commands();
        assert!(l > 0.0);
        assert!((l + r).abs() < 1e-12);
    }

    #[test]
    fn stop_closed_loop_zeroes_commands() {
        let (plant, drive) = rig();
        drive.start_closed_loop();
        drive.set_position_reference(10.0);
        drive.write_outputs().unwrap();
        drive.stop_closed_loop().unwrap();
        assert_eq!(plant.borrow().commands(), (0.0, 0.0));
    }

    #[test]
    fn at_reference_after_settling() {
        let (plant, drive) = rig();
        drive.start_closed_loop();
        drive.set_position_reference(20.0);
        for _ in 0..2000 {
            drive.write_outputs().unwrap();
            plant.borrow_mut().step(0.005);
        }
        assert!(drive.pos_at_reference());
        assert!(drive.angle_at_reference());
        assert!((drive.position() - 20.0).abs() < 1.0);
        assert!(drive.angle().abs() < 1e-9);
    }
}
