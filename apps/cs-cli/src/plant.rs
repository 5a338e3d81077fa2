//! Kinematic differential-drive plant standing in for motors, encoders and
//! the gyro.

use crate::config::PlantConfig;

/// Simulated drive base.
///
/// Each side's speed follows its command instantly. Forward speed is the
/// mean of both sides, turn rate their half-difference.
#[derive(Debug, Clone, PartialEq)]
pub struct SimDrive {
    max_speed: f64,
    max_turn_rate: f64,
    left_command: f64,
    right_command: f64,
    odometer: f64,
    heading: f64,
    encoder_offset: f64,
    gyro_offset: f64,
    velocity: f64,
    angular_rate: f64,
}

impl SimDrive {
    pub fn new(config: &PlantConfig) -> Self {
        Self {
            max_speed: config.max_speed,
            max_turn_rate: config.max_turn_rate,
            left_command: 0.0,
            right_command: 0.0,
            odometer: 0.0,
            heading: 0.0,
            encoder_offset: 0.0,
            gyro_offset: 0.0,
            velocity: 0.0,
            angular_rate: 0.0,
        }
    }

    pub fn set_left(&mut self, command: f64) {
        self.left_command = command;
    }

    pub fn set_right(&mut self, command: f64) {
        self.right_command = command;
    }

    /// Integrate one period with the latest commands.
    pub fn step(&mut self, dt: f64) {
        let (l, r) = (self.left_command, self.right_command);
        self.velocity = self.max_speed * (l + r) / 2.0;
        self.angular_rate = self.max_turn_rate * (l - r) / 2.0;
        self.odometer += self.velocity * dt;
        self.heading += self.angular_rate * dt;
    }

    /// Encoder distance since the last reset (in).
    pub fn position(&self) -> f64 {
        self.odometer - self.encoder_offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Gyro heading since the last reset (deg).
    pub fn angle(&self) -> f64 {
        self.heading - self.gyro_offset
    }

    pub fn angular_rate(&self) -> f64 {
        self.angular_rate
    }

    pub fn commands(&self) -> (f64, f64) {
        (self.left_command, self.right_command)
    }

    /// Total distance travelled, unaffected by encoder resets.
    pub fn odometer(&self) -> f64 {
        self.odometer
    }

    /// True heading, unaffected by gyro resets.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn reset_encoders(&mut self) {
        self.encoder_offset = self.odometer;
    }

    pub fn reset_gyro(&mut self) {
        self.gyro_offset = self.heading;
    }
}
