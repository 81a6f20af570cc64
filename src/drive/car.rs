// Car-level drive control
//
// Maps the seven motion commands onto per-wheel rotate/stop calls. The
// direction table and the trim arithmetic are tuned to the reference
// hardware: the left side drives forward counter-clockwise (a mounting
// convention), and the constant offsets below compensate for measured
// asymmetric friction. Change them per unit, not per taste.

use tracing::debug;

use crate::config::{CarConfig, DriveBias};

use super::gpio::{GpioDriver, GpioError};
use super::wheel::Wheel;

// Inner-side duty during an arc turn. A fixed crawl, not scaled by speed,
// so the turn stays a wide arc at any commanded speed.
const ARC_INNER_DUTY: f32 = 1.0;

// Extra duty on the rear-left wheel during in-place pivots.
const PIVOT_REAR_LEFT_TRIM: f32 = 1.0;

pub struct Car {
    front_left: Wheel,
    front_right: Wheel,
    rear_left: Wheel,
    rear_right: Wheel,
    bias: DriveBias,
}

impl Car {
    /// Build the car from its configuration, acquiring all twelve output
    /// channels from the GPIO driver.
    pub fn new(config: &CarConfig, gpio: &mut dyn GpioDriver) -> Result<Self, GpioError> {
        Ok(Self {
            front_left: Wheel::new(&config.front_left, gpio)?,
            front_right: Wheel::new(&config.front_right, gpio)?,
            rear_left: Wheel::new(&config.rear_left, gpio)?,
            rear_right: Wheel::new(&config.rear_right, gpio)?,
            bias: config.bias,
        })
    }

    pub fn move_forward(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: forward");
        self.front_left
            .rotate_counter_clockwise(speed + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_clockwise(speed + self.bias.right_front_rear);
        self.rear_left
            .rotate_counter_clockwise(speed + self.bias.left_right);
        self.rear_right.rotate_clockwise(speed);
    }

    pub fn move_reverse(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: reverse");
        self.front_left
            .rotate_clockwise(speed + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_counter_clockwise(speed + self.bias.right_front_rear);
        self.rear_left
            .rotate_clockwise(speed + self.bias.left_right);
        self.rear_right.rotate_counter_clockwise(speed);
    }

    /// Wide arc to the left: the left side crawls at the fixed inner duty
    /// while the right side runs at speed.
    pub fn turn_left(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: turn left");
        self.front_left
            .rotate_counter_clockwise(ARC_INNER_DUTY + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_clockwise(speed + self.bias.right_front_rear);
        self.rear_left
            .rotate_counter_clockwise(ARC_INNER_DUTY + self.bias.left_right);
        self.rear_right.rotate_clockwise(speed);
    }

    /// Wide arc to the right, mirrored from `turn_left`.
    pub fn turn_right(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: turn right");
        self.front_left
            .rotate_counter_clockwise(speed + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_clockwise(ARC_INNER_DUTY + self.bias.right_front_rear);
        self.rear_left
            .rotate_counter_clockwise(speed + self.bias.left_right);
        self.rear_right.rotate_clockwise(ARC_INNER_DUTY);
    }

    /// Pivot in place to the left: all four wheels clockwise.
    pub fn rotate_left(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: rotate left");
        self.front_left
            .rotate_clockwise(speed + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_clockwise(speed + self.bias.right_front_rear);
        self.rear_left
            .rotate_clockwise(speed + PIVOT_REAR_LEFT_TRIM + self.bias.left_right);
        self.rear_right.rotate_clockwise(speed);
    }

    /// Pivot in place to the right: all four wheels counter-clockwise.
    pub fn rotate_right(&mut self, speed: f32) {
        let speed = base_speed(speed);
        debug!(speed, "car: rotate right");
        self.front_left
            .rotate_counter_clockwise(speed + self.bias.left_front_rear + self.bias.left_right);
        self.front_right
            .rotate_counter_clockwise(speed + self.bias.right_front_rear);
        self.rear_left
            .rotate_counter_clockwise(speed + PIVOT_REAR_LEFT_TRIM + self.bias.left_right);
        self.rear_right.rotate_counter_clockwise(speed);
    }

    pub fn stop(&mut self) {
        debug!("car: stop");
        self.front_left.stop();
        self.front_right.stop();
        self.rear_left.stop();
        self.rear_right.stop();
    }
}

impl Drop for Car {
    fn drop(&mut self) {
        // Leave the wheels braked when the car goes away.
        self.stop();
    }
}

// The caller-chosen base value is constrained to the duty-cycle range before
// bias is added; bias may still push individual wheels past 100, which the
// wheel clamps.
fn base_speed(speed: f32) -> f32 {
    speed.clamp(0.0, 100.0)
}
