// Single-wheel actuator
//
// Tracks the direction and duty cycle most recently issued to hardware and
// suppresses repeat writes, so a command stream full of identical requests
// produces no redundant bus traffic.

use tracing::warn;

use crate::config::WheelConfig;

use super::gpio::{GpioDriver, GpioError, OutputPin, PwmOutput};

/// Rotation sense last issued to the wheel. `Stopped` is the brake state
/// (both direction channels high), not the absence of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Stopped,
    Clockwise,
    CounterClockwise,
}

pub struct Wheel {
    pwm: Box<dyn PwmOutput>,
    dir_a: Box<dyn OutputPin>,
    dir_b: Box<dyn OutputPin>,
    last_direction: Direction,
    last_duty: f32,
}

impl Wheel {
    /// Acquire the wheel's three output channels from the driver and park
    /// the PWM at zero duty.
    pub fn new(config: &WheelConfig, gpio: &mut dyn GpioDriver) -> Result<Self, GpioError> {
        let mut pwm = gpio.pwm_output(config.pwm_channel, config.pwm_freq_hz)?;
        let dir_a = gpio.digital_output(config.dir_channel_a)?;
        let dir_b = gpio.digital_output(config.dir_channel_b)?;

        pwm.set_duty_cycle(0.0);

        Ok(Self {
            pwm,
            dir_a,
            dir_b,
            last_direction: Direction::Stopped,
            last_duty: 0.0,
        })
    }

    pub fn rotate_clockwise(&mut self, duty: f32) {
        if self.last_direction != Direction::Clockwise {
            self.dir_a.set_high();
            self.dir_b.set_low();
            self.last_direction = Direction::Clockwise;
        }
        self.apply_duty(duty);
    }

    pub fn rotate_counter_clockwise(&mut self, duty: f32) {
        if self.last_direction != Direction::CounterClockwise {
            self.dir_a.set_low();
            self.dir_b.set_high();
            self.last_direction = Direction::CounterClockwise;
        }
        self.apply_duty(duty);
    }

    /// Brake: both direction channels high. The duty-cycle register is left
    /// where it was; the next rotate call restores motion at its own duty.
    pub fn stop(&mut self) {
        self.dir_a.set_high();
        self.dir_b.set_high();
        self.last_direction = Direction::Stopped;
    }

    pub fn last_direction(&self) -> Direction {
        self.last_direction
    }

    pub fn last_duty(&self) -> f32 {
        self.last_duty
    }

    fn apply_duty(&mut self, duty: f32) {
        let clamped = duty.clamp(0.0, 100.0);
        if clamped != duty {
            warn!(requested = duty, issued = clamped, "duty cycle clamped");
        }
        if clamped != self.last_duty {
            self.pwm.set_duty_cycle(clamped);
            self.last_duty = clamped;
        }
    }
}
