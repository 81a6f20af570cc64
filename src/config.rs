// Network defaults, teleop timing, and the startup configuration surface
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// Default TCP endpoint for the perception server
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8000";

// Duty-cycle base value used by the pilot client and the demo harnesses
pub const DEFAULT_DRIVE_SPEED: f32 = 4.0;

// Largest frame payload the server will accept before declaring the
// length prefix malformed
pub const MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

// Teleop: keyboard poll interval and how long a command stays live
// without a repeat before the car is stopped
pub const TELEOP_POLL_INTERVAL: Duration = Duration::from_millis(20);
pub const TELEOP_INPUT_TIMEOUT: Duration = Duration::from_millis(300);

/// One physical wheel: a PWM channel, two direction-control channels,
/// and the PWM carrier frequency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WheelConfig {
    pub pwm_channel: u8,
    pub dir_channel_a: u8,
    pub dir_channel_b: u8,
    pub pwm_freq_hz: u32,
}

/// Per-unit trim corrections added to the requested duty cycle.
///
/// Different wheels run at different speeds under the same control signal,
/// so each physical car carries its own measured values.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DriveBias {
    /// Speed difference between the two left wheels (front vs rear).
    pub left_front_rear: f32,
    /// Speed difference between the two right wheels (front vs rear).
    pub right_front_rear: f32,
    /// Speed difference between the left and right sides.
    pub left_right: f32,
}

impl DriveBias {
    /// The additive correction each wheel receives, in
    /// [front-left, front-right, rear-left, rear-right] order.
    pub fn per_wheel(&self) -> [f32; 4] {
        [
            self.left_front_rear + self.left_right,
            self.right_front_rear,
            self.left_right,
            0.0,
        ]
    }
}

/// Full startup configuration: four wheels plus the trim bias.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CarConfig {
    pub front_left: WheelConfig,
    pub front_right: WheelConfig,
    pub rear_left: WheelConfig,
    pub rear_right: WheelConfig,
    pub bias: DriveBias,
}

impl Default for CarConfig {
    fn default() -> Self {
        // Channel assignments and trim values measured on the reference car.
        Self {
            front_left: WheelConfig {
                pwm_channel: 33,
                dir_channel_a: 35,
                dir_channel_b: 37,
                pwm_freq_hz: 1500,
            },
            front_right: WheelConfig {
                pwm_channel: 32,
                dir_channel_a: 31,
                dir_channel_b: 29,
                pwm_freq_hz: 1500,
            },
            rear_left: WheelConfig {
                pwm_channel: 40,
                dir_channel_a: 38,
                dir_channel_b: 36,
                pwm_freq_hz: 1500,
            },
            rear_right: WheelConfig {
                pwm_channel: 15,
                dir_channel_a: 13,
                dir_channel_b: 11,
                pwm_freq_hz: 1500,
            },
            bias: DriveBias {
                left_front_rear: 1.0,
                right_front_rear: 1.0,
                left_right: 0.2,
            },
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl CarConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}
