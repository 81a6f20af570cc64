// Drive module for the four-wheel differential base
//
// Provides:
// - GPIO/PWM capability traits (the hardware seam)
// - Single-wheel actuator with redundant-write suppression
// - Car-level command mapping with trim bias

pub mod car;
pub mod gpio;
pub mod wheel;

pub use car::Car;
pub use gpio::{GpioDriver, GpioError, OutputPin, PwmOutput, TraceGpio};
pub use wheel::{Direction, Wheel};
