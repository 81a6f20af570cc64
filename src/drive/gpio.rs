// GPIO/PWM capability traits
//
// The platform driver (pin multiplexing, PWM carrier generation) lives outside
// this crate. Wheels receive their output channels as trait objects at
// construction and never reach for a global handle, so a fake driver can be
// substituted in tests.

use tracing::debug;

/// A digital output channel. Set calls are synchronous and always succeed,
/// per the platform driver contract.
pub trait OutputPin: Send {
    fn set_high(&mut self);
    fn set_low(&mut self);
}

/// A PWM output channel. The duty cycle is a percentage in [0, 100].
pub trait PwmOutput: Send {
    fn set_duty_cycle(&mut self, percent: f32);
}

#[derive(Debug, thiserror::Error)]
pub enum GpioError {
    #[error("gpio channel {channel} unavailable: {reason}")]
    Unavailable { channel: u8, reason: String },
}

/// Hands out output channels. Acquisition can fail on real hardware
/// (channel already claimed, unsupported carrier frequency); the signal
/// calls themselves cannot.
pub trait GpioDriver {
    fn digital_output(&mut self, channel: u8) -> Result<Box<dyn OutputPin>, GpioError>;

    fn pwm_output(&mut self, channel: u8, freq_hz: u32) -> Result<Box<dyn PwmOutput>, GpioError>;
}

/// Driver backend that logs every signal instead of touching hardware.
///
/// Stands in for the platform driver when running off-target (demos,
/// teleop on a dev machine, the self-test sequence).
#[derive(Debug, Default)]
pub struct TraceGpio;

struct TracePin {
    channel: u8,
}

impl OutputPin for TracePin {
    fn set_high(&mut self) {
        debug!(channel = self.channel, "digital out: high");
    }

    fn set_low(&mut self) {
        debug!(channel = self.channel, "digital out: low");
    }
}

struct TracePwm {
    channel: u8,
}

impl PwmOutput for TracePwm {
    fn set_duty_cycle(&mut self, percent: f32) {
        debug!(channel = self.channel, duty = percent, "pwm out: duty cycle");
    }
}

impl GpioDriver for TraceGpio {
    fn digital_output(&mut self, channel: u8) -> Result<Box<dyn OutputPin>, GpioError> {
        Ok(Box::new(TracePin { channel }))
    }

    fn pwm_output(&mut self, channel: u8, freq_hz: u32) -> Result<Box<dyn PwmOutput>, GpioError> {
        debug!(channel, freq_hz, "pwm out: channel configured");
        Ok(Box::new(TracePwm { channel }))
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording driver for unit tests: every signal issued through any
    //! channel lands in one shared, ordered log.

    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    pub enum Signal {
        Digital { channel: u8, high: bool },
        Duty { channel: u8, percent: f32 },
    }

    #[derive(Clone, Default)]
    pub struct SignalLog(Arc<Mutex<Vec<Signal>>>);

    impl SignalLog {
        pub fn take(&self) -> Vec<Signal> {
            std::mem::take(&mut self.0.lock().unwrap())
        }

        pub fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }

        fn push(&self, signal: Signal) {
            self.0.lock().unwrap().push(signal);
        }
    }

    pub struct MockGpio {
        pub log: SignalLog,
    }

    impl MockGpio {
        pub fn new() -> Self {
            Self {
                log: SignalLog::default(),
            }
        }
    }

    struct MockPin {
        channel: u8,
        log: SignalLog,
    }

    impl OutputPin for MockPin {
        fn set_high(&mut self) {
            self.log.push(Signal::Digital {
                channel: self.channel,
                high: true,
            });
        }

        fn set_low(&mut self) {
            self.log.push(Signal::Digital {
                channel: self.channel,
                high: false,
            });
        }
    }

    struct MockPwm {
        channel: u8,
        log: SignalLog,
    }

    impl PwmOutput for MockPwm {
        fn set_duty_cycle(&mut self, percent: f32) {
            self.log.push(Signal::Duty {
                channel: self.channel,
                percent,
            });
        }
    }

    impl GpioDriver for MockGpio {
        fn digital_output(&mut self, channel: u8) -> Result<Box<dyn OutputPin>, GpioError> {
            Ok(Box::new(MockPin {
                channel,
                log: self.log.clone(),
            }))
        }

        fn pwm_output(&mut self, channel: u8, _freq_hz: u32) -> Result<Box<dyn PwmOutput>, GpioError> {
            Ok(Box::new(MockPwm {
                channel,
                log: self.log.clone(),
            }))
        }
    }
}
