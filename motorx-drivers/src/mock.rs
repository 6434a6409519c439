//! Test doubles for the hardware I/O capability and delays

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, OutputPin};
use embedded_hal::pwm::{ErrorType as PwmErrorType, SetDutyCycle};
use motorx_hal::{HardwareIo, IoError, PinId, PwmChannelConfig, PwmTarget};

/// One recorded hardware call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoEvent {
    Output(PinId),
    Digital(PinId, bool),
    Duty(PwmTarget, u16),
    Channel(PwmChannelConfig),
}

/// Records every call made through `HardwareIo`
#[derive(Default)]
pub struct RecordingIo {
    pub events: Vec<IoEvent>,
    /// Reject channel configuration with this error
    pub reject_channels: Option<IoError>,
}

impl RecordingIo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded events, leaving the log empty
    pub fn take(&mut self) -> Vec<IoEvent> {
        core::mem::take(&mut self.events)
    }
}

impl HardwareIo for RecordingIo {
    fn configure_output(&mut self, pin: PinId) -> Result<(), IoError> {
        self.events.push(IoEvent::Output(pin));
        Ok(())
    }

    fn set_digital(&mut self, pin: PinId, high: bool) {
        self.events.push(IoEvent::Digital(pin, high));
    }

    fn set_pwm_duty(&mut self, target: PwmTarget, duty: u16) {
        self.events.push(IoEvent::Duty(target, duty));
    }

    fn configure_pwm_channel(&mut self, config: PwmChannelConfig) -> Result<(), IoError> {
        if let Some(e) = self.reject_channels {
            return Err(e);
        }
        self.events.push(IoEvent::Channel(config));
        Ok(())
    }
}

/// Records requested delays in microseconds
#[derive(Default)]
pub struct MockDelay {
    pub delays_us: Vec<u32>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_us(&self) -> u32 {
        self.delays_us.iter().sum()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.delays_us.push(ns / 1000);
    }

    fn delay_us(&mut self, us: u32) {
        self.delays_us.push(us);
    }
}

/// Output pin that accepts every write
pub struct NullPin;

impl PinErrorType for NullPin {
    type Error = Infallible;
}

impl OutputPin for NullPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// PWM output that accepts every write
pub struct NullPwm;

impl PwmErrorType for NullPwm {
    type Error = Infallible;
}

impl SetDutyCycle for NullPwm {
    fn max_duty_cycle(&self) -> u16 {
        255
    }

    fn set_duty_cycle(&mut self, _duty: u16) -> Result<(), Self::Error> {
        Ok(())
    }
}
