//! Hobby servo driver
//!
//! Each step emits one frame: the pin is held high for the pulse width of
//! the current angle, then low for the rest of the frame. With a PWM
//! channel configured the frame is generated by hardware instead and a step
//! only updates the duty cycle.

use embedded_hal::delay::DelayNs;
use motorx_core::config::{
    ServoHwConfig, ServoOutputMode, ServoTiming, SERVO_PWM_RESOLUTION_BITS,
};
use motorx_core::motion::AngleRamp;
use motorx_core::traits::ServoDriver;
use motorx_hal::io::max_duty_for_bits;
use motorx_hal::{HardwareIo, PinId, PwmChannelConfig, PwmTarget};

use crate::error::SetupError;

/// Pulse-positioned servo on a single pin
pub struct PulseServo<IO, D> {
    io: IO,
    delay: D,
    pin: PinId,
    mode: ServoOutputMode,
    timing: ServoTiming,
    enabled: bool,
    ramp: AngleRamp,
}

impl<IO: HardwareIo, D: DelayNs> PulseServo<IO, D> {
    /// Attach to the configured pin
    ///
    /// The servo starts enabled at 0° without emitting a pulse.
    pub fn attach(mut io: IO, delay: D, config: &ServoHwConfig) -> Result<Self, SetupError> {
        config.validate()?;

        match config.mode {
            ServoOutputMode::BitBang => io.configure_output(config.pin)?,
            ServoOutputMode::Pwm { channel } => {
                io.configure_pwm_channel(PwmChannelConfig {
                    channel,
                    pin: config.pin,
                    frequency_hz: config.timing.frequency_hz(),
                    resolution_bits: SERVO_PWM_RESOLUTION_BITS,
                })?;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Servo '{}': pin={}, mode={}",
            config.name.as_str(),
            config.pin,
            config.mode
        );

        Ok(Self {
            io,
            delay,
            pin: config.pin,
            mode: config.mode,
            timing: config.timing,
            enabled: true,
            ramp: AngleRamp::new(),
        })
    }

    /// Pulse timing in use
    pub fn timing(&self) -> &ServoTiming {
        &self.timing
    }

    /// Borrow the I/O capability
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutably borrow the I/O capability
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Release the I/O capability and delay provider
    pub fn release(self) -> (IO, D) {
        (self.io, self.delay)
    }

    fn emit(&mut self, angle: u8) {
        let width_us = self.timing.pulse_width_us(angle);
        match self.mode {
            ServoOutputMode::BitBang => {
                self.io.set_digital(self.pin, true);
                self.delay.delay_us(width_us);
                self.io.set_digital(self.pin, false);
                self.delay.delay_us(self.timing.off_time_us(width_us));
            }
            ServoOutputMode::Pwm { channel } => {
                let max = max_duty_for_bits(SERVO_PWM_RESOLUTION_BITS);
                let duty = self.timing.pwm_duty(width_us, max);
                self.io.set_pwm_duty(PwmTarget::Channel(channel), duty);
            }
        }
    }
}

impl<IO: HardwareIo, D: DelayNs> ServoDriver for PulseServo<IO, D> {
    fn step(&mut self, angle: u8, increment: u8) {
        if !self.enabled {
            return;
        }

        let current = self.ramp.apply(angle, increment);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Servo step: target={}, current={}",
            self.ramp.target(),
            current
        );

        self.emit(current);
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        if let ServoOutputMode::Pwm { channel } = self.mode {
            self.io.set_pwm_duty(PwmTarget::Channel(channel), 0);
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn read_angle(&self) -> u8 {
        self.ramp.target()
    }

    fn current_angle(&self) -> u8 {
        self.ramp.current()
    }
}
