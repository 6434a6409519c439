//! DC motor driver for H-bridge chips
//!
//! This driver provides:
//! - Bounded speed ramping, one increment per call
//! - Reversal through zero speed (direction only changes when stopped)
//! - Coast and brake outputs
//! - Output wiring for dual-input chips (L9110, TA6586) and PWM-input
//!   chips with two direction pins (VNH2SP30)
//!
//! # Usage
//!
//! The driver is stepped by calling `drive()` periodically. Each call moves
//! the speed by at most one increment and writes the outputs immediately.
//!
//! ```ignore
//! let config = MotorHwConfig::new(ChipVariant::L9110, 0, 1).with_channels(0, 1);
//! let mut motor = BridgeMotor::configure(io, &config)?;
//!
//! // In the control loop:
//! motor.drive(DriveRequest::Forward, 200, config.increment);
//! ```

use motorx_core::config::{ConfigError, MotorHwConfig};
use motorx_core::motion::SpeedRamp;
use motorx_core::traits::{ChipVariant, Direction, DriveRequest, MotorDriver, MotorOutput};
use motorx_hal::io::max_duty_for_bits;
use motorx_hal::{HardwareIo, PinId, PwmChannelConfig, PwmTarget};

use crate::error::SetupError;

/// Full-scale speed value that maps onto the top of the duty range
const SPEED_SCALE: u32 = 255;

/// DC motor behind an H-bridge driver chip
pub struct BridgeMotor<IO> {
    io: IO,
    chip: ChipVariant,
    /// First input pin (direction pin on PWM-input chips)
    pin_a: PinId,
    /// Second input pin (direction pin on PWM-input chips)
    pin_b: PinId,
    /// PWM destination for the first input
    out_a: PwmTarget,
    /// PWM destination for the second input
    out_b: PwmTarget,
    /// PWM destination for the speed input (PWM-input chips only)
    out_pwm: Option<PwmTarget>,
    /// Largest duty value of the PWM outputs
    max_duty: u16,
    ramp: SpeedRamp,
    output: MotorOutput,
}

impl<IO: HardwareIo> BridgeMotor<IO> {
    /// Configure the wiring and allocate PWM channels
    ///
    /// Channels are only allocated when the config names them; otherwise
    /// PWM is written directly to the pins at 8-bit resolution.
    pub fn configure(mut io: IO, config: &MotorHwConfig) -> Result<Self, SetupError> {
        config.validate()?;

        let channel = |channel, pin| PwmChannelConfig {
            channel,
            pin,
            frequency_hz: config.frequency_hz,
            resolution_bits: config.resolution_bits,
        };

        let (out_a, out_b, out_pwm) = if config.chip.has_pwm_input() {
            let pwm_pin = config.pin_pwm.ok_or(ConfigError::MissingPwmPin)?;
            io.configure_output(config.pin_a)?;
            io.configure_output(config.pin_b)?;

            let out_pwm = match config.channel_pwm {
                Some(ch) => {
                    io.configure_pwm_channel(channel(ch, pwm_pin))?;
                    PwmTarget::Channel(ch)
                }
                None => PwmTarget::Pin(pwm_pin),
            };
            (
                PwmTarget::Pin(config.pin_a),
                PwmTarget::Pin(config.pin_b),
                Some(out_pwm),
            )
        } else {
            match (config.channel_a, config.channel_b) {
                (Some(ch_a), Some(ch_b)) => {
                    io.configure_pwm_channel(channel(ch_a, config.pin_a))?;
                    io.configure_pwm_channel(channel(ch_b, config.pin_b))?;
                    (PwmTarget::Channel(ch_a), PwmTarget::Channel(ch_b), None)
                }
                _ => (
                    PwmTarget::Pin(config.pin_a),
                    PwmTarget::Pin(config.pin_b),
                    None,
                ),
            }
        };

        let resolution_bits = if config.uses_channels() {
            config.resolution_bits
        } else {
            8
        };

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Motor '{}': chip={}, pins=({}, {}), channels={}",
            config.name.as_str(),
            config.chip,
            config.pin_a,
            config.pin_b,
            config.uses_channels()
        );

        Ok(Self {
            io,
            chip: config.chip,
            pin_a: config.pin_a,
            pin_b: config.pin_b,
            out_a,
            out_b,
            out_pwm,
            max_duty: max_duty_for_bits(resolution_bits),
            ramp: SpeedRamp::new(),
            output: MotorOutput::Coast,
        })
    }

    /// Driver chip variant
    pub fn chip(&self) -> ChipVariant {
        self.chip
    }

    /// Borrow the I/O capability
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Mutably borrow the I/O capability
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Release the I/O capability
    pub fn release(self) -> IO {
        self.io
    }

    /// Write raw duty values to the two bridge inputs
    ///
    /// Meant for dual-input chips; the values bypass the speed ramp.
    pub fn write_outputs(&mut self, duty_a: u8, duty_b: u8) {
        let duty_a = self.scale_duty(duty_a);
        let duty_b = self.scale_duty(duty_b);
        self.io.set_pwm_duty(self.out_a, duty_a);
        self.io.set_pwm_duty(self.out_b, duty_b);
    }

    /// Map a 0-255 speed onto the output duty range
    fn scale_duty(&self, duty: u8) -> u16 {
        (duty as u32 * self.max_duty as u32 / SPEED_SCALE) as u16
    }

    fn write(&mut self, output: MotorOutput) {
        if self.chip.is_dual_input() {
            let (duty_a, duty_b) = output.bridge_duties();
            self.write_outputs(duty_a, duty_b);
            return;
        }

        let (level_a, level_b) = output.direction_levels();
        self.io.set_digital(self.pin_a, level_a);
        self.io.set_digital(self.pin_b, level_b);
        if let (MotorOutput::Driving { duty, .. }, Some(out)) = (output, self.out_pwm) {
            let duty = self.scale_duty(duty);
            self.io.set_pwm_duty(out, duty);
        }
    }
}

impl<IO: HardwareIo> MotorDriver for BridgeMotor<IO> {
    fn drive(&mut self, request: DriveRequest, speed: u8, increment: u8) {
        let output = self.ramp.apply(request, speed, increment);

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "Motor step: request={}, target={}, inc={} -> dir={}, speed={}",
            request,
            speed,
            increment,
            self.ramp.direction(),
            self.ramp.speed()
        );

        self.write(output);
        self.output = output;
    }

    fn direction(&self) -> Direction {
        self.ramp.direction()
    }

    fn speed(&self) -> u8 {
        self.ramp.speed()
    }

    fn output(&self) -> MotorOutput {
        self.output
    }

    fn stop(&mut self) {
        self.ramp.reset();
        self.write(MotorOutput::Coast);
        self.output = MotorOutput::Coast;
    }
}
