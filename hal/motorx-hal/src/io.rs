//! Hardware I/O capability
//!
//! Pins and PWM channels are addressed by number, the way board
//! configuration files name them. The drivers never touch registers
//! directly; every side effect goes through [`HardwareIo`].

/// GPIO pin number
pub type PinId = u8;

/// PWM channel number (on targets with explicit channel allocation)
pub type ChannelId = u8;

/// Destination of a PWM duty write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmTarget {
    /// PWM generated directly on a pin
    Pin(PinId),
    /// PWM generated by an allocated channel
    Channel(ChannelId),
}

/// PWM channel setup request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmChannelConfig {
    /// Channel to allocate
    pub channel: ChannelId,
    /// Output pin the channel drives
    pub pin: PinId,
    /// PWM frequency in Hz
    pub frequency_hz: u32,
    /// Duty resolution in bits (duty range is `0..=2^bits - 1`)
    pub resolution_bits: u8,
}

impl PwmChannelConfig {
    /// Largest duty value for this resolution
    pub fn max_duty(&self) -> u16 {
        max_duty_for_bits(self.resolution_bits)
    }
}

/// Largest duty value representable with `bits` of resolution
///
/// Resolutions above 16 bits saturate at `u16::MAX`.
pub fn max_duty_for_bits(bits: u8) -> u16 {
    match bits {
        0 => 0,
        1..=15 => (1u16 << bits) - 1,
        _ => u16::MAX,
    }
}

/// Errors reported while configuring hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Pin is not available on this target
    InvalidPin(PinId),
    /// Channel is not available or already bound to another pin
    InvalidChannel(ChannelId),
    /// Requested duty resolution is not supported
    UnsupportedResolution(u8),
    /// Requested frequency is not supported
    UnsupportedFrequency(u32),
}

/// Hardware I/O capability
///
/// Writes are infallible: once a pin or channel has been configured, the
/// drivers assume writing to it succeeds. Writes to unknown pins or
/// channels are ignored by implementations, so configuration is where a
/// missing pin must be reported.
pub trait HardwareIo {
    /// Configure a pin as a digital output
    fn configure_output(&mut self, pin: PinId) -> Result<(), IoError>;

    /// Drive a digital output high or low
    fn set_digital(&mut self, pin: PinId, high: bool);

    /// Write a PWM duty value
    ///
    /// `duty` is in units of the target's resolution (8-bit unless a
    /// channel was configured otherwise).
    fn set_pwm_duty(&mut self, target: PwmTarget, duty: u16);

    /// Allocate a PWM channel and bind it to an output pin
    fn configure_pwm_channel(&mut self, config: PwmChannelConfig) -> Result<(), IoError>;
}

impl<T: HardwareIo + ?Sized> HardwareIo for &mut T {
    fn configure_output(&mut self, pin: PinId) -> Result<(), IoError> {
        (**self).configure_output(pin)
    }

    fn set_digital(&mut self, pin: PinId, high: bool) {
        (**self).set_digital(pin, high)
    }

    fn set_pwm_duty(&mut self, target: PwmTarget, duty: u16) {
        (**self).set_pwm_duty(target, duty)
    }

    fn configure_pwm_channel(&mut self, config: PwmChannelConfig) -> Result<(), IoError> {
        (**self).configure_pwm_channel(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_duty_for_bits() {
        assert_eq!(max_duty_for_bits(0), 0);
        assert_eq!(max_duty_for_bits(1), 1);
        assert_eq!(max_duty_for_bits(8), 255);
        assert_eq!(max_duty_for_bits(10), 1023);
        assert_eq!(max_duty_for_bits(16), u16::MAX);
        assert_eq!(max_duty_for_bits(20), u16::MAX);
    }

    #[test]
    fn test_channel_config_max_duty() {
        let config = PwmChannelConfig {
            channel: 0,
            pin: 4,
            frequency_hz: 5000,
            resolution_bits: 8,
        };
        assert_eq!(config.max_duty(), 255);
    }
}
