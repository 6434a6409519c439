//! `HardwareIo` on top of embedded-hal 1.0
//!
//! Any target whose HAL implements `embedded_hal::digital::OutputPin` and
//! `embedded_hal::pwm::SetDutyCycle` can drive the MotorX drivers through
//! [`EmbeddedIo`]. Pins are handed over already configured as outputs and
//! registered under the number the board configuration uses for them.
//!
//! embedded-hal has no notion of frequency or resolution, so a channel's
//! frequency is recorded for inspection only and the resolution is applied
//! by scaling duty values onto the output's own duty range.

use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal::pwm::SetDutyCycle;
use heapless::Vec;

use crate::io::{
    max_duty_for_bits, ChannelId, HardwareIo, IoError, PinId, PwmChannelConfig, PwmTarget,
};

/// Duty resolution of PWM outputs written by pin (no channel configured)
pub const DEFAULT_RESOLUTION_BITS: u8 = 8;

/// Highest duty resolution that fits the embedded-hal duty range
pub const MAX_RESOLUTION_BITS: u8 = 16;

struct DigitalSlot<P> {
    id: PinId,
    pin: P,
}

struct PwmSlot<W> {
    id: PinId,
    channel: Option<ChannelId>,
    resolution_bits: u8,
    frequency_hz: Option<u32>,
    output: W,
}

impl<W> PwmSlot<W> {
    fn matches(&self, target: PwmTarget) -> bool {
        match target {
            PwmTarget::Pin(id) => self.id == id,
            PwmTarget::Channel(channel) => self.channel == Some(channel),
        }
    }
}

/// Pin bank implementing [`HardwareIo`] with embedded-hal outputs
///
/// `NP` is the number of digital outputs and `NW` the number of PWM
/// outputs the bank can hold.
pub struct EmbeddedIo<P, W, const NP: usize, const NW: usize> {
    digital: Vec<DigitalSlot<P>, NP>,
    pwm: Vec<PwmSlot<W>, NW>,
}

impl<P, W, const NP: usize, const NW: usize> Default for EmbeddedIo<P, W, NP, NW> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, W, const NP: usize, const NW: usize> EmbeddedIo<P, W, NP, NW> {
    /// Create an empty pin bank
    pub const fn new() -> Self {
        Self {
            digital: Vec::new(),
            pwm: Vec::new(),
        }
    }

    /// Register a digital output under a pin number
    ///
    /// Fails if the number is already registered or the bank is full.
    pub fn add_digital(&mut self, id: PinId, pin: P) -> Result<(), IoError> {
        if self.has_pin(id) {
            return Err(IoError::InvalidPin(id));
        }
        self.digital
            .push(DigitalSlot { id, pin })
            .map_err(|_| IoError::InvalidPin(id))
    }

    /// Register a PWM output under a pin number
    ///
    /// Fails if the number is already registered or the bank is full.
    pub fn add_pwm(&mut self, id: PinId, output: W) -> Result<(), IoError> {
        if self.has_pin(id) {
            return Err(IoError::InvalidPin(id));
        }
        self.pwm
            .push(PwmSlot {
                id,
                channel: None,
                resolution_bits: DEFAULT_RESOLUTION_BITS,
                frequency_hz: None,
                output,
            })
            .map_err(|_| IoError::InvalidPin(id))
    }

    /// Builder form of [`add_digital`](Self::add_digital)
    pub fn with_digital(mut self, id: PinId, pin: P) -> Result<Self, IoError> {
        self.add_digital(id, pin)?;
        Ok(self)
    }

    /// Builder form of [`add_pwm`](Self::add_pwm)
    pub fn with_pwm(mut self, id: PinId, output: W) -> Result<Self, IoError> {
        self.add_pwm(id, output)?;
        Ok(self)
    }

    /// Check if a pin number is registered (digital or PWM)
    pub fn has_pin(&self, id: PinId) -> bool {
        self.digital.iter().any(|slot| slot.id == id) || self.pwm.iter().any(|slot| slot.id == id)
    }

    /// Pin a channel is bound to, if any
    pub fn channel_binding(&self, channel: ChannelId) -> Option<PinId> {
        self.pwm
            .iter()
            .find(|slot| slot.channel == Some(channel))
            .map(|slot| slot.id)
    }

    /// Duty resolution used for a PWM target
    pub fn resolution_bits(&self, target: PwmTarget) -> Option<u8> {
        self.pwm
            .iter()
            .find(|slot| slot.matches(target))
            .map(|slot| slot.resolution_bits)
    }

    /// Frequency requested for a PWM target, if a channel was configured
    pub fn frequency_hz(&self, target: PwmTarget) -> Option<u32> {
        self.pwm
            .iter()
            .find(|slot| slot.matches(target))
            .and_then(|slot| slot.frequency_hz)
    }

    /// Borrow a registered digital output
    pub fn digital(&self, id: PinId) -> Option<&P> {
        self.digital
            .iter()
            .find(|slot| slot.id == id)
            .map(|slot| &slot.pin)
    }

    /// Borrow a registered PWM output
    pub fn pwm(&self, target: PwmTarget) -> Option<&W> {
        self.pwm
            .iter()
            .find(|slot| slot.matches(target))
            .map(|slot| &slot.output)
    }
}

impl<P, W, const NP: usize, const NW: usize> HardwareIo for EmbeddedIo<P, W, NP, NW>
where
    P: OutputPin,
    W: SetDutyCycle,
{
    fn configure_output(&mut self, pin: PinId) -> Result<(), IoError> {
        // Pins are registered already in output mode
        if self.digital.iter().any(|slot| slot.id == pin) {
            Ok(())
        } else {
            Err(IoError::InvalidPin(pin))
        }
    }

    fn set_digital(&mut self, pin: PinId, high: bool) {
        if let Some(slot) = self.digital.iter_mut().find(|slot| slot.id == pin) {
            // Write errors are not reportable through the drivers
            let _ = slot.pin.set_state(PinState::from(high));
        }
    }

    fn set_pwm_duty(&mut self, target: PwmTarget, duty: u16) {
        if let Some(slot) = self.pwm.iter_mut().find(|slot| slot.matches(target)) {
            let max = max_duty_for_bits(slot.resolution_bits);
            if max == 0 {
                return;
            }
            let _ = slot.output.set_duty_cycle_fraction(duty.min(max), max);
        }
    }

    fn configure_pwm_channel(&mut self, config: PwmChannelConfig) -> Result<(), IoError> {
        if config.resolution_bits == 0 || config.resolution_bits > MAX_RESOLUTION_BITS {
            return Err(IoError::UnsupportedResolution(config.resolution_bits));
        }
        if config.frequency_hz == 0 {
            return Err(IoError::UnsupportedFrequency(config.frequency_hz));
        }
        if let Some(bound) = self.channel_binding(config.channel) {
            if bound != config.pin {
                return Err(IoError::InvalidChannel(config.channel));
            }
        }

        let slot = self
            .pwm
            .iter_mut()
            .find(|slot| slot.id == config.pin)
            .ok_or(IoError::InvalidPin(config.pin))?;
        slot.channel = Some(config.channel);
        slot.resolution_bits = config.resolution_bits;
        slot.frequency_hz = Some(config.frequency_hz);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Mock digital output
    struct MockPin {
        high: bool,
        writes: u32,
    }

    impl MockPin {
        fn new() -> Self {
            Self {
                high: false,
                writes: 0,
            }
        }
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.high = false;
            self.writes += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.high = true;
            self.writes += 1;
            Ok(())
        }
    }

    /// Mock PWM output with a 0..=1000 duty range
    struct MockPwm {
        duty: u16,
    }

    impl MockPwm {
        fn new() -> Self {
            Self { duty: 0 }
        }
    }

    impl embedded_hal::pwm::ErrorType for MockPwm {
        type Error = Infallible;
    }

    impl SetDutyCycle for MockPwm {
        fn max_duty_cycle(&self) -> u16 {
            1000
        }

        fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
            self.duty = duty;
            Ok(())
        }
    }

    type TestIo = EmbeddedIo<MockPin, MockPwm, 2, 2>;

    fn bank() -> TestIo {
        TestIo::new()
            .with_digital(10, MockPin::new())
            .unwrap()
            .with_pwm(4, MockPwm::new())
            .unwrap()
            .with_pwm(5, MockPwm::new())
            .unwrap()
    }

    #[test]
    fn test_duplicate_pin_rejected() {
        let mut io = bank();
        assert_eq!(io.add_digital(4, MockPin::new()), Err(IoError::InvalidPin(4)));
        assert!(io.has_pin(10));
        assert!(!io.has_pin(11));
    }

    #[test]
    fn test_bank_full() {
        let mut io = bank();
        assert_eq!(io.add_pwm(6, MockPwm::new()), Err(IoError::InvalidPin(6)));
    }

    #[test]
    fn test_digital_write() {
        let mut io = bank();
        io.set_digital(10, true);
        assert!(io.digital(10).unwrap().high);

        io.set_digital(10, false);
        assert!(!io.digital(10).unwrap().high);
        assert_eq!(io.digital(10).unwrap().writes, 2);

        // Unknown pins are ignored
        io.set_digital(3, true);
    }

    #[test]
    fn test_configure_output_requires_digital_slot() {
        let mut io = bank();
        assert_eq!(io.configure_output(10), Ok(()));
        assert_eq!(io.configure_output(3), Err(IoError::InvalidPin(3)));
        // PWM outputs cannot be driven as plain digital pins
        assert_eq!(io.configure_output(4), Err(IoError::InvalidPin(4)));
    }

    #[test]
    fn test_pwm_write_by_pin_scales_8_bit() {
        let mut io = bank();

        io.set_pwm_duty(PwmTarget::Pin(4), 255);
        assert_eq!(io.pwm(PwmTarget::Pin(4)).unwrap().duty, 1000);

        io.set_pwm_duty(PwmTarget::Pin(4), 0);
        assert_eq!(io.pwm(PwmTarget::Pin(4)).unwrap().duty, 0);

        // Out of range duty saturates
        io.set_pwm_duty(PwmTarget::Pin(4), 4000);
        assert_eq!(io.pwm(PwmTarget::Pin(4)).unwrap().duty, 1000);
    }

    #[test]
    fn test_channel_configuration() {
        let mut io = bank();
        let config = PwmChannelConfig {
            channel: 2,
            pin: 5,
            frequency_hz: 5000,
            resolution_bits: 8,
        };
        assert_eq!(io.configure_pwm_channel(config), Ok(()));
        assert_eq!(io.channel_binding(2), Some(5));
        assert_eq!(io.frequency_hz(PwmTarget::Channel(2)), Some(5000));
        assert_eq!(io.frequency_hz(PwmTarget::Pin(4)), None);

        io.set_pwm_duty(PwmTarget::Channel(2), 51);
        assert_eq!(io.pwm(PwmTarget::Pin(5)).unwrap().duty, 200);

        // Re-binding the same channel to the same pin is allowed
        assert_eq!(io.configure_pwm_channel(config), Ok(()));

        // Binding it to another pin is not
        let other = PwmChannelConfig { pin: 4, ..config };
        assert_eq!(io.configure_pwm_channel(other), Err(IoError::InvalidChannel(2)));
    }

    #[test]
    fn test_channel_configuration_errors() {
        let mut io = bank();
        let config = PwmChannelConfig {
            channel: 0,
            pin: 4,
            frequency_hz: 50,
            resolution_bits: 16,
        };

        let bad_bits = PwmChannelConfig {
            resolution_bits: 17,
            ..config
        };
        assert_eq!(
            io.configure_pwm_channel(bad_bits),
            Err(IoError::UnsupportedResolution(17))
        );

        let bad_freq = PwmChannelConfig {
            frequency_hz: 0,
            ..config
        };
        assert_eq!(
            io.configure_pwm_channel(bad_freq),
            Err(IoError::UnsupportedFrequency(0))
        );

        // Digital-only pin cannot carry a channel
        let digital = PwmChannelConfig { pin: 10, ..config };
        assert_eq!(io.configure_pwm_channel(digital), Err(IoError::InvalidPin(10)));
    }

    #[test]
    fn test_sixteen_bit_resolution() {
        let mut io = bank();
        io.configure_pwm_channel(PwmChannelConfig {
            channel: 1,
            pin: 4,
            frequency_hz: 50,
            resolution_bits: 16,
        })
        .unwrap();

        assert_eq!(io.resolution_bits(PwmTarget::Pin(4)), Some(16));
        io.set_pwm_duty(PwmTarget::Channel(1), u16::MAX / 2);
        assert_eq!(io.pwm(PwmTarget::Pin(4)).unwrap().duty, 499);
    }
}
