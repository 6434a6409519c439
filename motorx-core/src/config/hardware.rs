//! Hardware configuration types
//!
//! These types describe how motors and servos are wired to the board:
//! driver chip, pins, optional PWM channels and ramp settings.

use heapless::{FnvIndexSet, String, Vec};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::{ChipVariant, MAX_ANGLE};

/// Maximum motors per config
pub const MAX_MOTORS: usize = 4;

/// Maximum servos per config
pub const MAX_SERVOS: usize = 4;

/// Maximum length of a device name
pub const MAX_LABEL_LEN: usize = 16;

/// PWM frequency for motor outputs
pub const MOTOR_PWM_FREQUENCY_HZ: u32 = 5000;

/// PWM resolution for motor outputs
pub const MOTOR_PWM_RESOLUTION_BITS: u8 = 8;

/// PWM frequency for hardware-generated servo pulses
pub const SERVO_PWM_FREQUENCY_HZ: u32 = 50;

/// PWM resolution for hardware-generated servo pulses
pub const SERVO_PWM_RESOLUTION_BITS: u8 = 16;

/// Longest servo frame in µs (1 Hz)
pub const MAX_FRAME_US: u32 = 1_000_000;

/// Errors found while validating a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Chip needs a PWM input pin but none was given
    MissingPwmPin,
    /// Only some of the PWM channels a chip needs were given
    IncompleteChannels,
    /// PWM resolution outside 1..=16 bits
    InvalidResolution(u8),
    /// PWM frequency of zero
    InvalidFrequency,
    /// Servo pulse range empty or longer than the frame
    InvalidPulseRange,
    /// Same pin used twice
    PinConflict(u8),
    /// Same device name used twice
    DuplicateName,
}

/// DC motor hardware configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorHwConfig {
    /// Motor name (e.g., "left", "right", "winch")
    pub name: String<MAX_LABEL_LEN>,
    /// Driver chip variant
    pub chip: ChipVariant,
    /// First input pin (PWM for dual-input chips, direction otherwise)
    pub pin_a: u8,
    /// Second input pin (PWM for dual-input chips, direction otherwise)
    pub pin_b: u8,
    /// PWM input pin (VNH2SP30 only)
    pub pin_pwm: Option<u8>,
    /// PWM channel bound to `pin_a`
    pub channel_a: Option<u8>,
    /// PWM channel bound to `pin_b`
    pub channel_b: Option<u8>,
    /// PWM channel bound to `pin_pwm`
    pub channel_pwm: Option<u8>,
    /// PWM frequency when channels are allocated
    pub frequency_hz: u32,
    /// PWM resolution when channels are allocated
    pub resolution_bits: u8,
    /// Speed step per control loop iteration
    pub increment: u8,
}

impl Default for MotorHwConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            chip: ChipVariant::L9110,
            pin_a: 0,
            pin_b: 1,
            pin_pwm: None,
            channel_a: None,
            channel_b: None,
            channel_pwm: None,
            frequency_hz: MOTOR_PWM_FREQUENCY_HZ,
            resolution_bits: MOTOR_PWM_RESOLUTION_BITS,
            increment: 5,
        }
    }
}

impl MotorHwConfig {
    /// Create a config for a chip on two input pins
    pub fn new(chip: ChipVariant, pin_a: u8, pin_b: u8) -> Self {
        Self {
            chip,
            pin_a,
            pin_b,
            ..Self::default()
        }
    }

    /// Set the PWM input pin (VNH2SP30)
    pub fn with_pwm_pin(mut self, pin: u8) -> Self {
        self.pin_pwm = Some(pin);
        self
    }

    /// Allocate PWM channels for the two inputs of a dual-input chip
    pub fn with_channels(mut self, channel_a: u8, channel_b: u8) -> Self {
        self.channel_a = Some(channel_a);
        self.channel_b = Some(channel_b);
        self
    }

    /// Allocate a PWM channel for the PWM input (VNH2SP30)
    pub fn with_pwm_channel(mut self, channel: u8) -> Self {
        self.channel_pwm = Some(channel);
        self
    }

    /// True if this motor's PWM outputs go through allocated channels
    pub fn uses_channels(&self) -> bool {
        if self.chip.has_pwm_input() {
            self.channel_pwm.is_some()
        } else {
            self.channel_a.is_some() && self.channel_b.is_some()
        }
    }

    /// Pins this motor drives
    pub fn pins(&self) -> impl Iterator<Item = u8> + '_ {
        [Some(self.pin_a), Some(self.pin_b), self.pin_pwm]
            .into_iter()
            .flatten()
    }

    /// Check the wiring is consistent with the chip
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chip.has_pwm_input() && self.pin_pwm.is_none() {
            return Err(ConfigError::MissingPwmPin);
        }
        if self.chip.is_dual_input() && self.channel_a.is_some() != self.channel_b.is_some() {
            return Err(ConfigError::IncompleteChannels);
        }
        if self.resolution_bits == 0 || self.resolution_bits > 16 {
            return Err(ConfigError::InvalidResolution(self.resolution_bits));
        }
        if self.frequency_hz == 0 {
            return Err(ConfigError::InvalidFrequency);
        }
        if self.pin_a == self.pin_b || self.pin_pwm == Some(self.pin_a) {
            return Err(ConfigError::PinConflict(self.pin_a));
        }
        if self.pin_pwm == Some(self.pin_b) {
            return Err(ConfigError::PinConflict(self.pin_b));
        }
        Ok(())
    }
}

/// How servo pulses are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ServoOutputMode {
    /// Pulse timed with blocking delays on a digital pin
    #[default]
    BitBang,
    /// Pulse generated by a PWM channel at 50 Hz
    Pwm {
        /// Channel bound to the servo pin
        channel: u8,
    },
}

/// Servo pulse timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoTiming {
    /// Pulse width at 0° in µs
    pub min_pulse_us: u32,
    /// Pulse width at 180° in µs
    pub max_pulse_us: u32,
    /// Pulse period in µs
    pub frame_us: u32,
}

impl Default for ServoTiming {
    fn default() -> Self {
        Self {
            min_pulse_us: 540,
            max_pulse_us: 2400,
            frame_us: MAX_FRAME_US / SERVO_PWM_FREQUENCY_HZ,
        }
    }
}

impl ServoTiming {
    /// Pulse width for an angle, mapped linearly from 0-180°
    pub fn pulse_width_us(&self, angle: u8) -> u32 {
        let angle = angle.min(MAX_ANGLE) as u32;
        let span = self.max_pulse_us.saturating_sub(self.min_pulse_us);
        self.min_pulse_us + angle * span / MAX_ANGLE as u32
    }

    /// Low time following a pulse of `width_us` to complete the frame
    pub fn off_time_us(&self, width_us: u32) -> u32 {
        self.frame_us.saturating_sub(width_us)
    }

    /// Frame rate in Hz when pulses are generated by a PWM channel
    pub fn frequency_hz(&self) -> u32 {
        MAX_FRAME_US / self.frame_us.max(1)
    }

    /// Duty value for a pulse of `width_us`, on a `0..=max_duty` scale
    pub fn pwm_duty(&self, width_us: u32, max_duty: u16) -> u16 {
        let width_us = width_us.min(self.frame_us) as u64;
        (width_us * max_duty as u64 / self.frame_us.max(1) as u64) as u16
    }

    /// Check the frame length and that the pulse range fits in it
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_FRAME_US).contains(&self.frame_us) {
            return Err(ConfigError::InvalidFrequency);
        }
        if self.min_pulse_us >= self.max_pulse_us || self.max_pulse_us > self.frame_us {
            return Err(ConfigError::InvalidPulseRange);
        }
        Ok(())
    }
}

/// Servo hardware configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoHwConfig {
    /// Servo name (e.g., "arm", "gripper")
    pub name: String<MAX_LABEL_LEN>,
    /// Signal pin
    pub pin: u8,
    /// Pulse generation mode
    pub mode: ServoOutputMode,
    /// Pulse timing
    pub timing: ServoTiming,
    /// Angle step per control loop iteration (0 = jump)
    pub increment: u8,
}

impl ServoHwConfig {
    /// Create a bit-banged servo on a pin with default timing
    pub fn new(pin: u8) -> Self {
        Self {
            pin,
            ..Self::default()
        }
    }

    /// Generate pulses with a PWM channel instead of delays
    pub fn with_pwm_channel(mut self, channel: u8) -> Self {
        self.mode = ServoOutputMode::Pwm { channel };
        self
    }

    /// Check the timing is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timing.validate()
    }
}

/// Complete board configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    /// Configuration version for compatibility checks
    pub version: u8,
    /// Motor configurations
    pub motors: Vec<MotorHwConfig, MAX_MOTORS>,
    /// Servo configurations
    pub servos: Vec<ServoHwConfig, MAX_SERVOS>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: 1,
            motors: Vec::new(),
            servos: Vec::new(),
        }
    }
}

impl BoardConfig {
    /// Create a new empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a motor by name
    pub fn find_motor(&self, name: &str) -> Option<&MotorHwConfig> {
        self.motors.iter().find(|m| m.name.as_str() == name)
    }

    /// Find a servo by name
    pub fn find_servo(&self, name: &str) -> Option<&ServoHwConfig> {
        self.servos.iter().find(|s| s.name.as_str() == name)
    }

    /// Validate every device and check no pin or name is used twice
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut pins: FnvIndexSet<u8, 32> = FnvIndexSet::new();
        let mut claim = |pin: u8| -> Result<(), ConfigError> {
            match pins.insert(pin) {
                Ok(true) => Ok(()),
                _ => Err(ConfigError::PinConflict(pin)),
            }
        };

        for motor in &self.motors {
            motor.validate()?;
            for pin in motor.pins() {
                claim(pin)?;
            }
        }
        for servo in &self.servos {
            servo.validate()?;
            claim(servo.pin)?;
        }

        let names = self
            .motors
            .iter()
            .map(|m| m.name.as_str())
            .chain(self.servos.iter().map(|s| s.name.as_str()));
        for (i, name) in names.clone().enumerate() {
            if names.clone().skip(i + 1).any(|other| other == name) {
                return Err(ConfigError::DuplicateName);
            }
        }
        Ok(())
    }
}
