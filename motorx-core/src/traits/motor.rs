//! Motor driver traits
//!
//! This module defines the types shared by DC motor drivers that sit behind
//! an H-bridge style chip:
//! - Chip variants and their output wiring
//! - Drive requests (forward, reverse, coast, brake)
//! - The output state written by each control step

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest speed (duty) value a motor driver outputs
pub const MAX_SPEED: u8 = 254;

/// Duty written to both bridge inputs when braking
pub const BRAKE_DUTY: u8 = 254;

/// Motor rotation direction
///
/// Encoded as 0 (forward) and 1 (reverse), which is also the level written
/// to the first direction input of the driver chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Forward rotation (code 0)
    #[default]
    Forward,
    /// Reverse rotation (code 1)
    Reverse,
}

impl Direction {
    /// Numeric code (0 = forward, 1 = reverse)
    pub const fn code(self) -> u8 {
        match self {
            Direction::Forward => 0,
            Direction::Reverse => 1,
        }
    }

    /// Parse a numeric code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Direction::Forward),
            1 => Some(Direction::Reverse),
            _ => None,
        }
    }
}

/// Requested motor action for one control step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DriveRequest {
    /// Rotate forward (code 0)
    Forward,
    /// Rotate in reverse (code 1)
    Reverse,
    /// Let the outputs float (code 2)
    Coast,
    /// Short the outputs to brake, if the wiring supports it (code 3)
    Brake,
}

impl DriveRequest {
    /// Numeric code (0 = forward, 1 = reverse, 2 = coast, 3 = brake)
    pub const fn code(self) -> u8 {
        match self {
            DriveRequest::Forward => 0,
            DriveRequest::Reverse => 1,
            DriveRequest::Coast => 2,
            DriveRequest::Brake => 3,
        }
    }

    /// Parse a numeric code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(DriveRequest::Forward),
            1 => Some(DriveRequest::Reverse),
            2 => Some(DriveRequest::Coast),
            3 => Some(DriveRequest::Brake),
            _ => None,
        }
    }

    /// Rotation direction of this request, if it is one
    pub const fn direction(self) -> Option<Direction> {
        match self {
            DriveRequest::Forward => Some(Direction::Forward),
            DriveRequest::Reverse => Some(Direction::Reverse),
            DriveRequest::Coast | DriveRequest::Brake => None,
        }
    }
}

impl From<Direction> for DriveRequest {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Forward => DriveRequest::Forward,
            Direction::Reverse => DriveRequest::Reverse,
        }
    }
}

/// Motor driver chip variant
///
/// Selects how speed and direction are mapped onto the driver inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChipVariant {
    /// L9110 - two PWM inputs, one per direction
    #[default]
    L9110,
    /// TA6586 - two PWM inputs, one per direction
    Ta6586,
    /// VNH2SP30 - two direction inputs plus one PWM input
    Vnh2sp30,
}

impl ChipVariant {
    /// Numeric code (0 = L9110, 1 = TA6586, 2 = VNH2SP30)
    pub const fn code(self) -> u8 {
        match self {
            ChipVariant::L9110 => 0,
            ChipVariant::Ta6586 => 1,
            ChipVariant::Vnh2sp30 => 2,
        }
    }

    /// Parse a numeric code
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ChipVariant::L9110),
            1 => Some(ChipVariant::Ta6586),
            2 => Some(ChipVariant::Vnh2sp30),
            _ => None,
        }
    }

    /// Name used in board configuration files
    pub const fn name(self) -> &'static str {
        match self {
            ChipVariant::L9110 => "l9110",
            ChipVariant::Ta6586 => "ta6586",
            ChipVariant::Vnh2sp30 => "vnh2sp30",
        }
    }

    /// Parse a configuration name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        [ChipVariant::L9110, ChipVariant::Ta6586, ChipVariant::Vnh2sp30]
            .into_iter()
            .find(|chip| chip.name().eq_ignore_ascii_case(name))
    }

    /// True for chips driven by two PWM inputs (one per direction)
    pub const fn is_dual_input(self) -> bool {
        matches!(self, ChipVariant::L9110 | ChipVariant::Ta6586)
    }

    /// True for chips with a dedicated PWM input and two direction pins
    pub const fn has_pwm_input(self) -> bool {
        matches!(self, ChipVariant::Vnh2sp30)
    }
}

/// Output state written to the driver chip by a control step
///
/// Coast, brake and driving are mutually exclusive: exactly one of them is
/// written per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MotorOutput {
    /// Outputs off, motor freewheels
    #[default]
    Coast,
    /// Outputs shorted, motor brakes
    Brake,
    /// Motor driven in `direction` with `duty`
    Driving {
        /// Direction the bridge is driving
        direction: Direction,
        /// Duty written to the active input (0-254)
        duty: u8,
    },
}

impl MotorOutput {
    /// Duty values for the two inputs of a dual-input bridge
    ///
    /// Input A carries `duty * direction`, input B `duty * (1 - direction)`.
    pub const fn bridge_duties(self) -> (u8, u8) {
        match self {
            MotorOutput::Coast => (0, 0),
            MotorOutput::Brake => (BRAKE_DUTY, BRAKE_DUTY),
            MotorOutput::Driving { direction, duty } => match direction {
                Direction::Forward => (0, duty),
                Direction::Reverse => (duty, 0),
            },
        }
    }

    /// Levels for the two direction pins of a PWM-input bridge
    pub const fn direction_levels(self) -> (bool, bool) {
        match self {
            MotorOutput::Coast => (false, false),
            MotorOutput::Brake => (true, true),
            MotorOutput::Driving { direction, .. } => match direction {
                Direction::Forward => (false, true),
                Direction::Reverse => (true, false),
            },
        }
    }
}

/// Trait for DC motors behind an H-bridge driver chip
///
/// The driver is stepped by calling [`drive`](MotorDriver::drive)
/// periodically. Every call moves the speed by at most one increment and
/// writes the resulting output to the hardware.
pub trait MotorDriver {
    /// Perform one control step
    ///
    /// - The stored direction only follows `request` while the speed is 0.
    /// - A request that differs from the stored direction (reversal, coast
    ///   or brake) forces the speed down instead of toward `speed`.
    /// - `increment == speed` sets the speed directly.
    ///
    /// Out of range values are clamped to 254.
    fn drive(&mut self, request: DriveRequest, speed: u8, increment: u8);

    /// Current commanded direction
    fn direction(&self) -> Direction;

    /// Current output speed (0-254)
    fn speed(&self) -> u8;

    /// Output written by the last control step
    fn output(&self) -> MotorOutput;

    /// Coast immediately and reset the speed to 0
    fn stop(&mut self);

    /// Check if the motor is at zero speed
    fn is_stopped(&self) -> bool {
        self.speed() == 0
    }
}
