//! Servo angle stepping
//!
//! The output angle is clamped to `[0, target]` after every step, so it
//! rises toward the target one increment at a time but settles on a lower
//! target in a single step.

use super::ramp::step_toward;
use crate::traits::{KEEP_TARGET, MAX_ANGLE};

/// Target/current angle state of a servo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleRamp {
    target: u8,
    current: u8,
}

impl AngleRamp {
    /// Create a ramp at 0°
    pub const fn new() -> Self {
        Self {
            target: 0,
            current: 0,
        }
    }

    /// Last commanded target angle
    pub fn target(&self) -> u8 {
        self.target
    }

    /// Angle currently output
    pub fn current(&self) -> u8 {
        self.current
    }

    /// Apply one step and return the angle to output
    ///
    /// `angle` replaces the target unless it is [`KEEP_TARGET`]; values above
    /// 180 are clamped. `increment` is clamped to 180, and 0 jumps directly
    /// to the target.
    pub fn apply(&mut self, angle: u8, increment: u8) -> u8 {
        let increment = increment.min(MAX_ANGLE);

        if angle != KEEP_TARGET {
            self.target = angle.min(MAX_ANGLE);
        }

        self.current = if increment > 0 {
            step_toward(self.current, self.target, increment).min(self.target)
        } else {
            self.target
        };

        self.current
    }
}
