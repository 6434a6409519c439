//! Motor speed and direction stepping
//!
//! Direction may only change at zero speed. A request for the other
//! direction while spinning first brings the speed down, so a reversal
//! always passes through a stop.

use super::ramp::step_toward;
use crate::traits::{Direction, DriveRequest, MotorOutput, MAX_SPEED};

/// Speed/direction state of a DC motor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SpeedRamp {
    direction: Direction,
    speed: u8,
}

impl SpeedRamp {
    /// Create a stopped ramp facing forward
    pub const fn new() -> Self {
        Self {
            direction: Direction::Forward,
            speed: 0,
        }
    }

    /// Current direction
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Current speed (0-254)
    pub fn speed(&self) -> u8 {
        self.speed
    }

    /// Reset to zero speed, keeping the direction
    pub fn reset(&mut self) {
        self.speed = 0;
    }

    /// Apply one control step and return the output to write
    pub fn apply(&mut self, request: DriveRequest, speed: u8, increment: u8) -> MotorOutput {
        let increment = increment.min(MAX_SPEED);
        let mut target = speed.min(MAX_SPEED);

        if self.speed == 0 {
            if let Some(dir) = request.direction() {
                self.direction = dir;
            }
        }

        if request.direction() != Some(self.direction) {
            // Wind down before a reversal, coast or brake completes
            target = self.speed.saturating_sub(1);
        }

        self.speed = if increment == target {
            target
        } else {
            step_toward(self.speed, target, increment)
        };

        match request {
            DriveRequest::Coast => MotorOutput::Coast,
            DriveRequest::Brake => MotorOutput::Brake,
            DriveRequest::Forward | DriveRequest::Reverse => MotorOutput::Driving {
                direction: self.direction,
                duty: self.speed,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(direction: Direction, speed: u8) -> SpeedRamp {
        let mut ramp = SpeedRamp::new();
        ramp.apply(direction.into(), speed, speed);
        assert_eq!(ramp.speed(), speed);
        assert_eq!(ramp.direction(), direction);
        ramp
    }

    #[test]
    fn test_initial_state() {
        let ramp = SpeedRamp::new();
        assert_eq!(ramp.direction(), Direction::Forward);
        assert_eq!(ramp.speed(), 0);
    }

    #[test]
    fn test_ramp_up_by_increment() {
        let mut ramp = SpeedRamp::new();

        let output = ramp.apply(DriveRequest::Forward, 100, 10);
        assert_eq!(ramp.speed(), 10);
        assert_eq!(
            output,
            MotorOutput::Driving {
                direction: Direction::Forward,
                duty: 10
            }
        );

        for _ in 0..20 {
            ramp.apply(DriveRequest::Forward, 100, 10);
        }
        assert_eq!(ramp.speed(), 100);
    }

    #[test]
    fn test_ramp_down_by_increment() {
        let mut ramp = running(Direction::Forward, 100);

        ramp.apply(DriveRequest::Forward, 20, 30);
        assert_eq!(ramp.speed(), 70);
        ramp.apply(DriveRequest::Forward, 20, 30);
        assert_eq!(ramp.speed(), 40);
        ramp.apply(DriveRequest::Forward, 20, 30);
        assert_eq!(ramp.speed(), 20);
    }

    #[test]
    fn test_instant_set() {
        let mut ramp = running(Direction::Forward, 30);
        ramp.apply(DriveRequest::Forward, 200, 200);
        assert_eq!(ramp.speed(), 200);

        ramp.apply(DriveRequest::Forward, 5, 5);
        assert_eq!(ramp.speed(), 5);
    }

    #[test]
    fn test_reversal_forces_deceleration() {
        let mut ramp = running(Direction::Forward, 50);

        let output = ramp.apply(DriveRequest::Reverse, 50, 5);
        assert_eq!(ramp.speed(), 49);
        assert_eq!(ramp.direction(), Direction::Forward);
        // Still driving the old direction while winding down
        assert_eq!(
            output,
            MotorOutput::Driving {
                direction: Direction::Forward,
                duty: 49
            }
        );

        let mut calls = 1;
        while ramp.speed() > 0 {
            ramp.apply(DriveRequest::Reverse, 50, 5);
            assert_eq!(ramp.direction(), Direction::Forward);
            calls += 1;
        }
        assert_eq!(calls, 50);

        // At zero speed the reversal takes effect
        ramp.apply(DriveRequest::Reverse, 50, 5);
        assert_eq!(ramp.direction(), Direction::Reverse);
        assert_eq!(ramp.speed(), 5);
    }

    #[test]
    fn test_reversal_from_standstill_is_immediate() {
        let mut ramp = SpeedRamp::new();
        ramp.apply(DriveRequest::Reverse, 40, 10);
        assert_eq!(ramp.direction(), Direction::Reverse);
        assert_eq!(ramp.speed(), 10);
    }

    #[test]
    fn test_coast_is_exclusive_and_winds_down() {
        let mut ramp = running(Direction::Reverse, 10);

        let output = ramp.apply(DriveRequest::Coast, 200, 3);
        assert_eq!(output, MotorOutput::Coast);
        assert_eq!(ramp.speed(), 9);
        assert_eq!(ramp.direction(), Direction::Reverse);
    }

    #[test]
    fn test_brake_keeps_direction_at_standstill() {
        let mut ramp = running(Direction::Reverse, 1);

        let output = ramp.apply(DriveRequest::Brake, 0, 1);
        assert_eq!(output, MotorOutput::Brake);
        assert_eq!(ramp.speed(), 0);

        ramp.apply(DriveRequest::Brake, 0, 1);
        assert_eq!(ramp.direction(), Direction::Reverse);
    }

    #[test]
    fn test_out_of_range_inputs_clamped() {
        let mut ramp = SpeedRamp::new();
        ramp.apply(DriveRequest::Forward, 255, 255);
        assert_eq!(ramp.speed(), 254);
    }

    #[test]
    fn test_zero_increment_holds_speed() {
        let mut ramp = running(Direction::Forward, 60);
        ramp.apply(DriveRequest::Forward, 120, 0);
        assert_eq!(ramp.speed(), 60);
    }

    fn request() -> impl Strategy<Value = DriveRequest> {
        (0u8..4).prop_map(|code| DriveRequest::from_code(code).unwrap())
    }

    proptest! {
        #[test]
        fn prop_speed_stays_in_range(
            steps in prop::collection::vec((request(), any::<u8>(), any::<u8>()), 1..64)
        ) {
            let mut ramp = SpeedRamp::new();
            for (request, speed, increment) in steps {
                ramp.apply(request, speed, increment);
                prop_assert!(ramp.speed() <= MAX_SPEED);
            }
        }

        #[test]
        fn prop_direction_only_changes_at_rest(
            steps in prop::collection::vec((request(), any::<u8>(), any::<u8>()), 1..64)
        ) {
            let mut ramp = SpeedRamp::new();
            for (request, speed, increment) in steps {
                let before = ramp;
                ramp.apply(request, speed, increment);
                if before.speed() != 0 {
                    prop_assert_eq!(ramp.direction(), before.direction());
                }
            }
        }
    }
}
