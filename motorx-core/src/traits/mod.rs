//! Hardware abstraction traits
//!
//! These traits define the interface between the application's control
//! loop and the motor and servo driver implementations.

pub mod motor;
pub mod servo;

pub use motor::{
    ChipVariant, Direction, DriveRequest, MotorDriver, MotorOutput, BRAKE_DUTY, MAX_SPEED,
};
pub use servo::{ServoDriver, KEEP_TARGET, MAX_ANGLE};
