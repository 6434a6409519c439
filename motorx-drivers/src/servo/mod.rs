//! Servo driver implementations

pub mod pulse;

pub use pulse::PulseServo;
