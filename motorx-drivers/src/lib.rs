//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in motorx-core, written against the `HardwareIo` capability from
//! motorx-hal:
//!
//! - DC motors behind H-bridge chips (L9110, TA6586, VNH2SP30)
//! - Hobby servos (bit-banged or hardware PWM pulses)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod error;
pub mod motor;
pub mod servo;

#[cfg(test)]
mod mock;

pub use error::SetupError;
pub use motor::BridgeMotor;
pub use servo::PulseServo;
