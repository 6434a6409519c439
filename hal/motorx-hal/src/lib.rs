//! MotorX Hardware Abstraction Layer
//!
//! This crate defines the hardware I/O capability that the motor and servo
//! drivers are written against. Each target provides one implementation of
//! it, so the same ramping logic runs unchanged on every board.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Drivers (motorx-drivers)               │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  motorx-hal (this crate - HardwareIo)   │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  EmbeddedIo   │       │  test doubles │
//! │ (embedded-hal)│       │               │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Items
//!
//! - [`io::HardwareIo`] - Digital writes, PWM duty writes, PWM channel setup
//! - [`embedded::EmbeddedIo`] - `HardwareIo` over embedded-hal 1.0 pins

#![no_std]
#![deny(unsafe_code)]

pub mod embedded;
pub mod io;

// Re-export key items at crate root for convenience
pub use embedded::EmbeddedIo;
pub use io::{ChannelId, HardwareIo, IoError, PinId, PwmChannelConfig, PwmTarget};
