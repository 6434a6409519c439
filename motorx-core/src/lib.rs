//! Board-agnostic core logic for MotorX drivers
//!
//! This crate contains all logic that does not depend on specific
//! hardware implementations:
//!
//! - Motor and servo driver traits
//! - Speed and angle stepping (direction-change policy, bounded ramps)
//! - Configuration type definitions and the board file parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod motion;
pub mod traits;
