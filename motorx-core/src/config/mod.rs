//! Configuration types
//!
//! Board-agnostic wiring descriptions for motors and servos, and the
//! parser for board configuration files.

pub mod hardware;
pub mod parse;

pub use hardware::*;
pub use parse::{parse_board_config, parse_pin_string, ParseError};
