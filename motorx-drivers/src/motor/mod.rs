//! Motor driver implementations
//!
//! - H-bridge DC motors: ramped speed, reversal through zero, coast and brake

pub mod bridge;

pub use bridge::BridgeMotor;
