//! Motion stepping
//!
//! Bounded per-call stepping of motor speed and servo angle. These types
//! hold no hardware; drivers feed their results to the outputs.

pub mod angle;
pub mod ramp;
pub mod speed;

pub use angle::AngleRamp;
pub use ramp::step_toward;
pub use speed::SpeedRamp;
