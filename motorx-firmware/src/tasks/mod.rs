//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals.

pub mod control;
pub mod sequencer;

pub use control::{control_task, Motor, Servo};
pub use sequencer::sequencer_task;
