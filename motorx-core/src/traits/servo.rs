//! Servo driver trait
//!
//! Hobby servos are positioned by a periodic pulse whose width encodes the
//! commanded angle. Drivers track a target angle and the angle currently
//! being output, and approach the target a bounded step per call.

/// Largest servo angle in degrees
pub const MAX_ANGLE: u8 = 180;

/// Angle argument that keeps the previous target
pub const KEEP_TARGET: u8 = 254;

/// Trait for pulse-positioned hobby servos
pub trait ServoDriver {
    /// Perform one control step and emit one pulse
    ///
    /// `angle` replaces the target unless it is [`KEEP_TARGET`]. A non-zero
    /// `increment` moves the output angle one step toward the target; zero
    /// jumps straight to it. Nothing is written while disabled.
    fn step(&mut self, angle: u8, increment: u8);

    /// Re-emit the current target without changing it
    fn refresh(&mut self) {
        self.step(KEEP_TARGET, 0);
    }

    /// Allow pulse output
    fn enable(&mut self);

    /// Stop pulse output
    fn disable(&mut self);

    /// Check if pulse output is enabled
    fn is_enabled(&self) -> bool;

    /// Last commanded target angle
    ///
    /// This is the target, not necessarily the angle being output.
    fn read_angle(&self) -> u8;

    /// Angle currently being output
    fn current_angle(&self) -> u8;
}
