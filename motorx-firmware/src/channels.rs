//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy tasks.
//! A signal holds only the latest command, which is all the control loop
//! needs.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use motorx_core::traits::DriveRequest;

/// Motor command (request and target speed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct MotorCommand {
    pub request: DriveRequest,
    pub speed: u8,
}

impl MotorCommand {
    /// Let the motor wind down and coast
    pub const COAST: Self = Self {
        request: DriveRequest::Coast,
        speed: 0,
    };
}

/// Servo command
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ServoCommand {
    /// Move toward an angle (0-180)
    MoveTo(u8),
    /// Resume pulse output
    Enable,
    /// Stop pulse output
    Disable,
}

/// Motor command signal (updated by the sequencer)
pub static MOTOR_CMD: Signal<CriticalSectionRawMutex, MotorCommand> = Signal::new();

/// Servo command signal (updated by the sequencer)
pub static SERVO_CMD: Signal<CriticalSectionRawMutex, ServoCommand> = Signal::new();
