//! Demo motion sequence
//!
//! Cycles the motor through forward, reverse and both stop modes while
//! sweeping the servo, publishing commands for the control task.

use defmt::*;
use embassy_time::{Duration, Timer};

use motorx_core::traits::DriveRequest;

use crate::channels::{MotorCommand, ServoCommand, MOTOR_CMD, SERVO_CMD};

/// One step of the demo sequence
struct SequenceStep {
    motor: MotorCommand,
    servo: ServoCommand,
    hold: Duration,
}

const fn step(request: DriveRequest, speed: u8, servo: ServoCommand, hold_ms: u64) -> SequenceStep {
    SequenceStep {
        motor: MotorCommand { request, speed },
        servo,
        hold: Duration::from_millis(hold_ms),
    }
}

const SEQUENCE: [SequenceStep; 7] = [
    step(DriveRequest::Forward, 200, ServoCommand::MoveTo(0), 3000),
    step(DriveRequest::Forward, 80, ServoCommand::MoveTo(180), 3000),
    // Reversal winds the speed down through zero before turning
    step(DriveRequest::Reverse, 150, ServoCommand::MoveTo(90), 6000),
    step(DriveRequest::Coast, 0, ServoCommand::Disable, 2000),
    step(DriveRequest::Forward, 254, ServoCommand::Enable, 3000),
    step(DriveRequest::Brake, 0, ServoCommand::MoveTo(45), 2000),
    step(DriveRequest::Coast, 0, ServoCommand::MoveTo(0), 2000),
];

/// Publish the demo sequence forever
#[embassy_executor::task]
pub async fn sequencer_task() {
    info!("Sequencer task started");

    loop {
        for (i, step) in SEQUENCE.iter().enumerate() {
            info!(
                "Step {}: motor {:?} at {}, servo {:?}",
                i, step.motor.request, step.motor.speed, step.servo
            );
            MOTOR_CMD.signal(step.motor);
            SERVO_CMD.signal(step.servo);
            Timer::after(step.hold).await;
        }
    }
}
