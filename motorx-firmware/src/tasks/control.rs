//! Motor and servo control loop
//!
//! Applies the latest commands once per servo frame. The motor is stepped
//! every iteration so its speed ramps one increment per frame.

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_rp::pwm::PwmOutput;
use embassy_time::{Delay, Duration, Ticker};

use motorx_core::traits::{MotorDriver, ServoDriver, KEEP_TARGET};
use motorx_drivers::{BridgeMotor, PulseServo};
use motorx_hal::EmbeddedIo;

use crate::channels::{MotorCommand, ServoCommand, MOTOR_CMD, SERVO_CMD};

/// Pin bank for the motor (two PWM inputs)
pub type MotorIo = EmbeddedIo<Output<'static>, PwmOutput<'static>, 0, 2>;

/// Pin bank for the servo (one digital output)
pub type ServoIo = EmbeddedIo<Output<'static>, PwmOutput<'static>, 1, 0>;

pub type Motor = BridgeMotor<MotorIo>;
pub type Servo = PulseServo<ServoIo, Delay>;

/// Control loop period, one servo frame
const FRAME: Duration = Duration::from_millis(20);

/// Drive the motor and servo from the command signals
///
/// `motor_increment` and `servo_increment` come from the board config.
/// While the servo is enabled its bit-banged frame takes the whole period,
/// so the ticker only paces the loop when pulses are off.
#[embassy_executor::task]
pub async fn control_task(
    mut motor: Motor,
    mut servo: Servo,
    motor_increment: u8,
    servo_increment: u8,
) {
    info!("Control task started");

    let mut motor_cmd = MotorCommand::COAST;
    let mut ticker = Ticker::every(FRAME);

    loop {
        if let Some(cmd) = MOTOR_CMD.try_take() {
            debug!("Motor command: {:?} at {}", cmd.request, cmd.speed);
            motor_cmd = cmd;
        }

        let angle = match SERVO_CMD.try_take() {
            Some(ServoCommand::MoveTo(angle)) => {
                debug!("Servo target: {}", angle);
                angle
            }
            Some(ServoCommand::Enable) => {
                debug!("Servo enabled");
                servo.enable();
                KEEP_TARGET
            }
            Some(ServoCommand::Disable) => {
                debug!("Servo disabled at {}", servo.current_angle());
                servo.disable();
                KEEP_TARGET
            }
            None => KEEP_TARGET,
        };

        motor.drive(motor_cmd.request, motor_cmd.speed, motor_increment);
        servo.step(angle, servo_increment);

        trace!(
            "Motor {:?} speed={}, servo {}/{}",
            motor.direction(),
            motor.speed(),
            servo.current_angle(),
            servo.read_angle()
        );

        ticker.next().await;
    }
}
