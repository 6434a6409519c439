//! MotorX - DC motor and servo demo firmware
//!
//! Main firmware binary for RP2040-based boards. Drives one H-bridge DC
//! motor and one hobby servo from the wiring described in board.toml, with
//! a demo sequence publishing commands to the control loop.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_time::Delay;
use {defmt_rtt as _, panic_probe as _};

use motorx_core::config::{
    parse_board_config, BoardConfig, MotorHwConfig, ServoHwConfig, ServoOutputMode,
};
use motorx_core::traits::ChipVariant;
use motorx_drivers::{BridgeMotor, PulseServo};

use crate::tasks::control::{MotorIo, ServoIo};

mod channels;
mod tasks;

/// Embedded board configuration (compiled into firmware)
/// Edit board.toml and rebuild to customize
const BOARD_CONFIG: &str = include_str!("../board.toml");

/// System clock feeding the PWM slices
const CLK_SYS_HZ: u32 = 125_000_000;

/// GPIO numbers the peripherals below are bound to
const MOTOR_PIN_A: u8 = 0;
const MOTOR_PIN_B: u8 = 1;
const SERVO_PIN: u8 = 15;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("MotorX firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = load_board_config();
    let motor_config = match config.find_motor("drive") {
        // PWM slice 0 carries both bridge inputs; there are no direction pins
        Some(motor) if motor.chip.is_dual_input() => motor.clone(),
        Some(motor) => {
            error!(
                "Motor chip {} needs direction pins, board is wired for a dual-input bridge",
                motor.chip.name()
            );
            fallback_motor_config()
        }
        None => {
            warn!("No 'drive' motor configured");
            fallback_motor_config()
        }
    };
    let servo_config = match config.find_servo("arm") {
        Some(servo) if servo.mode == ServoOutputMode::BitBang => servo.clone(),
        Some(_) => {
            error!("Servo PWM mode is not wired on this board, pulses are bit-banged");
            fallback_servo_config()
        }
        None => {
            warn!("No 'arm' servo configured");
            fallback_servo_config()
        }
    };

    if (motor_config.pin_a, motor_config.pin_b) != (MOTOR_PIN_A, MOTOR_PIN_B) {
        warn!(
            "Motor configured on GPIO{}/GPIO{}, board wiring is GPIO{}/GPIO{}",
            motor_config.pin_a, motor_config.pin_b, MOTOR_PIN_A, MOTOR_PIN_B
        );
    }
    if servo_config.pin != SERVO_PIN {
        warn!(
            "Servo configured on GPIO{}, board wiring is GPIO{}",
            servo_config.pin, SERVO_PIN
        );
    }

    // Motor: both bridge inputs on PWM slice 0
    let mut pwm_config = PwmConfig::default();
    pwm_config.top = pwm_top(motor_config.frequency_hz);
    let pwm = Pwm::new_output_ab(p.PWM_SLICE0, p.PIN_0, p.PIN_1, pwm_config);
    let (out_a, out_b) = pwm.split();

    let mut motor_io = MotorIo::new();
    unwrap!(motor_io.add_pwm(motor_config.pin_a, unwrap!(out_a)));
    unwrap!(motor_io.add_pwm(motor_config.pin_b, unwrap!(out_b)));
    let motor = unwrap!(BridgeMotor::configure(motor_io, &motor_config));
    info!(
        "Motor '{}' ready: {} at {} Hz",
        motor_config.name.as_str(),
        motor.chip().name(),
        motor_config.frequency_hz
    );

    // Servo: bit-banged on a plain output
    let mut servo_io = ServoIo::new();
    unwrap!(servo_io.add_digital(servo_config.pin, Output::new(p.PIN_15, Level::Low)));
    let servo = unwrap!(PulseServo::attach(servo_io, Delay, &servo_config));
    info!(
        "Servo '{}' ready: {}-{} us pulses",
        servo_config.name.as_str(),
        servo_config.timing.min_pulse_us,
        servo_config.timing.max_pulse_us
    );

    spawner
        .spawn(tasks::control_task(
            motor,
            servo,
            motor_config.increment,
            servo_config.increment,
        ))
        .unwrap();
    spawner.spawn(tasks::sequencer_task()).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// PWM counter wrap value for a frequency at the default divider
fn pwm_top(frequency_hz: u32) -> u16 {
    (CLK_SYS_HZ / frequency_hz.max(1))
        .saturating_sub(1)
        .min(u16::MAX as u32) as u16
}

/// Parse the embedded board configuration
///
/// Falls back to the board's built-in wiring if board.toml is broken.
fn load_board_config() -> BoardConfig {
    match parse_board_config(BOARD_CONFIG) {
        Ok(config) => {
            info!(
                "Parsed board configuration: {} motor(s), {} servo(s)",
                config.motors.len(),
                config.servos.len()
            );
            config
        }
        Err(e) => {
            error!("Failed to parse board config: {:?}", e);
            error!("Using built-in wiring");
            BoardConfig::new()
        }
    }
}

/// Motor config matching the board wiring
fn fallback_motor_config() -> MotorHwConfig {
    warn!("Using default L9110 motor on GPIO{}/GPIO{}", MOTOR_PIN_A, MOTOR_PIN_B);
    let mut config =
        MotorHwConfig::new(ChipVariant::L9110, MOTOR_PIN_A, MOTOR_PIN_B).with_channels(0, 1);
    let _ = config.name.push_str("drive");
    config
}

/// Servo config matching the board wiring
fn fallback_servo_config() -> ServoHwConfig {
    warn!("Using default bit-banged servo on GPIO{}", SERVO_PIN);
    let mut config = ServoHwConfig::new(SERVO_PIN);
    let _ = config.name.push_str("arm");
    config
}
