//! Board configuration parser
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! board configuration files. It does NOT support the full TOML grammar and
//! needs no allocator.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - `[board]`, `[motor.<name>]` and `[servo.<name>]` section headers
//! - Comments (# ...), including trailing comments
//! - Underscores in integers (20_000)
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings and escape sequences
//! - Floats and datetime values
//!
//! ```toml
//! [motor.drive]
//! chip = "l9110"
//! pin_a = "gpio0"
//! pin_b = "gpio1"
//!
//! [servo.arm]
//! pin = "gpio15"
//! increment = 2
//! ```

use heapless::String;

use super::hardware::{BoardConfig, ConfigError, MotorHwConfig, ServoHwConfig, ServoOutputMode};
use super::MAX_LABEL_LEN;
use crate::traits::ChipVariant;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid section header
    InvalidSection,
    /// Line is neither a header nor `key = value`
    InvalidLine,
    /// Key not known in the current section
    UnknownKey,
    /// Invalid value type or out of range value
    InvalidValue,
    /// Invalid pin string
    InvalidPin,
    /// Device name longer than the label limit
    NameTooLong,
    /// Too many items (exceeded heapless capacity)
    TooManyItems,
    /// A required key is missing
    MissingKey,
    /// Parsed configuration failed validation
    Config(ConfigError),
}

impl From<ConfigError> for ParseError {
    fn from(e: ConfigError) -> Self {
        ParseError::Config(e)
    }
}

/// Servo settings that are resolved once the whole section is read
#[derive(Default)]
struct ServoDraft {
    pwm: bool,
    channel: Option<u8>,
}

/// Current parsing context
enum Section {
    Root,
    Board,
    Motor(MotorHwConfig),
    Servo(ServoHwConfig, ServoDraft),
}

/// Parsed right-hand side of a `key = value` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value<'a> {
    Str(&'a str),
    Int(u32),
    Bool(bool),
}

impl<'a> Value<'a> {
    fn as_str(self) -> Result<&'a str, ParseError> {
        match self {
            Value::Str(s) => Ok(s),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_u32(self) -> Result<u32, ParseError> {
        match self {
            Value::Int(v) => Ok(v),
            _ => Err(ParseError::InvalidValue),
        }
    }

    fn as_u8(self) -> Result<u8, ParseError> {
        u8::try_from(self.as_u32()?).map_err(|_| ParseError::InvalidValue)
    }

    /// Pin given as `"gpioN"` or as a bare number
    fn as_pin(self) -> Result<u8, ParseError> {
        match self {
            Value::Str(s) => parse_pin_string(s).ok_or(ParseError::InvalidPin),
            Value::Int(v) => u8::try_from(v).map_err(|_| ParseError::InvalidPin),
            Value::Bool(_) => Err(ParseError::InvalidPin),
        }
    }
}

/// Parse a board configuration file
///
/// The result is validated before it is returned.
pub fn parse_board_config(input: &str) -> Result<BoardConfig, ParseError> {
    let mut config = BoardConfig::new();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = strip_comment(line).trim();

        // Skip empty lines and comments
        if line.is_empty() {
            continue;
        }

        // Check for section header
        if line.starts_with('[') && line.ends_with(']') {
            finish_section(section, &mut config)?;
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ParseError::InvalidLine)?;
        let key = key.trim();
        let value = parse_value(value.trim())?;

        match &mut section {
            Section::Root | Section::Board => apply_board_key(&mut config, key, value)?,
            Section::Motor(motor) => apply_motor_key(motor, key, value)?,
            Section::Servo(servo, draft) => apply_servo_key(servo, draft, key, value)?,
        }
    }

    finish_section(section, &mut config)?;
    config.validate()?;
    Ok(config)
}

/// Parse a pin string from config
///
/// Supports `"gpio11"` and `"11"`.
pub fn parse_pin_string(s: &str) -> Option<u8> {
    let s = s.trim();
    let num_str = match s.get(..4) {
        Some(prefix) if prefix.eq_ignore_ascii_case("gpio") => &s[4..],
        _ => s,
    };
    parse_int(num_str).and_then(|v| u8::try_from(v).ok())
}

fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_int(s: &str) -> Option<u32> {
    let mut value: u32 = 0;
    let mut digits = 0;
    for c in s.chars() {
        if c == '_' && digits > 0 {
            continue;
        }
        let d = c.to_digit(10)?;
        value = value.checked_mul(10)?.checked_add(d)?;
        digits += 1;
    }
    (digits > 0).then_some(value)
}

fn parse_value(s: &str) -> Result<Value<'_>, ParseError> {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        return Ok(Value::Str(&s[1..s.len() - 1]));
    }
    match s {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => parse_int(s).map(Value::Int).ok_or(ParseError::InvalidValue),
    }
}

fn parse_name(s: &str) -> Result<String<MAX_LABEL_LEN>, ParseError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ParseError::InvalidSection);
    }
    let mut name = String::new();
    name.push_str(s).map_err(|_| ParseError::NameTooLong)?;
    Ok(name)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    let header = header.trim();
    if header == "board" {
        return Ok(Section::Board);
    }

    let (kind, name) = header.split_once('.').ok_or(ParseError::InvalidSection)?;
    let name = parse_name(name)?;
    match kind.trim() {
        "motor" => Ok(Section::Motor(MotorHwConfig {
            name,
            ..MotorHwConfig::default()
        })),
        "servo" => Ok(Section::Servo(
            ServoHwConfig {
                name,
                ..ServoHwConfig::default()
            },
            ServoDraft::default(),
        )),
        _ => Err(ParseError::InvalidSection),
    }
}

fn finish_section(section: Section, config: &mut BoardConfig) -> Result<(), ParseError> {
    match section {
        Section::Root | Section::Board => Ok(()),
        Section::Motor(motor) => config
            .motors
            .push(motor)
            .map_err(|_| ParseError::TooManyItems),
        Section::Servo(mut servo, draft) => {
            if draft.pwm {
                let channel = draft.channel.ok_or(ParseError::MissingKey)?;
                servo.mode = ServoOutputMode::Pwm { channel };
            }
            config
                .servos
                .push(servo)
                .map_err(|_| ParseError::TooManyItems)
        }
    }
}

fn apply_board_key(config: &mut BoardConfig, key: &str, value: Value) -> Result<(), ParseError> {
    match key {
        "version" => config.version = value.as_u8()?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_motor_key(motor: &mut MotorHwConfig, key: &str, value: Value) -> Result<(), ParseError> {
    match key {
        "chip" => {
            let chip = match value {
                Value::Int(code) => u8::try_from(code).ok().and_then(ChipVariant::from_code),
                _ => ChipVariant::from_name(value.as_str()?),
            };
            motor.chip = chip.ok_or(ParseError::InvalidValue)?
        }
        "pin_a" => motor.pin_a = value.as_pin()?,
        "pin_b" => motor.pin_b = value.as_pin()?,
        "pin_pwm" => motor.pin_pwm = Some(value.as_pin()?),
        "channel_a" => motor.channel_a = Some(value.as_u8()?),
        "channel_b" => motor.channel_b = Some(value.as_u8()?),
        "channel_pwm" => motor.channel_pwm = Some(value.as_u8()?),
        "frequency_hz" => motor.frequency_hz = value.as_u32()?,
        "resolution_bits" => motor.resolution_bits = value.as_u8()?,
        "increment" => motor.increment = value.as_u8()?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

fn apply_servo_key(
    servo: &mut ServoHwConfig,
    draft: &mut ServoDraft,
    key: &str,
    value: Value,
) -> Result<(), ParseError> {
    match key {
        "pin" => servo.pin = value.as_pin()?,
        "mode" => {
            draft.pwm = match value.as_str()? {
                "bitbang" => false,
                "pwm" => true,
                _ => return Err(ParseError::InvalidValue),
            }
        }
        "channel" => draft.channel = Some(value.as_u8()?),
        "min_pulse_us" => servo.timing.min_pulse_us = value.as_u32()?,
        "max_pulse_us" => servo.timing.max_pulse_us = value.as_u32()?,
        "frame_us" => servo.timing.frame_us = value.as_u32()?,
        "increment" => servo.increment = value.as_u8()?,
        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
# Demo board
[board]
version = 2

[motor.drive]
chip = "l9110"      # two PWM inputs
pin_a = "gpio0"
pin_b = "gpio1"
channel_a = 0
channel_b = 1
increment = 10

[motor.winch]
chip = "VNH2SP30"
pin_a = 4
pin_b = 5
pin_pwm = "gpio6"
channel_pwm = 2
frequency_hz = 20_000

[servo.arm]
pin = "gpio15"
increment = 2

[servo.claw]
pin = "gpio16"
mode = "pwm"
channel = 3
min_pulse_us = 500
max_pulse_us = 2500
"#;

    #[test]
    fn test_parse_board() {
        let config = parse_board_config(BOARD).unwrap();
        assert_eq!(config.version, 2);
        assert_eq!(config.motors.len(), 2);
        assert_eq!(config.servos.len(), 2);

        let drive = config.find_motor("drive").unwrap();
        assert_eq!(drive.chip, ChipVariant::L9110);
        assert_eq!((drive.pin_a, drive.pin_b), (0, 1));
        assert_eq!((drive.channel_a, drive.channel_b), (Some(0), Some(1)));
        assert_eq!(drive.frequency_hz, 5000);
        assert_eq!(drive.increment, 10);

        let winch = config.find_motor("winch").unwrap();
        assert_eq!(winch.chip, ChipVariant::Vnh2sp30);
        assert_eq!(winch.pin_pwm, Some(6));
        assert_eq!(winch.channel_pwm, Some(2));
        assert_eq!(winch.frequency_hz, 20_000);

        let arm = config.find_servo("arm").unwrap();
        assert_eq!(arm.pin, 15);
        assert_eq!(arm.mode, ServoOutputMode::BitBang);
        assert_eq!(arm.timing.min_pulse_us, 540);
        assert_eq!(arm.increment, 2);

        let claw = config.find_servo("claw").unwrap();
        assert_eq!(claw.mode, ServoOutputMode::Pwm { channel: 3 });
        assert_eq!(claw.timing.min_pulse_us, 500);
        assert_eq!(claw.timing.max_pulse_us, 2500);
    }

    #[test]
    fn test_parse_pin_string() {
        assert_eq!(parse_pin_string("gpio11"), Some(11));
        assert_eq!(parse_pin_string("GPIO3"), Some(3));
        assert_eq!(parse_pin_string("7"), Some(7));
        assert_eq!(parse_pin_string("gpio"), None);
        assert_eq!(parse_pin_string("gpio300"), None);
        assert_eq!(parse_pin_string("pin11"), None);
        assert_eq!(parse_pin_string(""), None);
    }

    #[test]
    fn test_comment_inside_string_kept() {
        assert_eq!(strip_comment(r#"name = "a#b" # note"#), r#"name = "a#b" "#);
    }

    #[test]
    fn test_unknown_key() {
        let input = "[motor.m]\nspeed = 5\n";
        assert_eq!(parse_board_config(input), Err(ParseError::UnknownKey));
    }

    #[test]
    fn test_unknown_chip() {
        let input = "[motor.m]\nchip = \"drv8833\"\n";
        assert_eq!(parse_board_config(input), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_chip_by_code() {
        let input = "[motor.m]\nchip = 2\npin_a = 3\npin_b = 4\npin_pwm = 5\n";
        let board = parse_board_config(input).unwrap();
        assert_eq!(board.motors[0].chip, ChipVariant::Vnh2sp30);

        let input = "[motor.m]\nchip = 3\n";
        assert_eq!(parse_board_config(input), Err(ParseError::InvalidValue));
    }

    #[test]
    fn test_invalid_section() {
        assert_eq!(
            parse_board_config("[stepper.x]\n"),
            Err(ParseError::InvalidSection)
        );
        assert_eq!(parse_board_config("[motor]\n"), Err(ParseError::InvalidSection));
        assert_eq!(
            parse_board_config("[motor.this_name_is_too_long]\n"),
            Err(ParseError::NameTooLong)
        );
    }

    #[test]
    fn test_invalid_line_and_value() {
        assert_eq!(parse_board_config("[motor.m]\npin_a\n"), Err(ParseError::InvalidLine));
        assert_eq!(
            parse_board_config("[motor.m]\nincrement = 300\n"),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_board_config("[motor.m]\npin_a = \"d4\"\n"),
            Err(ParseError::InvalidPin)
        );
    }

    #[test]
    fn test_pwm_servo_needs_channel() {
        let input = "[servo.s]\npin = 3\nmode = \"pwm\"\n";
        assert_eq!(parse_board_config(input), Err(ParseError::MissingKey));
    }

    #[test]
    fn test_too_many_motors() {
        let input = "[motor.a]\npin_a = 0\npin_b = 1\n\
                     [motor.b]\npin_a = 2\npin_b = 3\n\
                     [motor.c]\npin_a = 4\npin_b = 5\n\
                     [motor.d]\npin_a = 6\npin_b = 7\n\
                     [motor.e]\npin_a = 8\npin_b = 9\n";
        assert_eq!(parse_board_config(input), Err(ParseError::TooManyItems));
    }

    #[test]
    fn test_validation_runs() {
        let input = "[motor.a]\npin_a = 0\npin_b = 1\n[servo.s]\npin = 1\n";
        assert_eq!(
            parse_board_config(input),
            Err(ParseError::Config(ConfigError::PinConflict(1)))
        );
    }
}
