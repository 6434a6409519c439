//! Build script for motorx-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time

use std::collections::HashSet;
use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const CHIPS: [&str; 3] = ["l9110", "ta6586", "vnh2sp30"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: board.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds board.toml from the motorx-firmware         ║\n\
            ║  directory. Please create one there.                             ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut pins = HashSet::new();
    report("motor", validate_motors(&config, &mut pins));
    report("servo", validate_servos(&config, &mut pins));

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Abort the build if a section produced errors
fn report(section: &str, errors: Vec<String>) {
    if errors.is_empty() {
        return;
    }
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: Invalid {:<7} configuration                              ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        section,
        errors
            .iter()
            .map(|e| format!("║  • {:<62} ║", e))
            .collect::<Vec<_>>()
            .join("\n")
    );
}

/// Resolve a pin given as "gpioN" or a plain number
fn pin_number(value: &toml::Value) -> Option<i64> {
    match value {
        toml::Value::Integer(n) => Some(*n),
        toml::Value::String(s) => s
            .to_ascii_lowercase()
            .strip_prefix("gpio")
            .and_then(|n| n.parse().ok()),
        _ => None,
    }
}

/// Check a pin key and record it, flagging reuse across the board
fn check_pin(
    section: &str,
    table: &toml::Table,
    key: &str,
    required: bool,
    pins: &mut HashSet<i64>,
    errors: &mut Vec<String>,
) {
    let Some(value) = table.get(key) else {
        if required {
            errors.push(format!("[{}] missing '{}'", section, key));
        }
        return;
    };
    match pin_number(value) {
        Some(pin) if (0..=29).contains(&pin) => {
            if !pins.insert(pin) {
                errors.push(format!("[{}] {} reuses GPIO{}", section, key, pin));
            }
        }
        _ => errors.push(format!("[{}] {} must be gpio0-gpio29", section, key)),
    }
}

/// Check an optional integer key lies in a range
fn check_range(
    section: &str,
    table: &toml::Table,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) {
    match table.get(key) {
        None => {}
        Some(toml::Value::Integer(n)) if range.contains(n) => {}
        Some(_) => errors.push(format!(
            "[{}] {} must be {}-{}",
            section,
            key,
            range.start(),
            range.end()
        )),
    }
}

/// Validate motor configurations
fn validate_motors(config: &toml::Value, pins: &mut HashSet<i64>) -> Vec<String> {
    let motors = match config.get("motor") {
        Some(toml::Value::Table(t)) => t,
        _ => return Vec::new(),
    };

    let mut errors = Vec::new();

    for (name, motor) in motors {
        let section = format!("motor.{}", name);
        let motor = match motor {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("[{}] name longer than 16 characters", section));
        }

        let chip = match motor.get("chip") {
            Some(toml::Value::String(chip)) => chip.to_ascii_lowercase(),
            Some(toml::Value::Integer(code)) => usize::try_from(*code)
                .ok()
                .and_then(|code| CHIPS.get(code))
                .map_or_else(String::new, |chip| chip.to_string()),
            _ => "l9110".to_string(),
        };
        if !CHIPS.contains(&chip.as_str()) {
            errors.push(format!(
                "[{}] chip must be 'l9110', 'ta6586', 'vnh2sp30' or 0-2",
                section
            ));
        }

        check_pin(&section, motor, "pin_a", true, pins, &mut errors);
        check_pin(&section, motor, "pin_b", true, pins, &mut errors);
        check_pin(&section, motor, "pin_pwm", chip == "vnh2sp30", pins, &mut errors);

        if chip != "vnh2sp30" && motor.contains_key("channel_a") != motor.contains_key("channel_b")
        {
            errors.push(format!(
                "[{}] channel_a and channel_b must be given together",
                section
            ));
        }

        for key in ["channel_a", "channel_b", "channel_pwm"] {
            check_range(&section, motor, key, 0..=15, &mut errors);
        }
        check_range(&section, motor, "frequency_hz", 1..=1_000_000, &mut errors);
        check_range(&section, motor, "resolution_bits", 1..=16, &mut errors);
        check_range(&section, motor, "increment", 0..=254, &mut errors);
    }

    errors
}

/// Validate servo configurations
fn validate_servos(config: &toml::Value, pins: &mut HashSet<i64>) -> Vec<String> {
    let servos = match config.get("servo") {
        Some(toml::Value::Table(t)) => t,
        _ => return Vec::new(),
    };

    let mut errors = Vec::new();

    for (name, servo) in servos {
        let section = format!("servo.{}", name);
        let servo = match servo {
            toml::Value::Table(t) => t,
            _ => {
                errors.push(format!("[{}] must be a table", section));
                continue;
            }
        };

        if name.len() > 16 {
            errors.push(format!("[{}] name longer than 16 characters", section));
        }

        check_pin(&section, servo, "pin", true, pins, &mut errors);

        match servo.get("mode") {
            None => {}
            Some(toml::Value::String(mode)) if mode == "bitbang" => {}
            Some(toml::Value::String(mode)) if mode == "pwm" => {
                if !servo.contains_key("channel") {
                    errors.push(format!("[{}] mode 'pwm' requires 'channel'", section));
                }
            }
            Some(_) => errors.push(format!("[{}] mode must be 'bitbang' or 'pwm'", section)),
        }

        check_range(&section, servo, "channel", 0..=15, &mut errors);
        check_range(&section, servo, "increment", 0..=180, &mut errors);

        let int = |key: &str, default: i64| {
            servo
                .get(key)
                .and_then(toml::Value::as_integer)
                .unwrap_or(default)
        };
        let (min, max, frame) = (
            int("min_pulse_us", 540),
            int("max_pulse_us", 2400),
            int("frame_us", 20_000),
        );
        if !(1..=1_000_000).contains(&frame) {
            errors.push(format!("[{}] frame_us must be 1-1000000", section));
        } else if min >= max || max > frame {
            errors.push(format!(
                "[{}] need min_pulse_us < max_pulse_us <= frame_us",
                section
            ));
        }
    }

    errors
}
