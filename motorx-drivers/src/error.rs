//! Driver setup errors

use motorx_core::config::ConfigError;
use motorx_hal::IoError;

/// Errors that can occur while configuring a driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SetupError {
    /// Configuration is inconsistent
    Config(ConfigError),
    /// Hardware rejected a pin or channel
    Io(IoError),
}

impl From<ConfigError> for SetupError {
    fn from(e: ConfigError) -> Self {
        SetupError::Config(e)
    }
}

impl From<IoError> for SetupError {
    fn from(e: IoError) -> Self {
        SetupError::Io(e)
    }
}
