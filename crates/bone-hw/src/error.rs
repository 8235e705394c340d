//! Error type shared by all controllers.

use std::io;
use std::path::{Path, PathBuf};

use platform::{RegistryError, SysfsError};

/// Failure of a pin operation.
///
/// A failed operation never panics: controllers return this and leave every
/// other pin untouched.
#[derive(Debug, thiserror::Error)]
pub enum HwError {
    /// The mode template is not one this layer knows how to apply.
    #[error("unknown pin mode template '{0}'")]
    UnknownModeTemplate(String),

    /// No descriptor with this key in the pin registry.
    #[error("unknown pin {0}")]
    UnknownPin(String),

    /// The pin has no mux register or no `<key>_pinmux.*` helper.
    #[error("no pinmux control for {0}")]
    NoMuxControl(String),

    /// The pin cannot be routed to a PWM channel.
    #[error("pin {0} has no PWM channel")]
    NotPwmCapable(String),

    /// The pin has no GPIO line.
    #[error("pin {0} has no GPIO line")]
    NotGpioCapable(String),

    /// The pin has no analog channel.
    #[error("pin {0} has no analog channel")]
    NotAnalogCapable(String),

    /// PWM update on a channel that was never put into PWM mode.
    #[error("PWM channel {0} has not been set to PWM mode")]
    ChannelNotConfigured(String),

    /// LED alias missing or its trigger file absent.
    #[error("unable to find LED {0}")]
    LedNotFound(String),

    /// Analog read before a successful enable.
    #[error("analog inputs not enabled: {0}")]
    AnalogNotEnabled(&'static str),

    /// No `bone_capemgr.*` directory.
    #[error("cape manager not found")]
    CapeManagerNotFound,

    /// The pin table could not be loaded.
    #[error("pin table: {0}")]
    PinTable(#[from] RegistryError),

    /// Unexpected read or write failure.
    #[error(transparent)]
    Io(#[from] SysfsError),

    /// An attribute held text that could not be interpreted.
    #[error("{}: unexpected contents '{value}'", .path.display())]
    Parse {
        /// Attribute path.
        path: PathBuf,
        /// Trimmed contents.
        value: String,
    },
}

/// Result of a mode-set or pin update.
pub type ModeResult<T> = Result<T, HwError>;

impl HwError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io(SysfsError::new(path, source))
    }

    pub(crate) fn parse(path: &Path, value: &str) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            value: value.trim().to_owned(),
        }
    }
}
