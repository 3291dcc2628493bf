//! Error types for stormsea.
//!
//! Configuration is validated once, up front. Per-frame code paths never
//! return errors: a bad value that slips in later (e.g. NaN from a debug
//! panel) only degrades that frame's output.

use std::fmt;

/// Errors raised while building or loading a storm configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The rain pool was configured with zero particles.
    EmptyPool,
    /// A range has `min >= max` or non-finite bounds.
    InvalidRange {
        /// Which range was rejected.
        name: &'static str,
        min: f32,
        max: f32,
    },
    /// The rain fall step is zero, negative or not finite.
    InvalidStep(f32),
    /// The respawn ceiling is not a positive finite number.
    InvalidCeiling(f32),
    /// More spawn decimals than an `f32` can hold.
    InvalidPrecision(u32),
    /// A probability or volume outside `[0, 1]`.
    NotUnit { name: &'static str, value: f32 },
    /// A parameter that must be finite is NaN or infinite.
    NonFinite(&'static str),
    /// The water grid needs at least one segment per side and a positive size.
    InvalidGrid { segments: u32 },
    /// A color string could not be parsed as `#rrggbb`.
    InvalidColor(String),
    /// Failed to read or write a config file.
    Io(std::io::Error),
    /// Failed to parse or serialize config JSON.
    Parse(serde_json::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPool => write!(f, "Rain pool needs at least one particle"),
            ConfigError::InvalidRange { name, min, max } => {
                write!(f, "Invalid {} range [{}, {}]: min must be below max and both finite", name, min, max)
            }
            ConfigError::InvalidStep(step) => {
                write!(f, "Rain fall step must be positive and finite, got {}", step)
            }
            ConfigError::InvalidCeiling(ceiling) => {
                write!(f, "Rain ceiling must be positive and finite, got {}", ceiling)
            }
            ConfigError::InvalidPrecision(digits) => {
                write!(f, "Rain precision must be at most {} decimals, got {}", crate::rain::MAX_PRECISION, digits)
            }
            ConfigError::NotUnit { name, value } => {
                write!(f, "`{}` must be within [0, 1], got {}", name, value)
            }
            ConfigError::NonFinite(name) => write!(f, "Parameter `{}` must be finite", name),
            ConfigError::InvalidGrid { segments } => {
                write!(f, "Water grid needs a positive size and at least one segment, got {} segments", segments)
            }
            ConfigError::InvalidColor(s) => write!(f, "Invalid color `{}`, expected #rrggbb", s),
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Errors from addressing a wave parameter by name.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// No parameter with this name exists.
    Unknown(String),
    /// The value's type does not match the parameter.
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::Unknown(name) => write!(f, "Unknown wave parameter `{}`", name),
            ParameterError::TypeMismatch { name, expected } => {
                write!(f, "Parameter `{}` expects a {} value", name, expected)
            }
        }
    }
}

impl std::error::Error for ParameterError {}
