//! Unified error handling for the station-matcher library.
//!
//! This module provides a consistent error type for all station-matcher
//! operations, replacing mixed error handling patterns (Option, panic,
//! silent failures).

use std::fmt;

/// Unified error type for station-matcher operations.
#[derive(Debug, Clone)]
pub enum StationMatchError {
    /// An operation that needs at least one route point received none
    EmptyRoute { operation: String },
    /// A point has invalid geographic coordinates
    InvalidCoordinates { name: String, message: String },
    /// The spatial index failed or is not loaded
    IndexUnavailable { message: String },
    /// Generic internal error
    Internal { message: String },
}

impl fmt::Display for StationMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationMatchError::EmptyRoute { operation } => {
                write!(f, "Empty route passed to {}", operation)
            }
            StationMatchError::InvalidCoordinates { name, message } => {
                write!(f, "Point '{}' has invalid coordinates: {}", name, message)
            }
            StationMatchError::IndexUnavailable { message } => {
                write!(f, "Spatial index unavailable: {}", message)
            }
            StationMatchError::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for StationMatchError {}

/// Result type alias for station-matcher operations.
pub type Result<T> = std::result::Result<T, StationMatchError>;

/// Extension trait for converting Option to StationMatchError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an empty route error.
    fn ok_or_empty_route(self, operation: &str) -> Result<T>;

    /// Convert Option to Result with generic internal error.
    fn ok_or_internal(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_empty_route(self, operation: &str) -> Result<T> {
        self.ok_or_else(|| StationMatchError::EmptyRoute {
            operation: operation.to_string(),
        })
    }

    fn ok_or_internal(self, message: &str) -> Result<T> {
        self.ok_or_else(|| StationMatchError::Internal {
            message: message.to_string(),
        })
    }
}
