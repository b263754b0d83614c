//! Error types for the ride core

use serde::{Deserialize, Serialize};

/// Errors surfaced by ride setup and by explicit calls into a session.
///
/// Per-tick failures never reach the frame loop as errors; the session turns
/// them into [`crate::RideEvent::Error`] and keeps the previous pose.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum RideError {
    /// Track, stops, or config cannot describe a valid ride
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    /// Curve parameter outside [0,1)
    #[error("Curve parameter {u} is outside [0, 1)")]
    InvalidDomain { u: f32 },

    /// Resume requested while the ride is moving
    #[error("Ride is not halted")]
    NotHalted,

    /// Halt requested while another stop is active
    #[error("Ride is already halted at stop {stop}")]
    AlreadyHalted { stop: usize },

    /// Unknown preference name
    #[error("Unknown preference: {name}")]
    UnknownPreference { name: String },

    /// Preference value is NaN or infinite
    #[error("Preference {name} must be finite")]
    NonFinitePreference { name: String },

    /// Resolved pose contains NaN or infinite components
    #[error("Resolved camera pose is not finite")]
    NonFinitePose,

    /// Track or config JSON could not be parsed
    #[error("Parse error: {reason}")]
    Parse { reason: String },

    /// Preference store failure
    #[error("Preference store error: {reason}")]
    Store { reason: String },
}

impl RideError {
    pub(crate) fn config(reason: impl Into<String>) -> Self {
        RideError::Configuration {
            reason: reason.into(),
        }
    }

    /// Whether this error must abort setup before the frame loop starts.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RideError::Configuration { .. } | RideError::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_are_fatal() {
        assert!(RideError::config("too few points").is_fatal());
        assert!(!RideError::NotHalted.is_fatal());
        assert!(!RideError::InvalidDomain { u: 1.5 }.is_fatal());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = RideError::UnknownPreference {
            name: "fov".into(),
        };
        assert_eq!(err.to_string(), "Unknown preference: fov");
    }
}
