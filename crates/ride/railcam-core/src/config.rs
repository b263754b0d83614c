//! Core configuration for railcam-core.
//!
//! Everything here is fixed for the lifetime of a session. Values the user may tune
//! while riding (offsets, input scale) live in [`crate::Preferences`] instead.

use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::progress::ReversePolicy;

/// Session constants: loop period, stop gating, look-ahead, drift.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RideConfig {
    /// Accumulated input covering one full traversal of the track.
    pub loop_length: f32,
    /// Half-width of the band around a stop threshold that triggers a halt.
    pub stop_tolerance: f32,
    /// Seconds after a release during which no stop may trigger.
    pub stop_cooldown: f32,
    /// Progress offset of the look-at sample ahead of the camera.
    pub look_ahead: f32,
    /// Forward drift in accumulated units per second while moving (0 disables).
    pub drift_per_second: f32,
    /// How input below the start of the track is treated.
    pub reverse_policy: ReversePolicy,
}

impl Default for RideConfig {
    fn default() -> Self {
        Self {
            loop_length: 20.0,
            stop_tolerance: 0.005,
            stop_cooldown: 10.0,
            look_ahead: 0.01,
            drift_per_second: 0.0,
            reverse_policy: ReversePolicy::default(),
        }
    }
}

/// Drift of the classic coaster page: 0.0005 units per frame at 60 fps.
pub const COASTER_DRIFT_PER_SECOND: f32 = 0.0005 * 60.0;

impl RideConfig {
    /// Defaults plus the slow forward drift the coaster ride always had, so the
    /// camera creeps along even without input.
    pub fn coaster() -> Self {
        Self {
            drift_per_second: COASTER_DRIFT_PER_SECOND,
            ..Self::default()
        }
    }

    /// Reject values the tick pipeline cannot work with.
    pub fn validate(&self) -> Result<(), RideError> {
        if !self.loop_length.is_finite() || self.loop_length <= 0.0 {
            return Err(RideError::config(format!(
                "loop_length must be positive and finite, got {}",
                self.loop_length
            )));
        }
        if !self.stop_tolerance.is_finite() || self.stop_tolerance <= 0.0 {
            return Err(RideError::config(format!(
                "stop_tolerance must be positive and finite, got {}",
                self.stop_tolerance
            )));
        }
        if !self.stop_cooldown.is_finite() || self.stop_cooldown < 0.0 {
            return Err(RideError::config(format!(
                "stop_cooldown must be non-negative and finite, got {}",
                self.stop_cooldown
            )));
        }
        if !self.look_ahead.is_finite() || self.look_ahead <= 0.0 || self.look_ahead >= 1.0 {
            return Err(RideError::config(format!(
                "look_ahead must be in (0, 1), got {}",
                self.look_ahead
            )));
        }
        if !self.drift_per_second.is_finite() {
            return Err(RideError::config("drift_per_second must be finite"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RideConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_loop_length_is_rejected() {
        for bad in [0.0, -20.0, f32::NAN, f32::INFINITY] {
            let cfg = RideConfig {
                loop_length: bad,
                ..RideConfig::default()
            };
            assert!(matches!(
                cfg.validate(),
                Err(RideError::Configuration { .. })
            ));
        }
    }

    #[test]
    fn coaster_preset_drifts_forward() {
        let cfg = RideConfig::coaster();
        assert!(cfg.validate().is_ok());
        assert!((cfg.drift_per_second - 0.03).abs() < 1e-6);
        assert_eq!(cfg.loop_length, RideConfig::default().loop_length);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: RideConfig = serde_json::from_str(r#"{ "loop_length": 40.0 }"#).unwrap();
        assert_eq!(cfg.loop_length, 40.0);
        assert_eq!(cfg.stop_cooldown, 10.0);
        assert_eq!(cfg.reverse_policy, ReversePolicy::ClampAtStart);
    }
}
