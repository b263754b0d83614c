//! Camera pose from progress: track point plus offsets, looking at a point slightly ahead.

use serde::{Deserialize, Serialize};

use crate::curve::ClosedCurve;
use crate::error::RideError;
use crate::math::{self, Vec3};
use crate::preferences::Preferences;

/// Camera position and look-at target in world space.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// Unit view direction from `position` toward `look_at`.
    pub fn forward(&self) -> Vec3 {
        math::normalize(math::sub(self.look_at, self.position))
    }

    pub fn is_finite(&self) -> bool {
        math::is_finite(self.position) && math::is_finite(self.look_at)
    }
}

/// Samples the curve at progress and at a look-ahead point.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PoseResolver {
    /// Progress distance between the camera and its look-at sample.
    pub look_ahead: f32,
}

impl PoseResolver {
    pub fn new(look_ahead: f32) -> Self {
        Self { look_ahead }
    }

    /// Resolve the pose at normalized progress `t` in [0,1).
    /// Offsets are applied in world axes, not rotated into the track frame.
    pub fn resolve(
        &self,
        curve: &ClosedCurve,
        t: f32,
        prefs: &Preferences,
    ) -> Result<CameraPose, RideError> {
        let on_track = curve.point_at(t)?;
        let ahead_t = (t + self.look_ahead).rem_euclid(1.0);
        // rem_euclid may round up to exactly 1.0
        let ahead_t = if ahead_t >= 1.0 { 0.0 } else { ahead_t };
        let ahead = curve.point_at(ahead_t)?;

        let pose = CameraPose {
            position: math::add(on_track, prefs.camera_offset()),
            look_at: math::add(ahead, prefs.look_at_offset()),
        };
        if pose.is_finite() {
            Ok(pose)
        } else {
            Err(RideError::NonFinitePose)
        }
    }
}
