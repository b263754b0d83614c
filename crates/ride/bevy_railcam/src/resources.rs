use bevy::prelude::*;
use railcam_core::{Inputs, MotionStatus};

/// Inputs gathered since the last tick, consumed by `tick_ride_system`.
#[derive(Resource, Default)]
pub struct PendingRideInputs(pub Inputs);

/// Converts wheel events into the pixel-like deltas the ride expects.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ScrollSettings {
    /// Pixels per wheel line (`MouseScrollUnit::Line`).
    pub pixels_per_line: f32,
    /// Flip when scrolling up should move forward.
    pub invert: bool,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            pixels_per_line: 100.0,
            invert: false,
        }
    }
}

/// Snapshot of the last tick for UI systems (stop overlay, progress bar).
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct RideState {
    pub progress: f32,
    pub status: MotionStatus,
}
