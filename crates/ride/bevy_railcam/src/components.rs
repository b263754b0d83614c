use bevy::prelude::*;

/// Marker for cameras whose Transform follows the ride pose every tick.
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RideCamera;
