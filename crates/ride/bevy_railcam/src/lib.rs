use bevy::input::mouse::MouseWheel;
use bevy::prelude::*;
use railcam_core::{Preferences, RideCommand, RideConfig, RideEvent, RideSession, TrackDef};

pub mod components;
pub mod resources;
pub mod systems;

pub use components::RideCamera;
pub use resources::{PendingRideInputs, RideState, ScrollSettings};
pub use systems::pose_transform;

#[derive(Resource)]
pub struct RideResource(pub RideSession);

/// Host request for the ride: stop-panel choices, settings, seeks.
#[derive(Event, Debug, Clone)]
pub struct RideRequest(pub RideCommand);

/// Ride event re-emitted into the ECS after each tick.
#[derive(Event, Debug, Clone, PartialEq)]
pub struct RideNotice(pub RideEvent);

pub struct RailcamPlugin {
    pub track: TrackDef,
    pub config: RideConfig,
    pub preferences: Preferences,
}

impl Default for RailcamPlugin {
    fn default() -> Self {
        Self {
            track: TrackDef::coaster(),
            config: RideConfig::default(),
            preferences: Preferences::default(),
        }
    }
}

impl Plugin for RailcamPlugin {
    fn build(&self, app: &mut App) {
        let session = match RideSession::new(&self.track, self.config.clone(), self.preferences)
        {
            Ok(session) => session,
            Err(e) => {
                error!("railcam: ride setup failed, plugin disabled: {e}");
                return;
            }
        };

        app.insert_resource(RideResource(session))
            .init_resource::<PendingRideInputs>()
            .init_resource::<ScrollSettings>()
            .init_resource::<RideState>()
            .add_event::<MouseWheel>()
            .add_event::<RideRequest>()
            .add_event::<RideNotice>()
            .add_systems(
                Update,
                (
                    systems::collect_scroll_system,
                    systems::collect_requests_system,
                    systems::tick_ride_system,
                )
                    .chain(),
            );
    }
}
