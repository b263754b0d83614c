use bevy::input::mouse::{MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use railcam_core::{CameraPose, RideEvent};

use crate::components::RideCamera;
use crate::resources::{PendingRideInputs, RideState, ScrollSettings};
use crate::{RideNotice, RideRequest, RideResource};

/// Camera transform for a pose: at `position`, looking at `look_at`, world up.
pub fn pose_transform(pose: &CameraPose) -> Transform {
    let [px, py, pz] = pose.position;
    let [tx, ty, tz] = pose.look_at;
    Transform::from_translation(Vec3::new(px, py, pz)).looking_at(Vec3::new(tx, ty, tz), Vec3::Y)
}

/// Wheel events become ride deltas. Scrolling down (negative y) moves forward.
pub fn collect_scroll_system(
    mut wheel: EventReader<MouseWheel>,
    settings: Res<ScrollSettings>,
    mut pending: ResMut<PendingRideInputs>,
) {
    for ev in wheel.read() {
        let pixels = match ev.unit {
            MouseScrollUnit::Line => ev.y * settings.pixels_per_line,
            MouseScrollUnit::Pixel => ev.y,
        };
        let delta = if settings.invert { pixels } else { -pixels };
        pending.0.deltas.push(delta);
    }
}

pub fn collect_requests_system(
    mut requests: EventReader<RideRequest>,
    mut pending: ResMut<PendingRideInputs>,
) {
    pending
        .0
        .commands
        .extend(requests.read().map(|r| r.0.clone()));
}

/// Step the ride, move every `RideCamera`, and forward ride events.
pub fn tick_ride_system(
    time: Res<Time>,
    mut ride: ResMut<RideResource>,
    mut pending: ResMut<PendingRideInputs>,
    mut state: ResMut<RideState>,
    mut cameras: Query<&mut Transform, With<RideCamera>>,
    mut notices: EventWriter<RideNotice>,
) {
    let inputs = std::mem::take(&mut pending.0);
    let out = ride.0.update(time.delta_seconds(), inputs);

    for ev in &out.events {
        match ev {
            RideEvent::Error { message } => warn!("railcam: {message}"),
            RideEvent::StopStatus { active, stop } => {
                debug!("railcam: stop {stop} active={active}")
            }
            _ => {}
        }
        notices.send(RideNotice(ev.clone()));
    }

    state.progress = out.progress;
    state.status = out.status;

    if let Some(pose) = out.pose {
        let tf = pose_transform(&pose);
        for mut cam in cameras.iter_mut() {
            *cam = tf;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pose_transform_faces_the_target() {
        let pose = CameraPose {
            position: [1.0, 2.0, 3.0],
            look_at: [1.0, 2.0, -7.0],
        };
        let tf = pose_transform(&pose);
        assert_eq!(tf.translation, Vec3::new(1.0, 2.0, 3.0));
        let fwd = tf.forward();
        assert!((fwd.z + 1.0).abs() < 1e-5, "forward {fwd:?}");
    }
}
