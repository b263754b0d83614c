//! Output contracts from the ride session.
//!
//! Outputs carry the pose for this tick plus a list of semantic events. Adapters
//! (Bevy/WASM) apply the pose to the host camera and forward events to the stop UI.

use serde::{Deserialize, Serialize};

use crate::motion::{MotionStatus, ResumeChoice};
use crate::pose::CameraPose;
use crate::preferences::PreferenceKey;

/// Discrete semantic signals emitted during stepping.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum RideEvent {
    /// Stop UI visibility: `active: true` on halt, `false` on release.
    StopStatus { active: bool, stop: usize },
    /// The ride left a stop.
    Resumed { stop: usize, choice: ResumeChoice },
    /// The rider chose the side path at `stop`; the host switches scene context.
    EnterRequested { stop: usize },
    /// A preference changed through a batched command; the host persists it.
    PreferenceChanged { key: PreferenceKey, value: f32 },
    /// A command or tick step failed; the tick itself still completed.
    Error { message: String },
}

/// Outputs returned by RideSession::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    /// Camera pose for this tick; None only before the first valid pose.
    #[serde(default)]
    pub pose: Option<CameraPose>,
    /// Normalized progress after this tick.
    #[serde(default)]
    pub progress: f32,
    #[serde(default)]
    pub status: MotionStatus,
    #[serde(default)]
    pub events: Vec<RideEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.pose = None;
        self.events.clear();
    }

    #[inline]
    pub fn push_event(&mut self, event: RideEvent) {
        self.events.push(event);
    }

    /// The stop that became active this tick, if any.
    pub fn halted_at(&self) -> Option<usize> {
        self.events.iter().find_map(|e| match e {
            RideEvent::StopStatus { active: true, stop } => Some(*stop),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_tagged() {
        let json = serde_json::to_value(RideEvent::StopStatus {
            active: true,
            stop: 1,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "stop_status", "active": true, "stop": 1 })
        );
    }

    #[test]
    fn halted_at_finds_activation_only() {
        let mut out = Outputs::default();
        out.push_event(RideEvent::StopStatus {
            active: false,
            stop: 0,
        });
        assert_eq!(out.halted_at(), None);
        out.push_event(RideEvent::StopStatus {
            active: true,
            stop: 2,
        });
        assert_eq!(out.halted_at(), Some(2));
    }
}
