//! Input contracts for the ride session.
//!
//! Adapters (web/Bevy) collect wheel deltas and stop-UI choices between frames and
//! pass them into `RideSession::update()`. Single events can also be merged right
//! away through `RideSession::apply_input`.

use serde::{Deserialize, Serialize};

use crate::preferences::PreferenceKey;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Inputs {
    /// Raw input deltas (e.g. wheel deltaY), applied in order before stepping.
    #[serde(default)]
    pub deltas: Vec<f32>,
    /// Commands applied before the deltas.
    #[serde(default)]
    pub commands: Vec<RideCommand>,
}

impl Inputs {
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty() && self.commands.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RideCommand {
    /// Leave the active stop along the main track.
    Continue,
    /// Leave the active stop into its side path.
    Enter,
    /// Change a tunable preference.
    SetPreference { key: PreferenceKey, value: f32 },
    /// Jump to a normalized progress in [0,1); rejected while halted.
    Seek { progress: f32 },
}
