//! Track description: control points, stop thresholds, curve type.
//!
//! JSON shape:
//! ```json
//! { "name": "coaster", "curve_type": "uniform",
//!   "control_points": [[0,0,0], [10,5,-10], ...], "stops": [0.25, 0.5] }
//! ```

use serde::{Deserialize, Serialize};

use crate::curve::{ClosedCurve, CurveType};
use crate::error::RideError;
use crate::math::Vec3;
use crate::stops::StopSet;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrackDef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub curve_type: CurveType,
    pub control_points: Vec<Vec3>,
    /// Normalized stop thresholds, strictly increasing in (0,1).
    #[serde(default)]
    pub stops: Vec<f32>,
}

impl TrackDef {
    /// The twelve-point coaster loop with three evenly spaced stops.
    pub fn coaster() -> Self {
        Self {
            name: "coaster".into(),
            curve_type: CurveType::Uniform,
            control_points: vec![
                [0.0, 0.0, 0.0],
                [10.0, 5.0, -10.0],
                [20.0, 0.0, -20.0],
                [30.0, 10.0, -30.0],
                [40.0, 0.0, -40.0],
                [50.0, 5.0, -50.0],
                [50.0, 10.0, -60.0],
                [40.0, 15.0, -70.0],
                [30.0, 10.0, -80.0],
                [20.0, 5.0, -70.0],
                [10.0, 3.0, -60.0],
                [0.0, 0.0, -50.0],
            ],
            stops: vec![0.25, 0.5, 0.75],
        }
    }

    /// Build the static parts of a ride: the curve and its stop set.
    pub fn build(&self) -> Result<(ClosedCurve, StopSet), RideError> {
        let curve = ClosedCurve::new(self.control_points.clone(), self.curve_type)?;
        let stops = StopSet::new(&self.stops)?;
        Ok((curve, stops))
    }
}

/// Parse a track JSON document.
pub fn parse_track_json(s: &str) -> Result<TrackDef, RideError> {
    serde_json::from_str(s).map_err(|e| RideError::Parse {
        reason: format!("track json: {e}"),
    })
}
