//! Stop points along the track and the detector that halts the ride at them.

use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::motion::MotionMachine;

/// One stop: a normalized threshold in (0,1) with its stable index.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StopDefinition {
    pub index: usize,
    pub threshold: f32,
}

/// Ordered stop thresholds, strictly increasing inside (0,1).
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct StopSet {
    stops: Vec<StopDefinition>,
}

impl StopSet {
    pub fn new(thresholds: &[f32]) -> Result<Self, RideError> {
        let mut last = 0.0f32;
        let mut stops = Vec::with_capacity(thresholds.len());
        for (index, &threshold) in thresholds.iter().enumerate() {
            if !threshold.is_finite() || threshold <= 0.0 || threshold >= 1.0 {
                return Err(RideError::config(format!(
                    "stop {index} threshold {threshold} is outside (0, 1)"
                )));
            }
            if index > 0 && threshold == last {
                return Err(RideError::config(format!(
                    "stop {index} duplicates threshold {threshold}"
                )));
            }
            if threshold < last {
                return Err(RideError::config(format!(
                    "stop {index} threshold {threshold} is below the previous stop {last}"
                )));
            }
            stops.push(StopDefinition { index, threshold });
            last = threshold;
        }
        Ok(Self { stops })
    }

    pub fn get(&self, index: usize) -> Option<&StopDefinition> {
        self.stops.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StopDefinition> {
        self.stops.iter()
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }
}

/// Tolerance band plus global cooldown.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StopDetector {
    pub tolerance: f32,
    pub cooldown: f32,
}

impl StopDetector {
    pub fn new(tolerance: f32, cooldown: f32) -> Self {
        Self {
            tolerance,
            cooldown,
        }
    }

    /// First stop, in definition order, whose band contains `normalized`.
    /// None while halted or while the cooldown since the last release is running.
    pub fn detect<'a>(
        &self,
        stops: &'a StopSet,
        normalized: f32,
        motion: &MotionMachine,
        now: f64,
    ) -> Option<&'a StopDefinition> {
        if !motion.status().is_moving() || !motion.cooldown_elapsed(now, self.cooldown) {
            return None;
        }
        stops
            .iter()
            .find(|s| (normalized - s.threshold).abs() < self.tolerance)
    }
}
