//! Progress tracking: unbounded accumulated input folded into normalized progress.
//!
//! `accumulated` is whatever the input stream adds up to (scaled). `normalized()` is
//! its position inside the current lap, always in [0,1). All mutation is guarded by
//! the motion status so a halted ride cannot be scrolled.

use serde::{Deserialize, Serialize};

use crate::motion::MotionStatus;

/// How input that would move the ride before its start is treated.
#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReversePolicy {
    /// `accumulated` never drops below 0; scrolling back stops at the start.
    #[default]
    ClampAtStart,
    /// Free bidirectional motion; scrolling back past 0 wraps to the end of the loop.
    Wrap,
}

/// Floor-style modulo of `accumulated` over `loop_length`, divided by `loop_length`.
/// Returns a value in [0,1) for any finite input, including negative ones.
#[inline]
pub fn normalize_progress(accumulated: f32, loop_length: f32) -> f32 {
    if loop_length <= 0.0 || !accumulated.is_finite() {
        return 0.0;
    }
    let n = accumulated.rem_euclid(loop_length) / loop_length;
    // rem_euclid can round up to loop_length for tiny negative inputs.
    if n >= 1.0 {
        0.0
    } else {
        n
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProgressTracker {
    accumulated: f32,
    loop_length: f32,
    policy: ReversePolicy,
}

impl ProgressTracker {
    /// `loop_length` is validated by [`crate::RideConfig::validate`].
    pub fn new(loop_length: f32, policy: ReversePolicy) -> Self {
        Self {
            accumulated: 0.0,
            loop_length,
            policy,
        }
    }

    #[inline]
    pub fn accumulated(&self) -> f32 {
        self.accumulated
    }

    #[inline]
    pub fn loop_length(&self) -> f32 {
        self.loop_length
    }

    #[inline]
    pub fn policy(&self) -> ReversePolicy {
        self.policy
    }

    /// Position inside the current lap, in [0,1).
    #[inline]
    pub fn normalized(&self) -> f32 {
        normalize_progress(self.accumulated, self.loop_length)
    }

    /// Completed laps (negative when wrapping backwards under [`ReversePolicy::Wrap`]).
    #[inline]
    pub fn lap(&self) -> i64 {
        (self.accumulated / self.loop_length).floor() as i64
    }

    /// Add `delta * scale` while moving. Returns false when the input was discarded.
    pub fn apply_input(&mut self, delta: f32, scale: f32, status: &MotionStatus) -> bool {
        if !status.is_moving() {
            return false;
        }
        let step = delta * scale;
        if !step.is_finite() {
            log::warn!("discarding non-finite input step (delta={delta}, scale={scale})");
            return false;
        }
        self.accumulated += step;
        self.apply_policy();
        true
    }

    /// Constant forward drift while moving; `step` is already multiplied by dt.
    pub fn apply_autonomous_advance(&mut self, step: f32, status: &MotionStatus) -> bool {
        if !status.is_moving() || step == 0.0 || !step.is_finite() {
            return false;
        }
        self.accumulated += step;
        self.apply_policy();
        true
    }

    /// Snap onto normalized position `n` inside the current lap.
    pub fn force_to(&mut self, n: f32) {
        self.accumulated = self.lap_base() + n * self.loop_length;
    }

    /// Move to the next whole accumulated unit strictly after normalized position
    /// `n + clearance`, i.e. out of a band of half-width `clearance` around `n`.
    pub fn advance_past(&mut self, n: f32, clearance: f32) {
        let edge = self.lap_base() + (n + clearance) * self.loop_length;
        let mut next = edge.floor() + 1.0;
        // Rounding can leave `next` on the band edge itself.
        if (normalize_progress(next, self.loop_length) - n).abs() < clearance {
            next += 1.0;
        }
        self.accumulated = next;
    }

    /// Back to the start of the track.
    pub fn reset(&mut self) {
        self.accumulated = 0.0;
    }

    #[inline]
    fn lap_base(&self) -> f32 {
        self.lap() as f32 * self.loop_length
    }

    #[inline]
    fn apply_policy(&mut self) {
        if self.policy == ReversePolicy::ClampAtStart && self.accumulated < 0.0 {
            self.accumulated = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const L: f32 = 20.0;

    #[test]
    fn negative_accumulated_wraps_floor_style() {
        assert_eq!(normalize_progress(-5.0, L), 0.75);
        assert_eq!(normalize_progress(-25.0, L), 0.75);
        assert_eq!(normalize_progress(5.0, L), 0.25);
    }

    #[test]
    fn normalized_stays_in_unit_interval() {
        for a in [
            0.0, 1e-9, -1e-9, 19.999_999, 20.0, -20.0, 1e6, -1e6, 123.456, -0.5,
        ] {
            let n = normalize_progress(a, L);
            assert!((0.0..1.0).contains(&n), "{a} -> {n}");
        }
    }

    #[test]
    fn normalized_is_periodic_in_loop_length() {
        for a in [0.0f32, 3.5, -7.25, 12.0] {
            for k in -3i32..=3 {
                let shifted = a + k as f32 * L;
                assert_eq!(normalize_progress(a, L), normalize_progress(shifted, L));
            }
        }
    }

    #[test]
    fn halted_discards_input() {
        let mut p = ProgressTracker::new(L, ReversePolicy::Wrap);
        let halted = MotionStatus::Halted { stop: 0 };
        assert!(!p.apply_input(3.0, 1.0, &halted));
        assert!(!p.apply_autonomous_advance(3.0, &halted));
        assert_eq!(p.accumulated(), 0.0);
    }

    #[test]
    fn clamp_policy_floors_at_start() {
        let mut p = ProgressTracker::new(L, ReversePolicy::ClampAtStart);
        p.apply_input(2.0, 1.0, &MotionStatus::Moving);
        p.apply_input(-10.0, 1.0, &MotionStatus::Moving);
        assert_eq!(p.accumulated(), 0.0);
        assert_eq!(p.normalized(), 0.0);
    }

    #[test]
    fn wrap_policy_goes_backwards_through_the_seam() {
        let mut p = ProgressTracker::new(L, ReversePolicy::Wrap);
        p.apply_input(-5.0, 1.0, &MotionStatus::Moving);
        assert_eq!(p.normalized(), 0.75);
        assert_eq!(p.lap(), -1);
    }

    #[test]
    fn force_to_keeps_the_lap() {
        let mut p = ProgressTracker::new(L, ReversePolicy::ClampAtStart);
        p.apply_input(44.9, 1.0, &MotionStatus::Moving);
        p.force_to(0.25);
        assert_eq!(p.accumulated(), 45.0);
        assert_eq!(p.normalized(), 0.25);
    }

    #[test]
    fn advance_past_moves_strictly_forward() {
        let mut p = ProgressTracker::new(L, ReversePolicy::ClampAtStart);
        p.force_to(0.25);
        p.advance_past(0.25, 0.005);
        assert_eq!(p.accumulated(), 6.0);
        assert!(p.normalized() > 0.25);
    }

    #[test]
    fn advance_past_clears_a_band_wider_than_one_unit() {
        // Band half-width is 0.005 * 400 = 2 units.
        let mut p = ProgressTracker::new(400.0, ReversePolicy::ClampAtStart);
        p.force_to(0.25);
        p.advance_past(0.25, 0.005);
        assert_eq!(p.accumulated(), 103.0);
        assert!(p.normalized() - 0.25 >= 0.005);
    }

    #[test]
    fn non_finite_input_is_ignored() {
        let mut p = ProgressTracker::new(L, ReversePolicy::Wrap);
        assert!(!p.apply_input(f32::NAN, 1.0, &MotionStatus::Moving));
        assert!(!p.apply_input(1.0, f32::INFINITY, &MotionStatus::Moving));
        assert_eq!(p.accumulated(), 0.0);
    }
}
