//! Motion state machine: Moving, or Halted at one stop.
//!
//! Transitions:
//! - Moving -> Halted{i}: `halt(i)`, driven by the stop detector.
//! - Halted{i} -> Moving: `resume(Continue, now)` starts the stop cooldown.
//! - Halted{i} -> Moving: `resume(Enter, now)` hands off to the side-track collaborator.

use serde::{Deserialize, Serialize};

use crate::error::RideError;

#[derive(Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum MotionStatus {
    #[default]
    Moving,
    Halted {
        stop: usize,
    },
}

impl MotionStatus {
    #[inline]
    pub fn is_moving(&self) -> bool {
        matches!(self, MotionStatus::Moving)
    }

    /// Index of the active stop, if halted.
    #[inline]
    pub fn active_stop(&self) -> Option<usize> {
        match self {
            MotionStatus::Moving => None,
            MotionStatus::Halted { stop } => Some(*stop),
        }
    }
}

/// Branch chosen when leaving a stop.
#[derive(Copy, Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResumeChoice {
    /// Carry on along the main track from the stop.
    Continue,
    /// Take the side path offered at the stop.
    Enter,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct MotionMachine {
    status: MotionStatus,
    /// Session time of the most recent `Continue` release.
    last_release: Option<f64>,
}

impl MotionMachine {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn status(&self) -> MotionStatus {
        self.status
    }

    #[inline]
    pub fn last_release(&self) -> Option<f64> {
        self.last_release
    }

    pub fn halt(&mut self, stop: usize) -> Result<(), RideError> {
        if let MotionStatus::Halted { stop: active } = self.status {
            return Err(RideError::AlreadyHalted { stop: active });
        }
        log::debug!("ride halted at stop {stop}");
        self.status = MotionStatus::Halted { stop };
        Ok(())
    }

    /// Leave the active stop. Returns the index of the stop that was released.
    pub fn resume(&mut self, choice: ResumeChoice, now: f64) -> Result<usize, RideError> {
        let stop = self.status.active_stop().ok_or(RideError::NotHalted)?;
        self.status = MotionStatus::Moving;
        if choice == ResumeChoice::Continue {
            self.last_release = Some(now);
        }
        log::debug!("ride resumed from stop {stop} via {choice:?} at t={now:.3}s");
        Ok(stop)
    }

    /// Continue along the main track; starts the cooldown at `now`.
    pub fn resume_continue(&mut self, now: f64) -> Result<usize, RideError> {
        self.resume(ResumeChoice::Continue, now)
    }

    /// Take the side path; the caller moves progress out of the stop band.
    pub fn resume_enter(&mut self, now: f64) -> Result<usize, RideError> {
        self.resume(ResumeChoice::Enter, now)
    }

    /// Whether `cooldown` seconds have passed since the last release.
    pub fn cooldown_elapsed(&self, now: f64, cooldown: f32) -> bool {
        match self.last_release {
            None => true,
            Some(at) => now - at >= f64::from(cooldown),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_moving_without_cooldown() {
        let m = MotionMachine::new();
        assert_eq!(m.status(), MotionStatus::Moving);
        assert!(m.cooldown_elapsed(0.0, 10.0));
    }

    #[test]
    fn halt_then_continue_starts_cooldown() {
        let mut m = MotionMachine::new();
        m.halt(2).unwrap();
        assert_eq!(m.status().active_stop(), Some(2));
        assert_eq!(m.resume(ResumeChoice::Continue, 5.0).unwrap(), 2);
        assert!(m.status().is_moving());
        assert!(!m.cooldown_elapsed(14.9, 10.0));
        assert!(m.cooldown_elapsed(15.0, 10.0));
    }

    #[test]
    fn cooldown_resolves_frame_steps_late_in_a_long_session() {
        let mut m = MotionMachine::new();
        let start = 600_000.0;
        m.halt(0).unwrap();
        m.resume_continue(start).unwrap();
        let mut now = start;
        for _ in 0..599 {
            now += f64::from(1.0f32 / 60.0);
        }
        assert!(!m.cooldown_elapsed(now, 10.0));
        for _ in 0..2 {
            now += f64::from(1.0f32 / 60.0);
        }
        assert!(m.cooldown_elapsed(now, 10.0));
    }

    #[test]
    fn enter_does_not_start_cooldown() {
        let mut m = MotionMachine::new();
        m.halt(0).unwrap();
        assert_eq!(m.resume_enter(3.0), Ok(0));
        assert_eq!(m.last_release(), None);
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut m = MotionMachine::new();
        assert_eq!(m.resume_continue(0.0), Err(RideError::NotHalted));
        m.halt(1).unwrap();
        assert_eq!(m.halt(0), Err(RideError::AlreadyHalted { stop: 1 }));
        assert_eq!(m.status(), MotionStatus::Halted { stop: 1 });
    }

    #[test]
    fn status_serializes_tagged() {
        let json = serde_json::to_value(MotionStatus::Halted { stop: 3 }).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "halted", "stop": 3 }));
    }
}
