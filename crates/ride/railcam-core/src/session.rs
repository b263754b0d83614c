//! RideSession: data ownership and public API for one ride.
//!
//! Static setup (curve, arc table, stops) is built once in `new`. Per-tick
//! parameters (preferences) are read fresh on every `update`, so tuning never
//! rebuilds anything.
//!
//! Tick order: commands -> input deltas -> drift -> stop detection -> pose.

use crate::config::RideConfig;
use crate::curve::ClosedCurve;
use crate::error::RideError;
use crate::inputs::{Inputs, RideCommand};
use crate::motion::{MotionMachine, MotionStatus, ResumeChoice};
use crate::outputs::{Outputs, RideEvent};
use crate::pose::{CameraPose, PoseResolver};
use crate::preferences::{PreferenceKey, PreferenceStore, Preferences};
use crate::progress::ProgressTracker;
use crate::stops::{StopDetector, StopSet};
use crate::track::TrackDef;

#[derive(Debug)]
pub struct RideSession {
    // Static setup
    cfg: RideConfig,
    curve: ClosedCurve,
    stops: StopSet,
    detector: StopDetector,
    resolver: PoseResolver,

    // Mutable ride state
    tracker: ProgressTracker,
    motion: MotionMachine,
    prefs: Preferences,
    /// Seconds since the session started (sum of tick dt). f64 so 1/60 s ticks
    /// still register after days of uptime.
    clock: f64,
    last_pose: Option<CameraPose>,
    alive: bool,

    // Events raised between ticks, flushed into the next Outputs.
    pending: Vec<RideEvent>,
    outputs: Outputs,
}

impl RideSession {
    /// Validate and build a session. Any error here must abort setup before the
    /// frame loop starts.
    pub fn new(track: &TrackDef, cfg: RideConfig, prefs: Preferences) -> Result<Self, RideError> {
        cfg.validate()?;
        let (curve, stops) = track.build()?;
        let resolver = PoseResolver::new(cfg.look_ahead);
        let first_pose = resolver.resolve(&curve, 0.0, &prefs)?;

        log::debug!(
            "ride session '{}' ready: {} control points, {} stops, length {:.2}",
            track.name,
            curve.control_points().len(),
            stops.len(),
            curve.length()
        );

        Ok(Self {
            detector: StopDetector::new(cfg.stop_tolerance, cfg.stop_cooldown),
            tracker: ProgressTracker::new(cfg.loop_length, cfg.reverse_policy),
            motion: MotionMachine::new(),
            resolver,
            curve,
            stops,
            cfg,
            prefs,
            clock: 0.0,
            last_pose: Some(first_pose),
            alive: true,
            pending: Vec::new(),
            outputs: Outputs::default(),
        })
    }

    /// Session with preferences loaded from `store` (defaults when it fails).
    pub fn with_store(
        track: &TrackDef,
        cfg: RideConfig,
        store: &mut dyn PreferenceStore,
    ) -> Result<Self, RideError> {
        Self::new(track, cfg, Preferences::load_from(store))
    }

    pub fn config(&self) -> &RideConfig {
        &self.cfg
    }

    pub fn curve(&self) -> &ClosedCurve {
        &self.curve
    }

    pub fn stops(&self) -> &StopSet {
        &self.stops
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    pub fn status(&self) -> MotionStatus {
        self.motion.status()
    }

    /// Normalized progress in [0,1).
    pub fn normalized(&self) -> f32 {
        self.tracker.normalized()
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Most recent valid pose.
    pub fn pose(&self) -> Option<CameraPose> {
        self.last_pose
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Tear down: every later call is a silent no-op.
    pub fn dispose(&mut self) {
        if self.alive {
            log::debug!("ride session disposed at t={:.3}s", self.clock);
        }
        self.alive = false;
        self.pending.clear();
        self.outputs = Outputs::default();
    }

    /// Merge one raw input event. Returns false when discarded (halted or disposed).
    pub fn apply_input(&mut self, delta: f32) -> bool {
        if !self.alive {
            return false;
        }
        self.tracker
            .apply_input(delta, self.prefs.input_scale, &self.motion.status())
    }

    /// Leave the active stop along the main track; starts the cooldown.
    pub fn continue_ride(&mut self) -> Result<(), RideError> {
        if !self.alive {
            return Ok(());
        }
        let stop = self.motion.resume_continue(self.clock)?;
        self.pending.push(RideEvent::StopStatus {
            active: false,
            stop,
        });
        self.pending.push(RideEvent::Resumed {
            stop,
            choice: ResumeChoice::Continue,
        });
        Ok(())
    }

    /// Leave the active stop into its side path. Progress moves just past the stop so
    /// it is not detected again; the scene switch itself belongs to the host.
    pub fn enter(&mut self) -> Result<(), RideError> {
        if !self.alive {
            return Ok(());
        }
        let stop = self.motion.resume_enter(self.clock)?;
        if let Some(def) = self.stops.get(stop) {
            self.tracker.advance_past(def.threshold, self.cfg.stop_tolerance);
        }
        self.pending.push(RideEvent::StopStatus {
            active: false,
            stop,
        });
        self.pending.push(RideEvent::Resumed {
            stop,
            choice: ResumeChoice::Enter,
        });
        self.pending.push(RideEvent::EnterRequested { stop });
        Ok(())
    }

    /// Jump to normalized progress `progress` in [0,1). Rejected while halted.
    pub fn seek(&mut self, progress: f32) -> Result<(), RideError> {
        if !self.alive {
            return Ok(());
        }
        crate::curve::check_domain(progress)?;
        if let MotionStatus::Halted { stop } = self.motion.status() {
            return Err(RideError::AlreadyHalted { stop });
        }
        self.tracker.force_to(progress);
        Ok(())
    }

    /// Update one preference. Returns whether the value changed.
    pub fn set_preference(&mut self, key: PreferenceKey, value: f32) -> Result<bool, RideError> {
        if !self.alive {
            return Ok(false);
        }
        if self.prefs.get(key) == value {
            return Ok(false);
        }
        self.prefs.set(key, value)?;
        Ok(true)
    }

    /// Update one preference and write it to `store` when it changed.
    /// A failed write leaves the previous value in place.
    pub fn set_and_save_preference(
        &mut self,
        key: PreferenceKey,
        value: f32,
        store: &mut dyn PreferenceStore,
    ) -> Result<(), RideError> {
        let previous = self.prefs.get(key);
        if self.set_preference(key, value)? {
            if let Err(e) = store.save(key.name(), value) {
                // Keep session and store in agreement.
                self.prefs.set(key, previous)?;
                return Err(e);
            }
        }
        Ok(())
    }

    /// Step the ride by `dt` seconds with the inputs gathered since the last tick.
    pub fn update(&mut self, dt: f32, inputs: Inputs) -> &Outputs {
        self.outputs.clear();
        if !self.alive {
            return &self.outputs;
        }
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        self.clock += f64::from(dt);

        // 1) Commands from the stop UI / settings panel
        self.apply_commands(inputs.commands);
        self.outputs.events.append(&mut self.pending);

        // 2) Input deltas, then drift (both ignored while halted)
        for delta in inputs.deltas {
            self.apply_input(delta);
        }
        self.tracker
            .apply_autonomous_advance(self.cfg.drift_per_second * dt, &self.motion.status());

        // 3) Stop detection
        self.detect_stop();

        // 4) Pose
        self.resolve_pose();

        self.outputs.progress = self.tracker.normalized();
        self.outputs.status = self.motion.status();
        &self.outputs
    }

    fn apply_commands(&mut self, commands: Vec<RideCommand>) {
        for cmd in commands {
            let result = match cmd {
                RideCommand::Continue => self.continue_ride(),
                RideCommand::Enter => self.enter(),
                RideCommand::Seek { progress } => self.seek(progress),
                RideCommand::SetPreference { key, value } => {
                    self.set_preference(key, value).map(|changed| {
                        if changed {
                            self.pending
                                .push(RideEvent::PreferenceChanged { key, value });
                        }
                    })
                }
            };
            if let Err(e) = result {
                log::warn!("ride command rejected: {e}");
                self.pending.push(RideEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    fn detect_stop(&mut self) {
        let normalized = self.tracker.normalized();
        let hit = self
            .detector
            .detect(&self.stops, normalized, &self.motion, self.clock)
            .copied();
        let Some(stop) = hit else {
            return;
        };
        match self.motion.halt(stop.index) {
            Ok(()) => {
                self.tracker.force_to(stop.threshold);
                self.outputs.push_event(RideEvent::StopStatus {
                    active: true,
                    stop: stop.index,
                });
            }
            Err(e) => self.outputs.push_event(RideEvent::Error {
                message: e.to_string(),
            }),
        }
    }

    fn resolve_pose(&mut self) {
        let t = self.tracker.normalized();
        debug_assert!((0.0..1.0).contains(&t), "normalized progress {t} out of range");
        let t = if (0.0..1.0).contains(&t) { t } else { 0.0 };

        match self.resolver.resolve(&self.curve, t, &self.prefs) {
            Ok(pose) => self.last_pose = Some(pose),
            Err(e) => {
                log::warn!("pose resolution failed at t={t}, keeping previous pose: {e}");
                self.outputs.push_event(RideEvent::Error {
                    message: e.to_string(),
                });
            }
        }
        self.outputs.pose = self.last_pose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(stops: Vec<f32>) -> TrackDef {
        TrackDef {
            name: "test".into(),
            curve_type: Default::default(),
            control_points: vec![
                [0.0, 0.0, 0.0],
                [10.0, 5.0, -10.0],
                [20.0, 0.0, -20.0],
                [30.0, 10.0, -30.0],
            ],
            stops,
        }
    }

    fn unit_scale() -> Preferences {
        Preferences {
            input_scale: 1.0,
            ..Preferences::default()
        }
    }

    #[test]
    fn new_rejects_bad_config() {
        let cfg = RideConfig {
            loop_length: 0.0,
            ..RideConfig::default()
        };
        assert!(RideSession::new(&track(vec![]), cfg, unit_scale()).is_err());
        assert!(RideSession::new(&track(vec![0.5, 0.4]), RideConfig::default(), unit_scale())
            .is_err());
    }

    #[test]
    fn pose_is_defined_right_after_init() {
        let s = RideSession::new(&track(vec![]), RideConfig::default(), unit_scale()).unwrap();
        assert!(s.pose().is_some());
    }

    #[test]
    fn set_preference_reports_changes() {
        let mut s = RideSession::new(&track(vec![]), RideConfig::default(), unit_scale()).unwrap();
        assert!(!s.set_preference(PreferenceKey::InputScale, 1.0).unwrap());
        assert!(s.set_preference(PreferenceKey::InputScale, 2.0).unwrap());
        assert!(s
            .set_preference(PreferenceKey::VerticalOffset, f32::NAN)
            .is_err());
    }

    #[test]
    fn seek_is_rejected_while_halted() {
        let mut s =
            RideSession::new(&track(vec![0.25]), RideConfig::default(), unit_scale()).unwrap();
        s.apply_input(5.0);
        s.update(0.016, Inputs::default());
        assert!(matches!(
            s.seek(0.1),
            Err(RideError::AlreadyHalted { stop: 0 })
        ));
        assert!(s.seek(1.0).is_err());
    }
}
