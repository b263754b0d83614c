//! Railcam Core (engine-agnostic)
//!
//! Scroll-driven rail camera: a closed Catmull-Rom track, a progress tracker
//! that folds unbounded scroll input into [0,1), stop points that halt the
//! ride until a choice is made, and a pose resolver that turns progress into
//! a camera position plus look-at target. Adapters (Bevy/WASM) own the frame
//! loop and the renderer; this crate only does the math and the state.

pub mod config;
pub mod curve;
pub mod error;
pub mod inputs;
pub mod math;
pub mod motion;
pub mod outputs;
pub mod pose;
pub mod preferences;
pub mod progress;
pub mod session;
pub mod stops;
pub mod track;

// Re-exports for consumers (adapters)
pub use config::RideConfig;
pub use curve::{ClosedCurve, CurveType, ARC_LENGTH_DIVISIONS};
pub use error::RideError;
pub use inputs::{Inputs, RideCommand};
pub use math::Vec3;
pub use motion::{MotionMachine, MotionStatus, ResumeChoice};
pub use outputs::{Outputs, RideEvent};
pub use pose::{CameraPose, PoseResolver};
pub use preferences::{
    JsonFileStore, MemoryStore, PreferenceKey, PreferenceStore, Preferences,
};
pub use progress::{normalize_progress, ProgressTracker, ReversePolicy};
pub use session::RideSession;
pub use stops::{StopDefinition, StopDetector, StopSet};
pub use track::{parse_track_json, TrackDef};
