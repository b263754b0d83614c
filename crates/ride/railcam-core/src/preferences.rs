//! User-tunable per-tick parameters and their persistence seam.
//!
//! Preferences are read once from a [`PreferenceStore`] when the session starts
//! (absent keys keep their defaults) and written back one key at a time whenever a
//! value changes. The session reads them fresh every tick, so tuning never rebuilds
//! the track.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::RideError;
use crate::math::Vec3;

/// Names of the persisted values. The string form is the storage key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PreferenceKey {
    VerticalOffset,
    DepthOffset,
    LookAtVerticalOffset,
    InputScale,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 4] = [
        PreferenceKey::VerticalOffset,
        PreferenceKey::DepthOffset,
        PreferenceKey::LookAtVerticalOffset,
        PreferenceKey::InputScale,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PreferenceKey::VerticalOffset => "verticalOffset",
            PreferenceKey::DepthOffset => "depthOffset",
            PreferenceKey::LookAtVerticalOffset => "lookAtVerticalOffset",
            PreferenceKey::InputScale => "inputScale",
        }
    }
}

impl FromStr for PreferenceKey {
    type Err = RideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PreferenceKey::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| RideError::UnknownPreference { name: s.to_string() })
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    /// World-space Y offset of the camera above the track.
    pub vertical_offset: f32,
    /// World-space Z offset of the camera.
    pub depth_offset: f32,
    /// World-space Y offset of the look-at target.
    pub look_at_vertical_offset: f32,
    /// Multiplier from raw input delta to accumulated progress.
    pub input_scale: f32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            vertical_offset: 0.0,
            depth_offset: 0.0,
            look_at_vertical_offset: 0.0,
            // Wheel deltaY of ~100 per notch moves 0.01 accumulated units.
            input_scale: 0.0001,
        }
    }
}

impl Preferences {
    pub fn get(&self, key: PreferenceKey) -> f32 {
        match key {
            PreferenceKey::VerticalOffset => self.vertical_offset,
            PreferenceKey::DepthOffset => self.depth_offset,
            PreferenceKey::LookAtVerticalOffset => self.look_at_vertical_offset,
            PreferenceKey::InputScale => self.input_scale,
        }
    }

    pub fn set(&mut self, key: PreferenceKey, value: f32) -> Result<(), RideError> {
        if !value.is_finite() {
            return Err(RideError::NonFinitePreference {
                name: key.name().to_string(),
            });
        }
        let slot = match key {
            PreferenceKey::VerticalOffset => &mut self.vertical_offset,
            PreferenceKey::DepthOffset => &mut self.depth_offset,
            PreferenceKey::LookAtVerticalOffset => &mut self.look_at_vertical_offset,
            PreferenceKey::InputScale => &mut self.input_scale,
        };
        *slot = value;
        Ok(())
    }

    /// Defaults overridden by every known, finite entry of `saved`.
    pub fn from_map(saved: &HashMap<String, f32>) -> Self {
        let mut prefs = Self::default();
        for (name, &value) in saved {
            let key = match name.parse::<PreferenceKey>() {
                Ok(key) => key,
                Err(_) => {
                    log::warn!("ignoring unknown saved preference '{name}'");
                    continue;
                }
            };
            if let Err(e) = prefs.set(key, value) {
                log::warn!("ignoring saved preference: {e}");
            }
        }
        prefs
    }

    pub fn to_map(&self) -> HashMap<String, f32> {
        PreferenceKey::ALL
            .into_iter()
            .map(|k| (k.name().to_string(), self.get(k)))
            .collect()
    }

    /// Load from a store, falling back to defaults when the store fails.
    pub fn load_from(store: &mut dyn PreferenceStore) -> Self {
        match store.load() {
            Ok(saved) => Self::from_map(&saved),
            Err(e) => {
                log::warn!("preference store unavailable, using defaults: {e}");
                Self::default()
            }
        }
    }

    /// Camera offset from the track point, in world axes.
    #[inline]
    pub fn camera_offset(&self) -> Vec3 {
        [0.0, self.vertical_offset, self.depth_offset]
    }

    /// Look-at target offset from the look-ahead point, in world axes.
    #[inline]
    pub fn look_at_offset(&self) -> Vec3 {
        [0.0, self.look_at_vertical_offset, 0.0]
    }
}

/// Persistence seam for preferences. Hosts supply browser storage, files, etc.
pub trait PreferenceStore {
    /// Every saved entry; an empty map when nothing was saved yet.
    fn load(&mut self) -> Result<HashMap<String, f32>, RideError>;
    fn save(&mut self, name: &str, value: f32) -> Result<(), RideError>;
}

/// In-memory store; useful for tests and hosts without persistence.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    pub values: HashMap<String, f32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&mut self) -> Result<HashMap<String, f32>, RideError> {
        Ok(self.values.clone())
    }

    fn save(&mut self, name: &str, value: f32) -> Result<(), RideError> {
        self.values.insert(name.to_string(), value);
        Ok(())
    }
}

/// Flat `{ "name": number }` JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn store_err(path: &Path, e: impl std::fmt::Display) -> RideError {
    RideError::Store {
        reason: format!("{}: {e}", path.display()),
    }
}

impl PreferenceStore for JsonFileStore {
    fn load(&mut self) -> Result<HashMap<String, f32>, RideError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let text = fs::read_to_string(&self.path).map_err(|e| store_err(&self.path, e))?;
        serde_json::from_str(&text).map_err(|e| store_err(&self.path, e))
    }

    fn save(&mut self, name: &str, value: f32) -> Result<(), RideError> {
        // An unreadable file must not block later saves; rewrite it from scratch.
        let mut values = self.load().unwrap_or_else(|e| {
            log::warn!("overwriting unreadable preference file: {e}");
            HashMap::new()
        });
        values.insert(name.to_string(), value);
        let text = serde_json::to_string_pretty(&values).map_err(|e| store_err(&self.path, e))?;
        fs::write(&self.path, text).map_err(|e| store_err(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_names_round_trip() {
        for key in PreferenceKey::ALL {
            assert_eq!(key.name().parse::<PreferenceKey>().unwrap(), key);
        }
        assert!("fieldOfView".parse::<PreferenceKey>().is_err());
    }

    #[test]
    fn saved_values_override_defaults() {
        let mut saved = HashMap::new();
        saved.insert("verticalOffset".to_string(), 1.5);
        saved.insert("bogus".to_string(), 3.0);
        saved.insert("inputScale".to_string(), f32::NAN);
        let prefs = Preferences::from_map(&saved);
        assert_eq!(prefs.vertical_offset, 1.5);
        assert_eq!(prefs.input_scale, Preferences::default().input_scale);
    }

    #[test]
    fn set_rejects_non_finite() {
        let mut prefs = Preferences::default();
        assert!(prefs.set(PreferenceKey::DepthOffset, f32::INFINITY).is_err());
        prefs.set(PreferenceKey::DepthOffset, -2.0).unwrap();
        assert_eq!(prefs.camera_offset(), [0.0, 0.0, -2.0]);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::new();
        store.save("lookAtVerticalOffset", 0.75).unwrap();
        let prefs = Preferences::load_from(&mut store);
        assert_eq!(prefs.look_at_vertical_offset, 0.75);
        assert_eq!(prefs.look_at_offset(), [0.0, 0.75, 0.0]);
    }
}
