use hashbrown::HashMap;
use js_sys::{Function, JSON};
use serde::Serialize;
use serde_wasm_bindgen as swb;
use wasm_bindgen::prelude::*;

use railcam_core::{
    parse_track_json, Inputs, Outputs, PreferenceKey, PreferenceStore, Preferences, RideConfig,
    RideError, RideEvent, RideSession, TrackDef,
};

#[wasm_bindgen]
pub struct RailcamRide {
    session: RideSession,
    sink: Option<Function>,
}

fn jsvalue_is_undefined_or_null(v: &JsValue) -> bool {
    v.is_undefined() || v.is_null()
}

fn ride_err(e: RideError) -> JsError {
    JsError::new(&e.to_string())
}

/// Plain-object output (maps as objects, not ES Maps).
fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    value
        .serialize(&swb::Serializer::json_compatible())
        .map_err(|e| JsError::new(&format!("serialize error: {e}")))
}

/// Write-only store backed by a JS callback `sink(name: string, value: number)`.
/// Loading happens on the JS side; saved values are passed to the constructor.
struct JsPreferenceSink<'a> {
    f: &'a Function,
}

impl PreferenceStore for JsPreferenceSink<'_> {
    fn load(&mut self) -> Result<HashMap<String, f32>, RideError> {
        Ok(HashMap::new())
    }

    fn save(&mut self, name: &str, value: f32) -> Result<(), RideError> {
        self.f
            .call2(
                &JsValue::UNDEFINED,
                &JsValue::from_str(name),
                &JsValue::from_f64(value as f64),
            )
            .map(|_| ())
            .map_err(|e| RideError::Store {
                reason: format!("preference sink threw: {e:?}"),
            })
    }
}

fn parse_track(track: JsValue) -> Result<TrackDef, JsError> {
    if jsvalue_is_undefined_or_null(&track) {
        return Ok(TrackDef::coaster());
    }
    // Accept either a JSON string or a plain object.
    let text = match track.as_string() {
        Some(s) => s,
        None => JSON::stringify(&track)
            .map_err(|e| JsError::new(&format!("track stringify error: {e:?}")))?
            .as_string()
            .ok_or_else(|| JsError::new("track: stringify produced non-string"))?,
    };
    parse_track_json(&text).map_err(ride_err)
}

#[wasm_bindgen]
impl RailcamRide {
    /// Build a ride. Every argument may be undefined/null for defaults:
    ///   new RailcamRide(trackJsonOrObject, { stop_cooldown: 5 }, { verticalOffset: 1 })
    /// `saved_preferences` is the flat name -> number map previously written by the sink.
    #[wasm_bindgen(constructor)]
    pub fn new(
        track: JsValue,
        config: JsValue,
        saved_preferences: JsValue,
    ) -> Result<RailcamRide, JsError> {
        console_error_panic_hook::set_once();

        let track = parse_track(track)?;
        let cfg: RideConfig = if jsvalue_is_undefined_or_null(&config) {
            RideConfig::default()
        } else {
            swb::from_value(config).map_err(|e| JsError::new(&format!("config error: {e}")))?
        };
        let prefs = if jsvalue_is_undefined_or_null(&saved_preferences) {
            Preferences::default()
        } else {
            let saved: HashMap<String, f32> = swb::from_value(saved_preferences)
                .map_err(|e| JsError::new(&format!("preferences error: {e}")))?;
            Preferences::from_map(&saved)
        };

        let session = RideSession::new(&track, cfg, prefs).map_err(ride_err)?;
        Ok(RailcamRide {
            session,
            sink: None,
        })
    }

    /// Register `sink(name, value)`, called whenever a preference changes.
    #[wasm_bindgen(js_name = set_preference_sink)]
    pub fn set_preference_sink(&mut self, sink: Function) {
        self.sink = Some(sink);
    }

    /// One raw wheel delta. Returns false when the ride discarded it.
    #[wasm_bindgen(js_name = apply_input)]
    pub fn apply_input(&mut self, delta: f32) -> bool {
        self.session.apply_input(delta)
    }

    /// Step by dt seconds. `inputs` is `{ deltas: number[], commands: [...] }` or undefined.
    /// Returns `{ pose, progress, status, events }`.
    /// Batched `set_preference` commands that change a value are sent to the sink too;
    /// a sink failure shows up as an `error` event instead of failing the frame.
    #[wasm_bindgen]
    pub fn update(&mut self, dt: f32, inputs: JsValue) -> Result<JsValue, JsError> {
        let inputs: Inputs = if jsvalue_is_undefined_or_null(&inputs) {
            Inputs::default()
        } else {
            swb::from_value(inputs).map_err(|e| JsError::new(&format!("inputs error: {e}")))?
        };
        let out = self.session.update(dt, inputs);

        let Some(f) = &self.sink else {
            return to_js(out);
        };
        let changed: Vec<(PreferenceKey, f32)> = out
            .events
            .iter()
            .filter_map(|e| match e {
                RideEvent::PreferenceChanged { key, value } => Some((*key, *value)),
                _ => None,
            })
            .collect();
        if changed.is_empty() {
            return to_js(out);
        }

        let mut out: Outputs = out.clone();
        let mut sink = JsPreferenceSink { f };
        for (key, value) in changed {
            if let Err(e) = sink.save(key.name(), value) {
                out.push_event(RideEvent::Error {
                    message: e.to_string(),
                });
            }
        }
        to_js(&out)
    }

    #[wasm_bindgen(js_name = continue_ride)]
    pub fn continue_ride(&mut self) -> Result<(), JsError> {
        self.session.continue_ride().map_err(ride_err)
    }

    #[wasm_bindgen]
    pub fn enter(&mut self) -> Result<(), JsError> {
        self.session.enter().map_err(ride_err)
    }

    #[wasm_bindgen]
    pub fn seek(&mut self, progress: f32) -> Result<(), JsError> {
        self.session.seek(progress).map_err(ride_err)
    }

    /// Set a preference by storage name (e.g. "verticalOffset"). Returns whether it changed.
    #[wasm_bindgen(js_name = set_preference)]
    pub fn set_preference(&mut self, name: &str, value: f32) -> Result<bool, JsError> {
        let key: PreferenceKey = name.parse().map_err(ride_err)?;
        let changed = self.session.set_preference(key, value).map_err(ride_err)?;
        if changed {
            if let Some(f) = &self.sink {
                JsPreferenceSink { f }
                    .save(key.name(), value)
                    .map_err(ride_err)?;
            }
        }
        Ok(changed)
    }

    /// Current preferences as `{ verticalOffset, depthOffset, ... }`.
    #[wasm_bindgen]
    pub fn preferences(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.preferences().to_map())
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f32 {
        self.session.normalized()
    }

    #[wasm_bindgen]
    pub fn status(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.status())
    }

    #[wasm_bindgen]
    pub fn pose(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.pose())
    }

    /// Tear down. Later calls are no-ops and `update` returns an empty output.
    #[wasm_bindgen]
    pub fn dispose(&mut self) {
        self.session.dispose();
        self.sink = None;
    }

    #[wasm_bindgen(js_name = is_alive)]
    pub fn is_alive(&self) -> bool {
        self.session.is_alive()
    }
}

/// The built-in coaster track as a plain object.
#[wasm_bindgen(js_name = coaster_track)]
pub fn coaster_track() -> Result<JsValue, JsError> {
    to_js(&TrackDef::coaster())
}

/// Numeric ABI version for compatibility checks at init.
#[wasm_bindgen]
pub fn abi_version() -> u32 {
    1
}
