#![cfg(target_arch = "wasm32")]
use js_sys::{Array, Function, Object, Reflect};
use railcam_wasm::{abi_version, coaster_track, RailcamRide};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn get(obj: &JsValue, key: &str) -> JsValue {
    Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

fn four_point_track() -> JsValue {
    JsValue::from_str(
        r#"{ "name": "four-point",
             "control_points": [[0,0,0],[10,5,-10],[20,0,-20],[30,10,-30]],
             "stops": [0.25] }"#,
    )
}

fn unit_scale() -> JsValue {
    let prefs = Object::new();
    Reflect::set(&prefs, &"inputScale".into(), &JsValue::from_f64(1.0)).unwrap();
    prefs.into()
}

#[wasm_bindgen_test]
fn abi_is_1() {
    assert_eq!(abi_version(), 1);
}

#[wasm_bindgen_test]
fn construct_with_defaults() {
    let ride = RailcamRide::new(JsValue::UNDEFINED, JsValue::NULL, JsValue::UNDEFINED);
    assert!(ride.is_ok());
}

#[wasm_bindgen_test]
fn coaster_track_round_trips_through_the_constructor() {
    let track = coaster_track().unwrap();
    assert!(RailcamRide::new(track, JsValue::UNDEFINED, JsValue::UNDEFINED).is_ok());
}

#[wasm_bindgen_test]
fn bad_track_is_an_error() {
    let too_short = JsValue::from_str(r#"{ "control_points": [[0,0,0],[1,0,0]] }"#);
    assert!(RailcamRide::new(too_short, JsValue::UNDEFINED, JsValue::UNDEFINED).is_err());
    let garbage = JsValue::from_str("not json");
    assert!(RailcamRide::new(garbage, JsValue::UNDEFINED, JsValue::UNDEFINED).is_err());
}

#[wasm_bindgen_test]
fn scroll_halts_at_stop_and_continue_resumes() {
    let mut ride = RailcamRide::new(four_point_track(), JsValue::UNDEFINED, unit_scale()).unwrap();
    assert!(ride.apply_input(5.0));

    let out = ride.update(0.016, JsValue::UNDEFINED).unwrap();
    assert_eq!(ride.progress(), 0.25);
    let status = get(&out, "status");
    assert_eq!(get(&status, "state").as_string().as_deref(), Some("halted"));
    let events = Array::from(&get(&out, "events"));
    assert_eq!(events.length(), 1);
    assert_eq!(
        get(&events.get(0), "type").as_string().as_deref(),
        Some("stop_status")
    );

    assert!(!ride.apply_input(5.0));
    ride.continue_ride().unwrap();
    assert!(ride.continue_ride().is_err());
    let out = ride.update(0.016, JsValue::UNDEFINED).unwrap();
    assert_eq!(
        get(&get(&out, "status"), "state").as_string().as_deref(),
        Some("moving")
    );
}

#[wasm_bindgen_test]
fn preference_changes_reach_the_sink() {
    let mut ride = RailcamRide::new(JsValue::UNDEFINED, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .unwrap();
    let sink = Function::new_with_args("name, value", "globalThis.__railcamSaved = [name, value];");
    ride.set_preference_sink(sink);

    assert!(ride.set_preference("verticalOffset", 2.5).unwrap());
    let saved = Array::from(&get(&js_sys::global().into(), "__railcamSaved"));
    assert_eq!(saved.get(0).as_string().as_deref(), Some("verticalOffset"));
    assert_eq!(saved.get(1).as_f64(), Some(2.5));

    assert!(!ride.set_preference("verticalOffset", 2.5).unwrap());
    assert!(ride.set_preference("fieldOfView", 1.0).is_err());

    let prefs = ride.preferences().unwrap();
    assert_eq!(get(&prefs, "verticalOffset").as_f64(), Some(2.5));
}

#[wasm_bindgen_test]
fn batched_preference_commands_reach_the_sink() {
    let mut ride = RailcamRide::new(JsValue::UNDEFINED, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .unwrap();
    let sink = Function::new_with_args("name, value", "globalThis.__railcamBatched = [name, value];");
    ride.set_preference_sink(sink);

    let inputs = js_sys::JSON::parse(
        r#"{ "commands": [ { "type": "set_preference", "key": "depthOffset", "value": -1.5 } ] }"#,
    )
    .unwrap();
    let out = ride.update(0.016, inputs).unwrap();

    let saved = Array::from(&get(&js_sys::global().into(), "__railcamBatched"));
    assert_eq!(saved.get(0).as_string().as_deref(), Some("depthOffset"));
    assert_eq!(saved.get(1).as_f64(), Some(-1.5));
    let events = Array::from(&get(&out, "events"));
    assert_eq!(
        get(&events.get(0), "type").as_string().as_deref(),
        Some("preference_changed")
    );
}

#[wasm_bindgen_test]
fn throwing_sink_is_reported() {
    let mut ride = RailcamRide::new(JsValue::UNDEFINED, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .unwrap();
    ride.set_preference_sink(Function::new_no_args("throw new Error('quota');"));
    assert!(ride.set_preference("depthOffset", 1.0).is_err());
}

#[wasm_bindgen_test]
fn disposed_ride_is_inert() {
    let mut ride = RailcamRide::new(JsValue::UNDEFINED, JsValue::UNDEFINED, JsValue::UNDEFINED)
        .unwrap();
    ride.dispose();
    assert!(!ride.is_alive());
    assert!(!ride.apply_input(100.0));
    assert!(ride.continue_ride().is_ok());
    let out = ride.update(0.016, JsValue::UNDEFINED).unwrap();
    assert!(get(&out, "pose").is_null());
}
