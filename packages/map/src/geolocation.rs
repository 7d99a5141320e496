//! Browser geolocation watcher.
//!
//! Each [`locate`] call wraps one `navigator.geolocation.getCurrentPosition` request
//! in a JS promise. The success/error callbacks are the promise's own resolve/reject
//! functions, so nothing outlives the request once it settles and repeated
//! "refresh" clicks never accumulate listeners.

use chrono::{DateTime, Utc};
use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

use crate::geo::{LatLng, Position};
use crate::locate::{LocateOptions, LocationError};

/// Ask the device for its current position.
pub async fn locate(options: &LocateOptions) -> Result<Position, LocationError> {
    let geolocation = web_sys::window()
        .ok_or(LocationError::Unsupported)?
        .navigator()
        .geolocation()
        .map_err(|_| LocationError::Unsupported)?;

    let opts = Object::new();
    let _ = Reflect::set(&opts, &"enableHighAccuracy".into(), &options.high_accuracy.into());
    let _ = Reflect::set(&opts, &"timeout".into(), &options.timeout_ms.into());
    let _ = Reflect::set(&opts, &"maximumAge".into(), &options.maximum_age_ms.into());
    let opts: web_sys::PositionOptions = opts.unchecked_into();

    let promise = Promise::new(&mut |resolve, reject| {
        if let Err(e) =
            geolocation.get_current_position_with_error_callback_and_options(&resolve, Some(&reject), &opts)
        {
            let _ = reject.call1(&JsValue::NULL, &e);
        }
    });

    match JsFuture::from(promise).await {
        Ok(value) => parse_position(&value),
        Err(err) => Err(parse_error(&err)),
    }
}

fn number(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &key.into()).ok()?.as_f64()
}

fn parse_position(value: &JsValue) -> Result<Position, LocationError> {
    let coords = Reflect::get(value, &"coords".into())
        .map_err(|_| LocationError::PositionUnavailable)?;
    let (Some(lat), Some(lng)) = (number(&coords, "latitude"), number(&coords, "longitude")) else {
        return Err(LocationError::PositionUnavailable);
    };

    let timestamp = number(value, "timestamp")
        .and_then(|ms| DateTime::<Utc>::from_timestamp_millis(ms as i64))
        .unwrap_or_else(Utc::now);

    Ok(Position {
        coords: LatLng::new(lat, lng),
        accuracy: number(&coords, "accuracy").unwrap_or(0.0),
        timestamp,
    })
}

fn parse_error(err: &JsValue) -> LocationError {
    let code = number(err, "code").unwrap_or(0.0) as u16;
    let message = Reflect::get(err, &"message".into())
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_default();
    LocationError::from_code(code, &message)
}
