//! Android entry points for the fuel planner.
//!
//! The app's `com.fuelplan.app.RustBridge` class sees two calls: `version`
//! and `optimize`. Requests and responses cross the boundary as JSON
//! strings handled by `bridge::optimize_json`, so nothing here knows about
//! routes or stations. Logging goes to logcat under the `fuelplan` tag.

use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;

#[cfg(target_os = "android")]
fn init_logging() {
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("fuelplan"),
    );
}

#[cfg(not(target_os = "android"))]
fn init_logging() {}

fn to_jstring(env: &mut JNIEnv, value: &str) -> jstring {
    match env.new_string(value) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            log::error!("Failed to create Java string: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns the library version.
/// Maps to: RustBridge.version() -> String
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_fuelplan_app_RustBridge_version(
    mut env: JNIEnv,
    _class: JClass,
) -> jstring {
    to_jstring(&mut env, crate::VERSION)
}

/// Plans fuel stops for a JSON request (see `bridge::OptimizeRequest`).
/// Maps to: RustBridge.optimize(request: String) -> String?
///
/// Returns null only if the request string cannot be read from the JVM or
/// the response cannot be encoded; planning failures come back as JSON.
#[unsafe(no_mangle)]
pub extern "system" fn Java_com_fuelplan_app_RustBridge_optimize(
    mut env: JNIEnv,
    _class: JClass,
    request: JString,
) -> jstring {
    init_logging();

    let request: String = match env.get_string(&request) {
        Ok(s) => s.into(),
        Err(e) => {
            log::error!("Failed to read request string: {e}");
            return std::ptr::null_mut();
        }
    };

    match crate::bridge::optimize_json(&request) {
        Ok(response) => to_jstring(&mut env, &response),
        Err(e) => {
            log::error!("Failed to encode response: {e}");
            std::ptr::null_mut()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_have_jni_signatures() {
        let _: extern "system" fn(JNIEnv, JClass) -> jstring = Java_com_fuelplan_app_RustBridge_version;
        let _: extern "system" fn(JNIEnv, JClass, JString) -> jstring = Java_com_fuelplan_app_RustBridge_optimize;
    }

    #[test]
    fn malformed_request_is_answered_in_json() {
        let response = crate::bridge::optimize_json("not json").unwrap();
        let v: serde_json::Value = serde_json::from_str(&response).unwrap();
        assert_eq!(v["status"], "error");
        assert_eq!(v["kind"], "invalid_request");
    }
}
