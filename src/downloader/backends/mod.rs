// Resolution backends

pub mod cobalt;
pub mod piped;
pub mod tikwm;

pub use cobalt::CobaltBackend;
pub use piped::PipedBackend;
pub use tikwm::TikwmBackend;

use serde_json::Value;

/// Non-empty string field; numbers are stringified (ids come back as either)
pub(crate) fn json_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Duration in seconds, accepting numeric strings
pub(crate) fn json_seconds(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
