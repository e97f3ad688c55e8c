use serde_json::{json, Value};

/// Standard success envelope for JSON endpoints: `{ ok, cached, data }`.
pub fn envelope(data: Value, cached: bool) -> Value {
    json!({ "ok": true, "cached": cached, "data": data })
}

/// Envelope variant carrying the upstream attribution the original feed
/// endpoints include on fresh responses.
pub fn envelope_with_source(data: Value, cached: bool, source: &str) -> Value {
    json!({ "ok": true, "cached": cached, "data": data, "source": source })
}
