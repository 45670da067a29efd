//! The reserved stdout marker protocol for structured outputs.
//!
//! A command may publish small key/value results back to the orchestrator
//! by printing a single line of the shape `::{"outputs":{...}}::` to
//! stdout. Large payloads belong in a declared output file instead.

use std::collections::HashMap;

use serde_json::Value;

const MARKER_FENCE: &str = "::";

/// Parse a single stdout line as an outputs marker.
///
/// Lines that do not match the marker shape, or whose payload is not valid
/// JSON with an `outputs` object, return `None`.
pub fn parse_marker(line: &str) -> Option<HashMap<String, Value>> {
    let payload = line
        .trim()
        .strip_prefix(MARKER_FENCE)?
        .strip_suffix(MARKER_FENCE)?;

    let value: Value = serde_json::from_str(payload).ok()?;
    let outputs = value.get("outputs")?.as_object()?;
    Some(outputs.clone().into_iter().collect())
}

/// Scan captured stdout for markers and merge them, later keys winning.
pub fn extract(stdout: &str) -> HashMap<String, Value> {
    let mut outputs = HashMap::new();
    for line in stdout.lines() {
        if let Some(map) = parse_marker(line) {
            outputs.extend(map);
        }
    }
    outputs
}
