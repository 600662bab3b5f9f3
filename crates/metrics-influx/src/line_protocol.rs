//! InfluxDB line protocol encoding.
//!
//! ```text
//! measurement[,tag_key=tag_value...] field_key=field_value[,...] timestamp
//! ```
//!
//! Escaping follows the InfluxDB v2 reference:
//!
//! | Component | Escaped characters |
//! |-----------|--------------------|
//! | measurement | `,` and space |
//! | tag key, tag value, field key | `,`, `=` and space |
//! | string field value | `"` and `\` |
//!
//! Integers carry an `i` suffix, strings are double-quoted, floats and
//! booleans are written bare. Tags with empty values are dropped, as InfluxDB
//! rejects them.
//!
//! Keys must be non-empty, and no key or tag value may end with `\`: the
//! trailing backslash would escape the separator after it.

use std::fmt::Write as _;

use zinc_store::{FieldValue, MetricPoint, MetricsError, MetricsResult};

use crate::config::Precision;

/// Encodes `point` as a single line (without trailing newline).
///
/// # Errors
///
/// Returns [`MetricsError::Encoding`] if the point has no measurement or no
/// fields, if a tag or field key is empty, if any name or value contains a
/// newline, if a key or tag value ends with `\`, if a float field is not
/// finite, or if the timestamp is out of range for `precision`.
pub fn encode(point: &MetricPoint, precision: Precision) -> MetricsResult<String> {
    if point.measurement.is_empty() {
        return Err(MetricsError::encoding("measurement must not be empty"));
    }
    if point.fields.is_empty() {
        return Err(MetricsError::encoding(format!(
            "point {:?} has no fields",
            point.measurement
        )));
    }

    let mut line = String::with_capacity(64);
    line.push_str(&escape_measurement(check_component("measurement", &point.measurement)?));

    for (key, value) in &point.tags {
        if value.is_empty() {
            continue;
        }
        line.push(',');
        line.push_str(&escape_key(check_key("tag key", key)?));
        line.push('=');
        line.push_str(&escape_key(check_component("tag value", value)?));
    }

    line.push(' ');
    for (i, (key, value)) in point.fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        line.push_str(&escape_key(check_key("field key", key)?));
        line.push('=');
        write_field_value(&mut line, key, value)?;
    }

    let timestamp = precision.timestamp(point.timestamp).ok_or_else(|| {
        MetricsError::encoding(format!(
            "timestamp {} is out of range for precision {precision}",
            point.timestamp
        ))
    })?;
    // Writing to a String cannot fail.
    let _ = write!(line, " {timestamp}");

    Ok(line)
}

fn write_field_value(line: &mut String, key: &str, value: &FieldValue) -> MetricsResult<()> {
    match value {
        FieldValue::Integer(v) => {
            let _ = write!(line, "{v}i");
        },
        FieldValue::Float(v) => {
            if !v.is_finite() {
                return Err(MetricsError::encoding(format!("field {key:?} is not finite: {v}")));
            }
            let _ = write!(line, "{v}");
        },
        FieldValue::Bool(v) => line.push_str(if *v { "true" } else { "false" }),
        FieldValue::Text(v) => {
            line.push('"');
            line.push_str(&escape_string(v));
            line.push('"');
        },
    }
    Ok(())
}

fn check_component<'a>(what: &str, value: &'a str) -> MetricsResult<&'a str> {
    if value.contains(['\n', '\r']) {
        return Err(MetricsError::encoding(format!("{what} {value:?} contains a newline")));
    }
    if value.ends_with('\\') {
        return Err(MetricsError::encoding(format!("{what} {value:?} ends with a backslash")));
    }
    Ok(value)
}

fn check_key<'a>(what: &str, key: &'a str) -> MetricsResult<&'a str> {
    if key.is_empty() {
        return Err(MetricsError::encoding(format!("{what} must not be empty")));
    }
    check_component(what, key)
}

fn escape_with(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Escapes a measurement name.
pub(crate) fn escape_measurement(value: &str) -> String {
    escape_with(value, &[',', ' '])
}

/// Escapes a tag key, tag value or field key.
pub(crate) fn escape_key(value: &str) -> String {
    escape_with(value, &[',', '=', ' '])
}

/// Escapes the contents of a string field value.
pub(crate) fn escape_string(value: &str) -> String {
    escape_with(value, &['"', '\\'])
}
