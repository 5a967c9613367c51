//! SQL literal encoding for statement text.
//!
//! Batches are sent as one multi-statement command, so values are embedded
//! as literals instead of bind parameters.

use histograph_core::errors::Result;

pub const SQL_NULL: &str = "NULL";

/// SRID all stored geometries are tagged with (WGS 84).
pub const GEOMETRY_SRID: u32 = 4326;

/// A value to embed in statement text.
#[derive(Debug, Clone, Copy)]
pub enum LiteralValue<'a> {
    Null,
    Text(&'a str),
    Json(&'a serde_json::Value),
    Geometry(&'a serde_json::Value),
}

impl<'a> From<Option<&'a str>> for LiteralValue<'a> {
    fn from(value: Option<&'a str>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }
}

/// Encode any supported value as a SQL literal fragment.
pub fn encode(value: LiteralValue<'_>) -> Result<String> {
    match value {
        LiteralValue::Null => Ok(SQL_NULL.to_string()),
        LiteralValue::Text(text) => Ok(encode_text(text)),
        LiteralValue::Json(json) => encode_json(json),
        LiteralValue::Geometry(geometry) => encode_geometry(geometry),
    }
}

/// Quote a string. Quotes and backslashes are doubled; a backslash also
/// switches the literal to `E'...'` so the doubled backslash reads as one.
/// The empty string encodes as `NULL`.
pub fn encode_text(value: &str) -> String {
    if value.is_empty() {
        return SQL_NULL.to_string();
    }

    let mut has_backslash = false;
    let mut escaped = String::with_capacity(value.len() + 3);
    escaped.push('\'');
    for c in value.chars() {
        match c {
            '\'' => escaped.push_str("''"),
            '\\' => {
                escaped.push_str("\\\\");
                has_backslash = true;
            }
            _ => escaped.push(c),
        }
    }
    escaped.push('\'');

    if has_backslash {
        escaped.insert(0, 'E');
    }
    escaped
}

/// Serialize to JSON text, then quote it. JSON `null` encodes as `NULL`.
pub fn encode_json(value: &serde_json::Value) -> Result<String> {
    if value.is_null() {
        return Ok(SQL_NULL.to_string());
    }
    Ok(encode_text(&serde_json::to_string(value)?))
}

/// Embed a GeoJSON geometry as an SRID 4326 PostGIS expression.
///
/// The GeoJSON text goes through [`encode_text`] like any other string.
pub fn encode_geometry(geometry: &serde_json::Value) -> Result<String> {
    if geometry.is_null() {
        return Ok(SQL_NULL.to_string());
    }
    let geojson = serde_json::to_string(geometry)?;
    Ok(format!(
        "ST_SetSRID(ST_GeomFromGeoJSON({}), {GEOMETRY_SRID})",
        encode_text(&geojson)
    ))
}

/// Wrap in single quotes without escaping. Only for values that are known
/// to be simple identifiers.
pub fn quote_raw(value: &str) -> String {
    format!("'{value}'")
}
