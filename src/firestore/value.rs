//! Helpers for Firestore's typed value encoding.
//!
//! The REST API wraps every field in a single-key object naming its type,
//! e.g. `{"stringValue": "NSW"}`, `{"arrayValue": {"values": [...]}}` or
//! `{"mapValue": {"fields": {...}}}`. Documents come back weakly typed, so
//! every accessor here returns `None` (or an empty collection) instead of
//! failing when the shape is not what the caller hoped for.

use serde_json::{Map, Value};

/// Render a scalar wrapper as display text.
///
/// `nullValue`, container wrappers and anything malformed yield `None`.
pub fn scalar_string(value: &Value) -> Option<String> {
    let wrapper = value.as_object()?;

    if let Some(s) = wrapper.get("stringValue").and_then(Value::as_str) {
        return Some(s.to_string());
    }
    // int64 travels as a JSON string, but accept a bare number too
    if let Some(v) = wrapper.get("integerValue") {
        return match v {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
    }
    if let Some(n) = wrapper.get("doubleValue").and_then(Value::as_f64) {
        return Some(n.to_string());
    }
    if let Some(b) = wrapper.get("booleanValue").and_then(Value::as_bool) {
        return Some(b.to_string());
    }
    for key in ["timestampValue", "referenceValue"] {
        if let Some(s) = wrapper.get(key).and_then(Value::as_str) {
            return Some(s.to_string());
        }
    }
    None
}

/// The `fields` of a `mapValue` wrapper.
pub fn map_fields(value: &Value) -> Option<&Map<String, Value>> {
    static EMPTY: once_cell::sync::Lazy<Map<String, Value>> = once_cell::sync::Lazy::new(Map::new);

    let map_value = value.get("mapValue")?.as_object()?;
    match map_value.get("fields") {
        Some(fields) => fields.as_object(),
        // Firestore omits `fields` for an empty map
        None => Some(&*EMPTY),
    }
}

/// The `values` of an `arrayValue` wrapper.
pub fn array_values(value: &Value) -> Option<&[Value]> {
    let array_value = value.get("arrayValue")?.as_object()?;
    match array_value.get("values") {
        Some(values) => values.as_array().map(Vec::as_slice),
        None => Some(&[]),
    }
}

/// Walk nested `mapValue`s from a document's top-level `fields`.
///
/// `path[..len-1]` must name map fields; the last segment must name a
/// scalar. `string_at(fields, &["BillTo", "State"])` reads
/// `fields.BillTo.mapValue.fields.State.stringValue`.
pub fn string_at(fields: &Map<String, Value>, path: &[&str]) -> Option<String> {
    let (last, parents) = path.split_last()?;
    let mut current = fields;
    for segment in parents {
        current = map_fields(current.get(*segment)?)?;
    }
    scalar_string(current.get(*last)?)
}

/// Like [`string_at`] but renders anything missing as an empty string.
pub fn string_at_or_empty(fields: &Map<String, Value>, path: &[&str]) -> String {
    string_at(fields, path).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn scalar_wrappers_render_as_text() {
        assert_eq!(scalar_string(&json!({"stringValue": "NSW"})), Some("NSW".into()));
        assert_eq!(scalar_string(&json!({"integerValue": "42"})), Some("42".into()));
        assert_eq!(scalar_string(&json!({"integerValue": 7})), Some("7".into()));
        assert_eq!(scalar_string(&json!({"doubleValue": 1.5})), Some("1.5".into()));
        assert_eq!(scalar_string(&json!({"booleanValue": true})), Some("true".into()));
        assert_eq!(
            scalar_string(&json!({"timestampValue": "2024-12-16T01:02:03Z"})),
            Some("2024-12-16T01:02:03Z".into())
        );
    }

    #[test]
    fn non_scalars_yield_none() {
        assert_eq!(scalar_string(&json!({"nullValue": null})), None);
        assert_eq!(scalar_string(&json!({"mapValue": {"fields": {}}})), None);
        assert_eq!(scalar_string(&json!("plain")), None);
        assert_eq!(scalar_string(&json!({"stringValue": 12})), None);
    }

    #[test]
    fn empty_containers_are_present_but_empty() {
        assert_eq!(map_fields(&json!({"mapValue": {}})).map(Map::len), Some(0));
        assert_eq!(array_values(&json!({"arrayValue": {}})).map(<[Value]>::len), Some(0));
        assert!(map_fields(&json!({"stringValue": "x"})).is_none());
        assert!(array_values(&json!({"mapValue": {}})).is_none());
    }

    #[test]
    fn string_at_walks_nested_maps() {
        let doc = fields(json!({
            "BillTo": {"mapValue": {"fields": {
                "State": {"stringValue": "VIC"},
                "Address": {"mapValue": {"fields": {"Postcode": {"integerValue": "3000"}}}}
            }}}
        }));

        assert_eq!(string_at(&doc, &["BillTo", "State"]), Some("VIC".into()));
        assert_eq!(string_at(&doc, &["BillTo", "Address", "Postcode"]), Some("3000".into()));
        assert_eq!(string_at(&doc, &["BillTo", "Suburb"]), None);
        assert_eq!(string_at(&doc, &["BillTo", "State", "Deeper"]), None);
        assert_eq!(string_at(&doc, &[]), None);
        assert_eq!(string_at_or_empty(&doc, &["Missing"]), "");
    }
}
