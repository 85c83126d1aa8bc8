//! Record type and helpers
//!
//! A record is an ordered map of field name to JSON value. Nothing here knows
//! about the destination schema.

use serde_json::{Map, Value};

/// Data row sent to the remote table - field name to JSON value, insertion order kept
pub type Record = Map<String, Value>;

/// Field dropped from a record when the remote store reports an unknown column
pub const FALLBACK_DROPPED_FIELD: &str = "confidence";

/// Return a copy of `record` without `field`
///
/// The input is left untouched. If `field` is absent the copy equals the input.
pub fn without_field(record: &Record, field: &str) -> Record {
    let mut copy = record.clone();
    // shift_remove keeps the order of the remaining fields
    copy.shift_remove(field);
    copy
}

/// Build a record from a JSON value, if it is an object
pub fn record_from_value(value: Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Record {
        record_from_value(json!({
            "user_id": "u1",
            "confidence": 0.9,
            "label": "click",
        }))
        .unwrap()
    }

    #[test]
    fn test_without_field_removes_key_and_keeps_order() {
        let record = sample();
        let trimmed = without_field(&record, FALLBACK_DROPPED_FIELD);

        let keys: Vec<&str> = trimmed.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["user_id", "label"]);
        // original untouched
        assert_eq!(record.len(), 3);
        assert_eq!(record["confidence"], json!(0.9));
    }

    #[test]
    fn test_without_field_missing_key_is_identity() {
        let record = record_from_value(json!({"user_id": "u1"})).unwrap();
        assert_eq!(without_field(&record, FALLBACK_DROPPED_FIELD), record);
    }

    #[test]
    fn test_record_from_value_rejects_non_objects() {
        assert!(record_from_value(json!([1, 2, 3])).is_none());
        assert!(record_from_value(json!("text")).is_none());
        assert!(record_from_value(json!({})).is_some());
    }
}
