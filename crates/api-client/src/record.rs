//! Record normalization
//!
//! The origin keys records by its own primary-key field (`_id` for the
//! records backend); callers work against a canonical `id`. Normalization
//! copies the native key into `id` without removing the original, so a record
//! can round-trip back to the origin untouched. Applying it twice is a no-op.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The origin's native primary-key field
pub const DEFAULT_KEY_FIELD: &str = "_id";

/// A normalized record: an ordered field-to-value mapping carrying `id`
pub type Record = Map<String, Value>;

/// One page of normalized records plus the origin's total count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResult {
    /// Records in origin order
    pub data: Vec<Record>,
    /// Total matching records as reported by the origin, trusted verbatim
    pub total: u64,
}

/// Copy a raw record's fields and derive the canonical `id`
///
/// The native key wins over a pre-existing `id`; a record carrying neither
/// is rejected, since every record handed to a caller must be addressable.
pub fn normalize_record(raw: Value, key_field: &str) -> ApiResult<Record> {
    let Value::Object(mut record) = raw else {
        return Err(ApiError::MissingKey(key_field.to_string()));
    };

    if let Some(native) = record.get(key_field).filter(|v| !v.is_null()).cloned() {
        record.insert("id".to_string(), native);
        return Ok(record);
    }

    match record.get("id") {
        Some(id) if !id.is_null() => Ok(record),
        _ => Err(ApiError::MissingKey(key_field.to_string())),
    }
}

/// Normalize every element of a list response
///
/// `total` comes from the origin's count header, defaulting to 0 when the
/// header is absent or unparseable.
pub fn normalize_list(
    raw: Vec<Value>,
    total_header: Option<&str>,
    key_field: &str,
) -> ApiResult<ListResult> {
    let data = raw
        .into_iter()
        .map(|value| normalize_record(value, key_field))
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(ListResult {
        data,
        total: parse_total(total_header),
    })
}

/// Parse a count header value, defaulting to 0
#[must_use]
pub fn parse_total(header: Option<&str>) -> u64 {
    header.and_then(|raw| raw.trim().parse().ok()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_native_key_copied_not_moved() {
        let record =
            normalize_record(json!({"_id": "pt-1", "name": "Okafor"}), DEFAULT_KEY_FIELD).unwrap();
        assert_eq!(record["id"], json!("pt-1"));
        assert_eq!(record["_id"], json!("pt-1"));
        assert_eq!(record["name"], json!("Okafor"));
    }

    #[test]
    fn test_numeric_keys_survive() {
        let record = normalize_record(json!({"_id": 42}), DEFAULT_KEY_FIELD).unwrap();
        assert_eq!(record["id"], json!(42));
    }

    #[test]
    fn test_idempotent_on_normalized_input() {
        let once =
            normalize_record(json!({"_id": "pt-1", "x": 1}), DEFAULT_KEY_FIELD).unwrap();
        let twice = normalize_record(Value::Object(once.clone()), DEFAULT_KEY_FIELD).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_already_canonical_record_kept() {
        let record = normalize_record(json!({"id": 7, "x": 1}), DEFAULT_KEY_FIELD).unwrap();
        assert_eq!(record["id"], json!(7));
        assert!(!record.contains_key("_id"));
    }

    #[test]
    fn test_keyless_record_rejected() {
        let err = normalize_record(json!({"name": "nobody"}), DEFAULT_KEY_FIELD).unwrap_err();
        assert!(matches!(err, ApiError::MissingKey(_)));

        let err = normalize_record(json!({"id": null}), DEFAULT_KEY_FIELD).unwrap_err();
        assert!(matches!(err, ApiError::MissingKey(_)));
    }

    #[test]
    fn test_list_total_from_header() {
        let result = normalize_list(
            vec![json!({"_id": 1}), json!({"_id": 2})],
            Some("240"),
            DEFAULT_KEY_FIELD,
        )
        .unwrap();
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.total, 240);
    }

    #[test]
    fn test_list_total_defaults_to_zero() {
        assert_eq!(parse_total(None), 0);
        assert_eq!(parse_total(Some("not a number")), 0);
        assert_eq!(parse_total(Some(" 17 ")), 17);
    }
}
