//! Parameter sanitization.
//!
//! [`sanitize`] is the single choke point between untrusted caller
//! input and query construction: every repository call routes its
//! filters and updates through it before use. It is a pure function
//! and never fails — values that cannot be coerced are dropped.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

/// Maximum page size a caller can request.
pub const MAX_LIMIT: u64 = 100;
/// Maximum length of a search string.
pub const MAX_SEARCH_LEN: usize = 100;
/// Maximum length of any other free-text value.
pub const MAX_STRING_LEN: usize = 500;

/// Whitelist-and-coerce untrusted parameters.
///
/// Idempotent: applying the function to its own output changes
/// nothing.
pub fn sanitize(params: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in params {
        if value.is_null() {
            continue;
        }
        let kept = match key.as_str() {
            "id" | "tenant_id" => positive_int(value).map(|n| Value::from(n)),
            "page" => positive_int(value).map(Value::from),
            "limit" => positive_int(value).map(|n| Value::from(n.min(MAX_LIMIT as i64))),
            "search" => as_str(value).map(|s| Value::from(clip(s.trim(), MAX_SEARCH_LEN))),
            "is_active" => coerce_bool(value),
            "wedding_date_from" | "wedding_date_to" => valid_date(value),
            _ => pass_through(value),
        };
        if let Some(v) = kept {
            out.insert(key.clone(), v);
        }
    }
    out
}

/// Parse a sanitized id out of a parameter map.
pub fn get_id(params: &Map<String, Value>, key: &str) -> Option<i64> {
    params.get(key).and_then(Value::as_i64)
}

/// Offset for `(page - 1) * limit` pagination, defaulting to page 1
/// and the maximum page size. The page number is caller-controlled
/// and unbounded, so the multiplication saturates instead of
/// overflowing.
pub fn page_offset(params: &Map<String, Value>) -> (u64, u64) {
    let page = params
        .get("page")
        .and_then(Value::as_u64)
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(Value::as_u64)
        .unwrap_or(MAX_LIMIT);
    ((page - 1).saturating_mul(limit), limit)
}

fn positive_int(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    (n > 0).then_some(n)
}

fn as_str(value: &Value) -> Option<&str> {
    value.as_str()
}

fn coerce_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::String(s) => Some(Value::Bool(s.trim().eq_ignore_ascii_case("true"))),
        _ => None,
    }
}

fn valid_date(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    let ok = DateTime::parse_from_rfc3339(s).is_ok()
        || NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok();
    ok.then(|| Value::from(s))
}

/// Parse a sanitized date value into a concrete timestamp. Bare dates
/// are anchored at midnight UTC.
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn pass_through(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => Some(Value::from(clip(s.trim(), MAX_STRING_LEN))),
        Value::Number(_) | Value::Bool(_) => Some(value.clone()),
        _ => None,
    }
}

/// Truncate on a char boundary.
fn clip(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn ids_must_be_positive_integers() {
        let out = sanitize(&map(json!({
            "id": 7,
            "tenant_id": "12",
        })));
        assert_eq!(out["id"], json!(7));
        assert_eq!(out["tenant_id"], json!(12));

        let out = sanitize(&map(json!({
            "id": 0,
            "tenant_id": -3,
            "page": "abc",
        })));
        assert!(out.is_empty());
    }

    #[test]
    fn limit_is_clamped_to_one_hundred() {
        let out = sanitize(&map(json!({ "limit": 9999 })));
        assert_eq!(out["limit"], json!(100));

        let out = sanitize(&map(json!({ "limit": 25 })));
        assert_eq!(out["limit"], json!(25));
    }

    #[test]
    fn search_is_trimmed_and_truncated() {
        let long = "a".repeat(250);
        let out = sanitize(&map(json!({ "search": format!("  {long}  ") })));
        assert_eq!(out["search"].as_str().unwrap().len(), MAX_SEARCH_LEN);
    }

    #[test]
    fn is_active_accepts_bool_and_string() {
        let out = sanitize(&map(json!({ "is_active": false })));
        assert_eq!(out["is_active"], json!(false));

        let out = sanitize(&map(json!({ "is_active": "TRUE" })));
        assert_eq!(out["is_active"], json!(true));

        let out = sanitize(&map(json!({ "is_active": "yes" })));
        assert_eq!(out["is_active"], json!(false));
    }

    #[test]
    fn date_keys_require_parseable_dates() {
        let out = sanitize(&map(json!({
            "wedding_date_from": "2026-05-01",
            "wedding_date_to": "not a date",
        })));
        assert_eq!(out["wedding_date_from"], json!("2026-05-01"));
        assert!(!out.contains_key("wedding_date_to"));
        assert!(parse_date(&out["wedding_date_from"]).is_some());
    }

    #[test]
    fn nulls_arrays_and_objects_are_dropped() {
        let out = sanitize(&map(json!({
            "note": Value::Null,
            "tags": ["a", "b"],
            "nested": { "x": 1 },
            "count": 3,
        })));
        assert_eq!(out.len(), 1);
        assert_eq!(out["count"], json!(3));
    }

    #[test]
    fn other_strings_truncate_at_five_hundred() {
        let long = "x".repeat(600);
        let out = sanitize(&map(json!({ "notes": long })));
        assert_eq!(out["notes"].as_str().unwrap().len(), MAX_STRING_LEN);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let input = map(json!({
            "id": "5",
            "limit": 500,
            "search": "  bride  ",
            "is_active": "True",
            "wedding_date_from": "2026-05-01",
            "notes": format!("  {}  ", "y".repeat(700)),
            "flag": true,
        }));
        let once = sanitize(&input);
        let twice = sanitize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn page_offset_defaults_and_computes() {
        let out = sanitize(&map(json!({ "page": 3, "limit": 10 })));
        assert_eq!(page_offset(&out), (20, 10));
        assert_eq!(page_offset(&Map::new()), (0, MAX_LIMIT));
    }

    #[test]
    fn page_offset_saturates_on_huge_pages() {
        let out = sanitize(&map(json!({ "page": i64::MAX, "limit": 100 })));
        let (offset, limit) = page_offset(&out);
        assert_eq!(offset, u64::MAX);
        assert_eq!(limit, 100);
    }
}
