//! Case-insensitive header map with JSON serialization of non-string values.
//!
//! [`Headers`] stores at most one entry per case-insensitive header name.
//! String values are stored as-is; anything else is serialized to its compact
//! JSON form before storage, so a caller reading the header back always gets
//! a string.

use crate::{Error, Result};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// A case-insensitive mapping from header name to string value.
///
/// Lookup, insertion, existence checks, and removal all treat names
/// case-insensitively. The casing of the most recent `set` is preserved for
/// snapshots.
///
/// # Examples
///
/// ```
/// use backhaul::Headers;
///
/// let mut headers = Headers::new();
/// headers.set("Content-Type", "application/json").unwrap();
/// assert_eq!(headers.get("content-type"), Some("application/json"));
///
/// // Non-string values are stored in their JSON form.
/// headers.set("x-request-count", 42).unwrap();
/// assert_eq!(headers.get("X-Request-Count"), Some("42"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Headers {
    // Keyed by the lowercased name; one entry per case-insensitive name.
    entries: BTreeMap<String, Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    value: String,
}

impl Headers {
    /// Creates an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a header map from a plain key-value object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `object` is not a JSON object,
    /// or [`Error::InvalidHeader`] if any entry fails validation.
    ///
    /// # Examples
    ///
    /// ```
    /// use backhaul::Headers;
    /// use serde_json::json;
    ///
    /// let headers = Headers::from_object(&json!({ "accept": "text/plain" })).unwrap();
    /// assert!(headers.has("Accept"));
    /// ```
    pub fn from_object(object: &Value) -> Result<Self> {
        let mut headers = Self::new();
        headers.add_all(object)?;
        Ok(headers)
    }

    /// Returns the value stored under `name`, comparing case-insensitively.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_lowercase())
            .map(|entry| entry.value.as_str())
    }

    /// Returns `true` if a value is stored under `name`.
    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Stores `value` under `name`, replacing any entry whose name differs
    /// only in case.
    ///
    /// String values are stored verbatim. Other values are serialized to
    /// their compact JSON form first, so `set("x", 42)` stores `"42"` and
    /// `set("x", json!({"a": 1}))` stores `"{\"a\":1}"`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidHeader`] if the name is empty, or the value is
    /// null or an empty string.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidHeader {
                reason: "header name must not be empty".to_string(),
            });
        }
        let serialized = match value.into() {
            Value::Null => {
                return Err(Error::InvalidHeader {
                    reason: format!("no value provided for header '{name}'"),
                });
            }
            Value::String(s) if s.is_empty() => {
                return Err(Error::InvalidHeader {
                    reason: format!("empty value provided for header '{name}'"),
                });
            }
            Value::String(s) => s,
            other => other.to_string(),
        };
        self.entries.insert(
            name.to_lowercase(),
            Entry {
                name: name.to_string(),
                value: serialized,
            },
        );
        Ok(())
    }

    /// Removes the entry stored under `name`, if any. A no-op when absent.
    pub fn remove(&mut self, name: &str) {
        self.entries.remove(&name.to_lowercase());
    }

    /// Applies [`set`](Headers::set) for every entry of a plain key-value
    /// object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `object` is not a JSON object;
    /// propagates [`Error::InvalidHeader`] from individual entries.
    pub fn add_all(&mut self, object: &Value) -> Result<()> {
        let map = object.as_object().ok_or_else(|| {
            Error::InvalidArgument("headers must be a plain key-value object".to_string())
        })?;
        for (name, value) in map {
            self.set(name, value.clone())?;
        }
        Ok(())
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of stored headers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no headers are stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a plain-object snapshot of the map.
    ///
    /// Keys carry the casing of the most recent `set`. The snapshot does not
    /// track later mutations.
    pub fn to_json(&self) -> serde_json::Map<String, Value> {
        self.entries
            .values()
            .map(|entry| (entry.name.clone(), Value::String(entry.value.clone())))
            .collect()
    }

    /// Returns the headers as a plain `name -> value` string mapping, the
    /// shape handed to a transport.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries
            .values()
            .map(|entry| (entry.name.clone(), entry.value.clone()))
            .collect()
    }

    // For defaults known valid at compile time.
    pub(crate) fn insert_static(&mut self, name: &'static str, value: &'static str) {
        self.entries.insert(
            name.to_lowercase(),
            Entry {
                name: name.to_string(),
                value: value.to_string(),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("X-Custom-Header", "abc").unwrap();

        assert_eq!(headers.get("x-custom-header"), Some("abc"));
        assert_eq!(headers.get("X-CUSTOM-HEADER"), Some("abc"));
        assert!(headers.has("x-Custom-header"));
    }

    #[test]
    fn test_set_replaces_entry_differing_only_in_case() {
        let mut headers = Headers::new();
        headers.set("accept", "text/plain").unwrap();
        headers.set("Accept", "application/json").unwrap();

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept"), Some("application/json"));
    }

    #[test]
    fn test_non_string_values_are_serialized_to_json() {
        let mut headers = Headers::new();
        headers.set("x-count", 7).unwrap();
        headers.set("x-flag", true).unwrap();
        headers.set("x-meta", json!({ "a": 1 })).unwrap();

        assert_eq!(headers.get("x-count"), Some("7"));
        assert_eq!(headers.get("x-flag"), Some("true"));
        assert_eq!(headers.get("x-meta"), Some(r#"{"a":1}"#));
    }

    #[test]
    fn test_set_rejects_missing_name_or_value() {
        let mut headers = Headers::new();

        assert!(matches!(
            headers.set("", "v"),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            headers.set("x", Value::Null),
            Err(Error::InvalidHeader { .. })
        ));
        assert!(matches!(
            headers.set("x", ""),
            Err(Error::InvalidHeader { .. })
        ));
    }

    #[test]
    fn test_remove_is_case_insensitive_and_noop_when_absent() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json").unwrap();

        headers.remove("CONTENT-TYPE");
        assert!(!headers.has("content-type"));

        // absent name
        headers.remove("content-type");
    }

    #[test]
    fn test_add_all_rejects_non_objects() {
        let mut headers = Headers::new();

        assert!(matches!(
            headers.add_all(&json!([1, 2])),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            headers.add_all(&json!("nope")),
            Err(Error::InvalidArgument(_))
        ));

        headers
            .add_all(&json!({ "a": "1", "b": 2 }))
            .unwrap();
        assert_eq!(headers.get("a"), Some("1"));
        assert_eq!(headers.get("b"), Some("2"));
    }

    #[test]
    fn test_to_json_snapshot_preserves_latest_casing() {
        let mut headers = Headers::new();
        headers.set("X-Thing", "1").unwrap();

        let snapshot = headers.to_json();
        assert_eq!(snapshot.get("X-Thing"), Some(&json!("1")));
    }

    #[test]
    fn test_clear() {
        let mut headers = Headers::new();
        headers.set("a", "1").unwrap();
        headers.set("b", "2").unwrap();

        headers.clear();
        assert!(headers.is_empty());
    }
}
