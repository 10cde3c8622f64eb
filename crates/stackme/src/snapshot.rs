/// Plain record used to save and rehydrate a history stack.
///
/// Every field is optional so that partially written or hand-edited
/// records can still be imported: missing or malformed fields fall back
/// to defaults independently of one another.
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::DEFAULT_CAPACITY;
use crate::policy::Policy;

/// Saved state of a `HistoryStack`.
///
/// Older saves used the field names `maximum`, `stack` and `algo`; they are
/// accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StackSnapshot<T> {
    #[serde(alias = "maximum")]
    pub capacity: Option<i64>,
    #[serde(alias = "stack")]
    pub entries: Option<Vec<T>>,
    pub current: Option<i64>,
    #[serde(alias = "algo")]
    pub policy: Option<String>,
}

impl<T> Default for StackSnapshot<T> {
    fn default() -> Self {
        Self {
            capacity: None,
            entries: None,
            current: None,
            policy: None,
        }
    }
}

/// A snapshot with every field resolved and the invariants restored.
#[derive(Debug)]
pub(crate) struct Normalized<T> {
    pub capacity: usize,
    pub entries: Vec<T>,
    pub current: usize,
    pub policy: Policy,
}

impl<T: DeserializeOwned> StackSnapshot<T> {
    /// Reads a snapshot out of an untyped JSON value. Never fails.
    ///
    /// A field with the wrong JSON type is treated as absent, and a legacy
    /// alias is only consulted if the current name is missing or unusable.
    /// An entries array whose items do not decode as `T` is treated as empty.
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            tracing::debug!("Snapshot is not a JSON object, using defaults");
            return Self::default();
        };

        let capacity = take_field(&mut map, &["capacity", "maximum"], |v| as_integer(&v));
        let current = take_field(&mut map, &["current"], |v| as_integer(&v));
        let policy = take_field(&mut map, &["policy", "algo"], |v| match v {
            Value::String(name) => Some(name),
            _ => None,
        });
        let items = take_field(&mut map, &["entries", "stack"], |v| match v {
            Value::Array(items) => Some(items),
            _ => None,
        });

        let entries = match items {
            Some(items) => {
                let decoded = items
                    .into_iter()
                    .map(serde_json::from_value)
                    .collect::<serde_json::Result<Vec<T>>>();
                match decoded {
                    Ok(entries) => Some(entries),
                    Err(e) => {
                        tracing::warn!("Discarding snapshot entries that failed to decode: {e}");
                        Some(Vec::new())
                    }
                }
            }
            None => None,
        };

        Self {
            capacity,
            entries,
            current,
            policy,
        }
    }

    /// Parses a snapshot from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error only if `text` is not JSON at all. Field-level
    /// problems are normalized by `from_value`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).context("Snapshot is not valid JSON")?;
        Ok(Self::from_value(value))
    }
}

impl<T> StackSnapshot<T> {
    /// Resolves defaults, trims entries to the capacity and clamps the cursor.
    pub(crate) fn normalize(self) -> Normalized<T> {
        let capacity = match self.capacity {
            Some(c) if c >= 1 => usize::try_from(c).unwrap_or(usize::MAX),
            _ => DEFAULT_CAPACITY,
        };
        let mut entries = self.entries.unwrap_or_default();
        let current = match self.current {
            Some(c) if c >= 0 => usize::try_from(c).unwrap_or(usize::MAX),
            _ => 0,
        };
        let policy = self
            .policy
            .as_deref()
            .and_then(Policy::parse)
            .unwrap_or_default();

        if entries.len() > capacity {
            tracing::debug!(
                "Truncating imported history from {} to {capacity} entries",
                entries.len()
            );
            entries.truncate(capacity);
        }

        let clamped = current.min(capacity - 1);
        if clamped != current {
            tracing::debug!("Clamping imported cursor {current} to {clamped}");
        }

        Normalized {
            capacity,
            entries,
            current: clamped,
            policy,
        }
    }
}

/// Removes `names` from a JSON object in order and returns the first value
/// `read` accepts. Later names are legacy aliases.
fn take_field<U>(
    map: &mut serde_json::Map<String, Value>,
    names: &[&str],
    read: impl Fn(Value) -> Option<U>,
) -> Option<U> {
    names
        .iter()
        .filter_map(|name| map.remove(*name))
        .find_map(read)
}

/// Integer value of a JSON number, accepting floats with no fractional part.
fn as_integer(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        let f = value.as_f64()?;
        (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_value_reads_all_fields() {
        let snap: StackSnapshot<String> = StackSnapshot::from_value(json!({
            "capacity": 5,
            "entries": ["a", "b"],
            "current": 1,
            "policy": "insertion",
        }));
        assert_eq!(snap.capacity, Some(5));
        assert_eq!(snap.entries, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(snap.current, Some(1));
        assert_eq!(snap.policy.as_deref(), Some("insertion"));
    }

    #[test]
    fn test_from_value_accepts_legacy_names() {
        let snap: StackSnapshot<i32> = StackSnapshot::from_value(json!({
            "maximum": 4,
            "stack": [1, 2, 3],
            "current": 2,
            "algo": "lineare",
        }));
        let n = snap.normalize();
        assert_eq!(n.capacity, 4);
        assert_eq!(n.entries, vec![1, 2, 3]);
        assert_eq!(n.current, 2);
        assert_eq!(n.policy, Policy::Linear);
    }

    #[test]
    fn test_from_value_wrong_types_become_absent() {
        let snap: StackSnapshot<i32> = StackSnapshot::from_value(json!({
            "capacity": "ten",
            "entries": {"0": 1},
            "current": null,
            "policy": 3,
        }));
        assert_eq!(snap, StackSnapshot::default());
    }

    #[test]
    fn test_from_value_accepts_integral_floats() {
        let snap: StackSnapshot<i32> = StackSnapshot::from_value(json!({
            "capacity": 3.0,
            "entries": [1, 2, 3, 4],
            "current": 1.0,
        }));
        assert_eq!(snap.capacity, Some(3));
        assert_eq!(snap.current, Some(1));
        let n = snap.normalize();
        assert_eq!(n.entries, vec![1, 2, 3]);
    }

    #[test]
    fn test_from_value_rejects_fractional_numbers() {
        let snap: StackSnapshot<i32> =
            StackSnapshot::from_value(json!({ "capacity": 2.5, "current": 0.5 }));
        assert_eq!(snap.capacity, None);
        assert_eq!(snap.current, None);
    }

    #[test]
    fn test_from_value_falls_back_to_alias_when_current_name_is_malformed() {
        let snap: StackSnapshot<i32> = StackSnapshot::from_value(json!({
            "capacity": "x",
            "maximum": 5,
            "entries": null,
            "stack": [4, 5],
            "policy": false,
            "algo": "insertion",
        }));
        assert_eq!(snap.capacity, Some(5));
        assert_eq!(snap.entries, Some(vec![4, 5]));
        assert_eq!(snap.policy.as_deref(), Some("insertion"));
    }

    #[test]
    fn test_from_value_prefers_current_name_when_both_valid() {
        let snap: StackSnapshot<i32> =
            StackSnapshot::from_value(json!({ "capacity": 7, "maximum": 5 }));
        assert_eq!(snap.capacity, Some(7));
    }

    #[test]
    fn test_from_value_undecodable_entries_become_empty() {
        let snap: StackSnapshot<i32> =
            StackSnapshot::from_value(json!({ "entries": [1, "two", 3] }));
        assert_eq!(snap.entries, Some(Vec::new()));
    }

    #[test]
    fn test_from_value_non_object() {
        let snap: StackSnapshot<i32> = StackSnapshot::from_value(json!([1, 2, 3]));
        assert_eq!(snap, StackSnapshot::default());
    }

    #[test]
    fn test_from_json_str_rejects_garbage() {
        assert!(StackSnapshot::<i32>::from_json_str("{not json").is_err());
        assert!(StackSnapshot::<i32>::from_json_str("42").is_ok());
    }

    #[test]
    fn test_normalize_defaults() {
        let n = StackSnapshot::<i32>::default().normalize();
        assert_eq!(n.capacity, DEFAULT_CAPACITY);
        assert!(n.entries.is_empty());
        assert_eq!(n.current, 0);
        assert_eq!(n.policy, Policy::ClearPath);
    }

    #[test]
    fn test_normalize_rejects_non_positive_capacity_and_negative_cursor() {
        let n = StackSnapshot::<i32> {
            capacity: Some(0),
            entries: Some(vec![1]),
            current: Some(-1),
            policy: Some("sideways".to_string()),
        }
        .normalize();
        assert_eq!(n.capacity, DEFAULT_CAPACITY);
        assert_eq!(n.current, 0);
        assert_eq!(n.policy, Policy::ClearPath);
    }

    #[test]
    fn test_normalize_truncates_to_capacity() {
        let n = StackSnapshot {
            capacity: Some(3),
            entries: Some(vec![1, 2, 3, 4, 5]),
            current: Some(4),
            policy: None,
        }
        .normalize();
        assert_eq!(n.entries, vec![1, 2, 3]);
        assert_eq!(n.current, 2);
    }

    #[test]
    fn test_normalize_clamps_cursor_to_capacity_not_length() {
        let n = StackSnapshot {
            capacity: Some(10),
            entries: Some(vec![1, 2]),
            current: Some(50),
            policy: None,
        }
        .normalize();
        assert_eq!(n.current, 9);
        assert_eq!(n.entries.len(), 2);
    }

    #[test]
    fn test_deserialize_missing_fields() {
        let snap: StackSnapshot<i32> = serde_json::from_str(r#"{"stack":[7]}"#).unwrap();
        assert_eq!(snap.entries, Some(vec![7]));
        assert_eq!(snap.capacity, None);
    }
}
