//! Metric records and their scalar values.

use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::Serialize;

/// A scalar metric value.
///
/// The wire form is the plain JSON scalar; the enum exists so the set of
/// encodable kinds is closed at compile time. Integer values keep their
/// full `i64`/`u64` range on the wire, floats are IEEE double precision.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    Uint(u64),
    /// A floating point number.
    Float(f64),
    /// A string, typically used for tags.
    Str(String),
}

macro_rules! into_value {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Value {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

into_value!(Int: i8, i16, i32, i64);
into_value!(Uint: u8, u16, u32, u64);
into_value!(Float: f32, f64);

impl From<isize> for Value {
    fn from(value: isize) -> Value {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Value {
        Value::Uint(value as u64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Value {
        Value::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Value {
        Value::Str(value)
    }
}

/// One measurement event: a mapping from metric keys to scalar values.
///
/// Records are built per call and discarded after publishing; key order
/// is not significant. The [`record!`](crate::record!) macro builds
/// literals:
///
/// ```
/// let record = mqmetrics::record! {
///     "counter" => 1000u64,
///     "tag" => "checkout",
/// };
/// assert_eq!(record.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    entries: BTreeMap<String, Value>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Record {
        Record::default()
    }

    /// Inserts a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Record::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Record {
        self.insert(key, value);
        self
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of entries in the record.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record holds no entries.
    ///
    /// Empty records are never published.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Record {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Record {
        let mut record = Record::new();
        record.extend(iter);
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_encode_as_plain_scalars() {
        assert_eq!(serde_json::to_string(&Value::from(42i32)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&Value::from(-7i64)).unwrap(), "-7");
        assert_eq!(
            serde_json::to_string(&Value::from(u64::MAX)).unwrap(),
            u64::MAX.to_string()
        );
        assert_eq!(serde_json::to_string(&Value::from(2.5f64)).unwrap(), "2.5");
        assert_eq!(
            serde_json::to_string(&Value::from("gauge")).unwrap(),
            "\"gauge\""
        );
    }

    #[test]
    fn test_record_encodes_as_an_object() {
        let record = crate::record! { "counter" => 3u64, "tag" => "a" };
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"counter":3,"tag":"a"}"#
        );
    }

    #[test]
    fn test_empty_record_macro() {
        let record = crate::record! {};
        assert!(record.is_empty());
    }

    #[test]
    fn test_builder_and_collection_apis() {
        let record = Record::new().with("a", 1u64).with("b", "x");
        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Value::Uint(1)));
        assert_eq!(record.get("b"), Some(&Value::Str("x".to_owned())));

        let collected: Record = record.into_iter().collect();
        assert_eq!(collected.len(), 2);
    }

    #[test]
    fn test_insert_replaces_previous_value() {
        let mut record = Record::new();
        record.insert("counter", 1u64);
        record.insert("counter", 2u64);
        assert_eq!(record.get("counter"), Some(&Value::Uint(2)));
        assert_eq!(record.len(), 1);
    }
}
