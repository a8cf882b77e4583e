//! Key/value patches.

use crate::error::{ProtocolError, ProtocolResult};
use crate::value::Value;

/// Message carried by [`ProtocolError::InvalidPatch`] for shape errors.
pub const INVALID_PATCH: &str = "need an ordered sequence of key/value pairs";

/// One field-level entry of a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    /// Address key, resolved against the parent operation's type and id.
    pub key: String,
    /// Entry payload.
    pub value: Value,
}

impl KeyValue {
    /// Creates a patch entry.
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// An ordered sequence of key/value entries.
///
/// Order and duplicate keys are both significant for replay, so this is
/// a sequence and never a keyed map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch(Vec<KeyValue>);

impl Patch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends an entry.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.push(KeyValue::new(key, value));
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the patch has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the entries in order.
    pub fn iter(&self) -> std::slice::Iter<'_, KeyValue> {
        self.0.iter()
    }
}

impl From<Vec<KeyValue>> for Patch {
    fn from(entries: Vec<KeyValue>) -> Self {
        Self(entries)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Patch {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| KeyValue::new(k, v)).collect())
    }
}

impl IntoIterator for Patch {
    type Item = KeyValue;
    type IntoIter = std::vec::IntoIter<KeyValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl TryFrom<&Value> for Patch {
    type Error = ProtocolError;

    /// Accepts an array of maps, each with a text `key` entry and an
    /// optional `value` entry.
    fn try_from(value: &Value) -> ProtocolResult<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| ProtocolError::InvalidPatch(INVALID_PATCH.into()))?;

        items
            .iter()
            .map(|item| {
                if item.as_map().is_none() {
                    return Err(ProtocolError::InvalidPatch(INVALID_PATCH.into()));
                }
                let key = item.get("key").and_then(Value::as_text).ok_or_else(|| {
                    ProtocolError::InvalidPatch("patch entry without a text key".into())
                })?;
                let value = item.get("value").cloned().unwrap_or(Value::Null);
                Ok(KeyValue::new(key, value))
            })
            .collect::<ProtocolResult<Vec<_>>>()
            .map(Patch)
    }
}

impl TryFrom<Value> for Patch {
    type Error = ProtocolError;

    fn try_from(value: Value) -> ProtocolResult<Self> {
        Patch::try_from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn entry(key: &str, value: i64) -> Value {
        Value::map([("key", Value::from(key)), ("value", Value::Integer(value))])
    }

    #[test]
    fn from_value_preserves_order() {
        let raw = Value::Array(vec![entry(".b", 1), entry(".a", 2), entry(".b", 3)]);
        let patch = Patch::try_from(&raw).unwrap();
        let keys: Vec<_> = patch.iter().map(|kv| kv.key.as_str()).collect();
        assert_eq!(keys, [".b", ".a", ".b"]);
        assert_eq!(patch.iter().nth(2).unwrap().value, Value::Integer(3));
    }

    #[test]
    fn missing_value_is_null() {
        let raw = Value::Array(vec![Value::map([("key", Value::from(".x"))])]);
        let patch = Patch::try_from(raw).unwrap();
        assert_eq!(patch.iter().next().unwrap().value, Value::Null);
    }

    #[test]
    fn rejects_non_sequence() {
        let single = entry(".a", 1);
        assert_eq!(
            Patch::try_from(&single),
            Err(ProtocolError::InvalidPatch(INVALID_PATCH.into()))
        );
        assert!(Patch::try_from(Value::from("text")).is_err());
    }

    #[test]
    fn rejects_malformed_entries() {
        let raw = Value::Array(vec![Value::Integer(1)]);
        assert!(matches!(
            Patch::try_from(&raw),
            Err(ProtocolError::InvalidPatch(_))
        ));

        let raw = Value::Array(vec![Value::map([("value", Value::Integer(1))])]);
        assert!(matches!(
            Patch::try_from(&raw),
            Err(ProtocolError::InvalidPatch(_))
        ));
    }

    #[test]
    fn collect_from_pairs() {
        let patch: Patch = vec![(".x", 1i64), (".y", 2i64)].into_iter().collect();
        assert_eq!(patch.len(), 2);
        assert!(!patch.is_empty());
    }

    proptest! {
        #[test]
        fn try_from_keeps_order_and_duplicates(keys in prop::collection::vec("\\.[a-c]", 0..16)) {
            let raw = Value::Array(
                keys.iter()
                    .enumerate()
                    .map(|(i, key)| entry(key, i as i64))
                    .collect(),
            );
            let patch = Patch::try_from(&raw).unwrap();

            prop_assert_eq!(patch.len(), keys.len());
            for (i, (kv, key)) in patch.iter().zip(&keys).enumerate() {
                prop_assert_eq!(&kv.key, key);
                prop_assert_eq!(&kv.value, &Value::Integer(i as i64));
            }
        }
    }
}
