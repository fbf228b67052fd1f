//! Ordered rows and the conversions applied to them.

use crate::error::Result;
use crate::npy::{binary_to_ndarray, is_npy, NPY_MAGIC};
use crate::value::Value;
use std::collections::BTreeSet;

/// A result row: column names mapped to values, in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    entries: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Builder-style [`Row::insert`].
    pub fn with_value(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, keeping its position if it is already present.
    /// Returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Inserts `Value::Null` under `key` unless it is already present.
    pub fn set_default(&mut self, key: &str) -> &mut Value {
        let idx = match self.position(key) {
            Some(idx) => idx,
            None => {
                self.entries.push((key.to_string(), Value::Null));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.position(key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.position(key).map(move |idx| &mut self.entries[idx].1)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.position(key).map(|idx| self.entries.remove(idx).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Applies blob conversion to a fetched row. `None` passes through.
pub fn convert_row(row: Option<Row>) -> Result<Option<Row>> {
    row.map(convert_blobs).transpose()
}

/// Replaces NPY-encoded blob (or text) entries with the decoded array.
pub fn convert_blobs(mut row: Row) -> Result<Row> {
    for (_, value) in row.entries.iter_mut() {
        let decoded = match &*value {
            Value::Blob(bytes) if is_npy(bytes) => Some(binary_to_ndarray(bytes)?),
            Value::Text(text) => match npy_text_bytes(text) {
                Some(bytes) => Some(binary_to_ndarray(&bytes)?),
                None => None,
            },
            _ => None,
        };
        if let Some(array) = decoded {
            *value = Value::Array(array);
        }
    }
    Ok(row)
}

/// A payload that came back through a text column, one char per byte.
fn npy_text_bytes(text: &str) -> Option<Vec<u8>> {
    let mut chars = text.chars();
    let prefix_matches = NPY_MAGIC
        .iter()
        .all(|&b| chars.next() == Some(char::from(b)));
    if !prefix_matches {
        return None;
    }
    text.chars().map(|c| u8::try_from(c).ok()).collect()
}

/// Pads every row in `chunk` to the union of all keys, filling missing
/// columns with `Value::Null`. Returns the sorted union.
pub fn pad_chunk_columns(chunk: &mut [Row]) -> Vec<String> {
    let columns: BTreeSet<String> = chunk
        .iter()
        .flat_map(|row| row.keys().map(str::to_string))
        .collect();
    for row in chunk.iter_mut() {
        for column in &columns {
            row.set_default(column);
        }
    }
    columns.into_iter().collect()
}
