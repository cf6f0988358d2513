//! Ordered variable table for DEFINE / UNDEFINE processing.

use serde_json::{Map, Value};

/// Variables defined so far in a substitution pass, in first-definition order.
///
/// Redefining a name overwrites its value in place. Lookups of names that
/// are not present fail; there is no default value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefineTable {
    entries: Vec<(String, String)>,
}

impl DefineTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines `name`. Returns the previous value, if any.
    pub fn define(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        if let Some((_, existing)) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            return Some(std::mem::replace(existing, value));
        }
        self.entries.push((name, value));
        None
    }

    /// Removes `name`. Removing an unset name is a no-op.
    pub fn undefine(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    /// Looks up the current value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if `name` is currently defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of defined variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Converts the table to a JSON object of strings.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(n, v)| (n.to_string(), Value::String(v.to_string())))
            .collect();
        Value::Object(map)
    }
}
