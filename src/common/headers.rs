use std::collections::BTreeMap;

/// Case-insensitive multi-valued header map.
///
/// Names are folded to lowercase ASCII on insertion and lookup. Values keep
/// their insertion order per name; iteration yields names in ascending
/// order, which makes response serialization deterministic.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    map: BTreeMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `value` to the list for `name`, creating the list if absent.
    /// Never replaces earlier values.
    pub fn add<N, V>(&mut self, name: N, value: V)
    where
        N: AsRef<str>,
        V: Into<String>,
    {
        self.map
            .entry(name.as_ref().to_ascii_lowercase())
            .or_insert_with(Vec::new)
            .push(value.into());
    }

    /// All values recorded for `name`, in insertion order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.map
            .get(&name.to_ascii_lowercase())
            .map(Vec::as_slice)
    }

    /// Iterates `(name, values)` pairs in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.map
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Number of distinct header names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// `true` when no header has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
