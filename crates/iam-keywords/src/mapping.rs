//! Keyword mappings and array identifier tables.

use std::collections::BTreeMap;

use iam_core::resource::{DEFAULT_ARRAY_IDENTIFIERS, DEFAULT_IDENTIFIER_FIELD};

/// Keyword name to literal value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeywordMapping {
    entries: BTreeMap<String, String>,
}

impl KeywordMapping {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one keyword.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), value.into());
        self
    }

    /// Returns this mapping with `overrides` applied. Overrides win.
    #[must_use]
    pub fn with_overrides<I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.entries.extend(overrides);
        self
    }

    /// Value of a keyword.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns whether a keyword is mapped.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Keyword names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of keywords.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether no keyword is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<BTreeMap<String, String>> for KeywordMapping {
    fn from(entries: BTreeMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for KeywordMapping {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Array field name to the identifier field of its elements.
///
/// Fields without an entry use `name`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierTable {
    fields: BTreeMap<String, String>,
}

impl IdentifierTable {
    /// Table with the identifiers of the server's export schema.
    #[must_use]
    pub fn builtin() -> Self {
        DEFAULT_ARRAY_IDENTIFIERS.iter().copied().collect()
    }

    /// Adds or replaces one entry.
    #[must_use]
    pub fn with(mut self, array_field: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.fields.insert(array_field.into(), identifier.into());
        self
    }

    /// Identifier field for an array field.
    #[must_use]
    pub fn get(&self, array_field: &str) -> &str {
        self.fields
            .get(array_field)
            .map_or(DEFAULT_IDENTIFIER_FIELD, String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IdentifierTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for IdentifierTable {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.fields
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_on_collision() {
        let mapping = KeywordMapping::new()
            .with("ENV", "prod")
            .with("HOST", "iam.example.com")
            .with_overrides([("ENV".to_string(), "dev".to_string())]);
        assert_eq!(mapping.get("ENV"), Some("dev"));
        assert_eq!(mapping.get("HOST"), Some("iam.example.com"));
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn identifier_defaults_to_name() {
        let table = IdentifierTable::builtin().with("certificates", "alias");
        assert_eq!(table.get("roleMappings"), "localRole.localRoleName");
        assert_eq!(table.get("certificates"), "alias");
        assert_eq!(table.get("somethingElse"), "name");
    }
}
