//! Document - The serialized form of an entity
//!
//! A Document is a flat, ordered set of string fields. Numeric attributes
//! are stored as their decimal rendering and parsed back by the mapper.

use std::collections::BTreeMap;

/// Separator between the entity name and the entity-specific key
pub const KEY_SEPARATOR: &str = ":";

/// Separator between the parts of a composite primary key
pub const KEY_PART_SEPARATOR: &str = "|";

/// Join the stringified parts of a primary key with [`KEY_PART_SEPARATOR`].
///
/// A single-part key renders as the part itself.
pub fn compose_key<I, P>(parts: I) -> String
where
    I: IntoIterator<Item = P>,
    P: core::fmt::Display,
{
    let mut key = String::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            key.push_str(KEY_PART_SEPARATOR);
        }
        key.push_str(&part.to_string());
    }
    key
}

/// Unique identifier of a stored document within one index
///
/// Always `<entity name>:<entity key>`, e.g. `employee:42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentKey(String);

impl DocumentKey {
    pub fn new(entity: &str, entity_key: &str) -> Self {
        Self(format!("{}{}{}", entity, KEY_SEPARATOR, entity_key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Document - field name to string value
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set a field
    pub fn with_field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl ToString) {
        self.fields.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// Overlay `partial` onto this document (partial-document update)
    pub fn merge(&mut self, partial: &Document) {
        for (name, value) in &partial.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_key_format() {
        let key = DocumentKey::new("employee", "42");
        assert_eq!(key.as_str(), "employee:42");
        assert_eq!(key.to_string(), "employee:42");
    }

    #[test]
    fn test_compose_key() {
        assert_eq!(compose_key([7]), "7");
        assert_eq!(compose_key(["dept", "7"]), "dept|7");
        assert_eq!(compose_key(Vec::<i32>::new()), "");
    }

    #[test]
    fn test_merge_overlays_fields() {
        let mut doc = Document::new()
            .with_field("id", 1)
            .with_field("name", "Alice")
            .with_field("age", 30);

        doc.merge(&Document::new().with_field("name", "Alicia"));

        assert_eq!(doc.get("name"), Some("Alicia"));
        assert_eq!(doc.get("age"), Some("30"));
        assert_eq!(doc.len(), 3);
    }
}
