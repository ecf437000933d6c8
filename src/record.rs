//! Flat attribute records, one per catalog leaf

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use url::Url;

use crate::extractors::ExtractedValue;

/// Name of the entry that always carries the leaf URL.
pub const URL_FIELD: &str = "url";

/// Result of reading one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldOutcome {
    Value(ExtractedValue),
    /// Text was present but did not parse. Written out as `null`.
    Malformed { text: String, reason: String },
}

impl FieldOutcome {
    pub fn value(&self) -> Option<&ExtractedValue> {
        match self {
            Self::Value(v) => Some(v),
            Self::Malformed { .. } => None,
        }
    }
}

impl Serialize for FieldOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => v.serialize(serializer),
            Self::Malformed { .. } => serializer.serialize_none(),
        }
    }
}

/// Ordered field name → value mapping for one leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeRecord {
    url: Url,
    fields: Vec<(String, FieldOutcome)>,
}

impl AttributeRecord {
    pub(crate) fn new(url: Url, fields: Vec<(String, FieldOutcome)>) -> Self {
        Self { url, fields }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn get(&self, name: &str) -> Option<&FieldOutcome> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, outcome)| outcome)
    }

    /// Value of `name`, or `None` when the field is malformed or not declared.
    pub fn value(&self, name: &str) -> Option<&ExtractedValue> {
        self.get(name).and_then(FieldOutcome::value)
    }

    /// All names in output order, `url` first.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(URL_FIELD).chain(self.fields.iter().map(|(name, _)| name.as_str()))
    }

    pub fn malformed(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|(_, outcome)| matches!(outcome, FieldOutcome::Malformed { .. }))
            .map(|(name, _)| name.as_str())
    }
}

impl Serialize for AttributeRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(URL_FIELD, self.url.as_str())?;
        for (name, outcome) in &self.fields {
            map.serialize_entry(name, outcome)?;
        }
        map.end()
    }
}
