//! Schema-complete output record

use serde::Serialize;
use std::collections::BTreeMap;

/// Reserved field name carrying the distinguished name of each record.
pub const DN_ATTRIBUTE: &str = "dn";

/// One schema-complete record handed to the downstream consumer.
///
/// Every record emitted for one search has the identical field-name set: the
/// union of attribute names across all entries in that result set, plus
/// [`DN_ATTRIBUTE`]. Directory attributes are inherently multi-valued, so
/// each field holds an ordered sequence of strings; fields absent on the
/// source entry hold an empty sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRecord {
    fields: BTreeMap<String, Vec<String>>,
}

impl NormalizedRecord {
    pub(crate) fn new(fields: BTreeMap<String, Vec<String>>) -> Self {
        Self { fields }
    }

    /// Distinguished name of the record.
    pub fn dn(&self) -> Option<&str> {
        self.fields
            .get(DN_ATTRIBUTE)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Values of one field, if the field exists in this search's schema.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.fields.get(name).map(Vec::as_slice)
    }

    /// Field names, in emission order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields with their values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Consume the record, yielding the underlying field map.
    pub fn into_fields(self) -> BTreeMap<String, Vec<String>> {
        self.fields
    }
}
