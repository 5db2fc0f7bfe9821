//! Raw entry model
//!
//! One [`RawEntry`] per matching directory object. Attribute sets differ
//! entry-to-entry because directory schemas are sparse; reconciling that
//! is the normalizer's job, not the executor's.

use base64::Engine;
use ldap3::SearchEntry;
use serde::Serialize;
use std::collections::BTreeMap;

/// One object returned by a directory search, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawEntry {
    /// Distinguished name of the entry
    pub dn: String,
    /// Attribute values, keyed by attribute name
    pub attrs: BTreeMap<String, Vec<String>>,
}

impl RawEntry {
    /// Build an entry with no attributes.
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: BTreeMap::new(),
        }
    }

    /// Add one attribute with its values.
    pub fn attr<S: Into<String>>(mut self, name: impl Into<String>, values: Vec<S>) -> Self {
        self.attrs
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Names of the attributes present on this entry.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// Convert a decoded protocol entry.
    ///
    /// Textual values pass through unchanged; values the server marks binary
    /// are surfaced base64-encoded so every attribute stays a string sequence.
    /// An attribute with both textual and binary values keeps both, textual
    /// first.
    pub(crate) fn from_search_entry(entry: SearchEntry) -> Self {
        let mut attrs: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for (name, values) in entry.attrs {
            attrs.entry(name).or_default().extend(values);
        }

        for (name, values) in entry.bin_attrs {
            let encoded = values
                .into_iter()
                .map(|v| base64::engine::general_purpose::STANDARD.encode(v));
            attrs.entry(name).or_default().extend(encoded);
        }

        Self {
            dn: entry.dn,
            attrs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn search_entry(
        dn: &str,
        attrs: Vec<(&str, Vec<&str>)>,
        bin_attrs: Vec<(&str, Vec<Vec<u8>>)>,
    ) -> SearchEntry {
        SearchEntry {
            dn: dn.to_string(),
            attrs: attrs
                .into_iter()
                .map(|(k, vs)| (k.to_string(), vs.into_iter().map(str::to_string).collect()))
                .collect::<HashMap<_, _>>(),
            bin_attrs: bin_attrs
                .into_iter()
                .map(|(k, vs)| (k.to_string(), vs))
                .collect::<HashMap<_, _>>(),
        }
    }

    #[test]
    fn test_from_search_entry_textual() {
        let entry = RawEntry::from_search_entry(search_entry(
            "uid=alice,ou=people,dc=example,dc=com",
            vec![("cn", vec!["Alice"]), ("mail", vec!["a@x.com", "a2@x.com"])],
            vec![],
        ));

        assert_eq!(entry.dn, "uid=alice,ou=people,dc=example,dc=com");
        assert_eq!(entry.attrs["cn"], vec!["Alice"]);
        assert_eq!(entry.attrs["mail"].len(), 2);
    }

    #[test]
    fn test_from_search_entry_binary_is_base64() {
        let entry = RawEntry::from_search_entry(search_entry(
            "cn=photo,dc=example,dc=com",
            vec![],
            vec![("jpegPhoto", vec![vec![0xff, 0xd8, 0xff]])],
        ));

        assert_eq!(entry.attrs["jpegPhoto"], vec!["/9j/".to_string()]);
    }

    #[test]
    fn test_mixed_attribute_keeps_both_value_kinds() {
        let entry = RawEntry::from_search_entry(search_entry(
            "cn=mixed,dc=example,dc=com",
            vec![("userCertificate", vec!["text"])],
            vec![("userCertificate", vec![vec![0x01]])],
        ));

        assert_eq!(entry.attrs["userCertificate"].len(), 2);
        assert_eq!(entry.attrs["userCertificate"][0], "text");
    }

    #[test]
    fn test_attribute_names() {
        let entry = RawEntry::new("cn=x").attr("cn", vec!["x"]).attr("sn", vec!["y"]);
        let names: Vec<&str> = entry.attribute_names().collect();
        assert_eq!(names, vec!["cn", "sn"]);
    }
}
