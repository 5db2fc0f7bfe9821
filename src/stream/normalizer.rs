//! Two-pass schema normalization
//!
//! A streaming consumer that infers a table's columns from the first row
//! silently loses attributes that only appear on later entries, and sparse
//! population is the common case in directory data, not an edge case. The
//! only way to guarantee no attribute is dropped is to observe every entry's
//! key set before emitting anything. That forces buffering the full result
//! set for one search; the cost is bounded by result-set size, not schema
//! size, and is accepted deliberately here.
//!
//! Pass one ([`Normalizer::collect`]) drains the entry source, folds each
//! distinguished name under the reserved `dn` key, unions attribute names
//! into the [`AttributeUniverse`], and caches entries in arrival order. Pass
//! two ([`RecordStream`](super::RecordStream)) replays the cache, padding
//! each entry up to the frozen universe.

use super::record::DN_ATTRIBUTE;
use super::record_stream::RecordStream;
use crate::search::{EntrySource, RawEntry};
use crate::Result;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;
use tracing::{debug, warn};

/// The set of attribute names observed across one search's entries, plus the
/// reserved `dn` name. Built during the collection pass, frozen before
/// emission begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeUniverse {
    names: BTreeSet<String>,
}

impl AttributeUniverse {
    /// A universe containing only the reserved `dn` name.
    pub fn new() -> Self {
        let mut names = BTreeSet::new();
        names.insert(DN_ATTRIBUTE.to_string());
        Self { names }
    }

    /// Union the given attribute names into the universe.
    pub fn observe<'a>(&mut self, names: impl IntoIterator<Item = &'a String>) {
        for name in names {
            if !self.names.contains(name) {
                self.names.insert(name.clone());
            }
        }
    }

    /// Whether the universe contains a name.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of names in the universe.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// A universe is never empty; it always carries the reserved `dn` name.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Names in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Backfill every universe name absent from the entry with an empty
    /// value sequence. Present attributes are never altered, so padding
    /// twice is a no-op.
    pub fn pad(&self, fields: &mut BTreeMap<String, Vec<String>>) {
        for name in &self.names {
            if !fields.contains_key(name) {
                fields.insert(name.clone(), Vec::new());
            }
        }
    }
}

impl Default for AttributeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

/// Collection-pass state: the attribute universe plus the ordered entry
/// cache.
#[derive(Debug, Default)]
pub struct Normalizer {
    universe: AttributeUniverse,
    cache: Vec<BTreeMap<String, Vec<String>>>,
}

impl Normalizer {
    /// An empty normalizer, ready to observe entries.
    pub fn new() -> Self {
        Self {
            universe: AttributeUniverse::new(),
            cache: Vec::new(),
        }
    }

    /// Fold one raw entry into the collection state: record its DN under the
    /// reserved key, union its attribute names, append it to the cache.
    pub fn observe(&mut self, entry: RawEntry) {
        let RawEntry { dn, mut attrs } = entry;

        if let Some(displaced) = attrs.insert(DN_ATTRIBUTE.to_string(), vec![dn]) {
            // The distinguished name owns the reserved key; a real attribute
            // with the same name is dropped, loudly.
            warn!(
                values = displaced.len(),
                "entry carries a literal '{}' attribute; its values are displaced by the distinguished name",
                DN_ATTRIBUTE
            );
        }

        self.universe.observe(attrs.keys());
        self.cache.push(attrs);
    }

    /// Run the collection pass: drain the source until end of results.
    ///
    /// Any error from the source aborts the whole operation; a failed search
    /// emits nothing, never a partial stream.
    pub async fn collect<S>(source: &mut S) -> Result<Self>
    where
        S: EntrySource + Send,
    {
        let started = Instant::now();
        let mut normalizer = Self::new();

        while let Some(entry) = source.next_entry().await? {
            normalizer.observe(entry);
        }

        crate::metrics::counters::entries_collected(normalizer.cache.len() as u64);
        crate::metrics::histograms::collection_duration(started.elapsed().as_millis() as u64);
        crate::metrics::histograms::attribute_universe_size(normalizer.universe.len());

        debug!(
            entries = normalizer.cache.len(),
            attributes = normalizer.universe.len(),
            "collection pass complete"
        );

        Ok(normalizer)
    }

    /// The universe accumulated so far.
    pub fn universe(&self) -> &AttributeUniverse {
        &self.universe
    }

    /// Number of cached entries.
    pub fn entry_count(&self) -> usize {
        self.cache.len()
    }

    /// Freeze the universe and hand the cache to the emission pass.
    ///
    /// `limit` caps the number of emitted records; the universe has already
    /// been computed over every entry, so a capped emission still carries the
    /// full field-name set.
    pub fn into_records(self, limit: Option<usize>) -> RecordStream {
        RecordStream::new(self.universe, self.cache, limit)
    }
}
