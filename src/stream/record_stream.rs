//! Lazy record emission
//!
//! The emission pass of the normalizer: replays the cached entries in
//! arrival order, pads each one up to the frozen attribute universe, and
//! yields records one at a time. Emission does no I/O; the stream is usable
//! both as a blocking [`Iterator`] and as a [`futures::Stream`] for async
//! sinks.

use super::normalizer::AttributeUniverse;
use super::record::NormalizedRecord;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Ordered, lazy sequence of schema-complete records for one search.
#[derive(Debug)]
pub struct RecordStream {
    universe: Arc<AttributeUniverse>,
    entries: std::vec::IntoIter<BTreeMap<String, Vec<String>>>,
    remaining: Option<usize>,
}

impl RecordStream {
    pub(crate) fn new(
        universe: AttributeUniverse,
        cache: Vec<BTreeMap<String, Vec<String>>>,
        limit: Option<usize>,
    ) -> Self {
        Self {
            universe: Arc::new(universe),
            entries: cache.into_iter(),
            remaining: limit,
        }
    }

    /// The frozen attribute universe shared by every record in the stream.
    pub fn universe(&self) -> &AttributeUniverse {
        &self.universe
    }

    fn next_record(&mut self) -> Option<NormalizedRecord> {
        if self.remaining == Some(0) {
            return None;
        }

        let mut fields = self.entries.next()?;
        self.universe.pad(&mut fields);

        if let Some(remaining) = &mut self.remaining {
            *remaining -= 1;
        }
        crate::metrics::counters::records_emitted(1);

        Some(NormalizedRecord::new(fields))
    }

    fn records_left(&self) -> usize {
        match self.remaining {
            Some(limit) => limit.min(self.entries.len()),
            None => self.entries.len(),
        }
    }

    /// Adapt the stream for async sinks.
    ///
    /// Emission does no I/O, so this is a plain adapter over the iterator
    /// face; it exists so async consumers can use `StreamExt` combinators
    /// without blocking glue.
    pub fn into_stream(self) -> impl futures::Stream<Item = NormalizedRecord> {
        futures::stream::iter(self)
    }
}

impl Iterator for RecordStream {
    type Item = NormalizedRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.records_left();
        (left, Some(left))
    }
}

impl ExactSizeIterator for RecordStream {}
