//! Metrics instrumentation
//!
//! Thin wrappers around the `metrics` facade so call sites stay one-liners
//! and metric names live in one place. A host application installs whatever
//! recorder it wants; without one these are no-ops.

/// Metric label values
pub mod labels {
    /// Search finished with all entries delivered
    pub const STATUS_SUCCESS: &str = "success";
    /// Search aborted with an error
    pub const STATUS_ERROR: &str = "error";
    /// Search aborted through a cancel handle
    pub const STATUS_CANCELLED: &str = "cancelled";
    /// Search aborted by the poll deadline
    pub const STATUS_TIMEOUT: &str = "timeout";
}

/// Counter metrics
pub mod counters {
    /// A search request was submitted to the directory
    pub fn search_started() {
        metrics::counter!("ldaptab_searches_started_total").increment(1);
    }

    /// A search drain finished, successfully or not
    pub fn search_completed(status: &'static str) {
        metrics::counter!("ldaptab_searches_completed_total", "status" => status).increment(1);
    }

    /// Entries drained from the directory during the collection pass
    pub fn entries_collected(count: u64) {
        metrics::counter!("ldaptab_entries_collected_total").increment(count);
    }

    /// Records handed to the caller during the emission pass
    pub fn records_emitted(count: u64) {
        metrics::counter!("ldaptab_records_emitted_total").increment(count);
    }
}

/// Histogram metrics
pub mod histograms {
    /// Wall-clock duration of the collection pass, in milliseconds
    pub fn collection_duration(millis: u64) {
        metrics::histogram!("ldaptab_collection_duration_ms").record(millis as f64);
    }

    /// Attribute-universe size observed for one search
    pub fn attribute_universe_size(size: usize) {
        metrics::histogram!("ldaptab_attribute_universe_size").record(size as f64);
    }
}
