//! Pull-based entry stream over one outstanding search.
//!
//! Directory search results arrive asynchronously; the server pushes entries
//! as it finds them and finishes with a result code. [`EntryStream`] turns
//! that into a pull model: each call to [`EntrySource::next_entry`] suspends
//! until the next entry or the completion signal arrives, so the polling
//! cadence is the consumer's business, not the protocol's.

use super::entry::RawEntry;
use crate::{Error, Result};
use async_trait::async_trait;
use ldap3::{SearchEntry, SearchStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cooperative cancellation for one search drain.
///
/// Cloneable; hand one clone to the search spec and keep the other. The flag
/// is checked once per poll iteration, so cancellation takes effect at the
/// next entry boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Create a handle in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of the drain.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// A pull-based source of raw entries.
///
/// The normalizer consumes this abstraction rather than the wire stream
/// directly, which keeps its two passes independent of polling mechanics and
/// lets tests script arbitrary entry sequences.
#[async_trait]
pub trait EntrySource {
    /// Next entry, `None` at end of results, or the error that aborted the
    /// search. After an error or end of results, subsequent calls return
    /// `Ok(None)`.
    async fn next_entry(&mut self) -> Result<Option<RawEntry>>;
}

/// Live entry stream over one outstanding directory search.
pub struct EntryStream {
    inner: SearchStream<'static, String, Vec<String>>,
    timeout: Option<Duration>,
    cancel: Option<CancelHandle>,
    entries_seen: u64,
    done: bool,
}

impl EntryStream {
    pub(crate) fn new(
        inner: SearchStream<'static, String, Vec<String>>,
        timeout: Option<Duration>,
        cancel: Option<CancelHandle>,
    ) -> Self {
        Self {
            inner,
            timeout,
            cancel,
            entries_seen: 0,
            done: false,
        }
    }

    /// Entries delivered so far.
    pub fn entries_seen(&self) -> u64 {
        self.entries_seen
    }

    async fn poll_next(&mut self) -> Result<Option<RawEntry>> {
        if self.done {
            return Ok(None);
        }

        if let Some(cancel) = &self.cancel {
            if cancel.is_cancelled() {
                self.done = true;
                debug!(entries = self.entries_seen, "search drain cancelled");
                crate::metrics::counters::search_completed(
                    crate::metrics::labels::STATUS_CANCELLED,
                );
                return Err(Error::Cancelled);
            }
        }

        let polled = match self.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, self.inner.next()).await {
                Ok(result) => result,
                Err(_) => {
                    self.done = true;
                    crate::metrics::counters::search_completed(
                        crate::metrics::labels::STATUS_TIMEOUT,
                    );
                    return Err(Error::Timeout(deadline));
                }
            },
            None => self.inner.next().await,
        };

        match polled {
            Ok(Some(result_entry)) => {
                self.entries_seen += 1;
                let entry = RawEntry::from_search_entry(SearchEntry::construct(result_entry));
                Ok(Some(entry))
            }
            Ok(None) => {
                self.done = true;
                // The protocol's completion signal carries the search result
                // code; a nonzero code means the whole search failed even if
                // entries were already delivered.
                let result = self.inner.finish().await;
                if result.rc != 0 {
                    crate::metrics::counters::search_completed(
                        crate::metrics::labels::STATUS_ERROR,
                    );
                    return Err(Error::Query(format!(
                        "directory returned code {}: {}",
                        result.rc,
                        describe_result(result.rc, &result.text)
                    )));
                }
                debug!(entries = self.entries_seen, "search drain complete");
                crate::metrics::counters::search_completed(crate::metrics::labels::STATUS_SUCCESS);
                Ok(None)
            }
            Err(e) => {
                self.done = true;
                crate::metrics::counters::search_completed(crate::metrics::labels::STATUS_ERROR);
                Err(Error::Query(format!("search aborted: {}", e)))
            }
        }
    }
}

#[async_trait]
impl EntrySource for EntryStream {
    async fn next_entry(&mut self) -> Result<Option<RawEntry>> {
        self.poll_next().await
    }
}

/// Substitute a generic explanation when the server sends no diagnostic text.
fn describe_result(rc: u32, text: &str) -> String {
    if !text.is_empty() {
        return text.to_string();
    }
    match rc {
        1 => "operations error".to_string(),
        2 => "protocol error in the request".to_string(),
        32 => "no such object".to_string(),
        50 => "insufficient access rights".to_string(),
        53 => "server unwilling to perform".to_string(),
        _ => "the directory rejected the search".to_string(),
    }
}
