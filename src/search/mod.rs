//! Search execution
//!
//! This module handles:
//! * Search parameters and their eager validation
//! * The raw entry model returned by the directory
//! * The pull-based entry stream draining one outstanding search

mod entry;
mod spec;
mod stream;

pub use entry::RawEntry;
pub use spec::{Scope, SearchSpec, MATCH_ALL_FILTER};
pub use stream::{CancelHandle, EntrySource, EntryStream};
