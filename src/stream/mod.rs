//! Schema normalization and record emission
//!
//! This module handles:
//! * The attribute universe (union of observed attribute names)
//! * The collection pass over the raw entry stream
//! * The emission pass yielding schema-complete records

mod normalizer;
mod record;
mod record_stream;

pub use normalizer::{AttributeUniverse, Normalizer};
pub use record::{NormalizedRecord, DN_ATTRIBUTE};
pub use record_stream::RecordStream;
