//! Streaming LDAP search with schema-complete record emission.
//!
//! Directory schemas are sparse: two entries matched by the same search
//! rarely populate the same attributes, and a tabular consumer that infers
//! its columns from early rows silently drops the attributes that only
//! appear later. This crate runs one asynchronous LDAP search and reconciles
//! the heterogeneous result entries into records that all share one
//! field-name set, in two passes:
//!
//! 1. **Collection**: drain every entry as the directory delivers it,
//!    caching entries in arrival order and accumulating the union of
//!    attribute names (plus the reserved `dn` field).
//! 2. **Emission**: replay the cache, backfilling each entry with empty
//!    value sequences for the attributes it lacks, yielding records lazily.
//!
//! The buffering is bounded by the result-set size of one search; that
//! trade-off is what guarantees no attribute is ever dropped.
//!
//! # Examples
//!
//! ```no_run
//! # async fn example() -> ldaptab::Result<()> {
//! use ldaptab::{ConnectionSpec, DirectoryClient, Scope, SearchSpec};
//!
//! let conn = ConnectionSpec::new("ldaps://ldap.example.com")
//!     .bind("cn=reader,dc=example,dc=com", "secret");
//!
//! let search = SearchSpec::new("ou=people,dc=example,dc=com")
//!     .scope(Scope::Subtree)
//!     .filter("(objectClass=person)");
//!
//! let client = DirectoryClient::connect(&conn).await?;
//! for record in client.search(&search).await? {
//!     // Every record has the identical field-name set, including "dn"
//!     println!("{:?}", record.dn());
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod connection;
pub mod error;
pub mod metrics;
pub mod search;
pub mod stream;

pub use client::DirectoryClient;
pub use connection::{Connection, ConnectionSpec, ConnectionState, TlsOptions, TransportSecurity};
pub use error::{Error, Result};
pub use search::{CancelHandle, EntrySource, EntryStream, RawEntry, Scope, SearchSpec};
pub use stream::{AttributeUniverse, NormalizedRecord, Normalizer, RecordStream, DN_ATTRIBUTE};
