//! DirectoryClient implementation

use crate::connection::{Connection, ConnectionSpec};
use crate::search::SearchSpec;
use crate::stream::{Normalizer, RecordStream};
use crate::Result;
use tracing::warn;

/// High-level search pipeline client.
///
/// Wires the search executor and the schema normalizer together: one
/// connection, at most one search, records out. The connection is closed on
/// every exit path, success or failure.
#[derive(Debug)]
pub struct DirectoryClient {
    conn: Connection,
}

impl DirectoryClient {
    /// Connect to the directory server and authenticate.
    ///
    /// The spec is validated before any network I/O; binding is skipped when
    /// no bind DN is supplied (anonymous search).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> ldaptab::Result<()> {
    /// use ldaptab::{ConnectionSpec, DirectoryClient};
    ///
    /// let spec = ConnectionSpec::new("ldaps://ldap.example.com")
    ///     .bind("cn=reader,dc=example,dc=com", "secret");
    /// let client = DirectoryClient::connect(&spec).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(spec: &ConnectionSpec) -> Result<Self> {
        spec.validate()?;

        let mut conn = Connection::open(spec).await?;
        if let Err(e) = conn.bind(spec).await {
            // Release the transport before surfacing the bind failure
            if let Err(close_err) = conn.close().await {
                warn!(error = %close_err, "error closing connection after failed bind");
            }
            return Err(e);
        }

        Ok(Self { conn })
    }

    /// Run one search through the full pipeline and return the record
    /// stream.
    ///
    /// Consumes the client: the collection pass drains every entry, the
    /// connection is unbound, and only then does the (I/O-free) emission
    /// pass begin. Any error during the search leaves no partial output.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example(client: ldaptab::DirectoryClient) -> ldaptab::Result<()> {
    /// use ldaptab::{Scope, SearchSpec};
    ///
    /// let search = SearchSpec::new("ou=people,dc=example,dc=com")
    ///     .scope(Scope::Subtree)
    ///     .filter("(objectClass=person)");
    ///
    /// for record in client.search(&search).await? {
    ///     println!("{}", record.dn().unwrap_or("<no dn>"));
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search(mut self, spec: &SearchSpec) -> Result<RecordStream> {
        spec.validate()?;

        let collected = async {
            let mut entries = self.conn.streaming_search(spec).await?;
            Normalizer::collect(&mut entries).await
        }
        .await;

        // Exactly one close per successful open, on every exit path
        if let Err(close_err) = self.conn.close().await {
            warn!(error = %close_err, "error closing connection after search");
        }

        let normalizer = collected?;
        Ok(normalizer.into_records(spec.limit))
    }

    /// Tear the connection down without searching.
    pub async fn close(self) -> Result<()> {
        self.conn.close().await
    }
}
