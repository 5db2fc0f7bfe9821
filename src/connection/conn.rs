//! Core connection type

use super::state::ConnectionState;
use super::tls::{TlsOptions, TransportSecurity};
use super::url::Endpoint;
use crate::search::{EntryStream, SearchSpec};
use crate::{Error, Result};
use ldap3::{Ldap, LdapConnAsync, LdapConnSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn, Instrument};

/// LDAP result code for rejected credentials (invalidCredentials).
const RC_INVALID_CREDENTIALS: u32 = 49;

/// Connection parameters for one directory server.
///
/// Validated eagerly: [`ConnectionSpec::validate`] runs before any network
/// call, so a malformed spec never opens a socket.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionSpec {
    /// Server host, with optional `ldap://` / `ldaps://` scheme and port
    pub server: String,

    /// Server port, only when `server` does not embed one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Transport security, only when `server` does not embed a scheme
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security: Option<TransportSecurity>,

    /// Whether the server certificate is validated (default: true)
    #[serde(default = "default_verify_certificate")]
    pub verify_certificate: bool,

    /// Custom CA certificate in PEM format (None = system roots)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert_path: Option<String>,

    /// Simple-bind DN; absent means anonymous search
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_dn: Option<String>,

    /// Simple-bind password; required whenever `bind_dn` is present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_password: Option<String>,

    /// Deadline for establishing the transport
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<Duration>,
}

fn default_verify_certificate() -> bool {
    true
}

impl ConnectionSpec {
    /// Create a spec for the given server with all defaults: LDAPS on the
    /// well-known port, certificate verification on, anonymous bind.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: None,
            security: None,
            verify_certificate: default_verify_certificate(),
            ca_cert_path: None,
            bind_dn: None,
            bind_password: None,
            connect_timeout: None,
        }
    }

    /// Set the server port (only valid when the server URI embeds none)
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Select the transport security mode
    pub fn security(mut self, security: TransportSecurity) -> Self {
        self.security = Some(security);
        self
    }

    /// Enable or disable server certificate verification
    pub fn verify_certificate(mut self, verify: bool) -> Self {
        self.verify_certificate = verify;
        self
    }

    /// Trust a custom CA certificate instead of the system roots
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca_cert_path = Some(path.into());
        self
    }

    /// Authenticate with a simple bind
    pub fn bind(mut self, dn: impl Into<String>, password: impl Into<String>) -> Self {
        self.bind_dn = Some(dn.into());
        self.bind_password = Some(password.into());
        self
    }

    /// Deadline for establishing the transport
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Validate the spec. Fails fast, before any network I/O.
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;

        if self.bind_dn.is_some() && self.bind_password.is_none() {
            return Err(Error::Config(
                "binddn was supplied without bindpassword".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the server endpoint from the spec.
    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::resolve(&self.server, self.port, self.security)
    }

    fn tls_options(&self) -> TlsOptions {
        TlsOptions {
            verify_certificate: self.verify_certificate,
            ca_cert_path: self.ca_cert_path.clone(),
        }
    }
}

impl std::fmt::Debug for ConnectionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSpec")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("security", &self.security)
            .field("verify_certificate", &self.verify_certificate)
            .field("ca_cert_path", &self.ca_cert_path)
            .field("bind_dn", &self.bind_dn)
            .field(
                "bind_password",
                &self.bind_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

/// Directory connection
///
/// One network connection per invocation; at most one outstanding search.
/// [`Connection::close`] must run exactly once per successful open, on every
/// exit path; unbind failures are logged, not propagated.
#[derive(Debug)]
pub struct Connection {
    ldap: Ldap,
    state: ConnectionState,
}

impl Connection {
    /// Establish the transport described by the spec.
    ///
    /// TLS demand travels with the spec into the connection settings here;
    /// nothing about certificate verification is process-global.
    pub async fn open(spec: &ConnectionSpec) -> Result<Self> {
        spec.validate()?;
        let endpoint = spec.endpoint()?;
        let url = endpoint.url();

        async {
            let mut settings = LdapConnSettings::new();
            if let Some(timeout) = spec.connect_timeout {
                settings = settings.set_conn_timeout(timeout);
            }
            if endpoint.security == TransportSecurity::Ldaps {
                settings = spec.tls_options().apply(settings)?;
            }

            let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
                .await
                .map_err(|e| Error::Connection(format!("failed to connect to {}: {}", url, e)))?;

            // The library multiplexes the socket through a driver task
            tokio::spawn(async move {
                if let Err(e) = conn.drive().await {
                    warn!(error = %e, "directory connection driver error");
                }
            });

            let mut state = ConnectionState::Initial;
            state.transition(ConnectionState::Connected)?;

            info!("directory connection established");
            Ok(Self { ldap, state })
        }
        .instrument(tracing::info_span!("open", url = %url))
        .await
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Authenticate with the spec's credentials, or proceed anonymously when
    /// no bind DN is supplied.
    pub async fn bind(&mut self, spec: &ConnectionSpec) -> Result<()> {
        match (&spec.bind_dn, &spec.bind_password) {
            (Some(dn), Some(password)) => {
                debug!(bind_dn = %dn, "performing simple bind");
                let result = self
                    .ldap
                    .simple_bind(dn, password)
                    .await
                    .map_err(|e| Error::Connection(format!("bind request failed: {}", e)))?;

                if result.rc == RC_INVALID_CREDENTIALS {
                    return Err(Error::Authentication(format!(
                        "directory rejected credentials for {}",
                        dn
                    )));
                }
                if result.rc != 0 {
                    return Err(Error::Protocol(format!(
                        "bind failed with code {}: {}",
                        result.rc, result.text
                    )));
                }
                debug!(bind_dn = %dn, "bind successful");
            }
            (Some(_), None) => {
                // validate() rejects this before open; kept as a backstop for
                // callers that skip the facade
                return Err(Error::Config(
                    "binddn was supplied without bindpassword".to_string(),
                ));
            }
            _ => {
                debug!("no bind DN supplied, searching anonymously");
            }
        }

        self.state.transition(ConnectionState::Ready)?;
        Ok(())
    }

    /// Submit one search and return the stream of raw entries.
    pub async fn streaming_search(&mut self, spec: &SearchSpec) -> Result<EntryStream> {
        spec.validate()?;

        if self.state != ConnectionState::Ready {
            return Err(Error::ConnectionBusy(format!(
                "connection in state: {}",
                self.state
            )));
        }
        self.state.transition(ConnectionState::Searching)?;

        debug!(
            base_dn = %spec.base_dn,
            scope = %spec.scope,
            filter = %spec.filter,
            "submitting search"
        );
        crate::metrics::counters::search_started();

        // Empty attribute list asks the server for all user attributes
        let attrs: Vec<String> = spec.attribute_list.clone().unwrap_or_default();

        let stream = self
            .ldap
            .streaming_search(&spec.base_dn, spec.scope.to_ldap(), &spec.filter, attrs)
            .await
            .map_err(|e| Error::Query(format!("search request failed: {}", e)))?;

        Ok(EntryStream::new(stream, spec.timeout, spec.cancel.clone()))
    }

    /// Unbind and disconnect.
    pub async fn close(mut self) -> Result<()> {
        self.state.transition(ConnectionState::Closed)?;
        if let Err(e) = self.ldap.unbind().await {
            warn!(error = %e, "error during unbind");
        }
        Ok(())
    }
}
