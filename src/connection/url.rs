//! Server endpoint resolution
//!
//! Supports formats:
//! * ldaps://host:636 (scheme and port embedded)
//! * ldap://host (scheme embedded, default port)
//! * host (bare hostname; security and port from the spec, or defaults)

use super::tls::TransportSecurity;
use crate::{Error, Result};

/// A fully resolved directory server endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Transport security mode
    pub security: TransportSecurity,
    /// Server hostname or IP address
    pub host: String,
    /// Server port
    pub port: u16,
}

impl Endpoint {
    /// Resolve an endpoint from the caller-supplied server string plus the
    /// optional port and security overrides from the connection spec.
    ///
    /// A scheme embedded in the server URI is authoritative; an explicit
    /// security override that contradicts it is a configuration error, as is a
    /// port supplied both in the URI and as an option.
    pub fn resolve(
        server: &str,
        port: Option<u16>,
        security: Option<TransportSecurity>,
    ) -> Result<Self> {
        let parsed = ServerUrl::parse(server)?;

        let resolved_security = match (parsed.scheme, security) {
            (Some(from_uri), Some(explicit)) if from_uri != explicit => {
                return Err(Error::Config(format!(
                    "server URI scheme '{}' contradicts transport security '{}'",
                    from_uri.scheme(),
                    explicit
                )));
            }
            (Some(from_uri), _) => from_uri,
            (None, Some(explicit)) => explicit,
            (None, None) => TransportSecurity::default(),
        };

        let resolved_port = match (parsed.port, port) {
            (Some(_), Some(_)) => {
                return Err(Error::Config(
                    "port specified both in server URI and as an option".to_string(),
                ));
            }
            (Some(p), None) | (None, Some(p)) => {
                if p == 0 {
                    return Err(Error::Config("port must be >= 1".to_string()));
                }
                p
            }
            (None, None) => resolved_security.default_port(),
        };

        Ok(Self {
            security: resolved_security,
            host: parsed.host,
            port: resolved_port,
        })
    }

    /// The connection URL handed to the directory library.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", self.security.scheme(), self.host, self.port)
    }
}

/// Parsed pieces of a server string, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ServerUrl {
    scheme: Option<TransportSecurity>,
    host: String,
    port: Option<u16>,
}

impl ServerUrl {
    fn parse(s: &str) -> Result<Self> {
        let (scheme, rest) = match s.split_once("://") {
            Some((scheme, rest)) => (Some(TransportSecurity::from_scheme(scheme)?), rest),
            None => (None, s),
        };

        let rest = match rest.split_once('/') {
            Some((host_port, "")) => host_port,
            Some(_) => {
                return Err(Error::Config(format!(
                    "server URI must not contain a path: '{}'",
                    s
                )));
            }
            None => rest,
        };

        let (host, port) = match rest.rsplit_once(':') {
            Some((host, port)) => {
                let port = port
                    .parse::<u16>()
                    .map_err(|_| Error::Config(format!("invalid port in server URI: '{}'", s)))?;
                (host, Some(port))
            }
            None => (rest, None),
        };

        validate_host(host)?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }
}

/// Basic hostname validation, shared by TLS server-name handling.
fn validate_host(host: &str) -> Result<()> {
    let host = host.trim_end_matches('.');

    if host.is_empty() || host.len() > 253 {
        return Err(Error::Config(format!("invalid server host: '{}'", host)));
    }

    if !host
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '.')
    {
        return Err(Error::Config(format!("invalid server host: '{}'", host)));
    }

    Ok(())
}
