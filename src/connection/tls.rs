//! Transport security selection and TLS root-store construction.
//!
//! TLS demand is a per-connection value carried in the connection spec and
//! applied to the `ldap3` settings at open time. There is no process-global
//! TLS state anywhere in this crate.

use crate::{Error, Result};
use ldap3::LdapConnSettings;
use rustls::{Certificate, ClientConfig, RootCertStore};
use serde::{Deserialize, Serialize};
use std::fs;
use std::sync::Arc;

/// How the connection to the directory server is protected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportSecurity {
    /// Plain LDAP, no encryption
    Plain,
    /// Implicit TLS from the first byte (LDAPS)
    #[default]
    Ldaps,
}

impl TransportSecurity {
    /// URI scheme for this security mode
    pub fn scheme(&self) -> &'static str {
        match self {
            Self::Plain => "ldap",
            Self::Ldaps => "ldaps",
        }
    }

    /// Well-known default port for this security mode
    pub fn default_port(&self) -> u16 {
        match self {
            Self::Plain => 389,
            Self::Ldaps => 636,
        }
    }

    /// Map a URI scheme onto a security mode
    pub fn from_scheme(scheme: &str) -> Result<Self> {
        match scheme {
            "ldap" => Ok(Self::Plain),
            "ldaps" => Ok(Self::Ldaps),
            _ => Err(Error::Config(format!(
                "unsupported scheme '{}': expected ldap or ldaps",
                scheme
            ))),
        }
    }
}

impl std::fmt::Display for TransportSecurity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plain => write!(f, "none"),
            Self::Ldaps => write!(f, "ldaps"),
        }
    }
}

impl std::str::FromStr for TransportSecurity {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "none" | "plain" => Ok(Self::Plain),
            "ldaps" | "tls" => Ok(Self::Ldaps),
            _ => Err(Error::Config(format!(
                "invalid transport security '{}': expected none or ldaps",
                s
            ))),
        }
    }
}

/// TLS options for one connection.
///
/// `verify_certificate` defaults to true; turning it off disables chain and
/// hostname validation entirely and is only appropriate against test servers
/// with self-signed certificates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsOptions {
    /// Whether the server certificate is validated (default: true)
    pub verify_certificate: bool,
    /// Path to a custom CA certificate file in PEM format
    /// (None = system root certificates)
    pub ca_cert_path: Option<String>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            verify_certificate: true,
            ca_cert_path: None,
        }
    }
}

impl TlsOptions {
    /// Apply these options to the `ldap3` connection settings.
    ///
    /// With verification enabled a rustls `ClientConfig` is built from the
    /// selected root store and handed to the settings; with verification
    /// disabled the library's no-verify escape hatch is used instead.
    pub fn apply(&self, settings: LdapConnSettings) -> Result<LdapConnSettings> {
        if !self.verify_certificate {
            return Ok(settings.set_no_tls_verify(true));
        }

        let root_store = match &self.ca_cert_path {
            Some(path) => load_custom_ca(path)?,
            None => load_system_roots()?,
        };

        let client_config = ClientConfig::builder()
            .with_safe_defaults()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        Ok(settings.set_config(Arc::new(client_config)))
    }
}

/// Load system root certificates via rustls-native-certs.
fn load_system_roots() -> Result<RootCertStore> {
    let certs = rustls_native_certs::load_native_certs()
        .map_err(|e| Error::Config(format!("failed to load system root certificates: {}", e)))?;

    let mut store = RootCertStore::empty();
    for cert in certs {
        // Skip certificates the trust store carries but rustls cannot parse
        let _ = store.add(&Certificate(cert.0));
    }

    if store.is_empty() {
        return Err(Error::Config(
            "no usable system root certificates found".to_string(),
        ));
    }

    Ok(store)
}

/// Load a custom CA certificate from a PEM file.
fn load_custom_ca(ca_path: &str) -> Result<RootCertStore> {
    let ca_cert_data = fs::read(ca_path).map_err(|e| {
        Error::Config(format!(
            "failed to read CA certificate file '{}': {}",
            ca_path, e
        ))
    })?;

    let mut reader = std::io::Cursor::new(&ca_cert_data);
    let certs = rustls_pemfile::certs(&mut reader)
        .map_err(|_| Error::Config(format!("failed to parse CA certificate from '{}'", ca_path)))?;

    if certs.is_empty() {
        return Err(Error::Config(format!(
            "no valid certificates found in '{}'",
            ca_path
        )));
    }

    let mut store = RootCertStore::empty();
    for der in certs {
        let _ = store.add(&Certificate(der));
    }

    Ok(store)
}
