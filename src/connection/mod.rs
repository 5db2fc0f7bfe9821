//! Connection management
//!
//! This module handles:
//! * Server endpoint resolution (scheme, host, port)
//! * Connection lifecycle (open, bind, search, close)
//! * State machine enforcement
//! * Per-connection TLS configuration

mod conn;
mod state;
mod tls;
mod url;

pub use conn::{Connection, ConnectionSpec};
pub use state::ConnectionState;
pub use tls::{TlsOptions, TransportSecurity};
pub use url::Endpoint;
