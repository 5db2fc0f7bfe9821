//! Search parameters
//!
//! A [`SearchSpec`] describes exactly one directory search: where to start,
//! how deep to go, what to match, and which attributes to request. It is
//! validated eagerly, before any network I/O.

use super::stream::CancelHandle;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Match-all filter used when the caller supplies none.
pub const MATCH_ALL_FILTER: &str = "(objectClass=*)";

/// How deep a search traverses from its base DN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The base object only
    Base,
    /// Immediate children of the base, excluding the base itself
    OneLevel,
    /// The base object and its full subtree
    #[default]
    Subtree,
}

impl Scope {
    /// The wire-level scope for the directory library.
    pub(crate) fn to_ldap(self) -> ldap3::Scope {
        match self {
            Self::Base => ldap3::Scope::Base,
            Self::OneLevel => ldap3::Scope::OneLevel,
            Self::Subtree => ldap3::Scope::Subtree,
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::OneLevel => write!(f, "onelevel"),
            Self::Subtree => write!(f, "subtree"),
        }
    }
}

impl std::str::FromStr for Scope {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "base" => Ok(Self::Base),
            "onelevel" => Ok(Self::OneLevel),
            "subtree" => Ok(Self::Subtree),
            _ => Err(Error::Config(format!(
                "invalid scope '{}': expected base, onelevel, or subtree",
                s
            ))),
        }
    }
}

/// One directory search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSpec {
    /// Search base DN
    pub base_dn: String,

    /// Search scope (default: subtree)
    #[serde(default)]
    pub scope: Scope,

    /// Search filter (default: match-all)
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Attributes to request (None = server returns all attributes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_list: Option<Vec<String>>,

    /// Caller-side cap on emitted records
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,

    /// Deadline for each poll of the entry stream
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,

    /// Cancel handle checked once per poll iteration
    #[serde(skip)]
    pub(crate) cancel: Option<CancelHandle>,
}

fn default_filter() -> String {
    MATCH_ALL_FILTER.to_string()
}

impl SearchSpec {
    /// Create a search spec with defaults: subtree scope, match-all filter,
    /// all attributes, no limit, no timeout.
    pub fn new(base_dn: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            scope: Scope::default(),
            filter: default_filter(),
            attribute_list: None,
            limit: None,
            timeout: None,
            cancel: None,
        }
    }

    /// Set the search scope
    pub fn scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Set the search filter
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Restrict the attributes the server returns
    pub fn attributes(mut self, attrs: Vec<String>) -> Self {
        self.attribute_list = Some(attrs);
        self
    }

    /// Restrict attributes from a whitespace-delimited list, the form the
    /// surrounding command framework passes through
    pub fn attributes_from_str(mut self, list: &str) -> Self {
        let attrs: Vec<String> = list.split_whitespace().map(str::to_string).collect();
        self.attribute_list = if attrs.is_empty() { None } else { Some(attrs) };
        self
    }

    /// Cap the number of emitted records
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Abort any entry poll that exceeds this deadline
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a cancel handle, checked once per poll iteration
    pub fn cancel_handle(mut self, handle: CancelHandle) -> Self {
        self.cancel = Some(handle);
        self
    }

    /// Validate the spec. Fails fast, before any network I/O.
    pub fn validate(&self) -> Result<()> {
        if self.base_dn.is_empty() {
            return Err(Error::Config("basedn is required".to_string()));
        }

        if self.filter.is_empty() {
            return Err(Error::Config("filter must not be empty".to_string()));
        }

        if self.limit == Some(0) {
            return Err(Error::Config("limit must be >= 1".to_string()));
        }

        if let Some(attrs) = &self.attribute_list {
            if attrs.iter().any(|a| a.is_empty()) {
                return Err(Error::Config(
                    "attributelist must not contain empty names".to_string(),
                ));
            }
        }

        Ok(())
    }
}
