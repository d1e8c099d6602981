// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Flowlines-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Flowlines and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

pub const KAMELET_SCHEME: &str = "kamelet";

/// A parsed endpoint URI such as `direct:orders?timeout=5` or `kafka://payments`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointUri {
    scheme: SmolStr,
    path: SmolStr,
    query: Option<SmolStr>,
}

fn endpoint_regex() -> &'static Regex {
    static ENDPOINT: OnceLock<Regex> = OnceLock::new();
    ENDPOINT.get_or_init(|| {
        Regex::new(r"^(?P<scheme>[A-Za-z][A-Za-z0-9+.\-]*):(?://)?(?P<path>[^?]*)(?:\?(?P<query>.*))?$")
            .expect("endpoint regex is valid")
    })
}

impl EndpointUri {
    pub fn parse(input: &str) -> Result<Self, EndpointParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(EndpointParseError::Empty);
        }

        let captures = endpoint_regex()
            .captures(input)
            .ok_or_else(|| EndpointParseError::Malformed(input.to_owned()))?;

        let scheme = captures
            .name("scheme")
            .map(|m| SmolStr::new(m.as_str().to_ascii_lowercase()))
            .ok_or_else(|| EndpointParseError::Malformed(input.to_owned()))?;
        let path = captures.name("path").map(|m| SmolStr::new(m.as_str())).unwrap_or_default();
        let query = captures
            .name("query")
            .map(|m| SmolStr::new(m.as_str()))
            .filter(|q| !q.is_empty());

        Ok(Self { scheme, path, query })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// The logical name other routes refer to: the path without query.
    pub fn key(&self) -> EndpointKey {
        EndpointKey::new(self.scheme.clone(), self.path.clone())
    }

    /// `scheme:path` without query, used to match placeholder entries.
    pub fn base(&self) -> String {
        format!("{}:{}", self.scheme, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    Empty,
    Malformed(String),
}

impl fmt::Display for EndpointParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("endpoint uri must not be empty"),
            Self::Malformed(uri) => write!(f, "endpoint uri {uri:?} has no scheme"),
        }
    }
}

impl std::error::Error for EndpointParseError {}

/// `(scheme, name)` pair used by the topology index, e.g. `direct:orders` or
/// `kamelet:slack-sink`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EndpointKey {
    pub scheme: SmolStr,
    pub name: SmolStr,
}

impl EndpointKey {
    pub fn new(scheme: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            scheme: scheme.into(),
            name: name.into(),
        }
    }

    pub fn kamelet(name: impl Into<SmolStr>) -> Self {
        Self::new(KAMELET_SCHEME, name)
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scheme, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::{EndpointKey, EndpointParseError, EndpointUri};

    #[test]
    fn parses_scheme_path_and_query() {
        let uri = EndpointUri::parse("direct:orders?timeout=5").expect("uri");
        assert_eq!(uri.scheme(), "direct");
        assert_eq!(uri.path(), "orders");
        assert_eq!(uri.query(), Some("timeout=5"));
        assert_eq!(uri.key(), EndpointKey::new("direct", "orders"));
        assert_eq!(uri.base(), "direct:orders");
    }

    #[test]
    fn strips_authority_slashes_and_lowercases_scheme() {
        let uri = EndpointUri::parse("  SEDA://audit ").expect("uri");
        assert_eq!(uri.scheme(), "seda");
        assert_eq!(uri.path(), "audit");
        assert_eq!(uri.query(), None);
    }

    #[test]
    fn rejects_empty_and_schemeless_input() {
        assert_eq!(EndpointUri::parse("   "), Err(EndpointParseError::Empty));
        assert_eq!(
            EndpointUri::parse("orders"),
            Err(EndpointParseError::Malformed("orders".to_owned()))
        );
    }

    #[test]
    fn key_displays_as_scheme_and_name() {
        assert_eq!(EndpointKey::kamelet("slack-sink").to_string(), "kamelet:slack-sink");
    }
}
